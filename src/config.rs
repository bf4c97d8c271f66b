use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::*;

/// Settings for one deployment of the annotation flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub registry: RegistryConfig,
    #[serde(default)]
    pub session: SessionConfig,
}

/// Registry ids the flow reads from and writes into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistryConfig {
    pub app_id: String,
    pub registry_id: String,
    pub dna_sequence_schema_id: String,
    pub dna_feature_schema_id: String,
    pub aa_sequence_schema_id: String,
    #[serde(default)]
    pub author_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub timeout_secs: u64,
    pub max_message_len: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 3600,
            max_message_len: 200,
        }
    }
}

impl Config {
    /// Read the config from a YAML file.
    pub fn from_file(file: impl AsRef<Path>) -> Result<Self> {
        let file = file.as_ref();
        let contents = std::fs::read_to_string(file).map_err(|e| Error::ConfigIo {
            file: file.display().to_string(),
            source: Box::new(e),
        })?;
        Self::from_yaml(&contents)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(|e| Error::ConfigParse {
            source: Box::new(e),
        })
    }
}
