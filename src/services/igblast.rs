use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::parse_utils::non_empty;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Organism {
    Human,
    Mouse,
    Rat,
    Rabbit,
    RhesusMonkey,
}

impl Organism {
    pub fn as_str(&self) -> &'static str {
        match self {
            Organism::Human => "human",
            Organism::Mouse => "mouse",
            Organism::Rat => "rat",
            Organism::Rabbit => "rabbit",
            Organism::RhesusMonkey => "rhesus_monkey",
        }
    }
}

/// Numbering convention used to delimit framework and CDR regions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainSystem {
    Imgt,
    Kabat,
}

impl DomainSystem {
    pub fn as_str(&self) -> &'static str {
        match self {
            DomainSystem::Imgt => "imgt",
            DomainSystem::Kabat => "kabat",
        }
    }

    /// Suffix used for annotation and field names, e.g. `CDR1_IMGT`.
    pub fn label(&self) -> &'static str {
        match self {
            DomainSystem::Imgt => "IMGT",
            DomainSystem::Kabat => "Kabat",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuerySequence {
    pub id: String,
    pub bases: String,
}

impl fmt::Display for QuerySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, ">{}\n{}", self.id, self.bases)
    }
}

/// One IgBLAST command over a batch of nucleotide sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationRequest {
    pub sequences: Vec<QuerySequence>,
    pub organism: Organism,
    pub domain_system: DomainSystem,
}

impl AnnotationRequest {
    pub fn cli_args(&self) -> Vec<String> {
        let organism = self.organism.as_str();
        let germline_db = |segment: &str| format!("imgt_{organism}_IG{segment}");

        vec![
            "-germline_db_V".into(),
            germline_db("V"),
            "-germline_db_D".into(),
            germline_db("D"),
            "-germline_db_J".into(),
            germline_db("J"),
            "-auxiliary_data".into(),
            format!("optional_file/{organism}_gl.aux"),
            "-organism".into(),
            organism.into(),
            "-query".into(),
            "@file".into(),
            "-show_translation".into(),
            "-outfmt".into(),
            "19".into(),
            "-domain_system".into(),
            self.domain_system.as_str().into(),
            "-ig_seqtype".into(),
            "Ig".into(),
            "-num_alignments_V".into(),
            "1".into(),
            "-num_alignments_D".into(),
            "1".into(),
            "-num_alignments_J".into(),
            "1".into(),
            "-strand".into(),
            "both".into(),
            "-extend_align5end".into(),
            "-extend_align3end".into(),
        ]
    }

    /// Query file contents in FASTA format.
    pub fn fasta(&self) -> String {
        self.sequences
            .iter()
            .map(|s| s.to_string())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// One row of the AIRR tab-separated report. Blank cells are left out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgBlastRecord {
    columns: BTreeMap<String, String>,
}

impl IgBlastRecord {
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns.get(column).map(|v| v.as_str())
    }

    pub fn sequence_id(&self) -> Option<&str> {
        self.get("sequence_id")
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for IgBlastRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let columns = iter.into_iter().map(|(k, v)| (k.into(), v.into()));
        Self {
            columns: columns.collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationReport {
    pub data: String,
    pub imgt_version: Option<String>,
}

impl AnnotationReport {
    pub fn records(&self) -> Result<Vec<IgBlastRecord>> {
        let mut rdr = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(true)
            .flexible(true)
            .from_reader(self.data.as_bytes());

        let headers = rdr
            .headers()
            .map_err(|e| Error::AnnotationReport {
                source: Box::new(e),
            })?
            .clone();

        let mut res = Vec::new();
        for record in rdr.records() {
            let record = record.map_err(|e| Error::AnnotationReport {
                source: Box::new(e),
            })?;
            res.push(
                headers
                    .iter()
                    .zip(record.iter())
                    .filter_map(|(column, cell)| non_empty(cell).map(|v| (column, v)))
                    .collect(),
            );
        }

        Ok(res)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationResponse {
    pub key: String,
    pub return_code: i32,
    #[serde(default)]
    pub error: Option<String>,
    pub report: AnnotationReport,
}

/// Remote IgBLAST command service.
pub trait Annotator {
    /// Start a command and return the key to fetch its result with.
    fn submit(&self, request: &AnnotationRequest) -> Result<String>;

    fn fetch_result(&self, key: &str, wait: bool) -> Result<AnnotationResponse>;
}

/// Run a command and wait for its result.
pub fn annotate_sync(
    annotator: &dyn Annotator,
    request: &AnnotationRequest,
) -> Result<AnnotationResponse> {
    tracing::info!(
        sequences = request.sequences.len(),
        organism = request.organism.as_str(),
        domain_system = request.domain_system.as_str(),
        "Executing IgBlast command"
    );

    let key = annotator.submit(request)?;
    let response = annotator.fetch_result(&key, true)?;

    if response.return_code != 0 {
        tracing::error!(
            key = %key,
            return_code = response.return_code,
            error = response.error.as_deref().unwrap_or_default(),
            "Error with IgBlast command for {} domain system",
            request.domain_system.label()
        );
    }

    Ok(response)
}
