use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Text(String),
    List(Vec<String>),
}

impl FieldValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(_) => None,
        }
    }

    /// First value of a multi-select field, or the value of a single field.
    pub fn first(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            FieldValue::List(l) => l.first().map(|s| s.as_str()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    #[serde(default)]
    pub value: Option<FieldValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,
}

impl Field {
    pub fn new(value: FieldValue) -> Self {
        Self {
            value: Some(value),
            text_value: None,
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::new(FieldValue::Text(value.into()))
    }

    pub fn list(values: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self::new(FieldValue::List(
            values.into_iter().map(|v| v.into()).collect(),
        ))
    }

    /// A field as returned by the registry, with its display text.
    pub fn with_text_value(value: FieldValue, text_value: impl Into<String>) -> Self {
        Self {
            value: Some(value),
            text_value: Some(text_value.into()),
        }
    }
}

pub type Fields = BTreeMap<String, Field>;

/// Entities that carry schema fields.
pub trait HasFields {
    fn fields(&self) -> &Fields;

    fn field_value(&self, key: &str) -> Option<&FieldValue> {
        self.fields().get(key).and_then(|f| f.value.as_ref())
    }

    fn field_text_value(&self, key: &str) -> Option<&str> {
        self.fields().get(key).and_then(|f| f.text_value.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaRef {
    pub id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredEntity {
    pub id: String,
    pub name: String,
    pub schema: SchemaRef,
    #[serde(default)]
    pub fields: Fields,
}

/// Notification that an entity was registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityRegisteredEvent {
    pub id: String,
    pub entity: RegisteredEntity,
}

impl EntityRegisteredEvent {
    pub fn schema_id(&self) -> &str {
        &self.entity.schema.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaSequence {
    pub id: String,
    pub name: String,
    pub bases: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub is_circular: bool,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub custom_fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomEntity {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaSequence {
    pub id: String,
    pub name: String,
    pub amino_acids: String,
    #[serde(default)]
    pub folder_id: Option<String>,
    #[serde(default)]
    pub registry_id: Option<String>,
    #[serde(default)]
    pub fields: Fields,
    #[serde(default)]
    pub custom_fields: Fields,
}

impl HasFields for RegisteredEntity {
    fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl HasFields for DnaSequence {
    fn fields(&self) -> &Fields {
        &self.fields
    }
}

impl HasFields for CustomEntity {
    fn fields(&self) -> &Fields {
        &self.fields
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaAnnotation {
    pub color: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub name: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NamingStrategy {
    NewIds,
    KeepNames,
    ReplaceNamesFromParts,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AaSequenceCreate {
    pub name: String,
    pub amino_acids: String,
    pub annotations: Vec<AaAnnotation>,
    pub fields: Fields,
    pub custom_fields: Fields,
    pub registry_id: String,
    pub folder_id: Option<String>,
    pub schema_id: String,
    pub naming_strategy: NamingStrategy,
    pub author_ids: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaSequenceBulkCreate {
    pub name: String,
    pub bases: String,
    pub is_circular: bool,
    pub folder_id: Option<String>,
    pub custom_fields: Fields,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnaSequenceBulkUpdate {
    pub id: String,
    pub name: String,
    pub bases: String,
    pub fields: Fields,
    pub custom_fields: Fields,
    pub folder_id: Option<String>,
    pub is_circular: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlignmentAlgorithm {
    Mafft,
    Clustalo,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateAlignmentCreate {
    pub algorithm: AlignmentAlgorithm,
    pub name: String,
    pub template_sequence_id: String,
    pub sequence_ids: Vec<String>,
}

/// Handle to a bulk operation running in the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskLink {
    pub task_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Running,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskResponse {
    #[serde(default)]
    pub dna_sequences: Vec<DnaSequence>,
}

/// A completed bulk operation.
///
/// `errors` is kept as raw JSON since the registry reports either a batch-level
/// message or per-index errors, see [`crate::flow::AsyncTaskResultProcessor`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AsyncTask {
    pub id: String,
    pub status: TaskStatus,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<serde_json::Value>,
    #[serde(default)]
    pub response: Option<TaskResponse>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MessageStyle {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SessionStatus {
    Running,
    Succeeded,
    CompletedWithWarnings,
    Failed,
}
