//! Fakes and fixtures shared by the unit tests.

use std::cell::RefCell;
use std::collections::VecDeque;

use serde::Serialize;
use serde_json::Value;

use crate::config::*;
use crate::errors::*;
use crate::items::*;
use crate::mapper::IgBlastToRegistryMapper;
use crate::services::fields::*;
use crate::services::*;

pub const BASES: &str = "CAGGTGCAGCTGGTGGAGTCTGGG";
pub const AMINO_ACIDS: &str = "QVQLVGFTFSYAISTRWGQ";
pub const GERMLINE_ALIGNMENT: &str = "CAGGTGCAGCTGGTGGAGTCTGGG";
pub const IMGT_VERSION: &str = "202402-1";

/// Minimal item for exercising the flow machinery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tube(pub u32, pub String);

impl ProvenanceItem for Tube {
    fn entity_id(&self) -> &str {
        &self.1
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap()
    }
}

pub fn tubes(numbers: &[u32]) -> Vec<Tube> {
    numbers.iter().map(|n| Tube(*n, format!("tube_{n}"))).collect()
}

pub fn registry_config() -> RegistryConfig {
    RegistryConfig {
        app_id: "app_1".to_owned(),
        registry_id: "reg_1".to_owned(),
        dna_sequence_schema_id: "ts_seq".to_owned(),
        dna_feature_schema_id: "ts_feat".to_owned(),
        aa_sequence_schema_id: "ts_aa".to_owned(),
        author_ids: vec!["ent_1".to_owned()],
    }
}

pub fn config() -> Config {
    Config {
        registry: registry_config(),
        session: SessionConfig::default(),
    }
}

fn field(value: FieldValue, text: &str) -> Field {
    Field::with_text_value(value, text)
}

fn text_field(text: &str) -> Field {
    field(FieldValue::Text(text.to_owned()), text)
}

fn dna_fields(schema_type: DnaSchemaType) -> Fields {
    let mut fields = Fields::new();
    match schema_type {
        DnaSchemaType::Sequence => {
            fields.insert(dna_sequence::TYPE.to_owned(), text_field("VH"));
            fields.insert(
                dna_sequence::SOURCE_CLONE.to_owned(),
                field(FieldValue::Text("bfi_clone_1".to_owned()), "Clone 1"),
            );
        }
        DnaSchemaType::Feature => {
            fields.insert(
                dna_feature::FUNCTIONS.to_owned(),
                field(FieldValue::List(vec!["VL".to_owned()]), "VL"),
            );
            fields.insert(
                dna_feature::SEQUENCE_SOURCE.to_owned(),
                text_field("Phage library"),
            );
            fields.insert(
                dna_feature::SOURCE_SPECIES.to_owned(),
                text_field("Homo sapiens"),
            );
        }
    }
    fields
}

pub fn event(id: &str, schema_type: DnaSchemaType) -> EntityRegisteredEvent {
    let config = registry_config();
    let schema_id = match schema_type {
        DnaSchemaType::Sequence => config.dna_sequence_schema_id,
        DnaSchemaType::Feature => config.dna_feature_schema_id,
    };

    EntityRegisteredEvent {
        id: format!("evt_{id}"),
        entity: RegisteredEntity {
            id: id.to_owned(),
            name: id.to_owned(),
            schema: SchemaRef { id: schema_id },
            fields: dna_fields(schema_type),
        },
    }
}

pub fn dna_sequence(id: &str, schema_type: DnaSchemaType) -> DnaSequence {
    DnaSequence {
        id: id.to_owned(),
        name: id.to_owned(),
        bases: BASES.to_owned(),
        folder_id: Some("lib_1".to_owned()),
        is_circular: false,
        fields: dna_fields(schema_type),
        custom_fields: Fields::new(),
    }
}

pub fn clone_entity(id: &str, species: &str) -> CustomEntity {
    let mut fields = Fields::new();
    fields.insert(dna_sequence::SPECIES.to_owned(), text_field(species));

    CustomEntity {
        id: id.to_owned(),
        name: id.to_owned(),
        fields,
    }
}

/// IgBLAST report columns of a sequence translating to [`AMINO_ACIDS`].
pub fn record_columns(id: &str, stop_codon: bool) -> Vec<(String, String)> {
    [
        ("sequence_id", id),
        ("stop_codon", if stop_codon { "T" } else { "F" }),
        ("sequence_alignment_aa", AMINO_ACIDS),
        ("germline_alignment", "CAGGTG-CAGCTGGTG-GAGTCTGGG"),
        ("fwr1_aa", "QVQLV"),
        ("cdr1_aa", "GFTF"),
        ("fwr2_aa", "SY"),
        ("cdr2_aa", "AI"),
        ("fwr3_aa", "ST"),
        ("cdr3_aa", "RW"),
        ("fwr4_aa", "GQ"),
        ("v_sequence_alignment_aa", "QVQLV-GFTFSY"),
        ("j_sequence_alignment_aa", "RWGQ"),
        ("v_call", "IGHV3-23*01"),
        ("j_call", "IGHJ4*02"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_owned(), v.to_owned()))
    .collect()
}

pub fn analysis(id: &str, stop_codon: bool) -> SequenceAnalysis {
    SequenceAnalysis {
        imgt_version: Some(IMGT_VERSION.to_owned()),
        imgt: record_columns(id, stop_codon).into_iter().collect(),
        kabat: record_columns(id, stop_codon).into_iter().collect(),
    }
}

pub fn event_item(id: &str, schema_type: DnaSchemaType) -> EventValidationItem {
    EventValidationItem::new(event(id, schema_type), schema_type)
}

pub fn dna_sequence_item(id: &str, schema_type: DnaSchemaType) -> DnaSequenceItem {
    DnaSequenceItem::new(event_item(id, schema_type), dna_sequence(id, schema_type))
}

pub fn species_item(id: &str, schema_type: DnaSchemaType) -> SpeciesItem {
    let previous = dna_sequence_item(id, schema_type);
    SpeciesItem::new(previous, "Homo sapiens", Organism::Human)
}

pub fn igblast_item(id: &str, schema_type: DnaSchemaType, stop_codon: bool) -> IgBlastItem {
    IgBlastItem::new(species_item(id, schema_type), analysis(id, stop_codon))
}

pub fn aa_sequence_item(id: &str, schema_type: DnaSchemaType) -> AaSequenceItem {
    let config = registry_config();
    let previous = igblast_item(id, schema_type, false);
    let request = IgBlastToRegistryMapper::new(&config)
        .to_aa_sequence_create(previous.dna_sequence(), schema_type, previous.analysis())
        .unwrap();
    let aa_sequence = created_aa_sequence(&request);

    AaSequenceItem::new(previous, request, aa_sequence)
}

pub fn translation_item(id: &str) -> TranslationItem {
    TranslationItem::new(aa_sequence_item(id, DnaSchemaType::Sequence))
}

pub fn germline_alignment_item(id: &str) -> GermlineAlignmentItem {
    let mut custom_fields = Fields::new();
    custom_fields.insert(DNA_SEQUENCE_ID.to_owned(), Field::text(id));

    let germline = DnaSequence {
        id: format!("{id}_germline"),
        name: format!("{id}_germline_alignment"),
        bases: GERMLINE_ALIGNMENT.to_owned(),
        folder_id: Some("lib_1".to_owned()),
        is_circular: true,
        fields: Fields::new(),
        custom_fields,
    };

    GermlineAlignmentItem::new(translation_item(id), germline)
}

pub fn template_alignment_item(id: &str) -> TemplateAlignmentItem {
    TemplateAlignmentItem::new(germline_alignment_item(id))
}

fn source_id(custom_fields: &Fields) -> String {
    custom_fields
        .get(DNA_SEQUENCE_ID)
        .and_then(|f| f.value.as_ref())
        .and_then(|v| v.as_text())
        .unwrap_or_default()
        .to_owned()
}

fn created_aa_sequence(request: &AaSequenceCreate) -> AaSequence {
    AaSequence {
        id: format!("prtn_{}", source_id(&request.custom_fields)),
        name: request.name.clone(),
        amino_acids: request.amino_acids.clone(),
        folder_id: request.folder_id.clone(),
        registry_id: Some(request.registry_id.clone()),
        fields: request.fields.clone(),
        custom_fields: request.custom_fields.clone(),
    }
}

/// In-memory registry recording every call.
///
/// Bulk tasks complete immediately. Each task takes the next scripted error payload,
/// and succeeds once the script is exhausted.
#[derive(Default)]
pub struct FakeRegistry {
    pub dna_sequences: Vec<DnaSequence>,
    pub custom_entities: Vec<CustomEntity>,
    /// Names of AA sequences the registry refuses to create.
    pub rejected_aa_sequences: Vec<String>,
    /// Template sequence ids the registry refuses to align.
    pub rejected_template_alignments: Vec<String>,
    pub reverse_task_responses: bool,
    pub drop_task_responses: bool,
    pub task_errors: RefCell<VecDeque<(Option<String>, Value)>>,
    pub tasks: RefCell<Vec<AsyncTask>>,
    pub session_log: RefCell<Vec<String>>,
    pub message_log: RefCell<Vec<(String, MessageStyle)>>,
    pub status_log: RefCell<Vec<SessionStatus>>,
    pub dna_sequence_log: RefCell<Vec<Vec<String>>>,
    pub custom_entity_log: RefCell<Vec<Vec<String>>>,
    pub aa_sequence_log: RefCell<Vec<AaSequenceCreate>>,
    pub bulk_create_log: RefCell<Vec<Vec<DnaSequenceBulkCreate>>>,
    pub bulk_update_log: RefCell<Vec<Vec<DnaSequenceBulkUpdate>>>,
    pub template_alignment_log: RefCell<Vec<TemplateAlignmentCreate>>,
}

impl FakeRegistry {
    pub fn with_task_errors(self, errors: Vec<(Option<&str>, Value)>) -> Self {
        *self.task_errors.borrow_mut() = errors
            .into_iter()
            .map(|(message, errors)| (message.map(str::to_owned), errors))
            .collect();
        self
    }

    pub fn sessions(&self) -> Vec<String> {
        self.session_log.borrow().clone()
    }

    pub fn messages(&self) -> Vec<(String, MessageStyle)> {
        self.message_log.borrow().clone()
    }

    pub fn session_statuses(&self) -> Vec<SessionStatus> {
        self.status_log.borrow().clone()
    }

    pub fn dna_sequence_requests(&self) -> Vec<Vec<String>> {
        self.dna_sequence_log.borrow().clone()
    }

    pub fn custom_entity_requests(&self) -> Vec<Vec<String>> {
        self.custom_entity_log.borrow().clone()
    }

    pub fn created_aa_sequences(&self) -> Vec<AaSequenceCreate> {
        self.aa_sequence_log.borrow().clone()
    }

    pub fn bulk_creates(&self) -> Vec<Vec<DnaSequenceBulkCreate>> {
        self.bulk_create_log.borrow().clone()
    }

    pub fn bulk_updates(&self) -> Vec<Vec<DnaSequenceBulkUpdate>> {
        self.bulk_update_log.borrow().clone()
    }

    pub fn template_alignments(&self) -> Vec<TemplateAlignmentCreate> {
        self.template_alignment_log.borrow().clone()
    }

    fn complete_task(&self, response: Option<TaskResponse>) -> TaskLink {
        let (message, errors) = self
            .task_errors
            .borrow_mut()
            .pop_front()
            .unwrap_or((None, Value::Null));
        let status = if errors.is_null() {
            TaskStatus::Succeeded
        } else {
            TaskStatus::Failed
        };

        let mut tasks = self.tasks.borrow_mut();
        let id = format!("task_{}", tasks.len() + 1);
        tasks.push(AsyncTask {
            id: id.clone(),
            status,
            message,
            errors: Some(errors),
            response,
        });

        TaskLink { task_id: id }
    }
}

impl Registry for FakeRegistry {
    fn create_session(&self, name: &str, _timeout_secs: u64) -> Result<String> {
        let mut sessions = self.session_log.borrow_mut();
        sessions.push(name.to_owned());
        Ok(format!("sesn_{}", sessions.len()))
    }

    fn add_session_message(
        &self,
        _session_id: &str,
        content: &str,
        style: MessageStyle,
    ) -> Result<()> {
        let message = (content.to_owned(), style);
        self.message_log.borrow_mut().push(message);
        Ok(())
    }

    fn update_session_status(&self, _session_id: &str, status: SessionStatus) -> Result<()> {
        self.status_log.borrow_mut().push(status);
        Ok(())
    }

    fn get_dna_sequences(&self, ids: &[String]) -> Result<Vec<DnaSequence>> {
        self.dna_sequence_log.borrow_mut().push(ids.to_vec());
        Ok(self
            .dna_sequences
            .iter()
            .filter(|s| ids.contains(&s.id))
            .cloned()
            .collect())
    }

    fn get_custom_entities(&self, ids: &[String]) -> Result<Vec<CustomEntity>> {
        self.custom_entity_log.borrow_mut().push(ids.to_vec());
        Ok(self
            .custom_entities
            .iter()
            .filter(|e| ids.contains(&e.id))
            .cloned()
            .collect())
    }

    fn create_aa_sequence(&self, request: &AaSequenceCreate) -> Result<AaSequence> {
        self.aa_sequence_log.borrow_mut().push(request.clone());
        if self.rejected_aa_sequences.contains(&request.name) {
            return Err(Error::Registry {
                message: "AA sequence rejected".to_owned(),
                context: "create_aa_sequence",
            });
        }
        Ok(created_aa_sequence(request))
    }

    fn bulk_create_dna_sequences(&self, requests: &[DnaSequenceBulkCreate]) -> Result<TaskLink> {
        self.bulk_create_log.borrow_mut().push(requests.to_vec());

        let mut created = requests
            .iter()
            .map(|r| DnaSequence {
                id: format!("{}_germline", source_id(&r.custom_fields)),
                name: r.name.clone(),
                bases: r.bases.clone(),
                folder_id: r.folder_id.clone(),
                is_circular: r.is_circular,
                fields: Fields::new(),
                custom_fields: r.custom_fields.clone(),
            })
            .collect::<Vec<_>>();
        if self.reverse_task_responses {
            created.reverse();
        }
        if self.drop_task_responses {
            created.clear();
        }

        let response = TaskResponse {
            dna_sequences: created,
        };
        Ok(self.complete_task(Some(response)))
    }

    fn bulk_update_dna_sequences(&self, requests: &[DnaSequenceBulkUpdate]) -> Result<TaskLink> {
        self.bulk_update_log.borrow_mut().push(requests.to_vec());
        Ok(self.complete_task(None))
    }

    fn wait_for_task(&self, task_id: &str) -> Result<AsyncTask> {
        self.tasks
            .borrow()
            .iter()
            .find(|t| t.id == task_id)
            .cloned()
            .ok_or_else(|| Error::Registry {
                message: format!("unknown task \"{task_id}\""),
                context: "wait_for_task",
            })
    }

    fn create_template_alignment(&self, request: &TemplateAlignmentCreate) -> Result<TaskLink> {
        let mut log = self.template_alignment_log.borrow_mut();
        log.push(request.clone());
        if self.rejected_template_alignments.contains(&request.template_sequence_id) {
            return Err(Error::Registry {
                message: "alignment rejected".to_owned(),
                context: "create_template_alignment",
            });
        }
        Ok(TaskLink {
            task_id: format!("task_alignment_{}", log.len()),
        })
    }
}

/// IgBLAST stand-in answering every query with the [`record_columns`] fixture.
#[derive(Default)]
pub struct FakeAnnotator {
    pub return_code: i32,
    pub error: Option<String>,
    pub stop_codons: Vec<String>,
    pub missing_from_kabat: Vec<String>,
    pub submitted: RefCell<Vec<AnnotationRequest>>,
}

impl FakeAnnotator {
    pub fn requests(&self) -> Vec<AnnotationRequest> {
        self.submitted.borrow().clone()
    }

    fn report(&self, request: &AnnotationRequest) -> String {
        let imgt = request.domain_system == DomainSystem::Imgt;
        let rows = request
            .sequences
            .iter()
            .filter(|s| imgt || !self.missing_from_kabat.contains(&s.id))
            .map(|s| record_columns(&s.id, self.stop_codons.contains(&s.id)))
            .collect::<Vec<_>>();

        let header = record_columns("", false)
            .into_iter()
            .map(|(column, _)| column)
            .chain(["d_sequence_alignment_aa".to_owned()])
            .collect::<Vec<_>>()
            .join("\t");

        let mut lines = vec![header];
        for row in rows {
            let mut cells = row.into_iter().map(|(_, value)| value).collect::<Vec<_>>();
            cells.push(String::new());
            lines.push(cells.join("\t"));
        }
        lines.join("\n")
    }
}

impl Annotator for FakeAnnotator {
    fn submit(&self, request: &AnnotationRequest) -> Result<String> {
        let mut submitted = self.submitted.borrow_mut();
        submitted.push(request.clone());
        Ok(format!("key_{}", submitted.len() - 1))
    }

    fn fetch_result(&self, key: &str, _wait: bool) -> Result<AnnotationResponse> {
        let index = key.trim_start_matches("key_").parse::<usize>().unwrap();
        let request = self.submitted.borrow()[index].clone();

        Ok(AnnotationResponse {
            key: key.to_owned(),
            return_code: self.return_code,
            error: self.error.clone(),
            report: AnnotationReport {
                data: self.report(&request),
                imgt_version: Some(IMGT_VERSION.to_owned()),
            },
        })
    }
}
