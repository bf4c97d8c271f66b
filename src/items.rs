//! Items passed from one step of the annotation flow to the next.
//!
//! Each item owns the item of the step before it, so the whole history of a sequence
//! can be read back from the last item. Accessors for earlier data delegate down the
//! chain.

use std::fmt;

use serde::Serialize;

use crate::services::*;

/// An item that can be reported on after the flow completes.
pub trait ProvenanceItem: fmt::Debug {
    /// Id of the registered entity the item was built from.
    fn entity_id(&self) -> &str;

    fn to_json(&self) -> serde_json::Value;
}

macro_rules! delegate {
    ($($name:ident: $ty:ty),* $(,)?) => {
        $(
            pub fn $name(&self) -> $ty {
                self.previous.$name()
            }
        )*
    };
}

macro_rules! provenance_item {
    ($($item:ty),* $(,)?) => {
        $(
            impl ProvenanceItem for $item {
                fn entity_id(&self) -> &str {
                    &self.event().entity.id
                }

                fn to_json(&self) -> serde_json::Value {
                    item_json(self, self.entity_id())
                }
            }
        )*
    };
}

impl ProvenanceItem for EntityRegisteredEvent {
    fn entity_id(&self) -> &str {
        &self.entity.id
    }

    fn to_json(&self) -> serde_json::Value {
        item_json(self, &self.entity.id)
    }
}

/// Items that fail to serialize are reported as `null`.
fn item_json<T: Serialize + ?Sized>(item: &T, entity_id: &str) -> serde_json::Value {
    serde_json::to_value(item).unwrap_or_else(|e| {
        tracing::warn!(entity_id, error = %e, "Unable to serialize item");
        serde_json::Value::Null
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventValidationItem {
    event: EntityRegisteredEvent,
    dna_schema_type: DnaSchemaType,
}

impl EventValidationItem {
    pub fn new(event: EntityRegisteredEvent, dna_schema_type: DnaSchemaType) -> Self {
        Self {
            event,
            dna_schema_type,
        }
    }

    pub fn event(&self) -> &EntityRegisteredEvent {
        &self.event
    }

    pub fn dna_schema_type(&self) -> DnaSchemaType {
        self.dna_schema_type
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DnaSequenceItem {
    previous: EventValidationItem,
    dna_sequence: DnaSequence,
}

impl DnaSequenceItem {
    pub fn new(previous: EventValidationItem, dna_sequence: DnaSequence) -> Self {
        Self {
            previous,
            dna_sequence,
        }
    }

    delegate!(event: &EntityRegisteredEvent, dna_schema_type: DnaSchemaType);

    pub fn dna_sequence(&self) -> &DnaSequence {
        &self.dna_sequence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeciesItem {
    previous: DnaSequenceItem,
    species: String,
    organism: Organism,
}

impl SpeciesItem {
    pub fn new(previous: DnaSequenceItem, species: impl Into<String>, organism: Organism) -> Self {
        Self {
            previous,
            species: species.into(),
            organism,
        }
    }

    delegate!(
        event: &EntityRegisteredEvent,
        dna_schema_type: DnaSchemaType,
        dna_sequence: &DnaSequence,
    );

    pub fn species(&self) -> &str {
        &self.species
    }

    pub fn organism(&self) -> Organism {
        self.organism
    }
}

/// IMGT and Kabat annotations of one sequence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SequenceAnalysis {
    pub imgt_version: Option<String>,
    pub imgt: IgBlastRecord,
    pub kabat: IgBlastRecord,
}

impl SequenceAnalysis {
    pub fn record(&self, domain_system: DomainSystem) -> &IgBlastRecord {
        match domain_system {
            DomainSystem::Imgt => &self.imgt,
            DomainSystem::Kabat => &self.kabat,
        }
    }

    pub fn has_stop_codon(&self) -> bool {
        self.imgt.get("stop_codon") == Some("T")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IgBlastItem {
    previous: SpeciesItem,
    analysis: SequenceAnalysis,
}

impl IgBlastItem {
    pub fn new(previous: SpeciesItem, analysis: SequenceAnalysis) -> Self {
        Self { previous, analysis }
    }

    delegate!(
        event: &EntityRegisteredEvent,
        dna_schema_type: DnaSchemaType,
        dna_sequence: &DnaSequence,
        species: &str,
        organism: Organism,
    );

    pub fn analysis(&self) -> &SequenceAnalysis {
        &self.analysis
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AaSequenceItem {
    previous: IgBlastItem,
    aa_sequence_request: AaSequenceCreate,
    aa_sequence: AaSequence,
}

impl AaSequenceItem {
    pub fn new(
        previous: IgBlastItem,
        aa_sequence_request: AaSequenceCreate,
        aa_sequence: AaSequence,
    ) -> Self {
        Self {
            previous,
            aa_sequence_request,
            aa_sequence,
        }
    }

    delegate!(
        event: &EntityRegisteredEvent,
        dna_schema_type: DnaSchemaType,
        dna_sequence: &DnaSequence,
        analysis: &SequenceAnalysis,
    );

    pub fn aa_sequence_request(&self) -> &AaSequenceCreate {
        &self.aa_sequence_request
    }

    pub fn aa_sequence(&self) -> &AaSequence {
        &self.aa_sequence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranslationItem {
    previous: AaSequenceItem,
}

impl TranslationItem {
    pub fn new(previous: AaSequenceItem) -> Self {
        Self { previous }
    }

    delegate!(
        event: &EntityRegisteredEvent,
        dna_schema_type: DnaSchemaType,
        dna_sequence: &DnaSequence,
        analysis: &SequenceAnalysis,
        aa_sequence: &AaSequence,
    );
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GermlineAlignmentItem {
    previous: TranslationItem,
    germline_alignment_sequence: DnaSequence,
}

impl GermlineAlignmentItem {
    pub fn new(previous: TranslationItem, germline_alignment_sequence: DnaSequence) -> Self {
        Self {
            previous,
            germline_alignment_sequence,
        }
    }

    delegate!(
        event: &EntityRegisteredEvent,
        dna_sequence: &DnaSequence,
        analysis: &SequenceAnalysis,
        aa_sequence: &AaSequence,
    );

    pub fn germline_alignment_sequence(&self) -> &DnaSequence {
        &self.germline_alignment_sequence
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateAlignmentItem {
    previous: GermlineAlignmentItem,
}

impl TemplateAlignmentItem {
    pub fn new(previous: GermlineAlignmentItem) -> Self {
        Self { previous }
    }

    delegate!(
        event: &EntityRegisteredEvent,
        dna_sequence: &DnaSequence,
        aa_sequence: &AaSequence,
        germline_alignment_sequence: &DnaSequence,
    );
}

provenance_item!(
    EventValidationItem,
    DnaSequenceItem,
    SpeciesItem,
    IgBlastItem,
    AaSequenceItem,
    TranslationItem,
    GermlineAlignmentItem,
    TemplateAlignmentItem,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn accessors_walk_the_chain() {
        let item = template_alignment_item("seq_1");

        assert_eq!(item.event().entity.id, "seq_1");
        assert_eq!(item.dna_sequence().id, "seq_1");
        assert_eq!(item.aa_sequence().id, "prtn_seq_1");
        assert_eq!(
            item.germline_alignment_sequence().name,
            "seq_1_germline_alignment"
        );
        assert_eq!(item.entity_id(), "seq_1");
    }

    #[test]
    fn json_nests_previous_items() {
        let item = species_item("seq_1", DnaSchemaType::Feature);
        let json = item.to_json();

        assert_eq!(json["species"], "Homo sapiens");
        assert_eq!(json["organism"], "human");
        assert_eq!(json["previous"]["dna_sequence"]["id"], "seq_1");
        assert_eq!(json["previous"]["previous"]["dna_schema_type"], "Feature");
    }

    #[test]
    fn unserializable_values_become_null() {
        let mut by_pair = std::collections::BTreeMap::new();
        by_pair.insert((1, 2), "seq_1");

        assert_eq!(item_json(&by_pair, "seq_1"), serde_json::Value::Null);
        let registered = event("seq_1", DnaSchemaType::Feature);
        assert_eq!(registered.to_json()["entity"]["id"], "seq_1");
    }
}
