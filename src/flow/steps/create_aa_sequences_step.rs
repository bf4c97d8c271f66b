use crate::flow::*;
use crate::items::*;
use crate::mapper::IgBlastToRegistryMapper;
use crate::services::*;

pub struct CreateAaSequencesStep<'a> {
    registry: &'a dyn Registry,
    mapper: &'a IgBlastToRegistryMapper<'a>,
}

impl<'a> CreateAaSequencesStep<'a> {
    const NAME: &'static str = "CreateAaSequencesStep";
    const LABEL: &'static str = "Create AA sequences";

    /// Register the annotated translation of each sequence, one request per sequence.
    pub fn new(registry: &'a dyn Registry, mapper: &'a IgBlastToRegistryMapper<'a>) -> Self {
        Self { registry, mapper }
    }

    fn create(&self, item: &IgBlastItem) -> Result<(AaSequenceCreate, AaSequence)> {
        let dna_sequence = item.dna_sequence();
        let schema_type = item.dna_schema_type();
        let request = self
            .mapper
            .to_aa_sequence_create(dna_sequence, schema_type, item.analysis())?;
        let aa_sequence = self.registry.create_aa_sequence(&request)?;
        Ok((request, aa_sequence))
    }
}

impl<'a> Step for CreateAaSequencesStep<'a> {
    type Input = IgBlastItem;
    type Output = AaSequenceItem;
    type Failure = IgBlastItem;

    fn execute(&self, items: Vec<IgBlastItem>) -> Result<StepResults<AaSequenceItem, IgBlastItem>> {
        let mut results = StepResults::new();

        for item in items {
            match self.create(&item) {
                Ok((request, aa_sequence)) => {
                    tracing::debug!(
                        entity_id = %item.entity_id(),
                        aa_sequence_id = %aa_sequence.id,
                        "AA sequence created"
                    );
                    results.add_succeeded(AaSequenceItem::new(item, request, aa_sequence));
                }
                Err(e) => {
                    tracing::error!(
                        entity_id = %item.entity_id(),
                        error = %e,
                        "Error while creating AA sequence"
                    );
                    results.add_failed(item, e.to_string());
                }
            }
        }

        Ok(results)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn label(&self) -> &'static str {
        Self::LABEL
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    #[test]
    fn creates_one_aa_sequence_per_item() {
        let registry = FakeRegistry::default();
        let config = registry_config();
        let mapper = IgBlastToRegistryMapper::new(&config);
        let step = CreateAaSequencesStep::new(&registry, &mapper);

        let results = step
            .execute(vec![
                igblast_item("seq_1", DnaSchemaType::Sequence, false),
                igblast_item("feat_1", DnaSchemaType::Feature, false),
            ])
            .unwrap();

        assert!(results.failed.is_empty());
        assert_eq!(results.succeeded[0].aa_sequence().id, "prtn_seq_1");
        assert_eq!(
            results.succeeded[1].aa_sequence_request().name,
            "feat_1_translation"
        );
        assert_eq!(registry.created_aa_sequences().len(), 2);
    }

    #[test]
    fn mapping_and_registry_errors_fail_the_item() {
        let registry = FakeRegistry {
            rejected_aa_sequences: vec!["seq_2_translation".to_owned()],
            ..Default::default()
        };
        let config = registry_config();
        let mapper = IgBlastToRegistryMapper::new(&config);
        let step = CreateAaSequencesStep::new(&registry, &mapper);

        let mut analysis = analysis("seq_3", false);
        analysis.imgt = record_columns("seq_3", false)
            .into_iter()
            .chain([("cdr3_aa".to_owned(), "NOTINSEQUENCE".to_owned())])
            .collect();
        let unmatched = IgBlastItem::new(species_item("seq_3", DnaSchemaType::Sequence), analysis);

        let results = step
            .execute(vec![
                igblast_item("seq_1", DnaSchemaType::Sequence, false),
                igblast_item("seq_2", DnaSchemaType::Sequence, false),
                unmatched,
            ])
            .unwrap();

        assert_eq!(results.succeeded.len(), 1);
        assert_eq!(results.failed.len(), 2);
        assert_eq!(results.failed[0].payload.dna_sequence().id, "seq_2");
        assert!(results.failed[0].message.contains("AA sequence rejected"));
        let unparsed = &results.failed[1].message;
        assert!(unparsed.starts_with("Unable to parse amino acids"));
    }
}
