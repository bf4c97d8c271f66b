use crate::flow::*;
use crate::items::*;
use crate::mapper::IgBlastToRegistryMapper;
use crate::services::*;

pub const NON_PRODUCTIVE: &str = "Non-productive sequence: stop codon";

pub struct ExcludeStopCodonsStep<'a> {
    registry: &'a dyn Registry,
    session: &'a AppSession<'a>,
    mapper: &'a IgBlastToRegistryMapper<'a>,
}

impl<'a> ExcludeStopCodonsStep<'a> {
    const NAME: &'static str = "ExcludeStopCodonsStep";
    const LABEL: &'static str = "Exclude sequences with stop codon";

    /// Set aside non-productive sequences, flagging them in the session and in their
    /// comment field.
    pub fn new(
        registry: &'a dyn Registry,
        session: &'a AppSession<'a>,
        mapper: &'a IgBlastToRegistryMapper<'a>,
    ) -> Self {
        Self {
            registry,
            session,
            mapper,
        }
    }

    fn to_dna_sequence_bulk_update(&self, item: &IgBlastItem) -> DnaSequenceBulkUpdate {
        let schema_type = item.dna_schema_type();
        let mut payload = self
            .mapper
            .to_dna_sequence_bulk_update(item.dna_sequence(), schema_type.computed_fields());
        let comment = schema_type.comment_field().to_owned();
        payload.fields.insert(comment, Field::text(NON_PRODUCTIVE));
        payload
    }
}

impl<'a> Step for ExcludeStopCodonsStep<'a> {
    type Input = IgBlastItem;
    type Output = IgBlastItem;
    type Failure = IgBlastItem;

    fn execute(&self, items: Vec<IgBlastItem>) -> Result<StepResults<IgBlastItem>> {
        let mut results = StepResults::new();
        let mut excluded = Vec::new();

        for item in items {
            if !item.analysis().has_stop_codon() {
                results.add_succeeded(item);
                continue;
            }

            let message = format!("{NON_PRODUCTIVE} for {{id:{}}}", item.dna_sequence().id);
            self.session.add_message(&message, MessageStyle::Warning)?;
            excluded.push(self.to_dna_sequence_bulk_update(&item));
            results.add_warning(item, NON_PRODUCTIVE);
        }

        if !excluded.is_empty() {
            let task = update_dna_sequences(self.registry, &excluded)?;
            if task.status == TaskStatus::Failed {
                tracing::warn!(
                    task_id = %task.id,
                    message = ?task.message,
                    "Unable to flag non-productive sequences"
                );
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
