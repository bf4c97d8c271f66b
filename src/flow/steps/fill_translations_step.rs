use crate::flow::*;
use crate::items::*;
use crate::mapper::IgBlastToRegistryMapper;
use crate::services::*;

pub struct FillTranslationsStep<'a> {
    registry: &'a dyn Registry,
    mapper: &'a IgBlastToRegistryMapper<'a>,
}

impl<'a> FillTranslationsStep<'a> {
    const NAME: &'static str = "FillTranslationsStep";
    const LABEL: &'static str = "Fill DNA sequence translations";

    /// Link each DNA sequence to its new AA sequence through the translation field.
    pub fn new(registry: &'a dyn Registry, mapper: &'a IgBlastToRegistryMapper<'a>) -> Self {
        Self { registry, mapper }
    }

    fn to_dna_sequence_bulk_update(&self, item: &AaSequenceItem) -> DnaSequenceBulkUpdate {
        let schema_type = item.dna_schema_type();
        let mut payload = self
            .mapper
            .to_dna_sequence_bulk_update(item.dna_sequence(), schema_type.computed_fields());

        let aa_sequence_id = item.aa_sequence().id.clone();
        let translation = match schema_type {
            DnaSchemaType::Sequence => Field::list([aa_sequence_id]),
            DnaSchemaType::Feature => Field::text(aa_sequence_id),
        };
        payload
            .fields
            .insert(schema_type.translation_field().to_owned(), translation);
        payload
    }
}

impl<'a> AsyncTaskStep for FillTranslationsStep<'a> {
    type Input = AaSequenceItem;
    type Output = TranslationItem;

    fn submit_task(&self, items: &[AaSequenceItem]) -> Result<AsyncTask> {
        let payloads = items
            .iter()
            .map(|item| self.to_dna_sequence_bulk_update(item))
            .collect::<Vec<_>>();
        update_dna_sequences(self.registry, &payloads)
    }

    fn succeeded_items(
        &self,
        items: Vec<AaSequenceItem>,
        _task: &AsyncTask,
    ) -> Result<Vec<TranslationItem>> {
        Ok(items.into_iter().map(TranslationItem::new).collect())
    }
}

impl<'a> Step for FillTranslationsStep<'a> {
    type Input = AaSequenceItem;
    type Output = TranslationItem;
    type Failure = AaSequenceItem;

    fn execute(
        &self,
        items: Vec<AaSequenceItem>,
    ) -> Result<StepResults<TranslationItem, AaSequenceItem>> {
        execute_async_task(self, items)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn label(&self) -> &'static str {
        Self::LABEL
    }
}
