use std::collections::VecDeque;

use rustc_hash::FxHashMap;

use crate::flow::*;
use crate::items::*;
use crate::mapper::IgBlastToRegistryMapper;
use crate::parse_utils::sanitize_sequence;
use crate::services::fields::DNA_SEQUENCE_ID;
use crate::services::*;

pub struct CreateGermlineAlignmentSequencesStep<'a> {
    registry: &'a dyn Registry,
    mapper: &'a IgBlastToRegistryMapper<'a>,
}

impl<'a> CreateGermlineAlignmentSequencesStep<'a> {
    const NAME: &'static str = "CreateGermlineAlignmentSequencesStep";
    const LABEL: &'static str = "Create germline alignment sequences";

    /// Register the IMGT germline alignment of each sequence as a DNA sequence of its own.
    pub fn new(registry: &'a dyn Registry, mapper: &'a IgBlastToRegistryMapper<'a>) -> Self {
        Self { registry, mapper }
    }
}

impl<'a> AsyncTaskStep for CreateGermlineAlignmentSequencesStep<'a> {
    type Input = TranslationItem;
    type Output = GermlineAlignmentItem;

    fn submit_task(&self, items: &[TranslationItem]) -> Result<AsyncTask> {
        let payloads = items
            .iter()
            .map(|item| {
                let alignment = item.analysis().imgt.get("germline_alignment");
                let germline = sanitize_sequence(alignment).unwrap_or_default();
                self.mapper
                    .to_dna_sequence_bulk_create(item.dna_sequence(), &germline)
            })
            .collect::<Vec<_>>();
        create_dna_sequences(self.registry, &payloads)
    }

    /// Created sequences are matched to their source through the `DNA Sequence ID`
    /// custom field, since the task response is not guaranteed to keep request order.
    /// A source submitted more than once gets one created sequence per submission.
    fn succeeded_items(
        &self,
        items: Vec<TranslationItem>,
        task: &AsyncTask,
    ) -> Result<Vec<GermlineAlignmentItem>> {
        let mut created = FxHashMap::<String, VecDeque<DnaSequence>>::default();
        for sequence in task.response.iter().flat_map(|r| r.dna_sequences.iter()) {
            if let Some(source_id) = source_id(sequence) {
                created
                    .entry(source_id.to_owned())
                    .or_default()
                    .push_back(sequence.clone());
            }
        }

        items
            .into_iter()
            .map(|item| {
                let source_id = item.dna_sequence().id.clone();
                match created.get_mut(&source_id).and_then(VecDeque::pop_front) {
                    Some(germline) => Ok(GermlineAlignmentItem::new(item, germline)),
                    None => Err(Error::TaskResponse {
                        task_id: task.id.clone(),
                        what: format!("germline alignment sequence for \"{source_id}\""),
                    }),
                }
            })
            .collect()
    }
}

fn source_id(sequence: &DnaSequence) -> Option<&str> {
    let field = sequence.custom_fields.get(DNA_SEQUENCE_ID)?;
    field.value.as_ref()?.as_text()
}

impl<'a> Step for CreateGermlineAlignmentSequencesStep<'a> {
    type Input = TranslationItem;
    type Output = GermlineAlignmentItem;
    type Failure = TranslationItem;

    fn execute(
        &self,
        items: Vec<TranslationItem>,
    ) -> Result<StepResults<GermlineAlignmentItem, TranslationItem>> {
        execute_async_task(self, items)
    }

    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn label(&self) -> &'static str {
        Self::LABEL
    }
}
