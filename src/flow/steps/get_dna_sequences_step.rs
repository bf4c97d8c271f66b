use rustc_hash::FxHashMap;

use crate::flow::*;
use crate::items::*;
use crate::services::*;

pub struct GetDnaSequencesStep<'a> {
    registry: &'a dyn Registry,
}

impl<'a> GetDnaSequencesStep<'a> {
    const NAME: &'static str = "GetDnaSequencesStep";
    const LABEL: &'static str = "Get DNA sequences";

    /// Fetch the registered DNA sequence behind each event, in one request.
    pub fn new(registry: &'a dyn Registry) -> Self {
        Self { registry }
    }
}

impl<'a> Step for GetDnaSequencesStep<'a> {
    type Input = EventValidationItem;
    type Output = DnaSequenceItem;
    type Failure = EventValidationItem;

    fn execute(
        &self,
        items: Vec<EventValidationItem>,
    ) -> Result<StepResults<DnaSequenceItem, EventValidationItem>> {
        let mut results = StepResults::new();

        if items.is_empty() {
            return Ok(results);
        }

        let ids = items
            .iter()
            .map(|i| i.event().entity.id.clone())
            .collect::<Vec<_>>();
        let by_id = self
            .registry
            .get_dna_sequences(&ids)?
            .into_iter()
            .map(|s| (s.id.clone(), s))
            .collect::<FxHashMap<_, _>>();

        for item in items {
            // events may repeat an entity, so every copy takes its own clone
            match by_id.get(&item.event().entity.id).cloned() {
                Some(dna_sequence) => {
                    results.add_succeeded(DnaSequenceItem::new(item, dna_sequence));
                }
                None => {
                    let message = format!("DNA sequence \"{}\" not found", item.entity_id());
                    results.add_failed(item, message);
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
