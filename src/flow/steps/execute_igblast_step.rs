use rustc_hash::FxHashMap;

use crate::flow::*;
use crate::items::*;
use crate::services::*;

pub struct ExecuteIgBlastStep<'a> {
    annotator: &'a dyn Annotator,
}

impl<'a> ExecuteIgBlastStep<'a> {
    const NAME: &'static str = "ExecuteIgBlastStep";
    const LABEL: &'static str = "Execute BLASTs";

    /// Annotate sequences with IgBLAST in both the IMGT and Kabat domain systems,
    /// one command per organism and domain system.
    pub fn new(annotator: &'a dyn Annotator) -> Self {
        Self { annotator }
    }

    fn records_by_id(response: &AnnotationResponse) -> Result<FxHashMap<String, IgBlastRecord>> {
        Ok(response
            .report
            .records()?
            .into_iter()
            .filter_map(|r| Some((r.sequence_id()?.to_owned(), r)))
            .collect())
    }
}

impl<'a> Step for ExecuteIgBlastStep<'a> {
    type Input = SpeciesItem;
    type Output = IgBlastItem;
    type Failure = SpeciesItem;

    fn execute(&self, items: Vec<SpeciesItem>) -> Result<StepResults<IgBlastItem, SpeciesItem>> {
        let mut results = StepResults::new();

        let mut groups: Vec<(Organism, Vec<SpeciesItem>)> = Vec::new();
        for item in items {
            match groups.iter_mut().find(|(o, _)| *o == item.organism()) {
                Some((_, group)) => group.push(item),
                None => groups.push((item.organism(), vec![item])),
            }
        }

        for (organism, group) in groups {
            let sequences = group
                .iter()
                .map(|item| QuerySequence {
                    id: item.dna_sequence().id.clone(),
                    bases: item.dna_sequence().bases.clone(),
                })
                .collect::<Vec<_>>();

            let annotate = |domain_system: DomainSystem| {
                annotate_sync(
                    self.annotator,
                    &AnnotationRequest {
                        sequences: sequences.clone(),
                        organism,
                        domain_system,
                    },
                )
            };
            let imgt = annotate(DomainSystem::Imgt)?;
            let kabat = annotate(DomainSystem::Kabat)?;

            if let Some(failed) = [&imgt, &kabat].into_iter().find(|r| r.return_code != 0) {
                let message = match &failed.error {
                    Some(error) => error.clone(),
                    None => format!("IgBlast exited with code {}", failed.return_code),
                };
                for item in group {
                    results.add_failed(item, message.clone());
                }
                continue;
            }

            let imgt_records = Self::records_by_id(&imgt)?;
            let kabat_records = Self::records_by_id(&kabat)?;

            for item in group {
                let id = item.dna_sequence().id.clone();
                let imgt_record = imgt_records.get(&id).cloned();
                let kabat_record = kabat_records.get(&id).cloned();
                match (imgt_record, kabat_record) {
                    (Some(imgt_record), Some(kabat_record)) => {
                        let analysis = SequenceAnalysis {
                            imgt_version: imgt.report.imgt_version.clone(),
                            imgt: imgt_record,
                            kabat: kabat_record,
                        };
                        results.add_succeeded(IgBlastItem::new(item, analysis));
                    }
                    _ => {
                        tracing::warn!(
                            entity_id = %item.entity_id(),
                            sequence_id = %id,
                            "Sequence missing from IgBlast report"
                        );
                        let message = format!("No IgBlast result for sequence \"{id}\"");
                        results.add_failed(item, message);
                    }
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
