use crate::flow::*;
use crate::items::*;
use crate::services::*;

pub struct CreateNucleotideTemplateAlignmentStep<'a> {
    registry: &'a dyn Registry,
}

impl<'a> CreateNucleotideTemplateAlignmentStep<'a> {
    const NAME: &'static str = "CreateNucleotideTemplateAlignmentStep";
    const LABEL: &'static str = "Create nucleotide template alignments";

    /// Align each DNA sequence against its germline alignment sequence, using the DNA
    /// sequence as template.
    pub fn new(registry: &'a dyn Registry) -> Self {
        Self { registry }
    }

    fn request(item: &GermlineAlignmentItem) -> TemplateAlignmentCreate {
        let dna_sequence = item.dna_sequence();
        let germline = item.germline_alignment_sequence();

        TemplateAlignmentCreate {
            algorithm: AlignmentAlgorithm::Mafft,
            name: germline.name.clone(),
            template_sequence_id: dna_sequence.id.clone(),
            sequence_ids: vec![dna_sequence.id.clone(), germline.id.clone()],
        }
    }
}

impl<'a> Step for CreateNucleotideTemplateAlignmentStep<'a> {
    type Input = GermlineAlignmentItem;
    type Output = TemplateAlignmentItem;
    type Failure = GermlineAlignmentItem;

    fn execute(
        &self,
        items: Vec<GermlineAlignmentItem>,
    ) -> Result<StepResults<TemplateAlignmentItem, GermlineAlignmentItem>> {
        let mut results = StepResults::new();

        for item in items {
            let request = Self::request(&item);
            match self.registry.create_template_alignment(&request) {
                Ok(link) => {
                    tracing::debug!(
                        entity_id = %item.entity_id(),
                        task_id = %link.task_id,
                        "Template alignment requested"
                    );
                    results.add_succeeded(TemplateAlignmentItem::new(item));
                }
                Err(e) => {
                    tracing::error!(
                        entity_id = %item.entity_id(),
                        error = %e,
                        "Error while creating nucleotide template alignment"
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
