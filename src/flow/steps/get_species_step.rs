use rustc_hash::{FxHashMap, FxHashSet};

use crate::flow::*;
use crate::items::*;
use crate::mapper::organism_for;
use crate::services::fields::*;
use crate::services::*;

pub struct GetSpeciesStep<'a> {
    registry: &'a dyn Registry,
}

impl<'a> GetSpeciesStep<'a> {
    const NAME: &'static str = "GetSpeciesStep";
    const LABEL: &'static str = "Get species";

    /// Resolve the species of each sequence and the IgBLAST organism it maps to.
    ///
    /// Features carry their species. Sequences take it from their source clone, and
    /// all clones of the batch are fetched in one request.
    pub fn new(registry: &'a dyn Registry) -> Self {
        Self { registry }
    }

    fn species(&self, items: &[DnaSequenceItem]) -> Result<Vec<Option<String>>> {
        let clone_ids = items
            .iter()
            .map(|item| match item.dna_schema_type() {
                DnaSchemaType::Sequence => item
                    .dna_sequence()
                    .field_value(dna_sequence::SOURCE_CLONE)
                    .and_then(|v| v.first()),
                DnaSchemaType::Feature => None,
            })
            .collect::<Vec<_>>();

        let mut seen = FxHashSet::default();
        let unique_ids = clone_ids
            .iter()
            .flatten()
            .filter(|id| seen.insert(**id))
            .map(|id| id.to_string())
            .collect::<Vec<_>>();

        let clone_species = if unique_ids.is_empty() {
            FxHashMap::default()
        } else {
            self.registry
                .get_custom_entities(&unique_ids)?
                .into_iter()
                .filter_map(|clone| {
                    let species = clone.field_text_value(dna_sequence::SPECIES)?.to_owned();
                    Some((clone.id, species))
                })
                .collect::<FxHashMap<_, _>>()
        };

        Ok(items
            .iter()
            .zip(clone_ids)
            .map(|(item, clone_id)| match item.dna_schema_type() {
                DnaSchemaType::Feature => item
                    .dna_sequence()
                    .field_text_value(dna_feature::SOURCE_SPECIES)
                    .map(|s| s.to_owned()),
                DnaSchemaType::Sequence => clone_id.and_then(|id| clone_species.get(id).cloned()),
            })
            .collect())
    }
}

impl<'a> Step for GetSpeciesStep<'a> {
    type Input = DnaSequenceItem;
    type Output = SpeciesItem;
    type Failure = DnaSequenceItem;

    fn execute(
        &self,
        items: Vec<DnaSequenceItem>,
    ) -> Result<StepResults<SpeciesItem, DnaSequenceItem>> {
        let mut results = StepResults::new();

        if items.is_empty() {
            return Ok(results);
        }

        let species = self.species(&items)?;

        for (item, species) in items.into_iter().zip(species) {
            let species = species.unwrap_or_default();
            match organism_for(&species) {
                Some(organism) => results.add_succeeded(SpeciesItem::new(item, species, organism)),
                None => results.add_failed(item, format!("Species \"{species}\" not supported")),
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
