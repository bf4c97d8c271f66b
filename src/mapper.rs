use lazy_static::lazy_static;
use rustc_hash::FxHashMap;

use crate::config::RegistryConfig;
use crate::errors::*;
use crate::items::SequenceAnalysis;
use crate::parse_utils::sanitize_sequence;
use crate::regions::AaRegions;
use crate::services::fields::*;
use crate::services::*;

lazy_static! {
    /// Species names in the registry that IgBLAST has germline databases for.
    pub static ref SPECIES_MAPPING: FxHashMap<&'static str, Organism> = {
        let mut m = FxHashMap::default();
        m.insert("Homo sapiens", Organism::Human);
        m.insert("Mus musculus", Organism::Mouse);
        m.insert("Rattus norvegicus", Organism::Rat);
        m.insert("Macaca mulatta", Organism::RhesusMonkey);
        m
    };
}

pub fn organism_for(species: &str) -> Option<Organism> {
    SPECIES_MAPPING.get(species).copied()
}

const REGIONS: [&str; 7] = ["fwr1", "cdr1", "fwr2", "cdr2", "fwr3", "cdr3", "fwr4"];
const CDRS: [&str; 3] = ["cdr1", "cdr2", "cdr3"];
const FWRS: [&str; 4] = ["fwr1", "fwr2", "fwr3", "fwr4"];
const ALIGNMENTS: [&str; 3] = ["v", "d", "j"];

const CDR_COLOR: &str = "#E2E3E5";
const FR_COLOR: &str = "#395EA8";
const ALIGNMENT_COLOR: &str = "#704878";
const ANNOTATION_TYPE: &str = "Site";

/// Builds registry payloads from IgBLAST results.
pub struct IgBlastToRegistryMapper<'a> {
    config: &'a RegistryConfig,
}

impl<'a> IgBlastToRegistryMapper<'a> {
    pub fn new(config: &'a RegistryConfig) -> Self {
        Self { config }
    }

    /// Translation of a DNA sequence, annotated with its CDR and framework regions in
    /// both domain systems and with its V, D and J germline alignments.
    pub fn to_aa_sequence_create(
        &self,
        dna_sequence: &DnaSequence,
        dna_schema_type: DnaSchemaType,
        analysis: &SequenceAnalysis,
    ) -> Result<AaSequenceCreate> {
        let imgt = &analysis.imgt;
        let Some(amino_acids) = sanitize_sequence(imgt.get("sequence_alignment_aa")) else {
            return Err(Error::MissingField {
                field: "sequence_alignment_aa".to_owned(),
                entity: format!("IgBlast result of \"{}\"", dna_sequence.id),
            });
        };

        let mut fields = Fields::new();
        if let Some(version) = &analysis.imgt_version {
            let version = Field::text(version);
            fields.insert(aa_sequence::IMGT_VERSION.to_owned(), version);
        }

        match dna_schema_type {
            DnaSchemaType::Sequence => {
                let source_clone = required_value(dna_sequence, dna_sequence::SOURCE_CLONE)?;
                let kind = required_value(dna_sequence, dna_sequence::TYPE)?;
                let clone_key = aa_sequence::SOURCE_CLONE.to_owned();
                fields.insert(clone_key, Field::new(source_clone));
                fields.insert(aa_sequence::TYPE.to_owned(), Field::new(kind));
            }
            DnaSchemaType::Feature => {
                let source = required_value(dna_sequence, dna_feature::SEQUENCE_SOURCE)?;
                let kind = match dna_sequence.field_value(dna_feature::FUNCTIONS) {
                    Some(FieldValue::List(functions)) => {
                        functions.first().cloned().unwrap_or_default()
                    }
                    _ => String::new(),
                };
                let source_key = aa_sequence::SEQUENCE_SOURCE.to_owned();
                fields.insert(source_key, Field::new(source));
                fields.insert(aa_sequence::TYPE.to_owned(), Field::text(kind));
            }
        }

        let mut annotations = Vec::new();

        for domain_system in [DomainSystem::Imgt, DomainSystem::Kabat] {
            let record = analysis.record(domain_system);
            let regions = AaRegions::detect(
                &amino_acids,
                REGIONS.iter().map(|r| (*r, record.get(&format!("{r}_aa")))),
            )?;

            let frameworks = FWRS.iter().map(|fwr| {
                let prefix = fwr.replace('w', "").to_uppercase();
                (*fwr, prefix, FR_COLOR)
            });
            let named = CDRS
                .iter()
                .map(|cdr| (*cdr, cdr.to_uppercase(), CDR_COLOR))
                .chain(frameworks);

            for (region_name, prefix, color) in named {
                let Some(value) = record.get(&format!("{region_name}_aa")) else {
                    continue;
                };
                let name = format!("{prefix}_{}", domain_system.label());
                fields.insert(name.clone(), Field::text(value));

                if let Some(region) = regions.get(region_name) {
                    annotations.push(AaAnnotation {
                        color: color.to_owned(),
                        kind: ANNOTATION_TYPE.to_owned(),
                        name,
                        start: region.start,
                        end: region.end,
                    });
                }
            }
        }

        let alignments = ALIGNMENTS
            .iter()
            .map(|a| {
                let aligned = imgt.get(&format!("{a}_sequence_alignment_aa"));
                (format!("{a}_alignment"), sanitize_sequence(aligned))
            })
            .collect::<Vec<_>>();
        let named = alignments.iter().map(|(name, a)| (name, a.as_deref()));
        let regions = AaRegions::detect(&amino_acids, named)?;

        for alignment in ALIGNMENTS {
            if let Some(region) = regions.get(&format!("{alignment}_alignment")) {
                let call = imgt.get(&format!("{alignment}_call"));
                annotations.push(AaAnnotation {
                    color: ALIGNMENT_COLOR.to_owned(),
                    kind: ANNOTATION_TYPE.to_owned(),
                    name: call.unwrap_or_default().to_owned(),
                    start: region.start,
                    end: region.end,
                });
            }
        }

        Ok(AaSequenceCreate {
            name: format!("{}_translation", dna_sequence.name),
            amino_acids,
            annotations,
            fields,
            custom_fields: dna_sequence_id_field(dna_sequence),
            registry_id: self.config.registry_id.clone(),
            folder_id: dna_sequence.folder_id.clone(),
            schema_id: self.config.aa_sequence_schema_id.clone(),
            naming_strategy: NamingStrategy::ReplaceNamesFromParts,
            author_ids: self.config.author_ids.clone(),
        })
    }

    /// Circular DNA sequence holding the germline alignment, next to its source.
    pub fn to_dna_sequence_bulk_create(
        &self,
        dna_sequence: &DnaSequence,
        germline_alignment: &str,
    ) -> DnaSequenceBulkCreate {
        DnaSequenceBulkCreate {
            name: format!("{}_germline_alignment", dna_sequence.name),
            bases: germline_alignment.to_owned(),
            is_circular: true,
            folder_id: dna_sequence.folder_id.clone(),
            custom_fields: dna_sequence_id_field(dna_sequence),
        }
    }

    /// Update writing back the current state of a DNA sequence. Empty fields and fields
    /// the registry computes are left out.
    pub fn to_dna_sequence_bulk_update(
        &self,
        dna_sequence: &DnaSequence,
        computed_fields: &[&str],
    ) -> DnaSequenceBulkUpdate {
        let mut fields = copy_fields(&dna_sequence.fields);
        for computed in computed_fields {
            fields.remove(*computed);
        }

        DnaSequenceBulkUpdate {
            id: dna_sequence.id.clone(),
            name: dna_sequence.name.clone(),
            bases: dna_sequence.bases.clone(),
            fields,
            custom_fields: copy_fields(&dna_sequence.custom_fields),
            folder_id: dna_sequence.folder_id.clone(),
            is_circular: dna_sequence.is_circular,
        }
    }
}

fn required_value(dna_sequence: &DnaSequence, key: &str) -> Result<FieldValue> {
    let Some(value) = dna_sequence.field_value(key) else {
        return Err(Error::MissingField {
            field: key.to_owned(),
            entity: format!("DNA sequence \"{}\"", dna_sequence.id),
        });
    };
    Ok(value.clone())
}

fn dna_sequence_id_field(dna_sequence: &DnaSequence) -> Fields {
    let mut custom_fields = Fields::new();
    custom_fields.insert(DNA_SEQUENCE_ID.to_owned(), Field::text(&dna_sequence.id));
    custom_fields
}

fn copy_fields(fields: &Fields) -> Fields {
    let mut copied = Fields::new();
    for (key, field) in fields {
        if let Some(value) = &field.value {
            copied.insert(key.clone(), Field::new(value.clone()));
        }
    }
    copied
}
