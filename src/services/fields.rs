use serde::{Deserialize, Serialize};

/// Field names of the DNA sequence schema.
pub mod dna_sequence {
    pub const SOURCE_CLONE: &str = "Source: Clone";
    pub const TYPE: &str = "Type";
    pub const SPECIES: &str = "Species";
    pub const TRANSLATION_AA: &str = "Translation AA";
    pub const TRANSLATION_AA_RESIDUES: &str = "Translation AA - Residues";
    pub const COMMENT: &str = "Comment";
}

/// Field names of the DNA feature schema.
pub mod dna_feature {
    pub const FUNCTIONS: &str = "Function(s)";
    pub const SEQUENCE_SOURCE: &str = "Sequence Source";
    pub const SOURCE_SPECIES: &str = "Source Species";
    pub const COMMENT: &str = "Comment";
    pub const TRANSLATION_AA: &str = "Translation AA";
    pub const TRANSLATION_AA_RESIDUES: &str = "Translation AA - Residues";
}

pub mod aa_sequence {
    pub const SEQUENCE_SOURCE: &str = "Sequence Source";
    pub const SOURCE_CLONE: &str = "Source: Clone";
    pub const TYPE: &str = "Type";
    pub const IMGT_VERSION: &str = "IMGT Version";
}

/// Custom field linking derived sequences back to their DNA sequence.
pub const DNA_SEQUENCE_ID: &str = "DNA Sequence ID";

/// The two DNA schemas the flow accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DnaSchemaType {
    Sequence,
    Feature,
}

impl DnaSchemaType {
    /// Fields computed by the registry, which must not be sent back on update.
    pub fn computed_fields(&self) -> &'static [&'static str] {
        match self {
            DnaSchemaType::Sequence => &[
                dna_sequence::SPECIES,
                dna_sequence::TRANSLATION_AA_RESIDUES,
            ],
            DnaSchemaType::Feature => &[dna_feature::TRANSLATION_AA_RESIDUES],
        }
    }

    pub fn comment_field(&self) -> &'static str {
        match self {
            DnaSchemaType::Sequence => dna_sequence::COMMENT,
            DnaSchemaType::Feature => dna_feature::COMMENT,
        }
    }

    pub fn translation_field(&self) -> &'static str {
        match self {
            DnaSchemaType::Sequence => dna_sequence::TRANSLATION_AA,
            DnaSchemaType::Feature => dna_feature::TRANSLATION_AA,
        }
    }
}
