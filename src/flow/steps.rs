//! The steps of the sequence annotation flow, in the order they run.

mod validate_events_step;
pub use validate_events_step::*;

mod get_dna_sequences_step;
pub use get_dna_sequences_step::*;

mod get_species_step;
pub use get_species_step::*;

mod execute_igblast_step;
pub use execute_igblast_step::*;

mod exclude_stop_codons_step;
pub use exclude_stop_codons_step::*;

mod create_aa_sequences_step;
pub use create_aa_sequences_step::*;

mod fill_translations_step;
pub use fill_translations_step::*;

mod create_germline_alignment_sequences_step;
pub use create_germline_alignment_sequences_step::*;

mod create_nucleotide_template_alignment_step;
pub use create_nucleotide_template_alignment_step::*;
