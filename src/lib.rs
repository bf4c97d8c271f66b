//! Annotation of antibody DNA sequences registered in a laboratory registry.
//!
//! # Overview
//! igannotate runs newly registered antibody DNA sequences through IgBLAST and writes the
//! results back into the registry: an annotated amino acid translation, a germline alignment
//! sequence, and a nucleotide alignment of each sequence against its germline.
//!
//! This is useful for:
//! * Annotating framework and CDR regions as soon as a sequence is registered
//! * Flagging non-productive sequences
//! * Keeping a per-run log of what happened to every sequence
//!
//! ## Flows and steps
//! Work is split into *steps* chained into a [`Flow`]. Every step takes a batch of items and
//! sorts each one into exactly one of three buckets:
//! * succeeded: passed on to the next step
//! * warning: expected exclusion, e.g. a sequence with a stop codon
//! * failed: an error specific to that item, e.g. an unsupported species
//!
//! Warnings and failures never reach the next step, and once a step has nothing left to pass
//! on, the rest of the flow is skipped. An error that is not specific to an item aborts the
//! whole flow.
//!
//! See [`flow::steps`] for the steps of the annotation flow, in the order they run.
//!
//! ## Items
//! Each step wraps the item it received into a richer one, so the last item holds the whole
//! history of a sequence:
//! ```text
//! TemplateAlignmentItem
//!  └ GermlineAlignmentItem   germline alignment DNA sequence
//!     └ TranslationItem
//!        └ AaSequenceItem    AA sequence request and created AA sequence
//!           └ IgBlastItem    IMGT and Kabat annotations
//!              └ SpeciesItem    species and IgBLAST organism
//!                 └ DnaSequenceItem    DNA sequence from the registry
//!                    └ EventValidationItem    registration event and schema
//! ```
//! Every item implements [`ProvenanceItem`], so warnings and failures of any step can be
//! collected together in the final [`FlowResults`].
//!
//! ## Bulk tasks
//! Some steps write to the registry through bulk tasks, which may reject the whole batch or
//! only some of its entries. Rejected entries fail, and the accepted ones are submitted again
//! until a task goes through, see [`execute_async_task`].
//!
//! ## Services
//! The registry and the IgBLAST service are reached through the [`services::Registry`] and
//! [`services::Annotator`] traits. The run log is an [`services::AppSession`] in the registry,
//! which receives a message per step and a summary once the flow completes.

pub mod config;
pub mod errors;
pub mod flow;
pub mod items;
pub mod mapper;
pub mod results;
pub mod services;

mod parse_utils;
mod regions;

#[cfg(test)]
mod testing;

// commonly used functions and types

pub use crate::config::*;
pub use crate::flow::*;
pub use crate::items::*;
