//! Diamond ID derivation engine
//!
//! Turns BOM rows into compact Diamond IDs of the form
//! `<prefix><n2><fingerprint>-<revision>`, one per row, using the rules of the
//! selected category and rule revision.

pub mod fingerprint;
pub mod generator;
pub mod rules;
pub mod segments;

pub use fingerprint::{fingerprint, fingerprint_with_modulo, DEFAULT_MODULO};
pub use generator::{DiamondIdGenerator, GenerationReport, GenerationSummary};
pub use rules::{derive, derive_for_prefix, required_columns};
