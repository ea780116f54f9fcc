//! # Diamond Core Domain Models
//!
//! This module contains the core domain models for the Diamond ID system, which
//! assigns deterministic identifier codes to rows of a manufacturing bill of materials.
//!
//! ## Key Models
//!
//! - **Category**: One of the ten fixed product categories (prefix digits 0-9)
//! - **RuleSet**: Revision of the per-category derivation rules
//! - **DiamondId**: A derived `<prefix><n2><fingerprint>-<revision>` code
//! - **RowOutcome**: Either a generated ID or a typed per-row failure
//! - **RowFields**: Column lookup abstraction over a single BOM row
//!
//! ## Sentinels
//!
//! Failed rows are rendered inline in the output column:
//! - `ERROR` for rows whose derivation failed
//! - `FORMAT ERROR: Start with O-` for Cladding Assy codes without the `O-` prefix
//! - `UNKNOWN` for an unrecognised category prefix

pub mod category;
pub mod diamond_id;


pub use category::*;
pub use diamond_id::*;
