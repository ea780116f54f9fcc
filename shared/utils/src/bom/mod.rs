//! BOM (Bill of Materials) Processing Module
//!
//! Reads BOM tables, checks them for the columns a category requires and
//! writes them back out with a generated ID column.

pub mod parser;
pub mod validator;
pub mod writer;

pub use parser::{BomFormat, BomParser, BomRow, ParsedBom, RowView};
pub use validator::{BomValidator, ColumnCheck};
pub use writer::BomWriter;
