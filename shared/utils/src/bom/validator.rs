//! BOM Validator
//!
//! Checks a parsed BOM against the columns a category needs before any row is
//! processed.

use std::collections::BTreeMap;

use super::parser::ParsedBom;
use crate::error::{DiamondError, DiamondResult};
use diamond_models::RowFields;

/// Outcome of checking a BOM for required columns
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnCheck {
    /// Required columns absent from the header row, in required order
    pub missing: Vec<String>,
    /// Required columns found in the header row
    pub present: Vec<String>,
    /// Per present column, how many rows have a blank cell
    pub blank_cells: BTreeMap<String, usize>,
}

impl ColumnCheck {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// Fails with the list of missing columns, if any.
    pub fn into_result(self) -> DiamondResult<Self> {
        if self.missing.is_empty() {
            Ok(self)
        } else {
            Err(DiamondError::missing_columns(self.missing))
        }
    }

    /// Human readable notes about blank required cells
    pub fn warnings(&self) -> Vec<String> {
        self.blank_cells
            .iter()
            .filter(|(_, count)| **count > 0)
            .map(|(column, count)| format!("Column '{}' is blank in {} row(s)", column, count))
            .collect()
    }
}

/// BOM validator
#[derive(Debug, Default)]
pub struct BomValidator;

impl BomValidator {
    pub fn new() -> Self {
        Self
    }

    /// Check that every required column exists; matching is exact and case-sensitive
    pub fn check_columns(&self, bom: &ParsedBom, required: &[&str]) -> ColumnCheck {
        let mut check = ColumnCheck::default();

        for column in required {
            if !bom.has_column(column) {
                check.missing.push((*column).to_string());
                continue;
            }

            let blanks = bom
                .row_views()
                .filter(|row| row.field(column).map_or(true, |v| v.trim().is_empty()))
                .count();
            check.present.push((*column).to_string());
            check.blank_cells.insert((*column).to_string(), blanks);
        }

        check
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bom::parser::BomParser;

    #[test]
    fn test_missing_columns_reported_in_order() {
        let bom = BomParser::new()
            .parse_csv("bom.csv", b"MasterCode,Cladding Panel\nO-1-2,CP\n")
            .unwrap();

        let check = BomValidator::new().check_columns(&bom, &["MasterCode", "Backer Board", "Cladding Panel", "Frame"]);

        assert!(!check.is_complete());
        assert_eq!(check.missing, vec!["Backer Board", "Frame"]);
        assert_eq!(check.present, vec!["MasterCode", "Cladding Panel"]);

        let err = check.into_result().unwrap_err();
        assert_eq!(err.to_string(), "Missing Columns in CSV: Backer Board, Frame");
        assert_eq!(err.http_status_code(), 422);
    }

    #[test]
    fn test_case_sensitive_match() {
        let bom = BomParser::new().parse_csv("bom.csv", b"mastercode\nO-1\n").unwrap();
        let check = BomValidator::new().check_columns(&bom, &["MasterCode"]);
        assert_eq!(check.missing, vec!["MasterCode"]);
    }

    #[test]
    fn test_blank_cells_counted() {
        let bom = BomParser::new()
            .parse_csv("bom.csv", b"MasterCode\nO-1\n \n\"\"\nO-2\n")
            .unwrap();
        let check = BomValidator::new().check_columns(&bom, &["MasterCode"]);

        assert!(check.is_complete());
        assert_eq!(check.blank_cells.get("MasterCode"), Some(&2));
        assert_eq!(check.warnings(), vec!["Column 'MasterCode' is blank in 2 row(s)"]);
    }
}
