//! Batch generation over a parsed BOM.

use chrono::{DateTime, Utc};
use diamond_models::{Category, RowFailure, RowFields, RowOutcome, RuleSet, MASTER_CODE};
use diamond_utils::{validate_master_code, BomValidator, DiamondError, DiamondResult, ParsedBom};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::rules;

/// Counts of row outcomes in one batch
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GenerationSummary {
    pub total_rows: usize,
    pub generated: usize,
    pub failed: usize,
    pub format_errors: usize,
    pub unknown: usize,
    /// Non-blank MasterCodes that are not dash-delimited alphanumeric segments
    pub malformed_codes: usize,
}

impl GenerationSummary {
    fn from_outcomes(outcomes: &[RowOutcome]) -> Self {
        let mut summary = Self {
            total_rows: outcomes.len(),
            ..Self::default()
        };
        for outcome in outcomes {
            match outcome.failure() {
                None => summary.generated += 1,
                Some(RowFailure::MissingOPrefix) => summary.format_errors += 1,
                Some(RowFailure::UnknownCategory { .. }) => summary.unknown += 1,
                Some(_) => summary.failed += 1,
            }
        }
        summary
    }
}

/// Per-row outcomes of one batch, in input row order
#[derive(Debug, Clone, Serialize)]
pub struct GenerationReport {
    pub category: Category,
    pub rule_set: RuleSet,
    pub output_column: String,
    pub outcomes: Vec<RowOutcome>,
    pub summary: GenerationSummary,
    pub warnings: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl GenerationReport {
    /// Output column values, one per input row.
    pub fn cell_values(&self) -> Vec<String> {
        self.outcomes.iter().map(RowOutcome::cell_value).collect()
    }

    /// Appends the output column to `bom`, or overwrites it if already present.
    pub fn apply_to(&self, bom: &mut ParsedBom) -> DiamondResult<()> {
        bom.set_column(&self.output_column, self.cell_values())
    }
}

/// Diamond ID generator for a fixed rule revision
#[derive(Debug, Clone)]
pub struct DiamondIdGenerator {
    rule_set: RuleSet,
    max_rows: Option<usize>,
}

impl Default for DiamondIdGenerator {
    fn default() -> Self {
        Self::new(RuleSet::default())
    }
}

impl DiamondIdGenerator {
    pub fn new(rule_set: RuleSet) -> Self {
        Self {
            rule_set,
            max_rows: None,
        }
    }

    /// Reject batches with more than `max_rows` rows
    pub fn with_max_rows(mut self, max_rows: usize) -> Self {
        self.max_rows = Some(max_rows);
        self
    }

    pub fn rule_set(&self) -> RuleSet {
        self.rule_set
    }

    pub fn required_columns(&self, category: Category) -> &'static [&'static str] {
        rules::required_columns(category, self.rule_set)
    }

    /// Required columns absent from the BOM header, in required order.
    pub fn missing_columns(&self, category: Category, bom: &ParsedBom) -> Vec<String> {
        BomValidator::new()
            .check_columns(bom, self.required_columns(category))
            .missing
    }

    pub fn derive<R>(&self, category: Category, row: &R) -> RowOutcome
    where
        R: RowFields + ?Sized,
    {
        rules::derive(category, self.rule_set, row)
    }

    pub fn derive_for_prefix<R>(&self, prefix: &str, row: &R) -> RowOutcome
    where
        R: RowFields + ?Sized,
    {
        rules::derive_for_prefix(prefix, self.rule_set, row)
    }

    /// Derives an ID for every row of `bom`.
    ///
    /// Missing required columns fail the whole batch before any row is read.
    /// Row-level failures are recorded as outcomes and never abort the batch.
    pub fn generate(&self, category: Category, bom: &ParsedBom) -> DiamondResult<GenerationReport> {
        if let Some(limit) = self.max_rows {
            if bom.rows.len() > limit {
                return Err(DiamondError::BatchTooLarge {
                    rows: bom.rows.len(),
                    limit,
                });
            }
        }

        let check = BomValidator::new().check_columns(bom, self.required_columns(category));
        if !check.is_complete() {
            warn!(
                category = %category,
                filename = %bom.filename,
                missing = ?check.missing,
                "Rejecting batch with missing columns"
            );
        }
        let check = check.into_result()?;

        let outcomes: Vec<RowOutcome> = bom
            .row_views()
            .map(|row| {
                let outcome = self.derive(category, &row);
                if let Some(failure) = outcome.failure() {
                    debug!(row = row.row_number(), reason = %failure, "Row derivation failed");
                }
                outcome
            })
            .collect();

        let mut summary = GenerationSummary::from_outcomes(&outcomes);
        summary.malformed_codes = self.count_malformed_codes(category, bom);
        info!(
            category = %category,
            rule_set = %self.rule_set,
            rows = summary.total_rows,
            generated = summary.generated,
            failed = summary.failed,
            format_errors = summary.format_errors,
            malformed_codes = summary.malformed_codes,
            "Generated Diamond IDs"
        );

        let mut warnings = bom.parse_warnings.clone();
        warnings.extend(check.warnings());
        if summary.malformed_codes > 0 {
            warnings.push(format!(
                "{} MasterCode value(s) are not dash-delimited segments",
                summary.malformed_codes
            ));
        }

        Ok(GenerationReport {
            category,
            rule_set: self.rule_set,
            output_column: category.output_column().to_string(),
            outcomes,
            summary,
            warnings,
            generated_at: Utc::now(),
        })
    }

    fn count_malformed_codes(&self, category: Category, bom: &ParsedBom) -> usize {
        if !self.required_columns(category).contains(&MASTER_CODE) {
            return 0;
        }

        bom.row_views()
            .filter_map(|row| row.field(MASTER_CODE).map(str::to_string))
            .filter(|code| !code.trim().is_empty() && validate_master_code(code).is_err())
            .count()
    }

    /// Generates and writes the output column into `bom`.
    pub fn generate_into(&self, category: Category, bom: &mut ParsedBom) -> DiamondResult<GenerationReport> {
        let report = self.generate(category, bom)?;
        report.apply_to(bom)?;
        Ok(report)
    }
}
