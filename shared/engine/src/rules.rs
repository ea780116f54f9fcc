//! Per-category derivation rules.
//!
//! Every rule reads a few columns of one row and assembles
//! `<prefix><n2><fingerprint>-<revision>`. The canonical rules are
//! [`RuleSet::V6_1`]; [`RuleSet::V6_0`] keeps the previous release's
//! behaviour for categories 1, 2, 3, 4, 5 and 9 so old batches can be
//! regenerated and compared.

use diamond_models::{
    Category, DiamondId, RowFailure, RowFields, RowOutcome, RuleSet, BACKER_BOARD, CLADDING_PANEL,
    DEFAULT_REVISION, KIT_COLUMNS, MASTER_CODE,
};

use crate::fingerprint::fingerprint;
use crate::segments::{alpha_to_pos, extract_n2, first_digit_pair, join_leading, split_segments};

const CLADDING_ASSY_PREFIX: &str = "O-";

const MASTER_CODE_ONLY: &[&str] = &[MASTER_CODE];
const CLADDING_ASSY_COLUMNS: &[&str] = &[MASTER_CODE, CLADDING_PANEL, BACKER_BOARD];
const LEGACY_CLADDING_ASSY_COLUMNS: &[&str] = &[CLADDING_PANEL, BACKER_BOARD];

/// Columns that must exist in the header row before a batch may start.
pub fn required_columns(category: Category, rule_set: RuleSet) -> &'static [&'static str] {
    match (category, rule_set) {
        (Category::MasterSku, _) => &KIT_COLUMNS,
        (Category::CladdingAssy, RuleSet::V6_1) => CLADDING_ASSY_COLUMNS,
        (Category::CladdingAssy, RuleSet::V6_0) => LEGACY_CLADDING_ASSY_COLUMNS,
        _ => MASTER_CODE_ONLY,
    }
}

/// Derives the Diamond ID for one row.
pub fn derive<R>(category: Category, rule_set: RuleSet, row: &R) -> RowOutcome
where
    R: RowFields + ?Sized,
{
    let result = match rule_set {
        RuleSet::V6_1 => derive_v6_1(category, row),
        RuleSet::V6_0 => derive_v6_0(category, row),
    };

    match result {
        Ok(id) => RowOutcome::Generated(id),
        Err(failure) => RowOutcome::Failed(failure),
    }
}

/// Derives by raw prefix text; anything outside `0..=9` is `UNKNOWN`.
pub fn derive_for_prefix<R>(prefix: &str, rule_set: RuleSet, row: &R) -> RowOutcome
where
    R: RowFields + ?Sized,
{
    match prefix.trim().parse::<u8>().ok().and_then(Category::from_prefix) {
        Some(category) => derive(category, rule_set, row),
        None => RowOutcome::Failed(RowFailure::UnknownCategory {
            prefix: prefix.to_string(),
        }),
    }
}

fn derive_v6_1<R>(category: Category, row: &R) -> Result<DiamondId, RowFailure>
where
    R: RowFields + ?Sized,
{
    let prefix = category.prefix();

    match category {
        Category::MasterSku => master_sku(row),
        Category::BaseAssyKit | Category::CountertopAssyKit | Category::CladdingAssyKit => {
            let code = master_code(row)?;
            let n2 = first_digit_pair(&code).unwrap_or('0');
            Ok(DiamondId::new(prefix, n2, fingerprint(&code), DEFAULT_REVISION))
        }
        Category::FinishKit => {
            let code = master_code(row)?;
            let segments = split_segments(&code);
            Ok(DiamondId::with_digit(prefix, segment_n2(&segments), fingerprint(&code), DEFAULT_REVISION))
        }
        Category::CladdingAssy => {
            let code = master_code(row)?;
            let rest = code
                .strip_prefix(CLADDING_ASSY_PREFIX)
                .ok_or(RowFailure::MissingOPrefix)?;
            let cleaned: String = rest.chars().filter(|c| *c != '-').collect();
            Ok(DiamondId::new(prefix, second_char(&cleaned), fingerprint(&cleaned), DEFAULT_REVISION))
        }
        Category::CladdingPanel | Category::BackerBoard => segment_rule(prefix, row, 4),
        Category::Countertop => segment_rule(prefix, row, 3),
        Category::Frame => {
            let segments = split_segments(&master_code(row)?);
            let revision = match segments.get(4) {
                Some(token) => alpha_to_pos(Some(token.as_str())).ok_or_else(|| RowFailure::RevisionOutOfRange {
                    token: token.clone(),
                })?,
                None => DEFAULT_REVISION,
            };
            Ok(DiamondId::with_digit(
                prefix,
                segment_n2(&segments),
                fingerprint(&join_leading(&segments, 4)),
                revision,
            ))
        }
    }
}

fn derive_v6_0<R>(category: Category, row: &R) -> Result<DiamondId, RowFailure>
where
    R: RowFields + ?Sized,
{
    let prefix = category.prefix();

    match category {
        Category::BaseAssyKit => {
            let code = master_code(row)?;
            let segments = split_segments(&code);
            let n2 = match segments.get(1) {
                Some(segment) => first_digit_pair(segment).ok_or_else(|| RowFailure::NoDigitPair {
                    segment: segment.clone(),
                })?,
                None => '0',
            };
            Ok(DiamondId::new(prefix, n2, fingerprint(&code), DEFAULT_REVISION))
        }
        Category::CountertopAssyKit | Category::CladdingAssyKit | Category::FinishKit => {
            segment_rule(prefix, row, 5)
        }
        Category::CladdingAssy => {
            let panel = required_field(row, CLADDING_PANEL)?;
            let backer = required_field(row, BACKER_BOARD)?;
            let combined = format!("{panel}{backer}");
            Ok(DiamondId::new(prefix, second_char(panel), fingerprint(&combined), DEFAULT_REVISION))
        }
        Category::Frame => segment_rule(prefix, row, 4),
        Category::MasterSku
        | Category::CladdingPanel
        | Category::BackerBoard
        | Category::Countertop => derive_v6_1(category, row),
    }
}

fn master_sku<R>(row: &R) -> Result<DiamondId, RowFailure>
where
    R: RowFields + ?Sized,
{
    let mut kits = Vec::with_capacity(KIT_COLUMNS.len());
    for column in KIT_COLUMNS {
        kits.push(required_field(row, column)?);
    }
    let n2 = second_char(kits[0]);
    Ok(DiamondId::new(0, n2, fingerprint(&kits.concat()), DEFAULT_REVISION))
}

/// N2 from segment[1], fingerprint over the first `count` segments.
fn segment_rule<R>(prefix: u8, row: &R, count: usize) -> Result<DiamondId, RowFailure>
where
    R: RowFields + ?Sized,
{
    let segments = split_segments(&master_code(row)?);
    Ok(DiamondId::with_digit(
        prefix,
        segment_n2(&segments),
        fingerprint(&join_leading(&segments, count)),
        DEFAULT_REVISION,
    ))
}

fn segment_n2(segments: &[String]) -> u8 {
    segments.get(1).map_or(0, |segment| extract_n2(segment))
}

fn second_char(value: &str) -> char {
    value.chars().nth(1).unwrap_or('0')
}

fn required_field<'a, R>(row: &'a R, column: &str) -> Result<&'a str, RowFailure>
where
    R: RowFields + ?Sized,
{
    row.field(column).ok_or_else(|| RowFailure::MissingField {
        column: column.to_string(),
    })
}

fn master_code<R>(row: &R) -> Result<String, RowFailure>
where
    R: RowFields + ?Sized,
{
    required_field(row, MASTER_CODE).map(|code| code.trim().to_uppercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    const CODE: &str = "O-61025-01-71815-01";

    fn run(category: Category, code: &str) -> String {
        derive(category, RuleSet::V6_1, &[(MASTER_CODE, code)]).cell_value()
    }

    fn run_legacy(category: Category, code: &str) -> String {
        derive(category, RuleSet::V6_0, &[(MASTER_CODE, code)]).cell_value()
    }

    #[test]
    fn test_master_sku() {
        let row = [
            ("Base Assy Kit", "K1-A"),
            ("Countertop Assy Kit", "K2"),
            ("Cladding Assy Kit", "K3"),
            ("Finish Kit", "K4"),
        ];
        assert_eq!(derive(Category::MasterSku, RuleSet::V6_1, &row).cell_value(), "01568-01");
        assert_eq!(derive(Category::MasterSku, RuleSet::V6_0, &row).cell_value(), "01568-01");
    }

    #[test]
    fn test_master_sku_short_base_kit() {
        let row = [
            ("Base Assy Kit", "K"),
            ("Countertop Assy Kit", ""),
            ("Cladding Assy Kit", ""),
            ("Finish Kit", ""),
        ];
        let outcome = derive(Category::MasterSku, RuleSet::V6_1, &row);
        assert_eq!(outcome.diamond_id().unwrap().n2, '0');
    }

    #[test]
    fn test_master_sku_missing_kit_column() {
        let row = [("Base Assy Kit", "K1")];
        let outcome = derive(Category::MasterSku, RuleSet::V6_1, &row);
        assert_eq!(
            outcome.failure(),
            Some(&RowFailure::MissingField {
                column: "Countertop Assy Kit".to_string()
            })
        );
        assert_eq!(outcome.cell_value(), "ERROR");
    }

    #[test]
    fn test_digit_pair_categories() {
        assert_eq!(run(Category::BaseAssyKit, CODE), "11044-01");
        assert_eq!(run(Category::CountertopAssyKit, "AB-12-3456"), "22792-01");
        assert_eq!(run(Category::CladdingAssyKit, "ab-12-3456"), "32792-01");
        // no two consecutive digits anywhere
        assert_eq!(run(Category::BaseAssyKit, "A-1-2"), format!("10{}-01", fingerprint("A-1-2")));
    }

    #[test]
    fn test_finish_kit() {
        assert_eq!(run(Category::FinishKit, CODE), "45044-01");
        assert_eq!(run(Category::FinishKit, "ABC"), "40153-01");
    }

    #[test]
    fn test_cladding_assy() {
        assert_eq!(run(Category::CladdingAssy, CODE), "51092-01");
        assert_eq!(run(Category::CladdingAssy, "o-61025-01-71815-01"), "51092-01");
        assert_eq!(run(Category::CladdingAssy, "X-61025-01"), "FORMAT ERROR: Start with O-");
        assert_eq!(run(Category::CladdingAssy, ""), "FORMAT ERROR: Start with O-");
        // single character after the prefix
        assert_eq!(run(Category::CladdingAssy, "O-7"), format!("50{}-01", fingerprint("7")));
    }

    #[test]
    fn test_segment_categories() {
        assert_eq!(run(Category::CladdingPanel, CODE), "65817-01");
        assert_eq!(run(Category::BackerBoard, CODE), "75817-01");
        assert_eq!(run(Category::Countertop, CODE), "85662-01");
        // fewer than two segments falls back to n2 = 0
        assert_eq!(run(Category::Countertop, "ABC"), "80153-01");
    }

    #[test]
    fn test_frame_revision() {
        assert_eq!(run(Category::Frame, "X-12-03-99-B"), "92999-02");
        assert_eq!(run(Category::Frame, "X-12-03-99-7"), "92999-07");
        assert_eq!(run(Category::Frame, "X-12-03-99-"), "92999-01");
        assert_eq!(run(Category::Frame, "X-12-03-99"), "92999-01");
        assert_eq!(run(Category::Frame, "X-12-03-99-123"), "92999-123");
        let huge = format!("X-12-03-99-{}", "9".repeat(30));
        assert_eq!(run(Category::Frame, &huge), "ERROR");
    }

    #[test]
    fn test_missing_master_code_column() {
        let row = [("Finish Kit", "FK")];
        let outcome = derive(Category::Frame, RuleSet::V6_1, &row);
        assert_eq!(
            outcome.failure(),
            Some(&RowFailure::MissingField {
                column: "MasterCode".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_prefix() {
        let row = [(MASTER_CODE, CODE)];
        assert_eq!(derive_for_prefix("X", RuleSet::V6_1, &row).cell_value(), "UNKNOWN");
        assert_eq!(derive_for_prefix("10", RuleSet::V6_1, &row).cell_value(), "UNKNOWN");
        assert_eq!(derive_for_prefix("5", RuleSet::V6_1, &row).cell_value(), "51092-01");
    }

    #[test]
    fn test_required_columns() {
        assert_eq!(required_columns(Category::MasterSku, RuleSet::V6_1), &KIT_COLUMNS);
        assert_eq!(
            required_columns(Category::CladdingAssy, RuleSet::V6_1),
            &["MasterCode", "Cladding Panel", "Backer Board"]
        );
        assert_eq!(
            required_columns(Category::CladdingAssy, RuleSet::V6_0),
            &["Cladding Panel", "Backer Board"]
        );
        assert_eq!(required_columns(Category::Frame, RuleSet::V6_0), &["MasterCode"]);
    }

    #[test]
    fn test_legacy_divergences() {
        // segment[1] only, not the whole code
        assert_eq!(run_legacy(Category::BaseAssyKit, CODE), "11044-01");
        assert_eq!(run_legacy(Category::BaseAssyKit, "12-A-3"), "ERROR");
        assert_eq!(run(Category::BaseAssyKit, "12-A-3"), format!("12{}-01", fingerprint("12-A-3")));

        // first five segments with extract_n2 instead of the digit pair
        assert_eq!(run_legacy(Category::CountertopAssyKit, CODE), "25044-01");
        assert_eq!(run(Category::CountertopAssyKit, CODE), "21044-01");
        assert_eq!(run_legacy(Category::FinishKit, "AB-12-3456-7-8-9"), format!("42{}-01", fingerprint("AB12345678")));

        // frame ignores the revision token
        assert_eq!(run_legacy(Category::Frame, "X-12-03-99-B"), "92999-01");

        // unchanged categories agree
        assert_eq!(run_legacy(Category::Countertop, CODE), run(Category::Countertop, CODE));
    }

    #[test]
    fn test_legacy_cladding_assy_uses_panel_and_backer() {
        let row = [("Cladding Panel", "CP-100"), ("Backer Board", "BB-200")];
        assert_eq!(derive(Category::CladdingAssy, RuleSet::V6_0, &row).cell_value(), "5P340-01");
    }
}
