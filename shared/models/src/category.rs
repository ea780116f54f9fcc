//! Product category domain models for the Diamond ID system.
//!
//! This module defines the ten fixed product categories, the selector labels
//! they are chosen by, and the rule-set revisions the ID derivation follows.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const MASTER_CODE: &str = "MasterCode";
pub const BASE_ASSY_KIT: &str = "Base Assy Kit";
pub const COUNTERTOP_ASSY_KIT: &str = "Countertop Assy Kit";
pub const CLADDING_ASSY_KIT: &str = "Cladding Assy Kit";
pub const FINISH_KIT: &str = "Finish Kit";
pub const CLADDING_PANEL: &str = "Cladding Panel";
pub const BACKER_BOARD: &str = "Backer Board";

/// Kit columns combined by the Master Sku rule, in concatenation order.
pub const KIT_COLUMNS: [&str; 4] = [BASE_ASSY_KIT, COUNTERTOP_ASSY_KIT, CLADDING_ASSY_KIT, FINISH_KIT];

/// One of the ten product categories a batch is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    MasterSku,
    BaseAssyKit,
    CountertopAssyKit,
    CladdingAssyKit,
    FinishKit,
    CladdingAssy,
    CladdingPanel,
    BackerBoard,
    Countertop,
    Frame,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CategoryParseError {
    #[error("Empty category selection")]
    Empty,

    #[error("Unknown category prefix: {prefix}")]
    UnknownPrefix { prefix: String },

    #[error("Category label '{label}' does not match prefix {prefix} ({expected})")]
    NameMismatch {
        label: String,
        prefix: u8,
        expected: &'static str,
    },
}

impl Category {
    /// All categories in selector order.
    pub const ALL: [Category; 10] = [
        Self::MasterSku,
        Self::BaseAssyKit,
        Self::CountertopAssyKit,
        Self::CladdingAssyKit,
        Self::FinishKit,
        Self::CladdingAssy,
        Self::CladdingPanel,
        Self::BackerBoard,
        Self::Countertop,
        Self::Frame,
    ];

    pub fn prefix(self) -> u8 {
        match self {
            Self::MasterSku => 0,
            Self::BaseAssyKit => 1,
            Self::CountertopAssyKit => 2,
            Self::CladdingAssyKit => 3,
            Self::FinishKit => 4,
            Self::CladdingAssy => 5,
            Self::CladdingPanel => 6,
            Self::BackerBoard => 7,
            Self::Countertop => 8,
            Self::Frame => 9,
        }
    }

    pub fn from_prefix(prefix: u8) -> Option<Self> {
        Self::ALL.get(usize::from(prefix)).copied()
    }

    /// Human readable name, also used as the output column name.
    pub fn name(self) -> &'static str {
        match self {
            Self::MasterSku => "Master Sku",
            Self::BaseAssyKit => BASE_ASSY_KIT,
            Self::CountertopAssyKit => COUNTERTOP_ASSY_KIT,
            Self::CladdingAssyKit => CLADDING_ASSY_KIT,
            Self::FinishKit => FINISH_KIT,
            Self::CladdingAssy => "Cladding Assy",
            Self::CladdingPanel => CLADDING_PANEL,
            Self::BackerBoard => BACKER_BOARD,
            Self::Countertop => "Countertop",
            Self::Frame => "Frame",
        }
    }

    /// Selector label, e.g. `"5: Cladding Assy"`.
    pub fn label(self) -> String {
        format!("{}: {}", self.prefix(), self.name())
    }

    pub fn output_column(self) -> &'static str {
        self.name()
    }

    /// Download filename derived from the category name.
    pub fn download_filename(self) -> String {
        format!("{}_Diamond_IDs.csv", self.name().replace(' ', "_"))
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.prefix(), self.name())
    }
}

/// Accepts a full selector label (`"5: Cladding Assy"`) or a bare prefix (`"5"`).
///
/// When a name follows the colon it must match the prefix's category; the
/// comparison trims surrounding whitespace but is otherwise exact.
impl FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(CategoryParseError::Empty);
        }

        let (prefix_part, name_part) = match trimmed.split_once(':') {
            Some((prefix, name)) => (prefix.trim(), Some(name.trim())),
            None => (trimmed, None),
        };

        let category = prefix_part
            .parse::<u8>()
            .ok()
            .and_then(Self::from_prefix)
            .ok_or_else(|| CategoryParseError::UnknownPrefix {
                prefix: prefix_part.to_string(),
            })?;

        match name_part {
            Some(name) if name != category.name() => Err(CategoryParseError::NameMismatch {
                label: trimmed.to_string(),
                prefix: category.prefix(),
                expected: category.name(),
            }),
            _ => Ok(category),
        }
    }
}

impl Serialize for Category {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Revision of the per-category derivation rules.
///
/// `V6_1` is canonical. `V6_0` reproduces the previous release so that
/// batches generated with it can be regenerated and compared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RuleSet {
    #[serde(rename = "v6.0")]
    V6_0,
    #[default]
    #[serde(rename = "v6.1")]
    V6_1,
}

impl RuleSet {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::V6_0 => "v6.0",
            Self::V6_1 => "v6.1",
        }
    }
}

impl fmt::Display for RuleSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleSet {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v6.0" | "6.0" => Ok(Self::V6_0),
            "v6.1" | "6.1" => Ok(Self::V6_1),
            other => Err(format!("Unknown rule set: {other}")),
        }
    }
}
