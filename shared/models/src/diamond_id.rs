//! Diamond ID value types and per-row derivation outcomes.

use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

pub const ERROR_SENTINEL: &str = "ERROR";
pub const UNKNOWN_SENTINEL: &str = "UNKNOWN";
pub const FORMAT_ERROR_SENTINEL: &str = "FORMAT ERROR: Start with O-";

/// Revision suffix used by every category except Frame.
pub const DEFAULT_REVISION: u64 = 1;

/// A derived identifier of the shape `<prefix><n2><fingerprint>-<revision>`.
///
/// The N2 slot is usually a digit, but the Master Sku rule copies the second
/// character of a kit code verbatim, so it is kept as a `char`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DiamondId {
    pub prefix: u8,
    pub n2: char,
    pub fingerprint: String,
    pub revision: u64,
}

impl DiamondId {
    pub fn new(prefix: u8, n2: char, fingerprint: impl Into<String>, revision: u64) -> Self {
        Self {
            prefix,
            n2,
            fingerprint: fingerprint.into(),
            revision,
        }
    }

    /// Builds an ID whose N2 slot is a numeric checksum digit.
    pub fn with_digit(prefix: u8, n2: u8, fingerprint: impl Into<String>, revision: u64) -> Self {
        let n2 = char::from_digit(u32::from(n2 % 10), 10).unwrap_or('0');
        Self::new(prefix, n2, fingerprint, revision)
    }
}

impl fmt::Display for DiamondId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}-{:02}", self.prefix, self.n2, self.fingerprint, self.revision)
    }
}

impl Serialize for DiamondId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Why a single row produced a sentinel instead of an ID.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowFailure {
    /// The row has no cell for a column the rule reads.
    MissingField { column: String },
    /// No two consecutive digits where the rule expects them.
    NoDigitPair { segment: String },
    /// A numeric revision token does not fit the revision field.
    RevisionOutOfRange { token: String },
    /// Cladding Assy codes must start with `O-`.
    MissingOPrefix,
    UnknownCategory { prefix: String },
}

impl RowFailure {
    /// Value written to the output column for this failure.
    pub fn sentinel(&self) -> &'static str {
        match self {
            Self::MissingField { .. } | Self::NoDigitPair { .. } | Self::RevisionOutOfRange { .. } => {
                ERROR_SENTINEL
            }
            Self::MissingOPrefix => FORMAT_ERROR_SENTINEL,
            Self::UnknownCategory { .. } => UNKNOWN_SENTINEL,
        }
    }
}

impl fmt::Display for RowFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingField { column } => write!(f, "missing field '{column}'"),
            Self::NoDigitPair { segment } => write!(f, "no digit pair in '{segment}'"),
            Self::RevisionOutOfRange { token } => write!(f, "revision '{token}' out of range"),
            Self::MissingOPrefix => f.write_str("code does not start with O-"),
            Self::UnknownCategory { prefix } => write!(f, "unknown category prefix '{prefix}'"),
        }
    }
}

/// Result of deriving one row: an ID or a typed failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowOutcome {
    Generated(DiamondId),
    Failed(RowFailure),
}

impl RowOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self, Self::Generated(_))
    }

    pub fn diamond_id(&self) -> Option<&DiamondId> {
        match self {
            Self::Generated(id) => Some(id),
            Self::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&RowFailure> {
        match self {
            Self::Generated(_) => None,
            Self::Failed(failure) => Some(failure),
        }
    }

    /// Cell value for the output column.
    pub fn cell_value(&self) -> String {
        match self {
            Self::Generated(id) => id.to_string(),
            Self::Failed(failure) => failure.sentinel().to_string(),
        }
    }
}

impl From<DiamondId> for RowOutcome {
    fn from(id: DiamondId) -> Self {
        Self::Generated(id)
    }
}

impl From<RowFailure> for RowOutcome {
    fn from(failure: RowFailure) -> Self {
        Self::Failed(failure)
    }
}

impl fmt::Display for RowOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.cell_value())
    }
}

impl Serialize for RowOutcome {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.cell_value())
    }
}

/// Column lookup for one BOM row.
///
/// `None` means the row has no such column at all; a blank cell is `Some("")`.
pub trait RowFields {
    fn field(&self, column: &str) -> Option<&str>;
}

impl RowFields for HashMap<String, String> {
    fn field(&self, column: &str) -> Option<&str> {
        self.get(column).map(String::as_str)
    }
}

impl RowFields for BTreeMap<String, String> {
    fn field(&self, column: &str) -> Option<&str> {
        self.get(column).map(String::as_str)
    }
}

impl RowFields for [(&str, &str)] {
    fn field(&self, column: &str) -> Option<&str> {
        self.iter().find(|(name, _)| *name == column).map(|(_, value)| *value)
    }
}

impl<const N: usize> RowFields for [(&str, &str); N] {
    fn field(&self, column: &str) -> Option<&str> {
        self.as_slice().field(column)
    }
}
