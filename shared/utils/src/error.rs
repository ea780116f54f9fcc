use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum DiamondError {
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    #[error("Missing Columns in CSV: {}", .columns.join(", "))]
    MissingColumns { columns: Vec<String> },

    #[error("BOM parsing error: {message}")]
    BomParsing { message: String },

    #[error("Unknown category: {label}")]
    UnknownCategory { label: String },

    #[error("Batch too large: {rows} rows exceeds limit of {limit}")]
    BatchTooLarge { rows: usize, limit: usize },

    #[error("Export error: {message}")]
    Export { message: String },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Internal server error: {message}")]
    Internal { message: String },
}

impl DiamondError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn missing_columns<I, S>(columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::MissingColumns {
            columns: columns.into_iter().map(Into::into).collect(),
        }
    }

    pub fn bom_parsing(message: impl Into<String>) -> Self {
        Self::BomParsing {
            message: message.into(),
        }
    }

    pub fn unknown_category(label: impl Into<String>) -> Self {
        Self::UnknownCategory {
            label: label.into(),
        }
    }

    pub fn export(message: impl Into<String>) -> Self {
        Self::Export {
            message: message.into(),
        }
    }

    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "VALIDATION_ERROR",
            Self::MissingColumns { .. } => "MISSING_COLUMNS",
            Self::BomParsing { .. } => "BOM_PARSING_ERROR",
            Self::UnknownCategory { .. } => "UNKNOWN_CATEGORY",
            Self::BatchTooLarge { .. } => "BATCH_TOO_LARGE",
            Self::Export { .. } => "EXPORT_ERROR",
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::Internal { .. } => "INTERNAL_SERVER_ERROR",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            Self::Validation { .. } => 400,
            Self::MissingColumns { .. } => 422,
            Self::BomParsing { .. } => 400,
            Self::UnknownCategory { .. } => 400,
            Self::BatchTooLarge { .. } => 413,
            Self::Export { .. } => 500,
            Self::Configuration { .. } => 500,
            Self::Internal { .. } => 500,
        }
    }

    /// Structured payload attached to the error response, if any.
    pub fn details(&self) -> Option<serde_json::Value> {
        match self {
            Self::MissingColumns { columns } => Some(serde_json::json!({ "missing_columns": columns })),
            Self::BatchTooLarge { rows, limit } => Some(serde_json::json!({ "rows": rows, "limit": limit })),
            _ => None,
        }
    }
}

pub type DiamondResult<T> = Result<T, DiamondError>;

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    pub message: String,
    pub details: Option<serde_json::Value>,
}

impl From<DiamondError> for ErrorResponse {
    fn from(error: DiamondError) -> Self {
        Self {
            error: error.to_string(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: error.details(),
        }
    }
}

// Conversion from common error types
impl From<csv::Error> for DiamondError {
    fn from(error: csv::Error) -> Self {
        Self::bom_parsing(error.to_string())
    }
}

impl From<serde_json::Error> for DiamondError {
    fn from(error: serde_json::Error) -> Self {
        Self::validation("JSON", error.to_string())
    }
}

impl From<diamond_models::CategoryParseError> for DiamondError {
    fn from(error: diamond_models::CategoryParseError) -> Self {
        Self::unknown_category(error.to_string())
    }
}
