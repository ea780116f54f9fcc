use crate::error::{DiamondError, DiamondResult};
use regex::Regex;
use std::sync::OnceLock;
use validator::{Validate, ValidationErrors};

pub fn validate_model<T: Validate>(model: &T) -> DiamondResult<()> {
    match model.validate() {
        Ok(()) => Ok(()),
        Err(errors) => {
            let error_messages = format_validation_errors(&errors);
            Err(DiamondError::validation("model", error_messages))
        }
    }
}

pub fn format_validation_errors(errors: &ValidationErrors) -> String {
    let mut messages = Vec::new();

    for (field, field_errors) in errors.field_errors() {
        for error in field_errors {
            let message = match &error.code {
                std::borrow::Cow::Borrowed("length") => {
                    format!("Length validation failed for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("range") => {
                    format!("Value out of range for field '{}'", field)
                }
                std::borrow::Cow::Borrowed("required") => {
                    format!("Field '{}' is required", field)
                }
                _ => match &error.message {
                    Some(custom) => format!("Field '{}': {}", field, custom),
                    None => format!("Validation failed for field '{}': {}", field, error.code),
                },
            };
            messages.push(message);
        }
    }

    messages.sort();
    messages.join(", ")
}

fn master_code_regex() -> &'static Regex {
    static MASTER_CODE: OnceLock<Regex> = OnceLock::new();
    MASTER_CODE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9]+(?:\s*-\s*[A-Za-z0-9]+)+$").expect("static MasterCode pattern")
    })
}

/// Checks that a MasterCode is a dash-delimited run of alphanumeric segments.
///
/// Generation never requires this; it is a pre-screen for callers that want to
/// reject malformed codes before they turn into `ERROR` rows.
pub fn validate_master_code(code: &str) -> DiamondResult<()> {
    if !master_code_regex().is_match(code.trim()) {
        return Err(DiamondError::validation(
            "MasterCode",
            format!("Invalid MasterCode '{}'. Expected dash-delimited segments like O-61025-01-71815-01", code),
        ));
    }

    Ok(())
}

pub fn validate_file_type(file_name: &str, allowed_types: &[&str]) -> DiamondResult<()> {
    let extension = std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("");

    if !allowed_types.contains(&extension.to_lowercase().as_str()) {
        return Err(DiamondError::validation(
            "file_type",
            format!("File type '{}' not allowed. Allowed types: {}", extension, allowed_types.join(", ")),
        ));
    }

    Ok(())
}

pub fn validate_file_size(file_size: u64, max_size: u64) -> DiamondResult<()> {
    if file_size > max_size {
        return Err(DiamondError::validation(
            "file_size",
            format!("File size {} bytes exceeds maximum allowed size {} bytes", file_size, max_size),
        ));
    }

    Ok(())
}
