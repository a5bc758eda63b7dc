use thiserror::Error;

/// Errors produced by type conversions.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid record id: {0:?}")]
    InvalidId(String),

    #[error("row is not an object")]
    RowNotObject,

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for TypeError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// A required field is missing or a value is malformed.
///
/// Validation runs before any remote call is attempted.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid email address: {0:?}")]
    InvalidEmail(String),

    #[error("invalid link {0:?}: must start with http:// or https://")]
    InvalidLink(String),
}

/// Reject blank (empty or whitespace-only) required text.
pub(crate) fn require_text(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(())
}

/// Like [`require_text`], but only when a patch actually carries the field.
pub(crate) fn require_patched_text(
    field: &'static str,
    value: &Option<String>,
) -> Result<(), ValidationError> {
    match value {
        Some(v) => require_text(field, v),
        None => Ok(()),
    }
}

/// Optional outbound links must be absolute http(s) URLs. Empty means "none".
pub(crate) fn check_link(value: &str) -> Result<(), ValidationError> {
    let v = value.trim();
    if v.is_empty() || v.starts_with("http://") || v.starts_with("https://") {
        Ok(())
    } else {
        Err(ValidationError::InvalidLink(value.to_string()))
    }
}

/// Map empty/whitespace optional text to `None`.
pub(crate) fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
