use oerc_types::{RecordId, TypeError};

/// Errors from table and bucket operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No row with this id exists.
    #[error("{table}: row not found: {id}")]
    NotFound { table: &'static str, id: RecordId },

    /// An insert would duplicate a value covered by a uniqueness constraint.
    #[error("{table}: duplicate value violates unique constraint: {key}")]
    UniqueViolation { table: &'static str, key: String },

    /// Upload target already exists.
    #[error("object already exists: {0}")]
    ObjectExists(String),

    /// Object path is empty, absolute, or escapes the bucket.
    #[error("invalid object path: {0:?}")]
    InvalidPath(String),

    /// Row could not be encoded or decoded.
    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("type error: {0}")]
    Type(#[from] TypeError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is unreachable or refused the request.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("lock poisoned: {0}")]
    LockPoisoned(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
