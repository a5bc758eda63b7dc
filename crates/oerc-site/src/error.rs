use oerc_types::{RecordId, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SiteError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// A required file slot was left empty.
    #[error("a {0} file is required")]
    MissingFile(&'static str),

    #[error("{0} records do not take file attachments")]
    UnexpectedAttachment(&'static str),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: RecordId },

    #[error("store error: {0}")]
    Store(#[from] oerc_store::StoreError),

    #[error("auth error: {0}")]
    Auth(#[from] oerc_auth::AuthError),

    #[error("mail error: {0}")]
    Mail(#[from] oerc_mail::MailError),
}

pub type SiteResult<T> = Result<T, SiteError>;
