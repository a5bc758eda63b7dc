use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MailError {
    /// Required configuration (such as the API key) is missing.
    #[error("mail not configured: {0}")]
    NotConfigured(String),

    #[error("message has no recipients")]
    NoRecipients,

    /// The delivery service refused the message.
    #[error("delivery rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// The delivery service could not be reached.
    #[error("transport error: {0}")]
    Transport(String),
}

pub type MailResult<T> = Result<T, MailError>;
