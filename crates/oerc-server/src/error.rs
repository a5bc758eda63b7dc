use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use oerc_auth::AuthError;
use oerc_mail::MailError;
use oerc_site::SiteError;
use oerc_store::StoreError;
use oerc_types::TypeError;
use serde_json::json;
use thiserror::Error;

/// Errors starting or configuring the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid config file: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("could not render config: {0}")]
    ConfigRender(#[from] toml::ser::Error),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    #[error("mail error: {0}")]
    Mail(#[from] MailError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

/// A failed request: status plus a `{"error": ...}` body.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self { status, message: message.into() }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::error!(status = %self.status, error = %self.message, "request failed");
        } else {
            tracing::debug!(status = %self.status, error = %self.message, "request rejected");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        let status = match &e {
            e if e.is_unauthenticated() => StatusCode::UNAUTHORIZED,
            AuthError::Forbidden { .. } => StatusCode::FORBIDDEN,
            AuthError::AccountExists(_) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        let status = match &e {
            StoreError::NotFound { .. } => StatusCode::NOT_FOUND,
            StoreError::UniqueViolation { .. } | StoreError::ObjectExists(_) => StatusCode::CONFLICT,
            StoreError::InvalidPath(_) => StatusCode::BAD_REQUEST,
            StoreError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<MailError> for ApiError {
    fn from(e: MailError) -> Self {
        let status = match &e {
            MailError::NoRecipients => StatusCode::BAD_REQUEST,
            MailError::Rejected { .. } | MailError::Transport(_) => StatusCode::BAD_GATEWAY,
            MailError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl From<TypeError> for ApiError {
    fn from(e: TypeError) -> Self {
        Self::bad_request(e.to_string())
    }
}

impl From<SiteError> for ApiError {
    fn from(e: SiteError) -> Self {
        match e {
            SiteError::Validation(_)
            | SiteError::MissingFile(_)
            | SiteError::UnexpectedAttachment(_) => Self::bad_request(e.to_string()),
            SiteError::NotFound { .. } => Self::not_found(e.to_string()),
            SiteError::Store(e) => e.into(),
            SiteError::Auth(e) => e.into(),
            SiteError::Mail(e) => e.into(),
        }
    }
}
