use thiserror::Error;

use crate::identity::Capability;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// No credentials were presented.
    #[error("missing authorization header")]
    MissingCredentials,

    /// The authorization header is not a bearer token.
    #[error("malformed authorization header")]
    MalformedCredentials,

    #[error("invalid email or password")]
    InvalidLogin,

    /// The bearer token does not name a live session.
    #[error("invalid authentication token")]
    InvalidToken,

    #[error("session expired")]
    SessionExpired,

    /// Authenticated, but lacking the capability.
    #[error("{email} lacks capability {capability}")]
    Forbidden { email: String, capability: Capability },

    #[error("account already exists: {0}")]
    AccountExists(String),

    #[error("internal auth error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Errors meaning "who are you?" rather than "you may not".
    pub fn is_unauthenticated(&self) -> bool {
        matches!(
            self,
            Self::MissingCredentials
                | Self::MalformedCredentials
                | Self::InvalidLogin
                | Self::InvalidToken
                | Self::SessionExpired
        )
    }
}

pub type AuthResult<T> = Result<T, AuthError>;
