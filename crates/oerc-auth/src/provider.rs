use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::error::AuthResult;
use crate::identity::Identity;
use crate::session::Session;

/// Session lifecycle notifications.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn { user_id: String, token: String },
    SignedOut { token: String },
    Expired { token: String },
}

impl AuthEvent {
    pub fn token(&self) -> &str {
        match self {
            Self::SignedIn { token, .. } | Self::SignedOut { token } | Self::Expired { token } => {
                token
            }
        }
    }
}

/// Hosted identity service: password sign-in and bearer sessions.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session>;

    /// End a session. Unknown tokens are `InvalidToken`.
    async fn sign_out(&self, token: &str) -> AuthResult<()>;

    /// Resolve a bearer token to its user.
    async fn current_user(&self, token: &str) -> AuthResult<Identity>;

    /// Subscribe to session changes.
    fn subscribe(&self) -> broadcast::Receiver<AuthEvent>;
}
