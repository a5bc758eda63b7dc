use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::RngCore;
use tokio::sync::broadcast;

use crate::error::{AuthError, AuthResult};
use crate::identity::{Identity, Role};
use crate::password::PasswordHash;
use crate::provider::{AuthEvent, IdentityProvider};
use crate::session::Session;

const EVENT_CAPACITY: usize = 64;

struct Account {
    identity: Identity,
    password: PasswordHash,
}

/// In-memory accounts and sessions.
///
/// Accounts are keyed by lowercased email. Tokens are 32 random bytes,
/// hex-encoded.
pub struct InMemoryIdentityProvider {
    accounts: RwLock<HashMap<String, Account>>,
    sessions: RwLock<HashMap<String, Session>>,
    ttl: Duration,
    events: broadcast::Sender<AuthEvent>,
}

impl InMemoryIdentityProvider {
    pub fn new(ttl: Duration) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            accounts: RwLock::new(HashMap::new()),
            sessions: RwLock::new(HashMap::new()),
            ttl,
            events,
        }
    }

    /// Create an account. Emails are matched case-insensitively.
    pub fn register(
        &self,
        email: &str,
        password: &str,
        roles: impl IntoIterator<Item = Role>,
    ) -> AuthResult<Identity> {
        let key = email.trim().to_ascii_lowercase();
        let mut accounts = self.accounts.write().map_err(poisoned)?;
        if accounts.contains_key(&key) {
            return Err(AuthError::AccountExists(key));
        }
        let identity = Identity::new(uuid::Uuid::now_v7().to_string(), email.trim(), roles);
        accounts.insert(
            key,
            Account {
                identity: identity.clone(),
                password: PasswordHash::new(password),
            },
        );
        Ok(identity)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.read().map(|s| s.len()).unwrap_or(0)
    }

    fn emit(&self, event: AuthEvent) {
        // No subscribers is fine.
        let _ = self.events.send(event);
    }
}

fn poisoned<E: std::fmt::Display>(e: E) -> AuthError {
    AuthError::Internal(format!("lock poisoned: {e}"))
}

fn new_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> AuthResult<Session> {
        let identity = {
            let accounts = self.accounts.read().map_err(poisoned)?;
            let account = accounts
                .get(&email.trim().to_ascii_lowercase())
                .ok_or(AuthError::InvalidLogin)?;
            if !account.password.verify(password) {
                return Err(AuthError::InvalidLogin);
            }
            account.identity.clone()
        };

        let now = Utc::now();
        let session = Session {
            access_token: new_token(),
            user: identity,
            issued_at: now,
            expires_at: now + self.ttl,
        };
        let expired = {
            let mut sessions = self.sessions.write().map_err(poisoned)?;
            let expired: Vec<String> = sessions
                .values()
                .filter(|s| s.is_expired_at(now))
                .map(|s| s.access_token.clone())
                .collect();
            for token in &expired {
                sessions.remove(token);
            }
            sessions.insert(session.access_token.clone(), session.clone());
            expired
        };
        if !expired.is_empty() {
            tracing::debug!(count = expired.len(), "dropped expired sessions");
        }
        for token in expired {
            self.emit(AuthEvent::Expired { token });
        }
        tracing::info!(email = %session.user.email, "signed in");
        self.emit(AuthEvent::SignedIn {
            user_id: session.user.user_id.clone(),
            token: session.access_token.clone(),
        });
        Ok(session)
    }

    async fn sign_out(&self, token: &str) -> AuthResult<()> {
        let removed = self.sessions.write().map_err(poisoned)?.remove(token);
        match removed {
            Some(session) => {
                tracing::info!(email = %session.user.email, "signed out");
                self.emit(AuthEvent::SignedOut { token: token.to_string() });
                Ok(())
            }
            None => Err(AuthError::InvalidToken),
        }
    }

    async fn current_user(&self, token: &str) -> AuthResult<Identity> {
        let session = self
            .sessions
            .read()
            .map_err(poisoned)?
            .get(token)
            .cloned()
            .ok_or(AuthError::InvalidToken)?;
        if session.is_expired_at(Utc::now()) {
            self.sessions.write().map_err(poisoned)?.remove(token);
            self.emit(AuthEvent::Expired { token: token.to_string() });
            return Err(AuthError::SessionExpired);
        }
        Ok(session.user)
    }

    fn subscribe(&self) -> broadcast::Receiver<AuthEvent> {
        self.events.subscribe()
    }
}

impl std::fmt::Debug for InMemoryIdentityProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let accounts = self.accounts.read().map(|a| a.len()).unwrap_or(0);
        f.debug_struct("InMemoryIdentityProvider")
            .field("accounts", &accounts)
            .field("sessions", &self.session_count())
            .finish()
    }
}
