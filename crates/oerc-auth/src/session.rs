use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use crate::identity::Identity;
use crate::provider::AuthEvent;

/// A signed-in session as issued by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub access_token: String,
    pub user: Identity,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// Root-level holder of the current session.
///
/// Cloning shares the same session; every clone observes the same changes.
/// Consumers call [`SessionHandle::subscribe`] instead of keeping their own
/// copy of "who is signed in".
#[derive(Clone, Debug)]
pub struct SessionHandle {
    tx: Arc<watch::Sender<Option<Session>>>,
}

impl SessionHandle {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// The signed-in user while the session is live. A session past its
    /// expiry is cleared and yields `None`.
    pub fn identity(&self) -> Option<Identity> {
        self.live_at(Utc::now()).map(|s| s.user)
    }

    /// The current session as of `now`, clearing it if it has expired.
    pub fn live_at(&self, now: DateTime<Utc>) -> Option<Session> {
        self.tx.send_if_modified(|current| {
            let expired = current.as_ref().is_some_and(|s| s.is_expired_at(now));
            if expired {
                tracing::info!("session expired");
                *current = None;
            }
            expired
        });
        self.current()
    }

    pub fn token(&self) -> Option<String> {
        self.tx.borrow().as_ref().map(|s| s.access_token.clone())
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    pub fn set(&self, session: Option<Session>) {
        self.tx.send_replace(session);
    }

    /// React to a provider event: the current session is dropped when it is
    /// signed out or expires elsewhere.
    pub fn apply(&self, event: &AuthEvent) {
        if matches!(event, AuthEvent::SignedIn { .. }) {
            return;
        }
        self.tx.send_if_modified(|current| {
            let ends_current = current
                .as_ref()
                .is_some_and(|s| s.access_token == event.token());
            if ends_current {
                *current = None;
            }
            ends_current
        });
    }

    /// Keep this handle in step with a provider's event stream.
    pub fn follow(&self, mut events: broadcast::Receiver<AuthEvent>) -> JoinHandle<()> {
        let handle = self.clone();
        tokio::spawn(async move {
            loop {
                match events.recv().await {
                    Ok(event) => handle.apply(&event),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(skipped, "session listener lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for SessionHandle {
    fn default() -> Self {
        Self::new()
    }
}
