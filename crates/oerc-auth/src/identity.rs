use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A privileged operation class.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// Create, update, and delete papers, events, conferences, and FAQs.
    ManageContent,
    /// List and remove newsletter subscribers.
    ManageSubscribers,
    /// Send a bulk email to all subscribers.
    SendNewsletter,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ManageContent => write!(f, "manage-content"),
            Self::ManageSubscribers => write!(f, "manage-subscribers"),
            Self::SendNewsletter => write!(f, "send-newsletter"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Every capability.
    Admin,
    /// Signed in, no privileges.
    Member,
}

impl Role {
    pub fn grants(&self, _capability: Capability) -> bool {
        matches!(self, Self::Admin)
    }
}

/// An authenticated user as recorded by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: String,
    pub email: String,
    pub roles: BTreeSet<Role>,
}

impl Identity {
    pub fn new(user_id: impl Into<String>, email: impl Into<String>, roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            user_id: user_id.into(),
            email: email.into(),
            roles: roles.into_iter().collect(),
        }
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.roles.iter().any(|r| r.grants(capability))
    }

    pub fn is_admin(&self) -> bool {
        self.roles.contains(&Role::Admin)
    }
}
