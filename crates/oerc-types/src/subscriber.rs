use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::id::RecordId;
use crate::resource::{Direction, ListOrder, OrderKey, Resource, ResourceKind};

/// A newsletter subscriber. `created_at` is the subscription time.
///
/// Subscribers are created by the public subscribe form and removed by an
/// admin; they are never edited.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscriber {
    pub id: RecordId,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubscriberDraft {
    pub email: String,
}

/// Check the shape of an email address: one `@`, a non-empty local part,
/// a dotted domain, and no whitespace.
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(ValidationError::MissingField("email"));
    }
    let invalid = || ValidationError::InvalidEmail(email.to_string());
    if email.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    let (local, domain) = email.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') {
        return Err(invalid());
    }
    let dotted = domain
        .split('.')
        .collect::<Vec<_>>();
    if dotted.len() < 2 || dotted.iter().any(|label| label.is_empty()) {
        return Err(invalid());
    }
    Ok(())
}

impl Resource for NewsletterSubscriber {
    type Draft = SubscriberDraft;
    type Patch = ();

    const KIND: ResourceKind = ResourceKind::Subscriber;
    const ORDER: ListOrder = ListOrder::new(OrderKey::CreatedAt, Direction::Descending);

    fn id(&self) -> &RecordId {
        &self.id
    }

    fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    fn unique_key(&self) -> Option<String> {
        Some(self.email.to_ascii_lowercase())
    }

    fn from_draft(id: RecordId, created_at: DateTime<Utc>, draft: SubscriberDraft) -> Self {
        Self {
            id,
            email: draft.email.trim().to_string(),
            created_at,
        }
    }

    fn to_draft(&self) -> SubscriberDraft {
        SubscriberDraft { email: self.email.clone() }
    }

    fn apply(&mut self, _patch: &()) {}

    fn diff(&self, _edited: &SubscriberDraft) {}

    fn validate_draft(draft: &SubscriberDraft) -> Result<(), ValidationError> {
        validate_email(&draft.email)
    }

    fn validate_patch(_patch: &()) -> Result<(), ValidationError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_ordinary_addresses() {
        assert!(validate_email("reader@oerc.ca").is_ok());
        assert!(validate_email(" first.last+news@mail.example.org ").is_ok());
    }

    #[test]
    fn rejects_malformed_addresses() {
        assert_eq!(validate_email(""), Err(ValidationError::MissingField("email")));
        for bad in ["nobody", "@oerc.ca", "a@b", "a@@b.ca", "a b@c.ca", "a@b..ca"] {
            assert!(validate_email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn unique_key_ignores_case() {
        let s = NewsletterSubscriber::from_draft(
            RecordId::from("s1"),
            Utc::now(),
            SubscriberDraft { email: " Reader@OERC.ca ".into() },
        );
        assert_eq!(s.email, "Reader@OERC.ca");
        assert_eq!(s.unique_key().as_deref(), Some("reader@oerc.ca"));
    }
}
