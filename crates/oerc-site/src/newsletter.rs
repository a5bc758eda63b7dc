//! Newsletter subscriptions and mailings.

use std::sync::Arc;

use oerc_auth::{require, Capability, Identity};
use oerc_mail::templates::{admin_notification, welcome_email};
use oerc_mail::{Mailer, OutboundEmail};
use oerc_store::RecordStore;
use oerc_types::subscriber::validate_email;
use oerc_types::{NewsletterSubscriber, RecordId, Resource, SubscriberDraft, ValidationError};
use serde::{Deserialize, Serialize};

use crate::error::SiteResult;

/// Admin-authored mailing sent to every subscriber.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BulkEmail {
    pub subject: String,
    pub html_content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOutcome {
    pub recipients: usize,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WelcomeOutcome {
    pub welcome_id: Option<String>,
    pub notified_admin: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsletterSettings {
    /// Sender on every outbound message.
    pub from: String,
    /// Receives a note for each new subscriber.
    pub admin_email: Option<String>,
}

/// Subscriber table plus delivery.
///
/// `subscribe` is the one unauthenticated write. Listing, removal, and bulk
/// sends check the caller's capabilities before touching the table or the
/// mailer.
pub struct NewsletterService {
    subscribers: Arc<dyn RecordStore<NewsletterSubscriber>>,
    mailer: Arc<dyn Mailer>,
    settings: NewsletterSettings,
}

impl NewsletterService {
    pub fn new(
        subscribers: Arc<dyn RecordStore<NewsletterSubscriber>>,
        mailer: Arc<dyn Mailer>,
        settings: NewsletterSettings,
    ) -> Self {
        Self { subscribers, mailer, settings }
    }

    pub fn settings(&self) -> &NewsletterSettings {
        &self.settings
    }

    /// Add an address. Duplicates fail only when the table enforces
    /// uniqueness.
    pub async fn subscribe(&self, email: &str) -> SiteResult<NewsletterSubscriber> {
        let draft = SubscriberDraft { email: email.trim().to_string() };
        NewsletterSubscriber::validate_draft(&draft)?;
        let subscriber = self.subscribers.insert(draft).await?;
        tracing::info!(id = %subscriber.id, "new newsletter subscriber");
        Ok(subscriber)
    }

    /// Every subscriber, newest first.
    pub async fn list(&self, caller: Option<&Identity>) -> SiteResult<Vec<NewsletterSubscriber>> {
        require(caller, Capability::ManageSubscribers)?;
        Ok(self.subscribers.select_all().await?)
    }

    pub async fn remove(&self, caller: Option<&Identity>, id: &RecordId) -> SiteResult<bool> {
        let caller = require(caller, Capability::ManageSubscribers)?;
        let removed = self.subscribers.delete(id).await?;
        tracing::info!(%id, removed, by = %caller.email, "subscriber removed");
        Ok(removed)
    }

    /// One message addressed to all current subscribers.
    pub async fn send_bulk(&self, caller: Option<&Identity>, email: &BulkEmail) -> SiteResult<SendOutcome> {
        let caller = require(caller, Capability::SendNewsletter)?;
        if email.subject.trim().is_empty() {
            return Err(ValidationError::MissingField("subject").into());
        }
        if email.html_content.trim().is_empty() {
            return Err(ValidationError::MissingField("htmlContent").into());
        }

        let recipients: Vec<String> = self
            .subscribers
            .select_all()
            .await?
            .into_iter()
            .map(|s| s.email)
            .collect();
        if recipients.is_empty() {
            return Ok(SendOutcome {
                recipients: 0,
                message: "No subscribers found".into(),
                delivery_id: None,
            });
        }

        let count = recipients.len();
        let message = OutboundEmail {
            from: self.settings.from.clone(),
            to: recipients,
            subject: email.subject.clone(),
            html: email.html_content.clone(),
        };
        let receipt = self.mailer.send(&message).await.map_err(|e| {
            tracing::error!(error = %e, mailer = self.mailer.name(), "bulk send failed");
            e
        })?;
        tracing::info!(recipients = count, by = %caller.email, "newsletter sent");
        Ok(SendOutcome {
            recipients: count,
            message: format!("Email sent to {count} subscribers"),
            delivery_id: receipt.id,
        })
    }

    /// Welcome a new subscriber and tell the admin.
    ///
    /// The admin note is skipped when no admin address is configured. A
    /// failed admin note is logged; the welcome result is still returned.
    pub async fn welcome(&self, email: &str) -> SiteResult<WelcomeOutcome> {
        let email = email.trim();
        validate_email(email)?;
        let receipt = self.mailer.send(&welcome_email(&self.settings.from, email)).await?;
        tracing::info!(mailer = self.mailer.name(), "welcome email sent");

        let mut notified_admin = false;
        if let Some(admin) = self.settings.admin_email.as_deref() {
            match self
                .mailer
                .send(&admin_notification(&self.settings.from, admin, email))
                .await
            {
                Ok(_) => notified_admin = true,
                Err(e) => tracing::warn!(error = %e, "admin notification failed"),
            }
        }
        Ok(WelcomeOutcome { welcome_id: receipt.id, notified_admin })
    }
}

impl std::fmt::Debug for NewsletterService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsletterService")
            .field("mailer", &self.mailer.name())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiteError;
    use oerc_auth::{AuthError, Role};
    use oerc_mail::{MailError, OutboxMailer};
    use oerc_store::{InMemoryTable, StoreError, UniquePolicy};

    struct Fixture {
        table: Arc<InMemoryTable<NewsletterSubscriber>>,
        outbox: Arc<OutboxMailer>,
        service: NewsletterService,
    }

    fn fixture(policy: UniquePolicy) -> Fixture {
        let table = Arc::new(InMemoryTable::with_policy(policy));
        let outbox = Arc::new(OutboxMailer::new());
        let service = NewsletterService::new(
            table.clone(),
            outbox.clone(),
            NewsletterSettings {
                from: "OERC Newsletter <info@oerc.ca>".into(),
                admin_email: Some("admin@oerc.ca".into()),
            },
        );
        Fixture { table, outbox, service }
    }

    fn admin() -> Identity {
        Identity::new("a", "admin@oerc.ca", [Role::Admin])
    }

    fn member() -> Identity {
        Identity::new("m", "member@oerc.ca", [Role::Member])
    }

    fn mailing() -> BulkEmail {
        BulkEmail { subject: "Spring update".into(), html_content: "<p>News</p>".into() }
    }

    #[tokio::test]
    async fn subscribe_validates_address() {
        let f = fixture(UniquePolicy::Enforce);
        assert!(matches!(
            f.service.subscribe("not-an-email").await,
            Err(SiteError::Validation(ValidationError::InvalidEmail(_)))
        ));
        let s = f.service.subscribe("  reader@school.ca ").await.unwrap();
        assert_eq!(s.email, "reader@school.ca");
        assert_eq!(f.table.len(), 1);
    }

    #[tokio::test]
    async fn duplicate_subscriber_depends_on_table_policy() {
        let f = fixture(UniquePolicy::Enforce);
        f.service.subscribe("reader@school.ca").await.unwrap();
        let err = f.service.subscribe("Reader@School.ca").await.unwrap_err();
        assert!(matches!(err, SiteError::Store(StoreError::UniqueViolation { .. })));
        assert_eq!(f.table.len(), 1);

        let f = fixture(UniquePolicy::Allow);
        f.service.subscribe("reader@school.ca").await.unwrap();
        f.service.subscribe("reader@school.ca").await.unwrap();
        assert_eq!(f.table.len(), 2);
    }

    #[tokio::test]
    async fn listing_requires_capability() {
        let f = fixture(UniquePolicy::Enforce);
        f.service.subscribe("a@x.ca").await.unwrap();
        f.service.subscribe("b@x.ca").await.unwrap();

        let rows = f.service.list(Some(&admin())).await.unwrap();
        assert_eq!(rows[0].email, "b@x.ca");

        assert!(matches!(
            f.service.list(Some(&member())).await,
            Err(SiteError::Auth(AuthError::Forbidden { .. }))
        ));
        assert!(matches!(
            f.service.list(None).await,
            Err(SiteError::Auth(AuthError::MissingCredentials))
        ));
    }

    #[tokio::test]
    async fn remove_requires_capability() {
        let f = fixture(UniquePolicy::Enforce);
        let s = f.service.subscribe("a@x.ca").await.unwrap();
        assert!(f.service.remove(Some(&member()), &s.id).await.is_err());
        assert_eq!(f.table.len(), 1);
        assert!(f.service.remove(Some(&admin()), &s.id).await.unwrap());
        assert!(!f.service.remove(Some(&admin()), &s.id).await.unwrap());
    }

    #[tokio::test]
    async fn bulk_send_is_one_message_to_everyone() {
        let f = fixture(UniquePolicy::Enforce);
        for e in ["a@x.ca", "b@x.ca", "c@x.ca"] {
            f.service.subscribe(e).await.unwrap();
        }
        let outcome = f.service.send_bulk(Some(&admin()), &mailing()).await.unwrap();
        assert_eq!(outcome.recipients, 3);
        assert_eq!(outcome.delivery_id.as_deref(), Some("outbox-1"));

        let sent = f.outbox.sent();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to.len(), 3);
        assert_eq!(sent[0].from, "OERC Newsletter <info@oerc.ca>");
    }

    #[tokio::test]
    async fn non_admin_bulk_send_has_no_side_effect() {
        let f = fixture(UniquePolicy::Enforce);
        f.service.subscribe("a@x.ca").await.unwrap();

        for caller in [Some(member()), None] {
            let err = f.service.send_bulk(caller.as_ref(), &mailing()).await.unwrap_err();
            assert!(matches!(err, SiteError::Auth(_)));
        }
        assert!(f.outbox.sent().is_empty());
        assert_eq!(f.table.len(), 1);
    }

    #[tokio::test]
    async fn bulk_send_validation_and_empty_list() {
        let f = fixture(UniquePolicy::Enforce);
        let blank = BulkEmail { subject: " ".into(), ..mailing() };
        assert!(matches!(
            f.service.send_bulk(Some(&admin()), &blank).await,
            Err(SiteError::Validation(ValidationError::MissingField("subject")))
        ));

        let outcome = f.service.send_bulk(Some(&admin()), &mailing()).await.unwrap();
        assert_eq!(outcome.recipients, 0);
        assert_eq!(outcome.message, "No subscribers found");
        assert!(f.outbox.sent().is_empty());
    }

    #[tokio::test]
    async fn delivery_failure_is_surfaced() {
        let f = fixture(UniquePolicy::Enforce);
        f.service.subscribe("a@x.ca").await.unwrap();
        f.outbox.fail_next(MailError::Rejected { status: 422, message: "bad from".into() });
        let err = f.service.send_bulk(Some(&admin()), &mailing()).await.unwrap_err();
        assert!(matches!(err, SiteError::Mail(MailError::Rejected { status: 422, .. })));
    }

    #[tokio::test]
    async fn welcome_sends_two_messages() {
        let f = fixture(UniquePolicy::Enforce);
        let outcome = f.service.welcome("new@x.ca").await.unwrap();
        assert!(outcome.notified_admin);
        let sent = f.outbox.sent();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].to, vec!["new@x.ca"]);
        assert_eq!(sent[1].to, vec!["admin@oerc.ca"]);
    }

    #[tokio::test]
    async fn welcome_without_email_is_rejected() {
        let f = fixture(UniquePolicy::Enforce);
        assert!(matches!(
            f.service.welcome("").await,
            Err(SiteError::Validation(ValidationError::MissingField("email")))
        ));
        assert!(f.outbox.sent().is_empty());
    }
}
