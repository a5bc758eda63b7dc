//! The admin dashboard: one session, one manager per resource kind.

use std::sync::Arc;

use oerc_auth::{Capability, IdentityProvider, SessionHandle};
use oerc_types::{Event, Faq, GlobalConference, NewsletterSubscriber, RecordId, ResearchPaper};
use tokio::task::JoinHandle;

use crate::error::SiteError;
use crate::manager::ResourceManager;
use crate::newsletter::{BulkEmail, NewsletterService, SendOutcome};
use crate::notice::{Confirmation, Notice};
use crate::site::Site;

pub type PaperManager = ResourceManager<ResearchPaper>;

/// Subscriber list and bulk mailing for the dashboard.
///
/// Failures are logged and reported as `false`/`None` with a [`Notice`].
pub struct SubscriberManager {
    service: Arc<NewsletterService>,
    session: SessionHandle,
    items: Vec<NewsletterSubscriber>,
    notice: Option<Notice>,
}

impl SubscriberManager {
    pub fn new(service: Arc<NewsletterService>, session: SessionHandle) -> Self {
        Self { service, session, items: Vec::new(), notice: None }
    }

    pub fn items(&self) -> &[NewsletterSubscriber] {
        &self.items
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub async fn load(&mut self) -> &[NewsletterSubscriber] {
        let caller = self.session.identity();
        match self.service.list(caller.as_ref()).await {
            Ok(rows) => self.items = rows,
            Err(e) => {
                self.fail("load subscribers", &e);
                self.items.clear();
            }
        }
        &self.items
    }

    pub async fn remove(&mut self, id: &RecordId, confirm: impl Confirmation) -> bool {
        if !confirm.confirm("Are you sure you want to remove this subscriber?") {
            return false;
        }
        let caller = self.session.identity();
        match self.service.remove(caller.as_ref(), id).await {
            Ok(removed) => {
                self.items.retain(|s| &s.id != id);
                if removed {
                    self.notice = Some(Notice::Success("Subscriber removed.".into()));
                } else {
                    self.fail(
                        "remove subscriber",
                        &SiteError::NotFound { kind: "subscriber", id: id.clone() },
                    );
                }
                removed
            }
            Err(e) => {
                self.fail("remove subscriber", &e);
                false
            }
        }
    }

    /// The delivery service's response is passed through as the notice.
    pub async fn send(&mut self, email: &BulkEmail) -> Option<SendOutcome> {
        let caller = self.session.identity();
        match self.service.send_bulk(caller.as_ref(), email).await {
            Ok(outcome) => {
                self.notice = Some(Notice::Success(outcome.message.clone()));
                Some(outcome)
            }
            Err(e) => {
                self.fail("send newsletter", &e);
                None
            }
        }
    }

    fn fail(&mut self, action: &str, error: &SiteError) {
        tracing::error!(action, error = %error, "subscriber action failed");
        self.notice = Some(Notice::Failure(format!("Failed to {action}: {error}")));
    }
}

/// Admin dashboard state.
///
/// The console owns the root [`SessionHandle`]; every manager reads that same
/// handle. The handle follows the identity provider's auth events, so a
/// session ended elsewhere closes the dashboard. Must be created inside a
/// tokio runtime.
pub struct AdminConsole {
    provider: Arc<dyn IdentityProvider>,
    session: SessionHandle,
    listener: JoinHandle<()>,
    pub papers: PaperManager,
    pub events: ResourceManager<Event>,
    pub conferences: ResourceManager<GlobalConference>,
    pub faqs: ResourceManager<Faq>,
    pub subscribers: SubscriberManager,
}

impl AdminConsole {
    pub fn new(site: &Site) -> Self {
        let session = SessionHandle::new();
        let listener = session.follow(site.identity.subscribe());
        Self {
            provider: site.identity.clone(),
            papers: PaperManager::new(site.papers.clone(), session.clone()),
            events: ResourceManager::<Event>::new(site.events.clone(), session.clone()),
            conferences: ResourceManager::<GlobalConference>::new(
                site.conferences.clone(),
                session.clone(),
            ),
            faqs: ResourceManager::<Faq>::new(site.faqs.clone(), session.clone()),
            subscribers: SubscriberManager::new(site.newsletter.clone(), session.clone()),
            session,
            listener,
        }
    }

    pub fn session(&self) -> &SessionHandle {
        &self.session
    }

    /// Start a session, ending any session this console already holds.
    pub async fn sign_in(&mut self, email: &str, password: &str) -> bool {
        if let Some(token) = self.session.token() {
            if let Err(e) = self.provider.sign_out(&token).await {
                tracing::debug!(error = %e, "previous session already ended");
            }
            self.session.set(None);
        }
        match self.provider.sign_in(email, password).await {
            Ok(session) => {
                tracing::debug!(email = %session.user.email, "dashboard session started");
                self.session.set(Some(session));
                true
            }
            Err(e) => {
                tracing::warn!(error = %e, "sign-in failed");
                false
            }
        }
    }

    pub async fn sign_out(&mut self) -> bool {
        let Some(token) = self.session.token() else {
            return false;
        };
        let result = self.provider.sign_out(&token).await;
        self.session.set(None);
        if let Err(e) = result {
            tracing::warn!(error = %e, "sign-out failed");
        }
        true
    }

    /// Route guard: only identities that may manage content see the
    /// dashboard.
    pub fn is_open(&self) -> bool {
        self.session
            .identity()
            .is_some_and(|id| id.can(Capability::ManageContent))
    }

    /// Load every list if the guard allows it.
    pub async fn open(&mut self) -> bool {
        if !self.is_open() {
            return false;
        }
        self.papers.load().await;
        self.events.load().await;
        self.conferences.load().await;
        self.faqs.load().await;
        self.subscribers.load().await;
        true
    }
}

impl Drop for AdminConsole {
    fn drop(&mut self) {
        self.listener.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::newsletter::NewsletterSettings;
    use crate::site::SiteStores;
    use crate::upload::{Attachments, FileUpload};
    use chrono::Duration;
    use oerc_auth::{InMemoryIdentityProvider, Role};
    use oerc_mail::OutboxMailer;
    use oerc_store::assets::extract_object_path;
    use oerc_store::UniquePolicy;
    use oerc_types::{EventDraft, PaperDraft, Resource};

    struct Fixture {
        site: Site,
        provider: Arc<InMemoryIdentityProvider>,
        outbox: Arc<OutboxMailer>,
    }

    fn fixture() -> Fixture {
        let provider = Arc::new(InMemoryIdentityProvider::new(Duration::hours(1)));
        provider.register("admin@oerc.ca", "s3cret", [Role::Admin]).unwrap();
        provider.register("member@oerc.ca", "pw", [Role::Member]).unwrap();
        let outbox = Arc::new(OutboxMailer::new());
        let site = Site::assemble(
            SiteStores::in_memory("oerc_assets", "https://site.example", UniquePolicy::Enforce),
            outbox.clone(),
            NewsletterSettings {
                from: "OERC Newsletter <info@oerc.ca>".into(),
                admin_email: Some("admin@oerc.ca".into()),
            },
            provider.clone(),
        );
        Fixture { site, provider, outbox }
    }

    #[tokio::test]
    async fn guard_requires_admin() {
        let f = fixture();
        let mut console = AdminConsole::new(&f.site);
        assert!(!console.open().await);

        assert!(!console.sign_in("admin@oerc.ca", "wrong").await);
        assert!(console.sign_in("member@oerc.ca", "pw").await);
        assert!(!console.is_open());

        assert!(console.sign_out().await);
        assert!(console.sign_in("admin@oerc.ca", "s3cret").await);
        assert!(console.open().await);
    }

    #[tokio::test]
    async fn managers_share_the_session() {
        let f = fixture();
        let mut console = AdminConsole::new(&f.site);
        console.sign_in("admin@oerc.ca", "s3cret").await;

        let event = console
            .events
            .create(
                EventDraft {
                    title: "Spring Symposium".into(),
                    location: "Toronto".into(),
                    description: "Talks".into(),
                    ..Default::default()
                },
                Attachments::default(),
            )
            .await;
        assert!(event.is_some());

        let paper = console
            .papers
            .create(
                PaperDraft {
                    title: "Open Pedagogy".into(),
                    author: "L. Chen".into(),
                    ..Default::default()
                },
                Attachments {
                    pdf: Some(FileUpload::new("p.pdf", &b"%PDF"[..])),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(paper.tags, vec!["Research"]);

        console.sign_out().await;
        let denied = console
            .faqs
            .create(Default::default(), Attachments::default())
            .await;
        assert!(denied.is_none());
    }

    #[tokio::test]
    async fn signing_in_again_ends_the_previous_session() {
        let f = fixture();
        let mut console = AdminConsole::new(&f.site);
        assert!(console.sign_in("admin@oerc.ca", "s3cret").await);
        let first = console.session().token().unwrap();
        assert!(console.sign_in("admin@oerc.ca", "s3cret").await);

        assert_eq!(f.provider.session_count(), 1);
        assert!(f.provider.current_user(&first).await.is_err());
        assert!(console.is_open());
    }

    #[tokio::test]
    async fn replacing_a_pdf_from_two_dashboards_leaves_no_orphan() {
        let f = fixture();
        let mut first = AdminConsole::new(&f.site);
        let mut second = AdminConsole::new(&f.site);
        first.sign_in("admin@oerc.ca", "s3cret").await;
        second.sign_in("admin@oerc.ca", "s3cret").await;

        let paper = first
            .papers
            .create(
                PaperDraft {
                    title: "Open Pedagogy".into(),
                    author: "L. Chen".into(),
                    ..Default::default()
                },
                Attachments {
                    pdf: Some(FileUpload::new("v1.pdf", &b"%PDF-1"[..])),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert!(second.open().await);
        let pdf = |name: &str| Attachments {
            pdf: Some(FileUpload::new(name, &b"%PDF-2"[..])),
            ..Default::default()
        };
        let middle = second
            .papers
            .update(&paper.id, paper.to_draft(), pdf("v2.pdf"))
            .await
            .unwrap();
        let last = first
            .papers
            .update(&paper.id, paper.to_draft(), pdf("v3.pdf"))
            .await
            .unwrap();

        let blobs = f.site.papers.blobs();
        let path = |url: &Option<String>| extract_object_path(url.as_deref(), blobs.bucket()).unwrap();
        assert!(blobs.download(&path(&paper.pdf_url)).await.unwrap().is_none());
        assert!(blobs.download(&path(&middle.pdf_url)).await.unwrap().is_none());
        assert!(blobs.download(&path(&last.pdf_url)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn session_ended_elsewhere_closes_dashboard() {
        let f = fixture();
        let mut console = AdminConsole::new(&f.site);
        console.sign_in("admin@oerc.ca", "s3cret").await;
        let token = console.session().token().unwrap();
        let mut changes = console.session().subscribe();

        f.provider.sign_out(&token).await.unwrap();
        changes.changed().await.unwrap();
        assert!(!console.is_open());
    }

    #[tokio::test]
    async fn subscriber_list_and_mailing() {
        let f = fixture();
        f.site.newsletter.subscribe("a@x.ca").await.unwrap();
        f.site.newsletter.subscribe("b@x.ca").await.unwrap();

        let mut console = AdminConsole::new(&f.site);
        let mailing = BulkEmail { subject: "Hi".into(), html_content: "<p>Hi</p>".into() };
        assert!(console.subscribers.send(&mailing).await.is_none());
        assert!(f.outbox.sent().is_empty());

        console.sign_in("admin@oerc.ca", "s3cret").await;
        assert!(console.open().await);
        assert_eq!(console.subscribers.items().len(), 2);

        let outcome = console.subscribers.send(&mailing).await.unwrap();
        assert_eq!(outcome.recipients, 2);
        assert_eq!(console.subscribers.notice().unwrap().message(), "Email sent to 2 subscribers");

        let id = console.subscribers.items()[0].id.clone();
        assert!(console.subscribers.remove(&id, |_: &str| true).await);
        assert_eq!(console.subscribers.items().len(), 1);
    }
}
