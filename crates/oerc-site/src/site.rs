use std::sync::Arc;

use oerc_auth::IdentityProvider;
use oerc_mail::Mailer;
use oerc_store::{BlobStore, InMemoryBucket, InMemoryTable, RecordStore, UniquePolicy};
use oerc_types::{Event, Faq, GlobalConference, NewsletterSubscriber, ResearchPaper};

use crate::newsletter::{NewsletterService, NewsletterSettings};
use crate::paper::PaperLibrary;
use crate::repository::{Repository, TableRepository};

/// Every backend service the site runs on.
#[derive(Clone)]
pub struct Site {
    pub papers: Arc<PaperLibrary>,
    pub events: Arc<dyn Repository<Event>>,
    pub conferences: Arc<dyn Repository<GlobalConference>>,
    pub faqs: Arc<dyn Repository<Faq>>,
    pub newsletter: Arc<NewsletterService>,
    pub identity: Arc<dyn IdentityProvider>,
}

/// Tables and bucket a [`Site`] is assembled from.
pub struct SiteStores {
    pub papers: Arc<dyn RecordStore<ResearchPaper>>,
    pub events: Arc<dyn RecordStore<Event>>,
    pub conferences: Arc<dyn RecordStore<GlobalConference>>,
    pub faqs: Arc<dyn RecordStore<Faq>>,
    pub subscribers: Arc<dyn RecordStore<NewsletterSubscriber>>,
    pub assets: Arc<dyn BlobStore>,
}

impl SiteStores {
    pub fn in_memory(bucket: &str, public_base: &str, subscribers: UniquePolicy) -> Self {
        Self {
            papers: Arc::new(InMemoryTable::<ResearchPaper>::new()),
            events: Arc::new(InMemoryTable::<Event>::new()),
            conferences: Arc::new(InMemoryTable::<GlobalConference>::new()),
            faqs: Arc::new(InMemoryTable::<Faq>::new()),
            subscribers: Arc::new(InMemoryTable::<NewsletterSubscriber>::with_policy(subscribers)),
            assets: Arc::new(InMemoryBucket::new(bucket, public_base)),
        }
    }
}

impl Site {
    pub fn assemble(
        stores: SiteStores,
        mailer: Arc<dyn Mailer>,
        newsletter: NewsletterSettings,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        Self {
            papers: Arc::new(PaperLibrary::new(stores.papers, stores.assets)),
            events: Arc::new(TableRepository::new(stores.events)),
            conferences: Arc::new(TableRepository::new(stores.conferences)),
            faqs: Arc::new(TableRepository::new(stores.faqs)),
            newsletter: Arc::new(NewsletterService::new(stores.subscribers, mailer, newsletter)),
            identity,
        }
    }
}

impl std::fmt::Debug for Site {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Site")
            .field("papers", &self.papers)
            .field("newsletter", &self.newsletter)
            .finish_non_exhaustive()
    }
}
