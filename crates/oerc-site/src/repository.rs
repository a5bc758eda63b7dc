use std::sync::Arc;

use async_trait::async_trait;
use oerc_store::RecordStore;
use oerc_types::{RecordId, Resource};

use crate::error::{SiteError, SiteResult};
use crate::upload::Attachments;

/// Validated data access for one resource kind.
///
/// Drafts and patches are validated before any remote call is made.
/// `update` and `remove` take the current row so implementations that own
/// side data (such as stored files) can see what is being replaced.
#[async_trait]
pub trait Repository<R: Resource>: Send + Sync {
    async fn list(&self) -> SiteResult<Vec<R>>;

    async fn get(&self, id: &RecordId) -> SiteResult<Option<R>>;

    async fn create(&self, draft: R::Draft, files: Attachments) -> SiteResult<R>;

    async fn update(&self, current: &R, patch: R::Patch, files: Attachments) -> SiteResult<R>;

    /// Returns `Ok(false)` if the row was already gone.
    async fn remove(&self, current: &R) -> SiteResult<bool>;

    /// Look up a row, failing with `NotFound` if it does not exist.
    async fn fetch(&self, id: &RecordId) -> SiteResult<R> {
        self.get(id).await?.ok_or_else(|| SiteError::NotFound {
            kind: R::KIND.label(),
            id: id.clone(),
        })
    }
}

/// Repository over a bare table, for resources without files.
pub struct TableRepository<R: Resource> {
    store: Arc<dyn RecordStore<R>>,
}

impl<R: Resource> TableRepository<R> {
    pub fn new(store: Arc<dyn RecordStore<R>>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl<R: Resource> Repository<R> for TableRepository<R> {
    async fn list(&self) -> SiteResult<Vec<R>> {
        Ok(self.store.select_all().await?)
    }

    async fn get(&self, id: &RecordId) -> SiteResult<Option<R>> {
        Ok(self.store.select_one(id).await?)
    }

    async fn create(&self, draft: R::Draft, files: Attachments) -> SiteResult<R> {
        if !files.is_empty() {
            return Err(SiteError::UnexpectedAttachment(R::KIND.label()));
        }
        R::validate_draft(&draft)?;
        let row = self.store.insert(draft).await?;
        tracing::info!(table = %R::KIND, id = %row.id(), "row created");
        Ok(row)
    }

    async fn update(&self, current: &R, patch: R::Patch, files: Attachments) -> SiteResult<R> {
        if !files.is_empty() {
            return Err(SiteError::UnexpectedAttachment(R::KIND.label()));
        }
        R::validate_patch(&patch)?;
        let row = self.store.update(current.id(), &patch).await?;
        tracing::info!(table = %R::KIND, id = %row.id(), "row updated");
        Ok(row)
    }

    async fn remove(&self, current: &R) -> SiteResult<bool> {
        let removed = self.store.delete(current.id()).await?;
        tracing::info!(table = %R::KIND, id = %current.id(), removed, "row deleted");
        Ok(removed)
    }
}

impl<R: Resource> std::fmt::Debug for TableRepository<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableRepository")
            .field("table", &R::KIND.table())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upload::FileUpload;
    use oerc_store::InMemoryTable;
    use oerc_types::{Faq, FaqDraft, FaqPatch, ValidationError};

    fn repo() -> TableRepository<Faq> {
        TableRepository::new(Arc::new(InMemoryTable::<Faq>::new()))
    }

    fn draft(q: &str) -> FaqDraft {
        FaqDraft { question: q.into(), answer: "Yes.".into() }
    }

    #[tokio::test]
    async fn invalid_draft_never_reaches_the_store() {
        let r = repo();
        let err = r.create(draft("  "), Attachments::default()).await.unwrap_err();
        assert!(matches!(err, SiteError::Validation(ValidationError::MissingField("question"))));
        assert!(r.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn files_are_refused() {
        let r = repo();
        let files = Attachments {
            pdf: Some(FileUpload::new("a.pdf", &b"%PDF"[..])),
            ..Default::default()
        };
        let err = r.create(draft("Q?"), files).await.unwrap_err();
        assert!(matches!(err, SiteError::UnexpectedAttachment("FAQ")));
    }

    #[tokio::test]
    async fn fetch_reports_missing_rows() {
        let r = repo();
        let row = r.create(draft("Q?"), Attachments::default()).await.unwrap();
        assert_eq!(r.fetch(&row.id).await.unwrap(), row);
        assert!(r.remove(&row).await.unwrap());
        assert!(!r.remove(&row).await.unwrap());
        assert!(matches!(r.fetch(&row.id).await, Err(SiteError::NotFound { .. })));
    }

    #[tokio::test]
    async fn update_sends_only_the_patch() {
        let r = repo();
        let row = r.create(draft("Q?"), Attachments::default()).await.unwrap();
        let patch = FaqPatch { answer: Some("No.".into()), ..Default::default() };
        let updated = r.update(&row, patch, Attachments::default()).await.unwrap();
        assert_eq!(updated.question, "Q?");
        assert_eq!(updated.answer, "No.");
    }
}
