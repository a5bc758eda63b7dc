use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use oerc_types::{IdStrategy, RecordId, Resource};

use crate::assets::{public_object_url, validate_object_path, StoredBlob};
use crate::error::{StoreError, StoreResult};
use crate::traits::{BlobStore, RecordStore, UniquePolicy};

/// Rows of one table plus its id and clock bookkeeping.
///
/// Shared by the in-memory and file-backed tables.
#[derive(Debug)]
pub(crate) struct TableState<R> {
    pub(crate) rows: Vec<R>,
    pub(crate) next_seq: u64,
    last_created: Option<DateTime<Utc>>,
}

impl<R: Resource> TableState<R> {
    pub(crate) fn new() -> Self {
        Self::from_rows(Vec::new(), 1)
    }

    pub(crate) fn from_rows(rows: Vec<R>, next_seq: u64) -> Self {
        let last_created = rows.iter().map(|r| r.created_at()).max();
        let max_seq = rows.iter().filter_map(|r| r.id().as_seq()).max().unwrap_or(0);
        Self {
            rows,
            next_seq: next_seq.max(max_seq + 1),
            last_created,
        }
    }

    fn next_id(&mut self) -> RecordId {
        match R::ID_STRATEGY {
            IdStrategy::Uuid => RecordId::new_uuid(),
            IdStrategy::Sequence => {
                let id = RecordId::from_seq(self.next_seq);
                self.next_seq += 1;
                id
            }
        }
    }

    // Creation times are strictly increasing so creation-ordered listings
    // are stable even for rows inserted within the same clock tick.
    fn next_timestamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let ts = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(ts);
        ts
    }

    fn check_unique(&self, candidate: &R, policy: UniquePolicy) -> StoreResult<()> {
        if policy == UniquePolicy::Allow {
            return Ok(());
        }
        let Some(key) = candidate.unique_key() else {
            return Ok(());
        };
        let taken = self
            .rows
            .iter()
            .any(|r| r.id() != candidate.id() && r.unique_key().as_deref() == Some(key.as_str()));
        if taken {
            return Err(StoreError::UniqueViolation {
                table: R::KIND.table(),
                key,
            });
        }
        Ok(())
    }

    pub(crate) fn select_all(&self) -> Vec<R> {
        let mut rows = self.rows.clone();
        R::ORDER.sort(&mut rows);
        rows
    }

    pub(crate) fn select_one(&self, id: &RecordId) -> Option<R> {
        self.rows.iter().find(|r| r.id() == id).cloned()
    }

    pub(crate) fn insert(&mut self, draft: R::Draft, policy: UniquePolicy) -> StoreResult<R> {
        let seq_before = self.next_seq;
        let last_before = self.last_created;
        let id = self.next_id();
        let created_at = self.next_timestamp();
        let row = R::from_draft(id, created_at, draft);
        if let Err(e) = self.check_unique(&row, policy) {
            self.next_seq = seq_before;
            self.last_created = last_before;
            return Err(e);
        }
        self.rows.push(row.clone());
        Ok(row)
    }

    pub(crate) fn update(
        &mut self,
        id: &RecordId,
        patch: &R::Patch,
        policy: UniquePolicy,
    ) -> StoreResult<R> {
        let index = self
            .rows
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                table: R::KIND.table(),
                id: id.clone(),
            })?;
        let mut updated = self.rows[index].clone();
        updated.apply(patch);
        self.check_unique(&updated, policy)?;
        self.rows[index] = updated.clone();
        Ok(updated)
    }

    pub(crate) fn delete(&mut self, id: &RecordId) -> bool {
        let before = self.rows.len();
        self.rows.retain(|r| r.id() != id);
        self.rows.len() != before
    }
}

/// In-memory table for tests and ephemeral servers.
///
/// Rows live in a `Vec` behind a `RwLock` and are lost when the table is
/// dropped.
pub struct InMemoryTable<R> {
    state: RwLock<TableState<R>>,
    policy: UniquePolicy,
}

impl<R: Resource> InMemoryTable<R> {
    pub fn new() -> Self {
        Self::with_policy(UniquePolicy::default())
    }

    pub fn with_policy(policy: UniquePolicy) -> Self {
        Self {
            state: RwLock::new(TableState::new()),
            policy,
        }
    }

    /// Number of rows currently stored.
    pub fn len(&self) -> usize {
        self.read().map(|s| s.rows.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, TableState<R>>> {
        self.state
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, TableState<R>>> {
        self.state
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))
    }
}

impl<R: Resource> Default for InMemoryTable<R> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<R: Resource> RecordStore<R> for InMemoryTable<R> {
    async fn select_all(&self) -> StoreResult<Vec<R>> {
        Ok(self.read()?.select_all())
    }

    async fn select_one(&self, id: &RecordId) -> StoreResult<Option<R>> {
        Ok(self.read()?.select_one(id))
    }

    async fn insert(&self, draft: R::Draft) -> StoreResult<R> {
        self.write()?.insert(draft, self.policy)
    }

    async fn update(&self, id: &RecordId, patch: &R::Patch) -> StoreResult<R> {
        self.write()?.update(id, patch, self.policy)
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        Ok(self.write()?.delete(id))
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.read()?.rows.len())
    }
}

impl<R: Resource> std::fmt::Debug for InMemoryTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryTable")
            .field("table", &R::KIND.table())
            .field("row_count", &self.len())
            .finish()
    }
}

/// In-memory asset bucket.
pub struct InMemoryBucket {
    name: String,
    public_base: String,
    objects: RwLock<HashMap<String, StoredBlob>>,
}

impl InMemoryBucket {
    pub fn new(name: impl Into<String>, public_base: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_base: public_base.into(),
            objects: RwLock::new(HashMap::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.objects.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, path: &str) -> bool {
        self.objects
            .read()
            .map(|m| m.contains_key(path))
            .unwrap_or(false)
    }

    /// Sorted list of stored object paths.
    pub fn paths(&self) -> Vec<String> {
        let mut paths: Vec<String> = self
            .objects
            .read()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        paths.sort();
        paths
    }
}

#[async_trait]
impl BlobStore for InMemoryBucket {
    fn bucket(&self) -> &str {
        &self.name
    }

    async fn upload(&self, path: &str, blob: StoredBlob) -> StoreResult<()> {
        validate_object_path(path)?;
        let mut map = self
            .objects
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        if map.contains_key(path) {
            return Err(StoreError::ObjectExists(path.to_string()));
        }
        map.insert(path.to_string(), blob);
        Ok(())
    }

    async fn download(&self, path: &str) -> StoreResult<Option<StoredBlob>> {
        let map = self
            .objects
            .read()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(map.get(path).cloned())
    }

    async fn remove(&self, paths: &[String]) -> StoreResult<usize> {
        let mut map = self
            .objects
            .write()
            .map_err(|e| StoreError::LockPoisoned(e.to_string()))?;
        Ok(paths.iter().filter(|p| map.remove(p.as_str()).is_some()).count())
    }

    fn public_url(&self, path: &str) -> String {
        public_object_url(&self.public_base, &self.name, path)
    }
}

impl std::fmt::Debug for InMemoryBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryBucket")
            .field("bucket", &self.name)
            .field("object_count", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use oerc_types::{
        ConferenceDraft, Event, EventDraft, EventPatch, GlobalConference, NewsletterSubscriber,
        SubscriberDraft,
    };

    fn event(title: &str, day: u32) -> EventDraft {
        EventDraft {
            title: title.into(),
            date: NaiveDate::from_ymd_opt(2025, 5, day),
            location: "Toronto".into(),
            description: "...".into(),
        }
    }

    // -----------------------------------------------------------------------
    // Core CRUD
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn insert_assigns_id_and_returns_row() {
        let table = InMemoryTable::<Event>::new();
        let row = table.insert(event("Spring Symposium", 1)).await.unwrap();
        assert_eq!(row.title, "Spring Symposium");
        assert_eq!(table.len(), 1);
        assert_eq!(table.select_one(&row.id).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn select_all_orders_by_date() {
        let table = InMemoryTable::<Event>::new();
        table.insert(event("late", 20)).await.unwrap();
        table.insert(event("early", 2)).await.unwrap();
        table.insert(event("middle", 10)).await.unwrap();
        let titles: Vec<_> = table
            .select_all()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.title)
            .collect();
        assert_eq!(titles, vec!["early", "middle", "late"]);
    }

    #[tokio::test]
    async fn update_touches_only_patched_fields() {
        let table = InMemoryTable::<Event>::new();
        let row = table.insert(event("Workshop", 3)).await.unwrap();
        let patch = EventPatch { location: Some("Ottawa".into()), ..Default::default() };
        let updated = table.update(&row.id, &patch).await.unwrap();
        assert_eq!(updated.location, "Ottawa");
        assert_eq!(updated.title, "Workshop");
        assert_eq!(updated.id, row.id);
        assert_eq!(updated.created_at, row.created_at);
    }

    #[tokio::test]
    async fn update_missing_row_is_not_found() {
        let table = InMemoryTable::<Event>::new();
        let err = table
            .update(&RecordId::from("nope"), &EventPatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { table: "events", .. }));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let table = InMemoryTable::<Event>::new();
        let row = table.insert(event("Gone", 1)).await.unwrap();
        assert!(table.delete(&row.id).await.unwrap());
        assert!(!table.delete(&row.id).await.unwrap());
        assert!(table.is_empty());
    }

    // -----------------------------------------------------------------------
    // Ids, clock, and constraints
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn sequence_ids_count_up() {
        let table = InMemoryTable::<GlobalConference>::new();
        let draft = ConferenceDraft {
            title: "C".into(),
            location: "L".into(),
            description: "D".into(),
            ..Default::default()
        };
        let a = table.insert(draft.clone()).await.unwrap();
        let b = table.insert(draft).await.unwrap();
        assert_eq!(a.id.as_str(), "1");
        assert_eq!(b.id.as_str(), "2");
    }

    #[tokio::test]
    async fn creation_times_strictly_increase() {
        let table = InMemoryTable::<Event>::new();
        let mut last = None;
        for i in 0..50 {
            let row = table.insert(event(&i.to_string(), 1)).await.unwrap();
            if let Some(prev) = last {
                assert!(row.created_at > prev);
            }
            last = Some(row.created_at);
        }
    }

    #[tokio::test]
    async fn unique_email_enforced_by_default() {
        let table = InMemoryTable::<NewsletterSubscriber>::new();
        table.insert(SubscriberDraft { email: "a@oerc.ca".into() }).await.unwrap();
        let err = table
            .insert(SubscriberDraft { email: "A@OERC.ca".into() })
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::UniqueViolation { .. }));
        assert_eq!(table.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn duplicates_allowed_when_configured() {
        let table = InMemoryTable::<NewsletterSubscriber>::with_policy(UniquePolicy::Allow);
        table.insert(SubscriberDraft { email: "a@oerc.ca".into() }).await.unwrap();
        table.insert(SubscriberDraft { email: "a@oerc.ca".into() }).await.unwrap();
        assert_eq!(table.count().await.unwrap(), 2);
    }

    // -----------------------------------------------------------------------
    // Bucket
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn bucket_upload_download_remove() {
        let bucket = InMemoryBucket::new("oerc_assets", "http://localhost:8080");
        let blob = StoredBlob::new(b"%PDF-1.7".to_vec(), "application/pdf");
        bucket.upload("pdfs/a.pdf", blob.clone()).await.unwrap();
        assert_eq!(bucket.download("pdfs/a.pdf").await.unwrap(), Some(blob));
        assert_eq!(
            bucket.public_url("pdfs/a.pdf"),
            "http://localhost:8080/storage/v1/object/public/oerc_assets/pdfs/a.pdf"
        );
        let removed = bucket
            .remove(&["pdfs/a.pdf".to_string(), "pdfs/missing.pdf".to_string()])
            .await
            .unwrap();
        assert_eq!(removed, 1);
        assert!(bucket.is_empty());
    }

    #[tokio::test]
    async fn bucket_refuses_overwrite_and_bad_paths() {
        let bucket = InMemoryBucket::new("oerc_assets", "http://localhost");
        bucket.upload("images/a.png", StoredBlob::new(vec![1], "image/png")).await.unwrap();
        assert!(matches!(
            bucket.upload("images/a.png", StoredBlob::new(vec![2], "image/png")).await,
            Err(StoreError::ObjectExists(_))
        ));
        assert!(matches!(
            bucket.upload("../x", StoredBlob::new(vec![2], "image/png")).await,
            Err(StoreError::InvalidPath(_))
        ));
    }

    #[test]
    fn debug_format() {
        let table = InMemoryTable::<Event>::new();
        let debug = format!("{table:?}");
        assert!(debug.contains("events"));
        assert!(debug.contains("row_count"));
    }
}
