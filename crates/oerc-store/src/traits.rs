use async_trait::async_trait;
use oerc_types::{RecordId, Resource};

use crate::assets::StoredBlob;
use crate::error::StoreResult;

/// Table-level access to one resource kind.
///
/// Implementations must satisfy these invariants:
/// - `select_all` returns every row ordered by `R::ORDER`.
/// - `insert` assigns a fresh id (per `R::ID_STRATEGY`) and the creation
///   time, and returns the stored row.
/// - `update` applies only the fields present in the patch and returns the
///   stored row, or `StoreError::NotFound`.
/// - `delete` returns `Ok(false)` for an id that does not exist.
#[async_trait]
pub trait RecordStore<R: Resource>: Send + Sync {
    async fn select_all(&self) -> StoreResult<Vec<R>>;

    /// Returns `Ok(None)` if the row does not exist.
    async fn select_one(&self, id: &RecordId) -> StoreResult<Option<R>>;

    async fn insert(&self, draft: R::Draft) -> StoreResult<R>;

    async fn update(&self, id: &RecordId, patch: &R::Patch) -> StoreResult<R>;

    async fn delete(&self, id: &RecordId) -> StoreResult<bool>;

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.select_all().await?.len())
    }
}

/// Whether a table enforces `Resource::unique_key`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum UniquePolicy {
    #[default]
    Enforce,
    Allow,
}

/// A single bucket of public assets.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Bucket name, also the marker used to recover paths from public URLs.
    fn bucket(&self) -> &str;

    /// Store a new object. Fails with `ObjectExists` if the path is taken.
    async fn upload(&self, path: &str, blob: StoredBlob) -> StoreResult<()>;

    async fn download(&self, path: &str) -> StoreResult<Option<StoredBlob>>;

    /// Remove objects, returning how many existed.
    async fn remove(&self, paths: &[String]) -> StoreResult<usize>;

    fn public_url(&self, path: &str) -> String;
}
