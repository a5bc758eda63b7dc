//! File-backed record table.
//!
//! Each table is a single JSON document `{dir}/{table}.json` holding the
//! stored rows (with stored column names) and the next sequence key. Every
//! mutation rewrites the document through a temporary file that is renamed
//! into place, so a crash leaves either the old or the new table. The write
//! runs on the blocking pool; mutations are serialized by an async lock.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use oerc_types::{columns, RecordId, Resource};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tempfile::NamedTempFile;
use tokio::sync::Mutex;

use crate::error::{StoreError, StoreResult};
use crate::memory::TableState;
use crate::traits::{RecordStore, UniquePolicy};

#[derive(Serialize, Deserialize)]
struct TableDocument {
    next_seq: u64,
    rows: Vec<Value>,
}

pub struct JsonFileTable<R> {
    path: PathBuf,
    state: RwLock<TableState<R>>,
    writer: Mutex<()>,
    policy: UniquePolicy,
}

impl<R: Resource> JsonFileTable<R> {
    /// Open (or create) the table under `dir`.
    pub fn open(dir: impl AsRef<Path>, policy: UniquePolicy) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", R::KIND.table()));
        let state = if path.exists() {
            let doc: TableDocument = serde_json::from_slice(&fs::read(&path)?)?;
            let rows = doc
                .rows
                .into_iter()
                .map(columns::from_row::<R>)
                .collect::<Result<Vec<_>, _>>()?;
            tracing::debug!(table = R::KIND.table(), rows = rows.len(), "loaded table");
            TableState::from_rows(rows, doc.next_seq)
        } else {
            TableState::new()
        };
        Ok(Self {
            path,
            state: RwLock::new(state),
            writer: Mutex::new(()),
            policy,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
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

    fn encode(state: &TableState<R>) -> StoreResult<Vec<u8>> {
        let rows = state
            .rows
            .iter()
            .map(columns::to_row)
            .collect::<Result<Vec<_>, _>>()?;
        let doc = TableDocument {
            next_seq: state.next_seq,
            rows,
        };
        Ok(serde_json::to_vec_pretty(&doc)?)
    }

    // Apply a mutation to a scratch copy, persist it, then publish it.
    async fn mutate<T: Send>(
        &self,
        op: impl FnOnce(&mut TableState<R>) -> StoreResult<T> + Send,
    ) -> StoreResult<T> {
        let _writer = self.writer.lock().await;
        let (scratch, out) = {
            let guard = self.read()?;
            let mut scratch = TableState::from_rows(guard.rows.clone(), guard.next_seq);
            let out = op(&mut scratch)?;
            (scratch, out)
        };
        let bytes = Self::encode(&scratch)?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || write_atomically(&path, &bytes))
            .await
            .map_err(|e| StoreError::Unavailable(format!("table writer failed: {e}")))??;
        *self.write()? = scratch;
        Ok(out)
    }
}

fn write_atomically(path: &Path, bytes: &[u8]) -> StoreResult<()> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl<R: Resource> RecordStore<R> for JsonFileTable<R> {
    async fn select_all(&self) -> StoreResult<Vec<R>> {
        Ok(self.read()?.select_all())
    }

    async fn select_one(&self, id: &RecordId) -> StoreResult<Option<R>> {
        Ok(self.read()?.select_one(id))
    }

    async fn insert(&self, draft: R::Draft) -> StoreResult<R> {
        let policy = self.policy;
        self.mutate(|state| state.insert(draft, policy)).await
    }

    async fn update(&self, id: &RecordId, patch: &R::Patch) -> StoreResult<R> {
        let policy = self.policy;
        self.mutate(|state| state.update(id, patch, policy)).await
    }

    async fn delete(&self, id: &RecordId) -> StoreResult<bool> {
        if self.read()?.select_one(id).is_none() {
            return Ok(false);
        }
        self.mutate(|state| Ok(state.delete(id))).await
    }
}

impl<R: Resource> std::fmt::Debug for JsonFileTable<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileTable")
            .field("path", &self.path)
            .finish()
    }
}
