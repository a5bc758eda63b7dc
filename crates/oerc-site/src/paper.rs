//! Paper storage: metadata rows plus PDF and cover-image objects.
//!
//! Each paper has two file slots. A new file is always stored under a fresh
//! random path before anything refers to it, and an old file is only removed
//! once the row no longer points at it:
//!
//! 1. upload the new object(s)
//! 2. write the row with the new public URL(s)
//! 3. remove the replaced object(s), best-effort
//!
//! If step 2 fails the freshly uploaded objects are removed again and the
//! stored paper is left exactly as it was.

use std::sync::Arc;

use async_trait::async_trait;
use oerc_store::assets::{extract_object_path, object_path};
use oerc_store::{AssetKind, BlobStore, RecordStore};
use oerc_types::{PaperDraft, PaperPatch, RecordId, ResearchPaper, Resource};
use rand::Rng;

use crate::error::{SiteError, SiteResult};
use crate::repository::Repository;
use crate::upload::{Attachments, FileUpload};

/// Cover used when a paper is uploaded without an image.
pub fn placeholder_image() -> String {
    let seed = rand::thread_rng().gen_range(0..1000);
    format!("https://picsum.photos/seed/{seed}/800/600")
}

/// Metadata table and asset bucket for research papers.
pub struct PaperLibrary {
    table: Arc<dyn RecordStore<ResearchPaper>>,
    blobs: Arc<dyn BlobStore>,
}

impl PaperLibrary {
    pub fn new(table: Arc<dyn RecordStore<ResearchPaper>>, blobs: Arc<dyn BlobStore>) -> Self {
        Self { table, blobs }
    }

    pub fn blobs(&self) -> &Arc<dyn BlobStore> {
        &self.blobs
    }

    /// Store one file under a fresh path and return `(path, public_url)`.
    async fn store_file(&self, kind: AssetKind, file: FileUpload) -> SiteResult<(String, String)> {
        let path = object_path(kind, &file.file_name);
        let size = file.bytes.len();
        self.blobs.upload(&path, file.into_blob()).await?;
        tracing::debug!(%path, size, kind = kind.label(), "stored paper asset");
        let url = self.blobs.public_url(&path);
        Ok((path, url))
    }

    /// Upload every chosen file. On failure, objects already stored by this
    /// call are removed before returning the error.
    async fn store_files(&self, mut files: Attachments) -> SiteResult<StoredFiles> {
        let mut stored = StoredFiles::default();
        for kind in [AssetKind::Pdf, AssetKind::Image] {
            let Some(file) = files.take(kind) else {
                continue;
            };
            match self.store_file(kind, file).await {
                Ok((path, url)) => stored.push(kind, path, url),
                Err(e) => {
                    self.discard(&stored.paths).await;
                    return Err(e);
                }
            }
        }
        Ok(stored)
    }

    /// Best-effort removal. Failures are logged and otherwise ignored.
    async fn discard(&self, paths: &[String]) {
        if paths.is_empty() {
            return;
        }
        match self.blobs.remove(paths).await {
            Ok(removed) => tracing::debug!(removed, "removed paper assets"),
            Err(e) => tracing::warn!(error = %e, ?paths, "failed to remove paper assets"),
        }
    }

    /// The row as the table has it now, so replaced files are resolved from
    /// stored URLs rather than a caller's possibly stale copy.
    async fn stored_row(&self, current: &ResearchPaper) -> SiteResult<ResearchPaper> {
        Ok(self
            .table
            .select_one(&current.id)
            .await?
            .unwrap_or_else(|| current.clone()))
    }

    /// Object paths the paper's URLs point at inside this library's bucket.
    fn owned_paths(&self, paper: &ResearchPaper, kinds: &[AssetKind]) -> Vec<String> {
        let bucket = self.blobs.bucket();
        kinds
            .iter()
            .filter_map(|kind| {
                let url = match kind {
                    AssetKind::Pdf => paper.pdf_url.as_deref(),
                    AssetKind::Image => paper.image_url.as_deref(),
                };
                extract_object_path(url, bucket)
            })
            .collect()
    }
}

#[derive(Debug, Default)]
struct StoredFiles {
    paths: Vec<String>,
    pdf_url: Option<String>,
    image_url: Option<String>,
    kinds: Vec<AssetKind>,
}

impl StoredFiles {
    fn push(&mut self, kind: AssetKind, path: String, url: String) {
        match kind {
            AssetKind::Pdf => self.pdf_url = Some(url),
            AssetKind::Image => self.image_url = Some(url),
        }
        self.paths.push(path);
        self.kinds.push(kind);
    }
}

#[async_trait]
impl Repository<ResearchPaper> for PaperLibrary {
    async fn list(&self) -> SiteResult<Vec<ResearchPaper>> {
        Ok(self.table.select_all().await?)
    }

    async fn get(&self, id: &RecordId) -> SiteResult<Option<ResearchPaper>> {
        Ok(self.table.select_one(id).await?)
    }

    /// A PDF is required; without an image a placeholder cover is used.
    async fn create(&self, mut draft: PaperDraft, files: Attachments) -> SiteResult<ResearchPaper> {
        ResearchPaper::validate_draft(&draft)?;
        if files.pdf.is_none() {
            return Err(SiteError::MissingFile(AssetKind::Pdf.label()));
        }
        let stored = self.store_files(files).await?;
        draft.pdf_url = stored.pdf_url.clone();
        draft.image_url = stored.image_url.clone().or_else(|| Some(placeholder_image()));

        match self.table.insert(draft).await {
            Ok(paper) => {
                tracing::info!(id = %paper.id, title = %paper.title, "paper uploaded");
                Ok(paper)
            }
            Err(e) => {
                tracing::error!(error = %e, "paper insert failed, removing uploaded files");
                self.discard(&stored.paths).await;
                Err(e.into())
            }
        }
    }

    /// Empty file slots keep the stored URL. Chosen files replace it.
    async fn update(
        &self,
        current: &ResearchPaper,
        mut patch: PaperPatch,
        files: Attachments,
    ) -> SiteResult<ResearchPaper> {
        ResearchPaper::validate_patch(&patch)?;
        // File URLs only change through uploads.
        patch.pdf_url = None;
        patch.image_url = None;

        let previous = if files.is_empty() {
            current.clone()
        } else {
            self.stored_row(current).await?
        };
        let stored = self.store_files(files).await?;
        patch.pdf_url = stored.pdf_url.clone();
        patch.image_url = stored.image_url.clone();

        let paper = match self.table.update(&current.id, &patch).await {
            Ok(paper) => paper,
            Err(e) => {
                tracing::error!(id = %current.id, error = %e, "paper update failed, keeping previous files");
                self.discard(&stored.paths).await;
                return Err(e.into());
            }
        };

        let replaced = self.owned_paths(&previous, &stored.kinds);
        self.discard(&replaced).await;
        tracing::info!(id = %paper.id, replaced = replaced.len(), "paper updated");
        Ok(paper)
    }

    /// Deletes the row, then its files (best-effort).
    async fn remove(&self, current: &ResearchPaper) -> SiteResult<bool> {
        let previous = self.stored_row(current).await?;
        let removed = self.table.delete(&current.id).await?;
        let paths = self.owned_paths(&previous, &[AssetKind::Pdf, AssetKind::Image]);
        self.discard(&paths).await;
        tracing::info!(id = %current.id, removed, files = paths.len(), "paper deleted");
        Ok(removed)
    }
}

impl std::fmt::Debug for PaperLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PaperLibrary")
            .field("bucket", &self.blobs.bucket())
            .finish_non_exhaustive()
    }
}
