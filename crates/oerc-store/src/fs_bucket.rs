use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::assets::{content_type_for, public_object_url, validate_object_path, StoredBlob};
use crate::error::{StoreError, StoreResult};
use crate::traits::BlobStore;

/// Asset bucket stored as plain files under `{root}/{bucket}/`.
///
/// Content types are derived from the file extension on download.
#[derive(Debug)]
pub struct FsBucket {
    name: String,
    root: PathBuf,
    public_base: String,
}

impl FsBucket {
    pub fn new(
        root: impl AsRef<Path>,
        name: impl Into<String>,
        public_base: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Self {
            root: root.as_ref().join(&name),
            name,
            public_base: public_base.into(),
        }
    }

    fn object_file(&self, path: &str) -> StoreResult<PathBuf> {
        validate_object_path(path)?;
        Ok(self.root.join(path))
    }
}

/// Fill a newly created object file. A failed write removes the partial
/// file so the path stays free.
async fn fill_object<W: AsyncWrite + Unpin>(
    file: &Path,
    mut out: W,
    bytes: &[u8],
) -> StoreResult<()> {
    let written = async {
        out.write_all(bytes).await?;
        out.flush().await
    }
    .await;
    let Err(e) = written else {
        return Ok(());
    };
    drop(out);
    if let Err(cleanup) = fs::remove_file(file).await {
        tracing::warn!(file = %file.display(), error = %cleanup, "could not remove partial object");
    }
    Err(e.into())
}

#[async_trait]
impl BlobStore for FsBucket {
    fn bucket(&self) -> &str {
        &self.name
    }

    async fn upload(&self, path: &str, blob: StoredBlob) -> StoreResult<()> {
        let file = self.object_file(path)?;
        if let Some(parent) = file.parent() {
            fs::create_dir_all(parent).await?;
        }
        let out = match fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&file)
            .await
        {
            Ok(f) => f,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(StoreError::ObjectExists(path.to_string()))
            }
            Err(e) => return Err(e.into()),
        };
        fill_object(&file, out, &blob.bytes).await?;
        tracing::debug!(bucket = %self.name, path, bytes = blob.len(), "stored object");
        Ok(())
    }

    async fn download(&self, path: &str) -> StoreResult<Option<StoredBlob>> {
        let file = self.object_file(path)?;
        match fs::read(&file).await {
            Ok(bytes) => Ok(Some(StoredBlob::new(bytes, content_type_for(path)))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn remove(&self, paths: &[String]) -> StoreResult<usize> {
        let mut removed = 0;
        for path in paths {
            let file = self.object_file(path)?;
            match fs::remove_file(&file).await {
                Ok(()) => removed += 1,
                Err(e) if e.kind() == ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(removed)
    }

    fn public_url(&self, path: &str) -> String {
        public_object_url(&self.public_base, &self.name, path)
    }
}
