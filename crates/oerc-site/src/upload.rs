use bytes::Bytes;
use oerc_store::assets::content_type_for;
use oerc_store::{AssetKind, StoredBlob};

/// A file chosen in a form, not yet stored.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

impl FileUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }

    /// Falls back to a type derived from the file name.
    pub fn into_blob(self) -> StoredBlob {
        let content_type = self
            .content_type
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| content_type_for(&self.file_name).to_string());
        StoredBlob::new(self.bytes, content_type)
    }
}

/// The file slots of a form. An empty slot means "keep what is stored".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Attachments {
    pub pdf: Option<FileUpload>,
    pub image: Option<FileUpload>,
}

impl Attachments {
    pub fn is_empty(&self) -> bool {
        self.pdf.is_none() && self.image.is_none()
    }

    pub fn take(&mut self, kind: AssetKind) -> Option<FileUpload> {
        match kind {
            AssetKind::Pdf => self.pdf.take(),
            AssetKind::Image => self.image.take(),
        }
    }
}
