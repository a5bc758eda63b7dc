//! Object path and public URL conventions for the asset bucket.

use bytes::Bytes;
use rand::Rng;

use crate::error::{StoreError, StoreResult};

const TOKEN_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
const TOKEN_LEN: usize = 11;

/// Which slot of a paper an asset fills.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Pdf,
    Image,
}

impl AssetKind {
    /// Path prefix inside the bucket.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::Pdf => "pdfs",
            Self::Image => "images",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Image => "image",
        }
    }
}

/// Object bytes plus the content type served back to browsers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Bytes,
    pub content_type: String,
}

impl StoredBlob {
    pub fn new(bytes: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            bytes: bytes.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Lowercased extension of an uploaded file name, if it has one.
pub fn file_extension(file_name: &str) -> Option<String> {
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Fresh random object path under the kind's prefix, keeping the extension.
///
/// Paths are random tokens; collisions are not checked for.
pub fn object_path(kind: AssetKind, file_name: &str) -> String {
    let mut rng = rand::thread_rng();
    let token: String = (0..TOKEN_LEN)
        .map(|_| TOKEN_ALPHABET[rng.gen_range(0..TOKEN_ALPHABET.len())] as char)
        .collect();
    match file_extension(file_name) {
        Some(ext) => format!("{}/{token}.{ext}", kind.prefix()),
        None => format!("{}/{token}", kind.prefix()),
    }
}

/// Public URL of an object: `{base}/storage/v1/object/public/{bucket}/{path}`.
pub fn public_object_url(base: &str, bucket: &str, path: &str) -> String {
    format!(
        "{}/storage/v1/object/public/{bucket}/{path}",
        base.trim_end_matches('/')
    )
}

/// Recover the object path from a public URL by splitting on `/{bucket}/`.
///
/// Returns `None` for absent URLs and URLs outside the bucket (for example
/// the placeholder images used when a paper has no cover).
pub fn extract_object_path(url: Option<&str>, bucket: &str) -> Option<String> {
    let url = url?;
    let marker = format!("/{bucket}/");
    let (_, path) = url.split_once(&marker)?;
    let path = path.split(['?', '#']).next().unwrap_or_default();
    validate_object_path(path).ok()?;
    Some(path.to_string())
}

/// Reject empty, absolute, or parent-relative paths.
pub fn validate_object_path(path: &str) -> StoreResult<()> {
    let bad = path.is_empty()
        || path.starts_with('/')
        || path.contains('\\')
        || path
            .split('/')
            .any(|seg| seg.is_empty() || seg == "." || seg == "..");
    if bad {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Content type from a path's extension.
pub fn content_type_for(path: &str) -> &'static str {
    match file_extension(path).as_deref() {
        Some("pdf") => "application/pdf",
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_keep_extension_under_prefix() {
        let p = object_path(AssetKind::Pdf, "Final Report.PDF");
        assert!(p.starts_with("pdfs/"));
        assert!(p.ends_with(".pdf"));
        assert_eq!(p.len(), "pdfs/".len() + TOKEN_LEN + ".pdf".len());

        let i = object_path(AssetKind::Image, "cover");
        assert!(i.starts_with("images/"));
        assert!(!i.contains('.'));
    }

    #[test]
    fn paths_are_random() {
        let a = object_path(AssetKind::Image, "a.png");
        let b = object_path(AssetKind::Image, "a.png");
        assert_ne!(a, b);
    }

    #[test]
    fn extension_rules() {
        assert_eq!(file_extension("x.tar.gz").as_deref(), Some("gz"));
        assert_eq!(file_extension(".hidden"), None);
        assert_eq!(file_extension("noext"), None);
        assert_eq!(file_extension("bad.p/f"), None);
    }

    #[test]
    fn url_round_trip() {
        let url = public_object_url("https://site.example/", "oerc_assets", "pdfs/abc.pdf");
        assert_eq!(
            url,
            "https://site.example/storage/v1/object/public/oerc_assets/pdfs/abc.pdf"
        );
        assert_eq!(
            extract_object_path(Some(&url), "oerc_assets").as_deref(),
            Some("pdfs/abc.pdf")
        );
    }

    #[test]
    fn foreign_urls_have_no_path() {
        assert_eq!(
            extract_object_path(Some("https://picsum.photos/seed/12/800/600"), "oerc_assets"),
            None
        );
        assert_eq!(extract_object_path(None, "oerc_assets"), None);
        assert_eq!(
            extract_object_path(Some("https://x/oerc_assets/../etc/passwd"), "oerc_assets"),
            None
        );
    }

    #[test]
    fn query_strings_are_dropped() {
        assert_eq!(
            extract_object_path(Some("https://x/oerc_assets/images/a.png?v=2"), "oerc_assets")
                .as_deref(),
            Some("images/a.png")
        );
    }

    #[test]
    fn content_types() {
        assert_eq!(content_type_for("pdfs/a.pdf"), "application/pdf");
        assert_eq!(content_type_for("images/a.JPG"), "image/jpeg");
        assert_eq!(content_type_for("images/a"), "application/octet-stream");
    }
}
