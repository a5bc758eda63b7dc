//! Storage collaborators for the OERC site.
//!
//! Two independent concerns live here:
//!
//! - **Record tables** ([`RecordStore`]): one table per resource kind with
//!   ordered select, select-by-id, insert, partial update, and delete. The
//!   table assigns ids and creation timestamps.
//! - **Asset buckets** ([`BlobStore`]): one bucket holding paper PDFs and
//!   cover images under the `pdfs/` and `images/` prefixes, addressed by
//!   random object paths and exposed through public URLs.
//!
//! # Backends
//!
//! - [`InMemoryTable`] / [`InMemoryBucket`]: for tests and ephemeral servers
//! - [`JsonFileTable`]: one JSON document per table, replaced atomically
//! - [`FsBucket`]: objects stored as files under a root directory
//!
//! # Rules
//!
//! 1. Ids are assigned by the table and never change.
//! 2. Updates touch only the fields present in the patch.
//! 3. Uploads never overwrite: an existing object path is an error.
//! 4. All I/O errors are propagated; callers decide what is best-effort.

pub mod assets;
pub mod error;
pub mod file;
pub mod fs_bucket;
pub mod memory;
pub mod traits;

pub use assets::{AssetKind, StoredBlob};
pub use error::{StoreError, StoreResult};
pub use file::JsonFileTable;
pub use fs_bucket::FsBucket;
pub use memory::{InMemoryBucket, InMemoryTable};
pub use traits::{BlobStore, RecordStore, UniquePolicy};
