//! Candidate index for previously seen files.
//!
//! The index is a durable, append-mostly collection of [`FileRecord`]s,
//! looked up by file size. Size is known without reading a file, so a lookup
//! narrows the candidates for a new file to a single size bucket before any
//! digest has to be computed.
//!
//! # Architecture
//!
//! * [`CandidateIndex`]: the contract consumed by the matcher.
//! * [`database`]: the SQLite-backed implementation, [`SqliteIndex`].
//! * [`record`]: the [`FileRecord`] data model.
//!
//! # History
//!
//! Records are never updated in place. Indexing the same path twice stores
//! two rows; a changed file produces a new row and the old one stays.

pub mod database;
pub mod record;

use std::path::PathBuf;

pub use database::SqliteIndex;
pub use record::FileRecord;

/// Errors reported by an index.
#[derive(thiserror::Error, Debug)]
pub enum IndexError {
    /// `create` refused to touch an existing location.
    #[error("Cannot create index, path already exists: {0}")]
    AlreadyExists(PathBuf),

    /// `open` found nothing at the location.
    #[error("Index not found: {0}")]
    NotFound(PathBuf),

    /// The location is a database, but not one created by this tool.
    #[error("Not a DupFinder index: {0}")]
    NotAnIndex(PathBuf),

    /// A size that does not fit the store's integer column.
    #[error("File size {0} is too large to store")]
    SizeOutOfRange(u64),

    /// A path that is not valid UTF-8, on a platform where its raw bytes
    /// cannot be stored.
    #[error("Path is not valid UTF-8: {0}")]
    NonUtf8Path(PathBuf),

    /// Failure in the underlying store, passed through as is.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
}

impl IndexError {
    /// Whether this is a resource-state conflict (create on an existing
    /// location, open on a missing one) rather than a failure.
    #[must_use]
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyExists(_) | Self::NotFound(_))
    }
}

/// Result type for index operations.
pub type IndexResult<T> = Result<T, IndexError>;

/// A store of previously observed files, queryable by size.
///
/// # Panics
///
/// Implementations panic when asked to insert a record without a digest.
/// That is a caller bug, and nothing is written before the check.
pub trait CandidateIndex {
    /// Append one record.
    fn insert(&mut self, record: &FileRecord) -> IndexResult<()>;

    /// Append records as one logical operation, returning how many were
    /// stored. Either every record is stored or an error is returned.
    fn insert_many(&mut self, records: &[FileRecord]) -> IndexResult<usize>;

    /// Every stored record with exactly `size` bytes, in a stable order.
    /// An empty vector means no candidates.
    fn lookup_by_size(&self, size: u64) -> IndexResult<Vec<FileRecord>>;

    /// Release the underlying resource.
    fn close(self) -> IndexResult<()>
    where
        Self: Sized;
}

/// Fail fast on a record that is not allowed into an index.
pub(crate) fn require_hash(record: &FileRecord) {
    assert!(
        record.is_hashed(),
        "record for {} has no content hash; hash it before inserting",
        record.filepath.display()
    );
}
