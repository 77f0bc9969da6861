//! File record definitions.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::scanner::FileEntry;

/// One observed file: path, size and (once computed) content digest.
///
/// Records coming out of the walker carry no digest. The matcher fills it in
/// lazily, only when a size collision makes the comparison necessary. A
/// record must have a non-empty digest before it can be stored in a
/// [`CandidateIndex`](super::CandidateIndex).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path as observed during enumeration
    pub filepath: PathBuf,
    /// Size in bytes at observation time
    pub size: u64,
    /// Content digest, `None` until hashed
    pub hash: Option<String>,
}

impl FileRecord {
    /// Create a record that has not been hashed yet.
    #[must_use]
    pub fn new(filepath: PathBuf, size: u64) -> Self {
        Self {
            filepath,
            size,
            hash: None,
        }
    }

    /// Create a record with a known digest.
    #[must_use]
    pub fn with_hash(filepath: PathBuf, size: u64, hash: impl Into<String>) -> Self {
        Self {
            filepath,
            size,
            hash: Some(hash.into()),
        }
    }

    /// The digest, if one has been computed and is non-empty.
    #[must_use]
    pub fn digest(&self) -> Option<&str> {
        self.hash.as_deref().filter(|h| !h.is_empty())
    }

    /// Whether this record may be inserted into an index.
    #[must_use]
    pub fn is_hashed(&self) -> bool {
        self.digest().is_some()
    }
}

impl From<FileEntry> for FileRecord {
    fn from(entry: FileEntry) -> Self {
        Self::new(entry.path, entry.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_unhashed() {
        let record = FileRecord::new(PathBuf::from("/a"), 4);
        assert!(record.hash.is_none());
        assert!(!record.is_hashed());
        assert_eq!(record.digest(), None);
    }

    #[test]
    fn test_empty_hash_counts_as_unhashed() {
        let record = FileRecord::with_hash(PathBuf::from("/a"), 4, "");
        assert!(!record.is_hashed());
        assert_eq!(record.digest(), None);
    }

    #[test]
    fn test_with_hash() {
        let record = FileRecord::with_hash(PathBuf::from("/a"), 4, "abcdef");
        assert!(record.is_hashed());
        assert_eq!(record.digest(), Some("abcdef"));
    }

    #[test]
    fn test_from_file_entry() {
        let record = FileRecord::from(FileEntry::new(PathBuf::from("/x/y"), 100));
        assert_eq!(record, FileRecord::new(PathBuf::from("/x/y"), 100));
    }
}
