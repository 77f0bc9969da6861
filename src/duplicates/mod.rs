//! Duplicate detection module.
//!
//! This module provides the two matching modes:
//! - [`indexed`]: compare newly observed files against a [`CandidateIndex`]
//! - [`finder`]: compare every file of one tree against every other, in memory
//!
//! Both modes use file size as the pre-filter and compute a content digest
//! only for files whose size collides with another candidate.
//!
//! [`CandidateIndex`]: crate::index::CandidateIndex

pub mod finder;
pub mod indexed;

use std::path::PathBuf;

use bytesize::ByteSize;
use serde::Serialize;

use crate::actions::delete::DeleteError;
use crate::index::{FileRecord, IndexError};
use crate::scanner::{HashError, ScanError};

pub use finder::{find_duplicates_in_tree, DuplicateFinder, FinderConfig, MatchStatus};
pub use indexed::{compare_against_index, IndexMatcher};

/// Outcome of comparing observed files against an index.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MatchResult {
    /// Files with no confirmed match, in input order.
    /// Those that needed a comparison already carry their digest.
    pub new_files: Vec<FileRecord>,
    /// Files whose size and digest match a stored record, in input order
    pub duplicate_files: Vec<FileRecord>,
    /// Statistics for this run
    pub summary: ScanSummary,
}

/// Outcome of the pairwise comparison of one tree.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TreeOutcome {
    /// First-encountered member of every content group, plus every unique file
    pub survivors: Vec<PathBuf>,
    /// Every later member of a content group, in the order found
    pub duplicates: Vec<PathBuf>,
    /// Number of duplicates removed from disk (0 unless deletion was requested)
    pub deleted: usize,
    /// Statistics for this run
    pub summary: ScanSummary,
}

/// Statistics about a matching run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Files considered
    pub total_files: usize,
    /// Files whose content was hashed during the run
    pub hashed_files: usize,
    /// Files classified as duplicates
    pub duplicate_files: usize,
    /// Bytes held by the duplicates
    pub reclaimable_bytes: u64,
}

impl ScanSummary {
    /// Reclaimable space formatted for humans.
    #[must_use]
    pub fn reclaimable_display(&self) -> String {
        ByteSize::b(self.reclaimable_bytes).to_string()
    }

    fn record_duplicate(&mut self, size: u64) {
        self.duplicate_files += 1;
        self.reclaimable_bytes += size;
    }
}

/// Errors that can occur during duplicate finding.
#[derive(thiserror::Error, Debug)]
pub enum FinderError {
    /// Enumerating the tree failed.
    #[error(transparent)]
    Scan(#[from] ScanError),

    /// Reading a file for its digest failed.
    #[error(transparent)]
    Hash(#[from] HashError),

    /// The candidate index failed.
    #[error(transparent)]
    Index(#[from] IndexError),

    /// Removing a confirmed duplicate failed.
    #[error(transparent)]
    Delete(#[from] DeleteError),
}
