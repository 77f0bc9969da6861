//! Matching observed files against a candidate index.
//!
//! Each observed record is looked up by size first. Only when the index
//! holds at least one record of that size is the observed file hashed, and
//! it is a duplicate when any candidate carries the same digest. A file
//! whose size is unique in the index is never read.

use std::sync::Arc;

use super::{FinderError, MatchResult, ScanSummary};
use crate::index::{CandidateIndex, FileRecord};
use crate::progress::{ProgressCallback, PHASE_CHECKING, PHASE_HASHING};
use crate::scanner::{ContentHasher, Hasher};

/// Compares observed files with the records of a [`CandidateIndex`].
pub struct IndexMatcher<H = Hasher> {
    hasher: H,
    progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl IndexMatcher<Hasher> {
    /// Create a matcher using the production hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::with_hasher(Hasher::new())
    }
}

impl Default for IndexMatcher<Hasher> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H: ContentHasher> IndexMatcher<H> {
    /// Create a matcher that hashes through `hasher`.
    #[must_use]
    pub fn with_hasher(hasher: H) -> Self {
        Self {
            hasher,
            progress_callback: None,
        }
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// The hasher used for lazy digests.
    #[must_use]
    pub fn hasher(&self) -> &H {
        &self.hasher
    }

    /// Split `observed` into new files and duplicates of indexed files.
    ///
    /// Both output lists keep input order. Records that needed a comparison
    /// come back with their digest filled in, so new files can be inserted
    /// without hashing them again. A record whose digest is absent (the file
    /// vanished) is always new.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Index` when a lookup fails and
    /// `FinderError::Hash` when an existing file cannot be read.
    pub fn compare_against_index<I>(
        &self,
        index: &I,
        observed: Vec<FileRecord>,
    ) -> Result<MatchResult, FinderError>
    where
        I: CandidateIndex + ?Sized,
    {
        let mut result = MatchResult {
            summary: ScanSummary {
                total_files: observed.len(),
                ..ScanSummary::default()
            },
            ..MatchResult::default()
        };

        if let Some(ref cb) = self.progress_callback {
            cb.on_phase_start(PHASE_CHECKING, observed.len());
        }

        for (position, mut record) in observed.into_iter().enumerate() {
            if let Some(ref cb) = self.progress_callback {
                cb.on_progress(position + 1, &record.filepath.to_string_lossy());
            }

            let candidates = index.lookup_by_size(record.size)?;
            if candidates.is_empty() {
                log::trace!("Unique size {}: {}", record.size, record.filepath.display());
                result.new_files.push(record);
                continue;
            }

            if !record.is_hashed() {
                record.hash = self.hasher.hash_file(&record.filepath)?;
                if record.is_hashed() {
                    result.summary.hashed_files += 1;
                }
            }

            let matched = record.digest().and_then(|digest| {
                candidates
                    .iter()
                    .find(|candidate| candidate.digest() == Some(digest))
            });

            match matched {
                Some(candidate) => {
                    log::debug!(
                        "Duplicate: {} (indexed as {})",
                        record.filepath.display(),
                        candidate.filepath.display()
                    );
                    result.summary.record_duplicate(record.size);
                    result.duplicate_files.push(record);
                }
                None => result.new_files.push(record),
            }
        }

        if let Some(ref cb) = self.progress_callback {
            cb.on_phase_end(PHASE_CHECKING);
        }

        Ok(result)
    }

    /// Hash every record that has no digest yet, returning how many digests
    /// were computed.
    ///
    /// Records that still have no digest afterwards name files that are gone
    /// and must not be inserted.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Hash` when an existing file cannot be read.
    pub fn fill_hashes(&self, records: &mut [FileRecord]) -> Result<usize, FinderError> {
        let pending = records.iter().filter(|r| !r.is_hashed()).count();
        if let Some(ref cb) = self.progress_callback {
            cb.on_phase_start(PHASE_HASHING, pending);
        }

        let mut filled = 0;
        for record in records.iter_mut().filter(|r| !r.is_hashed()) {
            record.hash = self.hasher.hash_file(&record.filepath)?;
            if record.is_hashed() {
                filled += 1;
            }
            if let Some(ref cb) = self.progress_callback {
                cb.on_progress(filled, &record.filepath.to_string_lossy());
            }
        }

        if let Some(ref cb) = self.progress_callback {
            cb.on_phase_end(PHASE_HASHING);
        }
        log::debug!("Hashed {} of {} pending records", filled, pending);

        Ok(filled)
    }
}

/// Compare `observed` against `index`, hashing through `hasher`.
///
/// # Errors
///
/// See [`IndexMatcher::compare_against_index`].
pub fn compare_against_index<I, H>(
    index: &I,
    hasher: H,
    observed: Vec<FileRecord>,
) -> Result<MatchResult, FinderError>
where
    I: CandidateIndex + ?Sized,
    H: ContentHasher,
{
    IndexMatcher::with_hasher(hasher).compare_against_index(index, observed)
}
