//! Pairwise duplicate finder for a single tree.
//!
//! # Overview
//!
//! No index is involved: every file under the root is compared with every
//! later file.
//! 1. **Enumerate**: walk the tree, collecting paths and sizes only
//! 2. **Classify**: compare each unclassified file with every later
//!    unclassified file of the same size, hashing both lazily
//! 3. **Delete** (optional): remove every duplicate once classification is done
//!
//! The first file of a content group in enumeration order is its survivor.
//! Every later member is a duplicate.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::duplicates::{DuplicateFinder, FinderConfig};
//! use std::path::Path;
//!
//! let finder = DuplicateFinder::new(FinderConfig::default());
//! let outcome = finder.find_duplicates_in_tree(Path::new(".")).unwrap();
//! for path in &outcome.duplicates {
//!     println!("{}", path.display());
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;

use super::{FinderError, ScanSummary, TreeOutcome};
use crate::actions::delete::delete_all;
use crate::index::FileRecord;
use crate::progress::{ProgressCallback, PHASE_COMPARING, PHASE_WALKING};
use crate::scanner::{ContentHasher, Hasher, Walker, WalkerConfig};

/// Classification state of one enumerated file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    /// Not yet reached by the comparison loop
    Unclassified,
    /// First-encountered member of its content group, or unique
    Survivor,
    /// Later member of a content group
    Duplicate,
}

/// Result of classifying a list of records.
///
/// `statuses` is aligned with the classified slice. `survivors` and
/// `duplicates` hold slice indices in the order they were identified.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    /// Status of each record, by slice index
    pub statuses: Vec<MatchStatus>,
    /// Indices of the files kept
    pub survivors: Vec<usize>,
    /// Indices of the files identified as duplicates
    pub duplicates: Vec<usize>,
    /// Number of digests computed; absent digests are not counted
    pub hashed: usize,
}

/// Configuration for the pairwise finder.
#[derive(Clone, Default)]
pub struct FinderConfig {
    /// Walker configuration for directory traversal.
    pub walker_config: WalkerConfig,
    /// Remove duplicates from disk after classification.
    pub delete: bool,
    /// Optional progress callback for reporting.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("walker_config", &self.walker_config)
            .field("delete", &self.delete)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl FinderConfig {
    /// Set the walker configuration.
    #[must_use]
    pub fn with_walker_config(mut self, config: WalkerConfig) -> Self {
        self.walker_config = config;
        self
    }

    /// Enable or disable deletion of duplicates.
    #[must_use]
    pub fn with_delete(mut self, delete: bool) -> Self {
        self.delete = delete;
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }
}

/// Stateless duplicate finder.
pub struct DuplicateFinder<H = Hasher> {
    config: FinderConfig,
    hasher: H,
}

impl DuplicateFinder<Hasher> {
    /// Create a new duplicate finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        Self::with_hasher(config, Hasher::new())
    }

    /// Create a new duplicate finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }
}

impl<H: ContentHasher> DuplicateFinder<H> {
    /// Create a finder that hashes through `hasher`.
    #[must_use]
    pub fn with_hasher(config: FinderConfig, hasher: H) -> Self {
        Self { config, hasher }
    }

    /// The finder's configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find the duplicates under `root`, deleting them if configured to.
    ///
    /// # Errors
    ///
    /// Returns `FinderError` if:
    /// - The root is missing, not a directory, or cannot be traversed
    /// - An existing file cannot be read for hashing
    /// - A duplicate cannot be deleted (the remaining ones are left alone)
    pub fn find_duplicates_in_tree(&self, root: &Path) -> Result<TreeOutcome, FinderError> {
        log::info!("Finding duplicates in {}", root.display());

        let mut records = self.enumerate(root)?;
        let classification = self.classify(&mut records)?;

        let mut summary = ScanSummary {
            total_files: records.len(),
            hashed_files: classification.hashed,
            ..ScanSummary::default()
        };
        let survivors = classification
            .survivors
            .iter()
            .map(|&i| records[i].filepath.clone())
            .collect();
        let duplicates: Vec<_> = classification
            .duplicates
            .iter()
            .map(|&i| {
                summary.record_duplicate(records[i].size);
                records[i].filepath.clone()
            })
            .collect();

        log::info!(
            "{} files, {} duplicates ({} reclaimable)",
            summary.total_files,
            summary.duplicate_files,
            summary.reclaimable_display()
        );

        let deleted = if self.config.delete && !duplicates.is_empty() {
            delete_all(&duplicates)?.success_count()
        } else {
            0
        };

        Ok(TreeOutcome {
            survivors,
            duplicates,
            deleted,
            summary,
        })
    }

    /// Classify `files` in place, caching computed digests on the records.
    ///
    /// Never touches the filesystem beyond hashing.
    ///
    /// # Errors
    ///
    /// Returns `FinderError::Hash` if an existing file cannot be read.
    pub fn classify(&self, files: &mut [FileRecord]) -> Result<Classification, FinderError> {
        let total = files.len();
        let mut classification = Classification {
            statuses: vec![MatchStatus::Unclassified; total],
            ..Classification::default()
        };
        // Files whose hash was attempted, including those that came back absent
        let mut attempted = vec![false; total];

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_start(PHASE_COMPARING, total);
        }

        for i in 0..total {
            if classification.statuses[i] != MatchStatus::Unclassified {
                continue;
            }
            classification.statuses[i] = MatchStatus::Survivor;
            classification.survivors.push(i);

            if let Some(ref cb) = self.config.progress_callback {
                cb.on_progress(i + 1, &files[i].filepath.to_string_lossy());
            }

            for j in (i + 1)..total {
                if classification.statuses[j] != MatchStatus::Unclassified
                    || files[j].size != files[i].size
                {
                    continue;
                }

                self.ensure_hash(files, &mut attempted, i, &mut classification.hashed)?;
                self.ensure_hash(files, &mut attempted, j, &mut classification.hashed)?;

                let same = match (files[i].digest(), files[j].digest()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                };
                if same {
                    log::debug!(
                        "Duplicate: {} (same as {})",
                        files[j].filepath.display(),
                        files[i].filepath.display()
                    );
                    classification.statuses[j] = MatchStatus::Duplicate;
                    classification.duplicates.push(j);
                }
            }
        }

        if let Some(ref cb) = self.config.progress_callback {
            cb.on_phase_end(PHASE_COMPARING);
        }

        Ok(classification)
    }

    fn enumerate(&self, root: &Path) -> Result<Vec<FileRecord>, FinderError> {
        let walker = Walker::new(root, self.config.walker_config.clone());
        let callback = self.config.progress_callback.as_ref();

        if let Some(cb) = callback {
            cb.on_phase_start(PHASE_WALKING, 0);
        }

        let mut records = Vec::new();
        for entry in walker.walk() {
            let entry = entry?;
            if let Some(cb) = callback {
                cb.on_progress(records.len() + 1, &entry.path.to_string_lossy());
            }
            records.push(FileRecord::from(entry));
        }

        if let Some(cb) = callback {
            cb.on_phase_end(PHASE_WALKING);
        }
        log::debug!("Enumerated {} files under {}", records.len(), root.display());

        Ok(records)
    }

    fn ensure_hash(
        &self,
        files: &mut [FileRecord],
        attempted: &mut [bool],
        index: usize,
        hashed: &mut usize,
    ) -> Result<(), FinderError> {
        if attempted[index] || files[index].is_hashed() {
            return Ok(());
        }
        attempted[index] = true;

        let record = &mut files[index];
        record.hash = self.hasher.hash_file(&record.filepath)?;
        if record.is_hashed() {
            *hashed += 1;
        } else {
            log::warn!("No digest for {}, skipping", record.filepath.display());
        }
        Ok(())
    }
}

/// Find the duplicates under `root` with default walker settings.
///
/// # Errors
///
/// See [`DuplicateFinder::find_duplicates_in_tree`].
pub fn find_duplicates_in_tree(root: &Path, delete: bool) -> Result<TreeOutcome, FinderError> {
    DuplicateFinder::new(FinderConfig::default().with_delete(delete)).find_duplicates_in_tree(root)
}
