//! Command layer.
//!
//! One function per subcommand, each taking an explicit options struct and
//! returning a [`Report`]. Nothing here reads global state: the CLI layer
//! resolves paths and flags before calling in.
//!
//! An index in the wrong state (already present for `create`, missing for
//! the others) is not an error. It yields [`Report::NothingDone`].

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};

use crate::actions::delete::delete_all;
use crate::duplicates::{DuplicateFinder, FinderConfig, IndexMatcher};
use crate::index::{CandidateIndex, FileRecord, IndexError, SqliteIndex};
use crate::output::{CheckReport, IndexReport, Report, TreeReport};
use crate::progress::{ProgressCallback, PHASE_WALKING};
use crate::scanner::{Walker, WalkerConfig};

/// Options for creating an index.
#[derive(Debug, Clone)]
pub struct CreateOptions {
    /// Where the new index file goes
    pub index_path: PathBuf,
}

/// Options for indexing a directory.
#[derive(Clone, Default)]
pub struct IndexOptions {
    /// Existing index to write to
    pub index_path: PathBuf,
    /// Directory whose files are indexed
    pub dir: PathBuf,
    /// Traversal options
    pub walker: WalkerConfig,
    /// Progress reporting, if any
    pub progress: Option<Arc<dyn ProgressCallback>>,
}

/// Options for checking a directory against an index.
#[derive(Clone, Default)]
pub struct CheckOptions {
    /// Existing index to compare against
    pub index_path: PathBuf,
    /// Directory to check
    pub dir: PathBuf,
    /// Traversal options
    pub walker: WalkerConfig,
    /// Delete files that are already indexed
    pub delete_duplicates: bool,
    /// Hash and insert files that are not indexed yet
    pub add_new_files: bool,
    /// Progress reporting, if any
    pub progress: Option<Arc<dyn ProgressCallback>>,
}

/// Options for finding duplicates inside one directory.
#[derive(Clone, Default)]
pub struct TreeOptions {
    /// Directory searched for duplicates
    pub dir: PathBuf,
    /// Traversal options
    pub walker: WalkerConfig,
    /// Delete every duplicate, keeping the first file found
    pub delete_duplicates: bool,
    /// Progress reporting, if any
    pub progress: Option<Arc<dyn ProgressCallback>>,
}

/// Create an empty index.
///
/// # Errors
///
/// Fails if the store cannot be initialized. An existing location is
/// reported as nothing done.
pub fn create_index(options: &CreateOptions) -> Result<Report> {
    let path = &options.index_path;
    match SqliteIndex::create(path) {
        Ok(index) => {
            index
                .close()
                .with_context(|| format!("Failed to close index {}", path.display()))?;
            log::info!("Created index {}", path.display());
            Ok(Report::Created {
                index: path.clone(),
            })
        }
        Err(e) if e.is_conflict() => Ok(nothing_done(e)),
        Err(e) => Err(e).with_context(|| format!("Failed to create index {}", path.display())),
    }
}

/// Hash every file under a directory and append it to the index.
///
/// # Errors
///
/// Fails on traversal, hashing, or store errors.
pub fn index_directory(options: &IndexOptions) -> Result<Report> {
    let mut index = match open_index(&options.index_path)? {
        Ok(index) => index,
        Err(report) => return Ok(report),
    };

    let mut records = enumerate(&options.dir, &options.walker, options.progress.as_ref())?;
    log::info!("{} files being indexed", records.len());

    let matcher = matcher(options.progress.as_ref());
    matcher.fill_hashes(&mut records)?;
    let (records, skipped) = split_unhashed(records);

    let indexed = index
        .insert_many(&records)
        .with_context(|| format!("Failed to write to index {}", options.index_path.display()))?;
    index.close()?;

    Ok(Report::Indexed(IndexReport {
        index: options.index_path.clone(),
        dir: options.dir.clone(),
        indexed,
        skipped,
    }))
}

/// Compare a directory with the index, then optionally delete the
/// duplicates and add the new files.
///
/// Duplicates are deleted before new files are added, and only after every
/// file has been classified.
///
/// # Errors
///
/// Fails on traversal, hashing, store, or deletion errors.
pub fn check_directory(options: &CheckOptions) -> Result<Report> {
    let mut index = match open_index(&options.index_path)? {
        Ok(index) => index,
        Err(report) => return Ok(report),
    };

    let observed = enumerate(&options.dir, &options.walker, options.progress.as_ref())?;
    let matcher = matcher(options.progress.as_ref());
    let mut result = matcher
        .compare_against_index(&index, observed)
        .with_context(|| format!("Failed to check {}", options.dir.display()))?;
    let mut report = CheckReport::new(&options.index_path, &options.dir, &result);

    if options.delete_duplicates && !report.duplicate_files.is_empty() {
        report.deleted = delete_all(&report.duplicate_files)
            .context("Failed to delete duplicate files")?
            .success_count();
    }

    if options.add_new_files {
        matcher.fill_hashes(&mut result.new_files)?;
        let (records, _) = split_unhashed(result.new_files);
        report.added = index.insert_many(&records).with_context(|| {
            format!("Failed to write to index {}", options.index_path.display())
        })?;
    }
    index.close()?;

    log::info!(
        "{} duplicated files found, {} new files found",
        report.duplicate_files.len(),
        report.new_files.len()
    );
    Ok(Report::Checked(report))
}

/// Find duplicates inside one directory without an index.
///
/// # Errors
///
/// Fails on traversal, hashing, or deletion errors.
pub fn find_duplicates(options: &TreeOptions) -> Result<Report> {
    let mut config = FinderConfig::default()
        .with_walker_config(options.walker.clone())
        .with_delete(options.delete_duplicates);
    if let Some(ref cb) = options.progress {
        config = config.with_progress_callback(Arc::clone(cb));
    }

    let outcome = DuplicateFinder::new(config)
        .find_duplicates_in_tree(&options.dir)
        .with_context(|| format!("Failed to find duplicates in {}", options.dir.display()))?;
    Ok(Report::Tree(TreeReport::new(&options.dir, outcome)))
}

/// Open the index, or produce the report for a missing one.
fn open_index(path: &Path) -> Result<std::result::Result<SqliteIndex, Report>> {
    match SqliteIndex::open(path) {
        Ok(index) => Ok(Ok(index)),
        Err(e) if e.is_conflict() => Ok(Err(nothing_done(e))),
        Err(e) => Err(e).with_context(|| format!("Failed to open index {}", path.display())),
    }
}

fn nothing_done(error: IndexError) -> Report {
    log::warn!("{}", error);
    Report::NothingDone {
        reason: error.to_string(),
    }
}

fn matcher(progress: Option<&Arc<dyn ProgressCallback>>) -> IndexMatcher {
    let matcher = IndexMatcher::new();
    match progress {
        Some(cb) => matcher.with_progress_callback(Arc::clone(cb)),
        None => matcher,
    }
}

fn enumerate(
    dir: &Path,
    config: &WalkerConfig,
    progress: Option<&Arc<dyn ProgressCallback>>,
) -> Result<Vec<FileRecord>> {
    if let Some(cb) = progress {
        cb.on_phase_start(PHASE_WALKING, 0);
    }

    let walker = Walker::new(dir, config.clone());
    let mut records = Vec::new();
    for entry in walker.walk() {
        let entry = entry.with_context(|| format!("Failed to scan {}", dir.display()))?;
        if let Some(cb) = progress {
            cb.on_progress(records.len() + 1, &entry.path.to_string_lossy());
        }
        records.push(FileRecord::from(entry));
    }

    if let Some(cb) = progress {
        cb.on_phase_end(PHASE_WALKING);
    }
    Ok(records)
}

/// Separate records that can be stored from those whose file vanished.
fn split_unhashed(records: Vec<FileRecord>) -> (Vec<FileRecord>, Vec<PathBuf>) {
    let (hashed, unhashed): (Vec<_>, Vec<_>) =
        records.into_iter().partition(FileRecord::is_hashed);
    let skipped = unhashed
        .into_iter()
        .map(|r| {
            log::warn!("Skipping {}: no longer a readable file", r.filepath.display());
            r.filepath
        })
        .collect();
    (hashed, skipped)
}
