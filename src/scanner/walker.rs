//! Directory walker implementation using walkdir.
//!
//! # Overview
//!
//! This module provides the [`Walker`] struct for traversing a directory tree
//! and collecting the path and size of every regular file beneath it. File
//! contents are never read here; hashing is deferred to the matcher so that
//! only size collisions pay for I/O.
//!
//! # Ordering
//!
//! Children of every directory are visited in file-name order, depth first.
//! Given an unchanged filesystem, two walks over the same root yield the same
//! sequence, which the survivor rule of the pairwise matcher depends on.
//!
//! # Symbolic links
//!
//! When links are followed, a file reachable through several paths is listed
//! once, under the first path visited. Later paths resolving to the same file
//! are skipped, so a link and its target are never matched against each other.
//!
//! # Example
//!
//! ```no_run
//! use dupfinder::scanner::{Walker, WalkerConfig};
//! use std::path::Path;
//!
//! let walker = Walker::new(Path::new("/home/user/Downloads"), WalkerConfig::default());
//! let files = walker.collect_files().expect("walk failed");
//! println!("Found {} files", files.len());
//! ```

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

use super::{FileEntry, ScanError, WalkerConfig};

/// Directory walker for sequential file discovery.
#[derive(Debug, Clone)]
pub struct Walker {
    /// Root path to walk
    root: PathBuf,
    /// Walker configuration
    config: WalkerConfig,
}

impl Walker {
    /// Create a new walker for the given path.
    ///
    /// # Arguments
    ///
    /// * `path` - Root directory to scan
    /// * `config` - Walker configuration options
    #[must_use]
    pub fn new(path: &Path, config: WalkerConfig) -> Self {
        Self {
            root: path.to_path_buf(),
            config,
        }
    }

    /// Root directory of this walker.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Walk the directory tree, yielding file entries.
    ///
    /// Errors are yielded as [`ScanError`] values. A root that is missing or
    /// is not a directory yields exactly one error and nothing else.
    pub fn walk(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let root_error = self.validate_root().err();
        let entries = if root_error.is_none() {
            Some(self.walk_entries())
        } else {
            None
        };

        root_error
            .map(Err)
            .into_iter()
            .chain(entries.into_iter().flatten())
    }

    /// Walk the whole tree and collect every file entry.
    ///
    /// # Errors
    ///
    /// Returns the first [`ScanError`] encountered. Traversal errors are
    /// never skipped.
    pub fn collect_files(&self) -> Result<Vec<FileEntry>, ScanError> {
        let files = self.walk().collect::<Result<Vec<_>, _>>()?;
        log::debug!(
            "Enumerated {} files under {}",
            files.len(),
            self.root.display()
        );
        Ok(files)
    }

    fn validate_root(&self) -> Result<(), ScanError> {
        let metadata = fs::metadata(&self.root).map_err(|e| self.handle_io_error(&self.root, e))?;
        if !metadata.is_dir() {
            return Err(ScanError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    fn walk_entries(&self) -> impl Iterator<Item = Result<FileEntry, ScanError>> + '_ {
        let skip_hidden = self.config.skip_hidden;
        let mut seen = self.config.follow_symlinks.then(HashSet::new);

        WalkDir::new(&self.root)
            .follow_links(self.config.follow_symlinks)
            .sort_by_file_name()
            .min_depth(1)
            .into_iter()
            // The root itself is exempt, temp dirs are often dot-prefixed
            .filter_entry(move |entry| !(skip_hidden && entry.depth() > 0 && is_hidden(entry)))
            .filter_map(move |entry_result| match entry_result {
                Ok(entry) => self.process_entry(entry),
                Err(e) => Some(Err(self.handle_walk_error(e))),
            })
            .filter(move |result| match (result, seen.as_mut()) {
                (Ok(file), Some(seen)) => first_visit(seen, file),
                _ => true,
            })
    }

    /// Turn a directory entry into a [`FileEntry`] if it is a regular file.
    fn process_entry(&self, entry: DirEntry) -> Option<Result<FileEntry, ScanError>> {
        let file_type = entry.file_type();

        if file_type.is_dir() {
            return None;
        }

        // Only reachable when links are not followed
        if file_type.is_symlink() {
            log::trace!("Skipping symlink: {}", entry.path().display());
            return None;
        }

        if !file_type.is_file() {
            log::trace!("Skipping special file: {}", entry.path().display());
            return None;
        }

        let metadata = match entry.metadata() {
            Ok(m) => m,
            Err(e) => return Some(Err(self.handle_walk_error(e))),
        };

        let size = metadata.len();
        if size == 0 && self.config.skip_empty {
            log::debug!("Skipping empty file: {}", entry.path().display());
            return None;
        }

        Some(Ok(FileEntry::new(entry.into_path(), size)))
    }

    /// Handle I/O errors during file access.
    fn handle_io_error(&self, path: &Path, error: io::Error) -> ScanError {
        match error.kind() {
            io::ErrorKind::PermissionDenied => {
                log::warn!("Permission denied: {}", path.display());
                ScanError::PermissionDenied(path.to_path_buf())
            }
            io::ErrorKind::NotFound => ScanError::NotFound(path.to_path_buf()),
            _ => {
                log::warn!("I/O error for {}: {}", path.display(), error);
                ScanError::Io {
                    path: path.to_path_buf(),
                    source: error,
                }
            }
        }
    }

    /// Handle walkdir errors.
    fn handle_walk_error(&self, error: walkdir::Error) -> ScanError {
        let path = error
            .path()
            .map_or_else(|| self.root.clone(), Path::to_path_buf);

        if let Some(ancestor) = error.loop_ancestor() {
            log::warn!(
                "Symlink loop at {} (points back to {})",
                path.display(),
                ancestor.display()
            );
            return ScanError::Io {
                source: io::Error::other(format!("symlink loop to {}", ancestor.display())),
                path,
            };
        }

        match error.into_io_error() {
            Some(io_error) => self.handle_io_error(&path, io_error),
            None => ScanError::Io {
                path,
                source: io::Error::other("directory walk failed"),
            },
        }
    }
}

/// Identity of the file a path resolves to.
#[cfg(unix)]
type FileId = (u64, u64);

#[cfg(not(unix))]
type FileId = PathBuf;

#[cfg(unix)]
fn file_id(path: &Path) -> Option<FileId> {
    use std::os::unix::fs::MetadataExt;

    fs::metadata(path).ok().map(|m| (m.dev(), m.ino()))
}

#[cfg(not(unix))]
fn file_id(path: &Path) -> Option<FileId> {
    fs::canonicalize(path).ok()
}

/// Record `file` as listed; false if its target was listed already.
///
/// A path whose identity cannot be read is kept, hashing will report it.
fn first_visit(seen: &mut HashSet<FileId>, file: &FileEntry) -> bool {
    let Some(id) = file_id(&file.path) else {
        return true;
    };
    if seen.insert(id) {
        return true;
    }
    log::debug!(
        "Skipping {}: resolves to a file already listed",
        file.path.display()
    );
    false
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|name| name.starts_with('.'))
}
