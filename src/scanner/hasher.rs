//! XXH64 file hasher with streaming support.
//!
//! # Overview
//!
//! This module provides the [`Hasher`] struct for computing XXH64 digests of
//! file contents. Files are streamed through a fixed-size buffer, which gives
//! the same digest as hashing the whole file in one call.
//!
//! Digests are rendered as 16 lowercase hex characters, the text form stored
//! in the candidate index.
//!
//! # Absence
//!
//! Hashing a path that does not exist, a directory, or anything else that is
//! not a regular file yields `Ok(None)`. Callers branch on the absent digest;
//! only real read failures on an existing file are errors.

use std::fs::File;
use std::hash::Hasher as _;
use std::io::{self, BufReader, Read};
use std::path::Path;

use twox_hash::XxHash64;

use super::HashError;

/// Seed shared by every digest. Changing it invalidates existing indexes.
pub const HASH_SEED: u64 = 0;

/// Buffer size for streaming file contents.
const BUFFER_SIZE: usize = 64 * 1024;

/// Computes content digests for files.
///
/// The matcher depends on this trait rather than on [`Hasher`] directly so
/// that hash calls can be observed or substituted.
pub trait ContentHasher {
    /// Digest of the full contents of `path`, or `None` when `path` is not
    /// an existing regular file.
    ///
    /// # Errors
    ///
    /// Returns [`HashError`] when an existing file cannot be read.
    fn hash_file(&self, path: &Path) -> Result<Option<String>, HashError>;
}

impl<T: ContentHasher + ?Sized> ContentHasher for &T {
    fn hash_file(&self, path: &Path) -> Result<Option<String>, HashError> {
        (**self).hash_file(path)
    }
}

/// Streaming XXH64 file hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Hasher;

impl Hasher {
    /// Create a new hasher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn hash_reader<R: Read>(mut reader: R) -> io::Result<u64> {
        let mut state = XxHash64::with_seed(HASH_SEED);
        let mut buffer = vec![0u8; BUFFER_SIZE];
        loop {
            let read = match reader.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            state.write(&buffer[..read]);
        }
        Ok(state.finish())
    }
}

impl ContentHasher for Hasher {
    fn hash_file(&self, path: &Path) -> Result<Option<String>, HashError> {
        if !path.is_file() {
            log::trace!("Not a regular file, no digest: {}", path.display());
            return Ok(None);
        }

        let file = match File::open(path) {
            Ok(f) => f,
            // Removed between the check and the open
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(to_hash_error(path, e)),
        };

        let digest = Self::hash_reader(BufReader::new(file)).map_err(|e| to_hash_error(path, e))?;
        log::trace!("Hashed {}: {:016x}", path.display(), digest);
        Ok(Some(hash_to_hex(digest)))
    }
}

fn to_hash_error(path: &Path, error: io::Error) -> HashError {
    match error.kind() {
        io::ErrorKind::PermissionDenied => HashError::PermissionDenied(path.to_path_buf()),
        _ => HashError::Io {
            path: path.to_path_buf(),
            source: error,
        },
    }
}

/// XXH64 of an in-memory buffer.
#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> u64 {
    let mut state = XxHash64::with_seed(HASH_SEED);
    state.write(bytes);
    state.finish()
}

/// Render a digest in its stored text form.
#[must_use]
pub fn hash_to_hex(hash: u64) -> String {
    format!("{:016x}", hash)
}
