//! Fixtures shared by the integration tests.

use std::fs;
use std::path::{Path, PathBuf};

use dupfinder::index::FileRecord;
use dupfinder::scanner::{ContentHasher, Hasher};

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &[u8]) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, content).unwrap();
    path
}

/// Record for an existing file, digest included.
pub fn hashed_record(path: &Path) -> FileRecord {
    let size = fs::metadata(path).unwrap().len();
    let hash = Hasher::new().hash_file(path).unwrap().unwrap();
    FileRecord::with_hash(path.to_path_buf(), size, hash)
}
