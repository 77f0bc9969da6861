use std::cell::Cell;
use std::path::Path;

use dupfinder::duplicates::{compare_against_index, IndexMatcher};
use dupfinder::index::{CandidateIndex, FileRecord, SqliteIndex};
use dupfinder::scanner::{ContentHasher, HashError, Hasher, Walker, WalkerConfig};
use tempfile::tempdir;

use super::support::{hashed_record, write_file};

struct CountingHasher {
    calls: Cell<usize>,
}

impl ContentHasher for CountingHasher {
    fn hash_file(&self, path: &Path) -> Result<Option<String>, HashError> {
        self.calls.set(self.calls.get() + 1);
        Hasher::new().hash_file(path)
    }
}

fn observe(root: &Path) -> Vec<FileRecord> {
    Walker::new(root, WalkerConfig::default())
        .collect_files()
        .unwrap()
        .into_iter()
        .map(FileRecord::from)
        .collect()
}

#[test]
fn test_same_size_different_hash_is_new() {
    let dir = tempdir().unwrap();
    let indexed = write_file(dir.path(), "library/a.txt", b"test");
    write_file(dir.path(), "incoming/b.txt", b"best");

    let mut index = SqliteIndex::create(&dir.path().join("i.db")).unwrap();
    index.insert(&hashed_record(&indexed)).unwrap();

    let observed = observe(&dir.path().join("incoming"));
    let result = compare_against_index(&index, Hasher::new(), observed).unwrap();

    assert!(result.duplicate_files.is_empty());
    assert_eq!(result.new_files.len(), 1);
    assert_ne!(result.new_files[0].hash, hashed_record(&indexed).hash);
}

#[test]
fn test_identical_content_elsewhere_is_duplicate() {
    let dir = tempdir().unwrap();
    let indexed = write_file(dir.path(), "library/photo.jpg", b"jpeg bytes");
    let copy = write_file(dir.path(), "incoming/nested/renamed.jpg", b"jpeg bytes");

    let mut index = SqliteIndex::create_in_memory().unwrap();
    index.insert(&hashed_record(&indexed)).unwrap();

    let result =
        compare_against_index(&index, Hasher::new(), observe(&dir.path().join("incoming")))
            .unwrap();
    assert_eq!(result.duplicate_files.len(), 1);
    assert_eq!(result.duplicate_files[0].filepath, copy);
    assert!(result.new_files.is_empty());
}

#[test]
fn test_only_colliding_sizes_are_hashed() {
    let dir = tempdir().unwrap();
    let mut index = SqliteIndex::create_in_memory().unwrap();
    index
        .insert_many(&[
            hashed_record(&write_file(dir.path(), "library/four", b"1234")),
            hashed_record(&write_file(dir.path(), "library/six", b"123456")),
        ])
        .unwrap();

    write_file(dir.path(), "incoming/a", b"1");
    write_file(dir.path(), "incoming/b", b"22");
    write_file(dir.path(), "incoming/c", b"abcd");
    write_file(dir.path(), "incoming/d", b"1234567");

    let hasher = CountingHasher {
        calls: Cell::new(0),
    };
    let result = IndexMatcher::with_hasher(&hasher)
        .compare_against_index(&index, observe(&dir.path().join("incoming")))
        .unwrap();

    assert_eq!(hasher.calls.get(), 1);
    assert_eq!(result.summary.hashed_files, 1);
    assert_eq!(result.new_files.len(), 4);
    let hashed: Vec<_> = result.new_files.iter().filter(|r| r.is_hashed()).collect();
    assert_eq!(hashed.len(), 1);
    assert!(hashed[0].filepath.ends_with("c"));
}

#[test]
fn test_new_files_can_be_filled_and_inserted() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "incoming/a", b"alpha");
    write_file(dir.path(), "incoming/b", b"bravo-bravo");

    let mut index = SqliteIndex::create_in_memory().unwrap();
    let matcher = IndexMatcher::new();
    let mut result = matcher
        .compare_against_index(&index, observe(&dir.path().join("incoming")))
        .unwrap();
    assert_eq!(result.new_files.len(), 2);

    assert_eq!(matcher.fill_hashes(&mut result.new_files).unwrap(), 2);
    assert_eq!(index.insert_many(&result.new_files).unwrap(), 2);

    // A second pass over the same files now finds them all
    let again = matcher
        .compare_against_index(&index, observe(&dir.path().join("incoming")))
        .unwrap();
    assert_eq!(again.duplicate_files.len(), 2);
    assert!(again.new_files.is_empty());
}
