use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::PathBuf;

use dupfinder::index::{CandidateIndex, FileRecord, IndexError, SqliteIndex};
use tempfile::tempdir;

use super::support::{hashed_record, write_file};

#[test]
fn test_round_trip_through_reopen() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("files.db");
    let file = write_file(dir.path(), "data/a.txt", b"test");
    let record = hashed_record(&file);

    let mut index = SqliteIndex::create(&db).unwrap();
    index.insert(&record).unwrap();
    index.close().unwrap();

    let index = SqliteIndex::open(&db).unwrap();
    assert_eq!(index.lookup_by_size(4).unwrap(), vec![record]);
    assert!(index.lookup_by_size(5).unwrap().is_empty());
    index.close().unwrap();
}

#[test]
fn test_create_never_overwrites() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("files.db");

    let mut index = SqliteIndex::create(&db).unwrap();
    index
        .insert(&FileRecord::with_hash(PathBuf::from("/x"), 1, "00000000000000aa"))
        .unwrap();
    index.close().unwrap();

    let err = SqliteIndex::create(&db).unwrap_err();
    assert!(matches!(err, IndexError::AlreadyExists(_)));
    assert!(err.is_conflict());

    let index = SqliteIndex::open(&db).unwrap();
    assert_eq!(index.len().unwrap(), 1);
}

#[test]
fn test_open_missing_is_conflict() {
    let dir = tempdir().unwrap();
    let err = SqliteIndex::open(&dir.path().join("nope.db")).unwrap_err();
    assert!(matches!(err, IndexError::NotFound(_)));
    assert!(err.is_conflict());
}

#[test]
fn test_unhashed_insert_fails_fast_without_writing() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("files.db");
    let mut index = SqliteIndex::create(&db).unwrap();

    let unhashed = FileRecord::new(PathBuf::from("/a"), 4);
    let result = catch_unwind(AssertUnwindSafe(|| index.insert(&unhashed)));
    assert!(result.is_err());

    let batch = vec![
        FileRecord::with_hash(PathBuf::from("/ok"), 4, "0000000000000001"),
        FileRecord::with_hash(PathBuf::from("/empty"), 4, ""),
    ];
    let result = catch_unwind(AssertUnwindSafe(|| index.insert_many(&batch)));
    assert!(result.is_err());

    assert!(index.is_empty().unwrap());
}

#[test]
fn test_bucket_order_is_insertion_order() {
    let dir = tempdir().unwrap();
    let mut index = SqliteIndex::create(&dir.path().join("files.db")).unwrap();

    let records: Vec<FileRecord> = (0..5)
        .map(|i| FileRecord::with_hash(PathBuf::from(format!("/f{}", i)), 8, format!("{:016x}", i)))
        .collect();
    assert_eq!(index.insert_many(&records).unwrap(), 5);
    index
        .insert(&FileRecord::with_hash(PathBuf::from("/other"), 9, "ff"))
        .unwrap();

    assert_eq!(index.lookup_by_size(8).unwrap(), records);
    assert_eq!(index.lookup_by_size(8).unwrap(), index.lookup_by_size(8).unwrap());
}

#[test]
fn test_reindexing_keeps_history() {
    let dir = tempdir().unwrap();
    let file = write_file(dir.path(), "a.txt", b"abcd");
    let mut index = SqliteIndex::create_in_memory().unwrap();

    index.insert(&hashed_record(&file)).unwrap();
    index.insert(&hashed_record(&file)).unwrap();

    let bucket = index.lookup_by_size(4).unwrap();
    assert_eq!(bucket.len(), 2);
    assert_eq!(bucket[0], bucket[1]);
}
