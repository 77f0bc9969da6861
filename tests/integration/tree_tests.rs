use dupfinder::duplicates::{find_duplicates_in_tree, DuplicateFinder, FinderConfig};
use dupfinder::scanner::WalkerConfig;
use tempfile::tempdir;

use super::support::write_file;

#[test]
fn test_survivors_and_duplicates_scenario() {
    let dir = tempdir().unwrap();
    let root = dir.path().join("dir1");
    let file1 = write_file(&root, "file1", b"test");
    let file2 = write_file(&root, "file2", b"same");
    let file3 = write_file(&root, "file3", b"same");

    let outcome = find_duplicates_in_tree(&root, false).unwrap();

    assert_eq!(outcome.survivors, vec![file1, file2]);
    assert_eq!(outcome.duplicates, vec![file3]);
}

#[test]
fn test_deletion_safety() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a/one.bin", b"payload");
    write_file(dir.path(), "a/two.bin", b"payload");
    write_file(dir.path(), "b/three.bin", b"payload");
    write_file(dir.path(), "b/other.bin", b"different");
    write_file(dir.path(), "c/empty1", b"");
    write_file(dir.path(), "c/empty2", b"");

    let outcome = find_duplicates_in_tree(dir.path(), true).unwrap();

    assert_eq!(outcome.duplicates.len(), 3);
    assert_eq!(outcome.deleted, 3);
    for path in &outcome.duplicates {
        assert!(!path.exists(), "{} should be gone", path.display());
    }
    for path in &outcome.survivors {
        assert!(path.exists(), "{} should remain", path.display());
    }
    assert_eq!(outcome.survivors.len(), 3);
}

#[test]
fn test_nothing_deleted_without_flag() {
    let dir = tempdir().unwrap();
    let a = write_file(dir.path(), "a", b"x");
    let b = write_file(dir.path(), "b", b"x");

    let outcome = find_duplicates_in_tree(dir.path(), false).unwrap();
    assert_eq!(outcome.duplicates, vec![b.clone()]);
    assert_eq!(outcome.deleted, 0);
    assert!(a.exists());
    assert!(b.exists());
}

#[test]
fn test_deep_nesting() {
    let dir = tempdir().unwrap();
    let top = write_file(dir.path(), "top.txt", b"deep content");
    let deep = write_file(dir.path(), "l1/l2/l3/l4/l5/deep.txt", b"deep content");

    let outcome = find_duplicates_in_tree(dir.path(), false).unwrap();
    // "l1" sorts before "top.txt"
    assert_eq!(outcome.survivors, vec![deep]);
    assert_eq!(outcome.duplicates, vec![top]);
    assert_eq!(outcome.summary.total_files, 2);
}

#[test]
fn test_repeated_runs_are_deterministic() {
    let dir = tempdir().unwrap();
    for (name, content) in [("q", "1"), ("w", "2"), ("e", "1"), ("r/t", "2"), ("y", "1")] {
        write_file(dir.path(), name, content.as_bytes());
    }

    let first = find_duplicates_in_tree(dir.path(), false).unwrap();
    let second = find_duplicates_in_tree(dir.path(), false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_skip_hidden() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "visible", b"same");
    write_file(dir.path(), ".hidden/copy", b"same");

    let config = FinderConfig::default().with_walker_config(WalkerConfig::new(false, true, false));
    let outcome = DuplicateFinder::new(config)
        .find_duplicates_in_tree(dir.path())
        .unwrap();
    assert!(outcome.duplicates.is_empty());
    assert_eq!(outcome.survivors.len(), 1);
}
