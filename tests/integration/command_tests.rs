use clap::Parser;
use dupfinder::cli::Cli;
use dupfinder::error::ExitCode;
use dupfinder::index::{CandidateIndex, SqliteIndex};
use dupfinder::run_app;
use tempfile::tempdir;

use super::support::write_file;

fn run(args: &[&str]) -> ExitCode {
    let mut argv = vec!["dupfinder", "-q"];
    argv.extend_from_slice(args);
    run_app(Cli::try_parse_from(argv).unwrap()).unwrap()
}

#[test]
fn test_create_db_twice_is_nothing_done() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("i.db");
    let db = db.to_str().unwrap();

    assert_eq!(run(&["create-db", "-d", db]), ExitCode::Success);
    assert_eq!(run(&["create-db", "-d", db]), ExitCode::NothingDone);
}

#[test]
fn test_check_without_index_is_nothing_done() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("missing.db");

    let code = run(&["check-dir", "-d", db.to_str().unwrap(), dir.path().to_str().unwrap()]);
    assert_eq!(code, ExitCode::NothingDone);
    assert!(!db.exists());
}

#[test]
fn test_index_check_delete_and_add() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("i.db");
    let db = db.to_str().unwrap();
    let library = dir.path().join("library");
    let incoming = dir.path().join("incoming");
    write_file(&library, "a.txt", b"already known");
    let copy = write_file(&incoming, "copy.txt", b"already known");
    let fresh = write_file(&incoming, "fresh.txt", b"not seen before");

    assert_eq!(run(&["create_db", "--use_db", db]), ExitCode::Success);
    assert_eq!(
        run(&["index-dir", "-d", db, library.to_str().unwrap()]),
        ExitCode::Success
    );
    assert_eq!(
        run(&[
            "check-dir",
            "-d",
            db,
            "--delete-dup-files",
            "-a",
            incoming.to_str().unwrap(),
        ]),
        ExitCode::Success
    );

    assert!(!copy.exists());
    assert!(fresh.exists());

    let index = SqliteIndex::open(std::path::Path::new(db)).unwrap();
    assert_eq!(index.len().unwrap(), 2);
    let bucket = index.lookup_by_size(15).unwrap();
    assert_eq!(bucket.len(), 1);
    assert_eq!(bucket[0].filepath, fresh);

    // Everything left under incoming is now indexed
    assert_eq!(
        run(&["check-dir", "-d", db, incoming.to_str().unwrap()]),
        ExitCode::Success
    );
}

#[test]
fn test_check_with_no_duplicates() {
    let dir = tempdir().unwrap();
    let db = dir.path().join("i.db");
    let db = db.to_str().unwrap();
    let incoming = dir.path().join("incoming");
    write_file(&incoming, "only.txt", b"unique");

    run(&["create-db", "-d", db]);
    assert_eq!(
        run(&["check-dir", "-d", db, incoming.to_str().unwrap()]),
        ExitCode::NoDuplicates
    );
}

#[test]
fn test_find_dups_in_dir_exit_codes() {
    let dir = tempdir().unwrap();
    write_file(dir.path(), "a", b"one");
    let root = dir.path().to_str().unwrap();

    assert_eq!(run(&["find-dups-in-dir", root]), ExitCode::NoDuplicates);

    let b = write_file(dir.path(), "b", b"one");
    assert_eq!(
        run(&["find-dups-in-dir", "--delete-dup-files", root]),
        ExitCode::Success
    );
    assert!(!b.exists());
    assert_eq!(run(&["find-dups-in-dir", root]), ExitCode::NoDuplicates);
}

#[test]
fn test_missing_directory_is_error() {
    let dir = tempdir().unwrap();
    let missing = dir.path().join("missing");
    let cli = Cli::try_parse_from(["dupfinder", "-q", "find-dups-in-dir", missing.to_str().unwrap()])
        .unwrap();

    let err = run_app(cli).unwrap_err();
    assert!(format!("{:#}", err).contains("Path not found"));
}
