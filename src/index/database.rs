//! SQLite-backed candidate index.
//!
//! # Layout
//!
//! One table, `records(filepath TEXT, size INTEGER, hash TEXT)`, plus a
//! non-unique index on `size` to serve [`CandidateIndex::lookup_by_size`].
//! `PRAGMA user_version` carries [`SCHEMA_VERSION`].
//!
//! Paths are stored as text when they are valid UTF-8. Any other path is
//! stored as a blob of its raw bytes on Unix, so it reads back unchanged.
//! Elsewhere such a path is rejected with [`IndexError::NonUtf8Path`].

use std::path::{Path, PathBuf};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, Value, ValueRef};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, Row};

use super::{require_hash, CandidateIndex, FileRecord, IndexError, IndexResult};

/// Schema version written by [`SqliteIndex::create`].
pub const SCHEMA_VERSION: i64 = 1;

const SCHEMA_SQL: &str = "
    CREATE TABLE records (
        filepath TEXT NOT NULL,
        size     INTEGER NOT NULL,
        hash     TEXT NOT NULL
    );
    CREATE INDEX records_size_idx ON records(size);
    PRAGMA user_version = 1;
";

const INSERT_SQL: &str = "INSERT INTO records (filepath, size, hash) VALUES (?1, ?2, ?3)";

const LOOKUP_BY_SIZE_SQL: &str =
    "SELECT filepath, size, hash FROM records WHERE size = ?1 ORDER BY rowid";

/// Candidate index stored in a single SQLite file.
///
/// The handle owns the connection exclusively; no locking beyond what SQLite
/// does itself is layered on top.
///
/// # Example
///
/// ```no_run
/// use dupfinder::index::{CandidateIndex, FileRecord, SqliteIndex};
/// use std::path::{Path, PathBuf};
///
/// let mut index = SqliteIndex::create(Path::new("/tmp/files.db")).unwrap();
/// index
///     .insert(&FileRecord::with_hash(PathBuf::from("/a.txt"), 4, "4fdcca5ddb678139"))
///     .unwrap();
/// assert_eq!(index.lookup_by_size(4).unwrap().len(), 1);
/// index.close().unwrap();
/// ```
#[derive(Debug)]
pub struct SqliteIndex {
    conn: Connection,
    location: Option<PathBuf>,
}

impl SqliteIndex {
    /// Create a new, empty index at `path`.
    ///
    /// # Errors
    ///
    /// [`IndexError::AlreadyExists`] if anything exists at `path`; an
    /// existing index is never overwritten.
    pub fn create(path: &Path) -> IndexResult<Self> {
        if path.symlink_metadata().is_ok() {
            log::debug!("Refusing to create index over {}", path.display());
            return Err(IndexError::AlreadyExists(path.to_path_buf()));
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA_SQL)?;
        log::info!("Created index at {}", path.display());

        Ok(Self {
            conn,
            location: Some(path.to_path_buf()),
        })
    }

    /// Create an empty index that lives only as long as the handle.
    pub fn create_in_memory() -> IndexResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA_SQL)?;
        Ok(Self {
            conn,
            location: None,
        })
    }

    /// Open an index previously made by [`SqliteIndex::create`].
    ///
    /// # Errors
    ///
    /// - [`IndexError::NotFound`] if no file exists at `path`
    /// - [`IndexError::NotAnIndex`] if the file is not an index
    pub fn open(path: &Path) -> IndexResult<Self> {
        if !path.is_file() {
            return Err(IndexError::NotFound(path.to_path_buf()));
        }

        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn =
            Connection::open_with_flags(path, flags).map_err(|e| classify_open_error(e, path))?;

        let tables: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'records'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| classify_open_error(e, path))?;
        if tables == 0 {
            return Err(IndexError::NotAnIndex(path.to_path_buf()));
        }

        let version: i64 = conn.query_row("PRAGMA user_version", [], |row| row.get(0))?;
        if version != SCHEMA_VERSION {
            // The table layout is all that lookups rely on
            log::debug!(
                "Index {} has schema version {}, expected {}",
                path.display(),
                version,
                SCHEMA_VERSION
            );
        }

        log::debug!("Opened index at {}", path.display());
        Ok(Self {
            conn,
            location: Some(path.to_path_buf()),
        })
    }

    /// Where this index is stored, `None` for in-memory indexes.
    #[must_use]
    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Number of stored records.
    pub fn len(&self) -> IndexResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM records", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Whether the index holds no records.
    pub fn is_empty(&self) -> IndexResult<bool> {
        Ok(self.len()? == 0)
    }

    fn row_to_record(row: &Row<'_>) -> rusqlite::Result<FileRecord> {
        let StoredPath(filepath) = row.get(0)?;
        let size: i64 = row.get(1)?;
        let size = u64::try_from(size).map_err(|_| rusqlite::Error::IntegralValueOutOfRange(1, size))?;
        let hash: String = row.get(2)?;
        Ok(FileRecord::with_hash(filepath, size, hash))
    }
}

/// A `filepath` column value, either text or raw bytes.
struct StoredPath(PathBuf);

impl FromSql for StoredPath {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        match value {
            ValueRef::Text(bytes) | ValueRef::Blob(bytes) => path_from_bytes(bytes).map(Self),
            _ => Err(FromSqlError::InvalidType),
        }
    }
}

#[cfg(unix)]
fn path_from_bytes(bytes: &[u8]) -> FromSqlResult<PathBuf> {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    Ok(PathBuf::from(OsStr::from_bytes(bytes)))
}

#[cfg(not(unix))]
fn path_from_bytes(bytes: &[u8]) -> FromSqlResult<PathBuf> {
    std::str::from_utf8(bytes)
        .map(PathBuf::from)
        .map_err(|e| FromSqlError::Other(Box::new(e)))
}

fn path_param(path: &Path) -> IndexResult<Value> {
    match path.to_str() {
        Some(text) => Ok(Value::Text(text.to_owned())),
        None => raw_path_param(path),
    }
}

#[cfg(unix)]
fn raw_path_param(path: &Path) -> IndexResult<Value> {
    use std::os::unix::ffi::OsStrExt;

    Ok(Value::Blob(path.as_os_str().as_bytes().to_vec()))
}

#[cfg(not(unix))]
fn raw_path_param(path: &Path) -> IndexResult<Value> {
    Err(IndexError::NonUtf8Path(path.to_path_buf()))
}

fn classify_open_error(error: rusqlite::Error, path: &Path) -> IndexError {
    match error {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::NotADatabase => {
            IndexError::NotAnIndex(path.to_path_buf())
        }
        e => IndexError::Database(e),
    }
}

fn size_param(size: u64) -> IndexResult<i64> {
    i64::try_from(size).map_err(|_| IndexError::SizeOutOfRange(size))
}

/// Validated column values for one insert.
fn insert_params(record: &FileRecord) -> IndexResult<(Value, i64, &str)> {
    require_hash(record);
    let size = size_param(record.size)?;
    let filepath = path_param(&record.filepath)?;
    let hash = record.digest().unwrap_or_default();
    Ok((filepath, size, hash))
}

impl CandidateIndex for SqliteIndex {
    fn insert(&mut self, record: &FileRecord) -> IndexResult<()> {
        let (filepath, size, hash) = insert_params(record)?;
        self.conn.execute(INSERT_SQL, params![filepath, size, hash])?;
        log::trace!("Indexed {} ({} bytes)", record.filepath.display(), size);
        Ok(())
    }

    fn insert_many(&mut self, records: &[FileRecord]) -> IndexResult<usize> {
        // Validate everything up front so a bad record leaves no partial batch
        let rows = records
            .iter()
            .map(insert_params)
            .collect::<IndexResult<Vec<_>>>()?;

        let tx = self.conn.transaction()?;
        {
            let mut stmt = tx.prepare_cached(INSERT_SQL)?;
            for (filepath, size, hash) in &rows {
                stmt.execute(params![filepath, size, hash])?;
            }
        }
        tx.commit()?;

        log::debug!("Indexed {} records", rows.len());
        Ok(rows.len())
    }

    fn lookup_by_size(&self, size: u64) -> IndexResult<Vec<FileRecord>> {
        let Ok(size) = i64::try_from(size) else {
            // Nothing this large can have been stored
            return Ok(Vec::new());
        };

        let mut stmt = self.conn.prepare_cached(LOOKUP_BY_SIZE_SQL)?;
        let records = stmt
            .query_map(params![size], Self::row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(records)
    }

    fn close(self) -> IndexResult<()> {
        let location = self.location;
        self.conn.close().map_err(|(_, e)| IndexError::Database(e))?;
        if let Some(path) = location {
            log::debug!("Closed index at {}", path.display());
        }
        Ok(())
    }
}
