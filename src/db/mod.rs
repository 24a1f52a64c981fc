//! Database layer: the read-only legacy source and the writable site
//! destination, both SQLite.

pub mod legacy;
pub mod record;
pub mod site;

use anyhow::{Context, Result};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

pub use legacy::LegacyDb;
pub use record::Record;
pub use site::SiteDb;

/// Database handle wrapping a SQLite connection.
///
/// The importer is single-threaded, so the connection is owned directly
/// and dropped together with the handle.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open an existing database file for reading and writing.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open database {}", path.display()))?;

        conn.execute_batch(
            "PRAGMA foreign_keys=ON;
             PRAGMA busy_timeout=5000;",
        )?;

        Ok(Self { conn })
    }

    /// Open an existing database file read-only, unlocking it first when a
    /// key is given.
    pub fn open_read_only<P: AsRef<Path>>(path: P, key: Option<&str>) -> Result<Self> {
        let path = path.as_ref();
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open database {}", path.display()))?;

        // Must run before any other statement. Plain SQLite ignores it.
        if let Some(key) = key {
            conn.pragma_update(None, "key", key)?;
        }

        // Fail here rather than in the first stage when the key is wrong.
        conn.query_row("SELECT COUNT(*) FROM sqlite_master", [], |row| {
            row.get::<_, i64>(0)
        })
        .with_context(|| format!("failed to read schema of {}", path.display()))?;

        Ok(Self { conn })
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        Ok(Self {
            conn: Connection::open_in_memory()?,
        })
    }

    /// Wrap an already configured connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self { conn }
    }

    /// Execute a function with access to the connection.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        f(&self.conn)
    }

    /// Count the rows of a table.
    pub fn count(&self, table: &str) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(table)?);
        self.with_conn(|conn| {
            conn.query_row(&sql, [], |row| row.get(0))
                .with_context(|| format!("failed to count rows of {}", table))
        })
    }
}

/// Quote an identifier for interpolation into SQL.
///
/// Only ASCII letters, digits and underscores are accepted, which covers
/// every table and column in both schemas.
pub fn quote_ident(name: &str) -> crate::error::ImportResult<String> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if valid {
        Ok(format!("\"{}\"", name))
    } else {
        Err(crate::error::ImportError::InvalidTableName(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_ident() {
        assert_eq!(quote_ident("tbl_user").unwrap(), "\"tbl_user\"");
        assert!(quote_ident("").is_err());
        assert!(quote_ident("user; DROP TABLE x").is_err());
        assert!(quote_ident("a\"b").is_err());
    }

    #[test]
    fn test_count() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute_batch("CREATE TABLE t (id INTEGER); INSERT INTO t VALUES (1), (2);")?;
            Ok(())
        })
        .unwrap();
        assert_eq!(db.count("t").unwrap(), 2);
    }

    #[test]
    fn test_open_read_only_rejects_writes() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("legacy.db");
        Connection::open(&path)
            .unwrap()
            .execute_batch("CREATE TABLE t (id INTEGER);")
            .unwrap();

        let db = Database::open_read_only(&path, None).unwrap();
        let result = db.with_conn(|conn| Ok(conn.execute("INSERT INTO t VALUES (1)", [])?));
        assert!(result.is_err());
    }

    #[test]
    fn test_open_missing_file_fails() {
        let dir = tempfile::TempDir::new().unwrap();
        assert!(Database::open(dir.path().join("missing.db")).is_err());
    }
}
