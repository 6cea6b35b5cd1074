//! Scoped connections to the SQLite store.
//!
//! A [`Database`] is only a connection descriptor. Each user action calls
//! [`Database::connect`], does its work, and drops the connection on every
//! exit path.

use crate::config::DbConfig;
use crate::error::{Error, Result};
use crate::schema;
use rusqlite::{Connection, OpenFlags, Transaction};
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    pub fn new(config: &DbConfig) -> Self {
        Self {
            path: config.path.clone(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open a connection with foreign-key enforcement switched on.
    pub fn connect(&self) -> Result<Connection> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_CREATE
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags).map_err(|e| self.connection_error(e))?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")
            .map_err(|e| self.connection_error(e))?;
        debug!(path = %self.path.display(), "opened connection");
        Ok(conn)
    }

    /// Create any missing tables.
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        schema::ensure_schema(&conn)
    }

    /// Run `work` inside a transaction that commits on `Ok` and rolls back otherwise.
    pub fn with_transaction<T, F>(&self, work: F) -> Result<T>
    where
        F: FnOnce(&Transaction<'_>) -> Result<T>,
    {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let value = work(&tx)?;
        tx.commit()?;
        Ok(value)
    }

    fn connection_error(&self, err: rusqlite::Error) -> Error {
        Error::Connection {
            path: self.path.clone(),
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_db() -> (TempDir, Database) {
        let dir = TempDir::new().unwrap();
        let db = Database::new(&DbConfig::new(dir.path().join("test.sqlite3")));
        db.ensure_schema().unwrap();
        (dir, db)
    }

    fn provider_count(db: &Database) -> i64 {
        db.connect()
            .unwrap()
            .query_row("SELECT COUNT(*) FROM providers", [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn connections_enforce_foreign_keys() {
        let (_dir, db) = temp_db();
        let conn = db.connect().unwrap();
        let enabled: i64 = conn
            .query_row("PRAGMA foreign_keys", [], |r| r.get(0))
            .unwrap();
        assert_eq!(enabled, 1);
    }

    #[test]
    fn failed_work_rolls_back() {
        let (_dir, db) = temp_db();
        let result: Result<()> = db.with_transaction(|tx| {
            tx.execute("INSERT INTO providers (Provider_ID) VALUES (1)", [])?;
            tx.execute("INSERT INTO providers (Provider_ID) VALUES (1)", [])?;
            Ok(())
        });
        assert!(result.unwrap_err().is_constraint());
        assert_eq!(provider_count(&db), 0);
    }

    #[test]
    fn successful_work_commits() {
        let (_dir, db) = temp_db();
        db.with_transaction(|tx| {
            tx.execute("INSERT INTO providers (Provider_ID) VALUES (7)", [])?;
            Ok(())
        })
        .unwrap();
        assert_eq!(provider_count(&db), 1);
    }

    #[test]
    fn unopenable_path_is_a_connection_error() {
        let dir = TempDir::new().unwrap();
        let db = Database::new(&DbConfig::new(dir.path().join("missing/dir/db.sqlite3")));
        assert!(matches!(db.connect(), Err(Error::Connection { .. })));
    }
}
