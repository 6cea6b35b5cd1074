//! Error taxonomy for database-facing operations.
//!
//! Every fallible call into the store returns [`Error`]. Binaries catch these
//! at the boundary of each user action and print them; nothing here retries.

use crate::catalog::{ParamName, ReportKey};
use rusqlite::ErrorCode;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// The database file could not be opened or configured.
    #[error("unable to connect to {path}: {message}")]
    Connection { path: PathBuf, message: String },

    /// Duplicate key, missing foreign key or CHECK failure reported by the engine.
    #[error("constraint violation: {0}")]
    Constraint(String),

    /// Malformed SQL, unknown table/column, or a type mismatch.
    #[error("query failed: {0}")]
    Sql(String),

    #[error("report '{0}' not found in catalog")]
    ReportNotFound(ReportKey),

    #[error("report '{report}' does not declare parameter '{param}'")]
    UnknownParameter { report: ReportKey, param: ParamName },

    #[error("query placeholder ':{0}' has no bound value")]
    MissingParameter(String),

    #[error("binding ':{0}' does not match any placeholder in the query")]
    UnexpectedParameter(String),

    #[error("refusing to run a statement that writes through the read path")]
    NotReadOnly,

    #[error("food listing {0} does not exist")]
    ListingNotFound(i64),

    /// A whole input file is unusable.
    #[error("{0}")]
    InvalidInput(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, message)
                if inner.code == ErrorCode::ConstraintViolation =>
            {
                Error::Constraint(message.clone().unwrap_or_else(|| err.to_string()))
            }
            _ => Error::Sql(err.to_string()),
        }
    }
}

impl Error {
    pub fn is_constraint(&self) -> bool {
        matches!(self, Error::Constraint(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_failures_are_classified() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER PRIMARY KEY); INSERT INTO t VALUES (1);")
            .unwrap();
        let err: Error = conn
            .execute("INSERT INTO t VALUES (1)", [])
            .unwrap_err()
            .into();
        assert!(err.is_constraint(), "got {err:?}");
        assert!(err.to_string().contains("UNIQUE"));
    }

    #[test]
    fn other_failures_are_sql_errors() {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        let err: Error = conn
            .prepare("SELECT * FROM missing_table")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Sql(ref msg) if msg.contains("missing_table")));
    }
}
