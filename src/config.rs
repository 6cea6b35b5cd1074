//! Environment-driven database configuration.
//!
//! Resolution order: `FOODSHARE_DB_PATH` names the file outright; otherwise
//! the file is `<FOODSHARE_DB_DIR>/<DB_NAME>.sqlite3` with defaults `.` and
//! `food_wastage`. Binaries may override the result with `--db`.

use std::env;
use std::path::PathBuf;

pub const DB_PATH_VAR: &str = "FOODSHARE_DB_PATH";
pub const DB_DIR_VAR: &str = "FOODSHARE_DB_DIR";
pub const DB_NAME_VAR: &str = "DB_NAME";

const DEFAULT_DB_NAME: &str = "food_wastage";
const DB_EXTENSION: &str = "sqlite3";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbConfig {
    pub path: PathBuf,
}

impl DbConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(path) = get(DB_PATH_VAR) {
            return Self::new(path);
        }

        let dir = get(DB_DIR_VAR).map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."));
        let name = get(DB_NAME_VAR).unwrap_or_else(|| DEFAULT_DB_NAME.to_string());
        Self::new(dir.join(format!("{name}.{DB_EXTENSION}")))
    }

    /// Apply a command-line override on top of the environment.
    pub fn with_override(self, path: Option<PathBuf>) -> Self {
        match path {
            Some(path) => Self::new(path),
            None => self,
        }
    }
}
