//! Running catalog reports and exporting their results.

use crate::catalog::{ParamOverrides, ReportEntry, ReportKey};
use crate::error::Result;
use crate::query::{ResultTable, execute_read};
use rusqlite::Connection;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ReportOutput {
    pub key: ReportKey,
    pub description: String,
    pub table: ResultTable,
}

/// Bind `entry` against `overrides` and run it read-only.
pub fn run_report(
    conn: &Connection,
    entry: &ReportEntry,
    overrides: &ParamOverrides,
) -> Result<ReportOutput> {
    let bindings = entry.bind(overrides)?;
    let table = execute_read(conn, entry.sql(), Some(&bindings))?;
    Ok(ReportOutput {
        key: entry.key().clone(),
        description: entry.description().to_string(),
        table,
    })
}

/// Write `output` to `<dir>/<key>.csv`, creating `dir` if needed.
pub fn export_csv(output: &ReportOutput, dir: &Path) -> Result<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.csv", output.key));
    output.table.write_csv_file(&path)?;
    Ok(path)
}
