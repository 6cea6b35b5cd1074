//! Parameterized statement execution.
//!
//! Values are bound to the statement's own placeholders by index, never
//! spliced into SQL text. Every placeholder must be bound and every binding
//! must match a placeholder; SQLite would otherwise bind the gap as NULL.

use crate::error::{Error, Result};
use crate::query::{Bindings, ResultTable, SqlValue};
use rusqlite::{Connection, Statement};
use std::collections::BTreeSet;
use tracing::debug;

/// Run a query and collect its rows. `None` and an empty mapping are equivalent.
pub fn execute(conn: &Connection, sql: &str, bindings: Option<&Bindings>) -> Result<ResultTable> {
    let mut stmt = prepare_bound(conn, sql, bindings)?;
    collect_rows(&mut stmt)
}

/// Like [`execute`], but refuses statements that would modify the database.
pub fn execute_read(
    conn: &Connection,
    sql: &str,
    bindings: Option<&Bindings>,
) -> Result<ResultTable> {
    let mut stmt = prepare_bound(conn, sql, bindings)?;
    if !stmt.readonly() {
        return Err(Error::NotReadOnly);
    }
    collect_rows(&mut stmt)
}

/// Run a data-modifying statement and return the number of affected rows.
pub fn execute_write(conn: &Connection, sql: &str, bindings: Option<&Bindings>) -> Result<usize> {
    let mut stmt = prepare_bound(conn, sql, bindings)?;
    Ok(stmt.raw_execute()?)
}

fn prepare_bound<'c>(
    conn: &'c Connection,
    sql: &str,
    bindings: Option<&Bindings>,
) -> Result<Statement<'c>> {
    debug!(sql, bindings = ?bindings, "executing");
    let mut stmt = conn.prepare(sql)?;
    let empty = Bindings::new();
    let bindings = bindings.unwrap_or(&empty);

    let mut used: BTreeSet<&str> = BTreeSet::new();
    for idx in 1..=stmt.parameter_count() {
        let placeholder = stmt
            .parameter_name(idx)
            .map(str::to_string)
            .unwrap_or_else(|| format!("?{idx}"));
        let name = placeholder
            .strip_prefix([':', '@', '$'])
            .unwrap_or(placeholder.as_str());
        let (key, value) = bindings
            .get_key_value(name)
            .ok_or_else(|| Error::MissingParameter(name.to_string()))?;
        stmt.raw_bind_parameter(idx, value)?;
        used.insert(key.as_str());
    }

    if let Some(extra) = bindings.keys().find(|k| !used.contains(k.as_str())) {
        return Err(Error::UnexpectedParameter(extra.clone()));
    }
    Ok(stmt)
}

fn collect_rows(stmt: &mut Statement<'_>) -> Result<ResultTable> {
    let columns: Vec<String> = stmt.column_names().into_iter().map(String::from).collect();
    let width = columns.len();
    let mut table = ResultTable::new(columns);
    let mut rows = stmt.raw_query();
    while let Some(row) = rows.next()? {
        let mut cells = Vec::with_capacity(width);
        for idx in 0..width {
            cells.push(SqlValue::from(row.get_ref(idx)?));
        }
        table.rows.push(cells);
    }
    Ok(table)
}
