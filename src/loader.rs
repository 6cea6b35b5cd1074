//! CSV bulk loader.
//!
//! Loading is append-only. Within one file the first row for a primary key
//! wins and later duplicates are dropped and counted. A row whose key is
//! already in the table is rejected and reported, never upserted. Rows the
//! engine refuses (for example a dangling foreign key) are rejected with the
//! engine message while the rest of the file still loads.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::query::SqlValue;
use crate::schema::{self, ColumnKind, ColumnSpec, TableSpec};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rusqlite::{Connection, params_from_iter};
use std::collections::BTreeSet;
use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{info, warn};

/// Standard input files, in load order.
pub const SOURCE_FILES: [(&TableSpec, &str); 4] = [
    (&schema::PROVIDERS, "providers_data.csv"),
    (&schema::RECEIVERS, "receivers_data.csv"),
    (&schema::FOOD_LISTINGS, "food_listings_data.csv"),
    (&schema::CLAIMS, "claims_data.csv"),
];

// Cells treated as missing.
const NULL_MARKERS: &[&str] = &["", "NA", "N/A", "NaN", "nan", "null", "NULL", "None"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%m-%Y", "%d %b %Y"];
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRejection {
    /// 1-based line in the source file.
    pub line: u64,
    pub key: Option<i64>,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    pub table: &'static str,
    pub rows_read: usize,
    pub inserted: usize,
    pub duplicates_dropped: usize,
    pub rejected: Vec<RowRejection>,
}

impl LoadReport {
    fn new(table: &'static str) -> Self {
        Self {
            table,
            rows_read: 0,
            inserted: 0,
            duplicates_dropped: 0,
            rejected: Vec::new(),
        }
    }

    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }

    fn reject(&mut self, line: u64, key: Option<i64>, reason: impl Into<String>) {
        let reason = reason.into();
        warn!(table = self.table, line, key, %reason, "rejected row");
        self.rejected.push(RowRejection { line, key, reason });
    }
}

impl fmt::Display for LoadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Loaded {} of {} rows into {} ({} duplicate(s) dropped, {} rejected)",
            self.inserted,
            self.rows_read,
            self.table,
            self.duplicates_dropped,
            self.rejected.len()
        )
    }
}

/// Load the four standard CSV files from `dir` in foreign-key order.
///
/// All files must exist before anything is loaded.
pub fn load_all(db: &Database, dir: &Path) -> Result<Vec<LoadReport>> {
    if let Some((_, missing)) = SOURCE_FILES
        .iter()
        .find(|(_, file)| !dir.join(file).is_file())
    {
        return Err(Error::InvalidInput(format!(
            "missing input file {}",
            dir.join(missing).display()
        )));
    }

    let mut conn = db.connect()?;
    let mut reports = Vec::with_capacity(SOURCE_FILES.len());
    for (spec, file) in SOURCE_FILES {
        reports.push(load_csv(&mut conn, spec, &dir.join(file))?);
    }
    Ok(reports)
}

pub fn load_csv(conn: &mut Connection, spec: &'static TableSpec, path: &Path) -> Result<LoadReport> {
    let file = File::open(path).map_err(|err| {
        Error::InvalidInput(format!("cannot open {}: {err}", path.display()))
    })?;
    load_reader(conn, spec, file).map_err(|err| match err {
        Error::InvalidInput(msg) => Error::InvalidInput(format!("{}: {msg}", path.display())),
        other => other,
    })
}

/// Append the rows of one CSV document into `spec`'s table inside a single transaction.
pub fn load_reader<R: Read>(
    conn: &mut Connection,
    spec: &'static TableSpec,
    reader: R,
) -> Result<LoadReport> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let columns = resolve_columns(spec, csv_reader.headers()?)?;
    let pk_index = columns
        .iter()
        .position(|c| c.name == spec.primary_key)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "header lacks primary key column {} for table {}",
                spec.primary_key, spec.name
            ))
        })?;

    let mut report = LoadReport::new(spec.name);
    let tx = conn.transaction()?;
    {
        let mut existing = existing_keys(&tx, spec)?;
        let mut seen: BTreeSet<i64> = BTreeSet::new();
        let mut insert = tx.prepare(&insert_statement(spec, &columns))?;

        for result in csv_reader.records() {
            let record = match result {
                Ok(record) => record,
                Err(err) if err.is_io_error() => return Err(err.into()),
                Err(err) => {
                    report.rows_read += 1;
                    let line = err.position().map(|p| p.line()).unwrap_or(0);
                    report.reject(line, None, format!("malformed CSV row: {err}"));
                    continue;
                }
            };
            report.rows_read += 1;
            let line = record.position().map(|p| p.line()).unwrap_or(0);

            let raw_key = record.get(pk_index).unwrap_or_default();
            let key = match parse_integer(raw_key) {
                Some(key) => key,
                None => {
                    report.reject(line, None, format!("invalid {} '{raw_key}'", spec.primary_key));
                    continue;
                }
            };
            if !seen.insert(key) {
                report.duplicates_dropped += 1;
                continue;
            }
            if existing.contains(&key) {
                report.reject(
                    line,
                    Some(key),
                    format!("{} {key} already loaded", spec.primary_key),
                );
                continue;
            }

            let values = match coerce_record(&columns, &record) {
                Ok(values) => values,
                Err(reason) => {
                    report.reject(line, Some(key), reason);
                    continue;
                }
            };
            match insert.execute(params_from_iter(values.iter())) {
                Ok(_) => {
                    report.inserted += 1;
                    existing.insert(key);
                }
                Err(err) => report.reject(line, Some(key), Error::from(err).to_string()),
            }
        }
    }
    tx.commit()?;

    info!(
        table = spec.name,
        read = report.rows_read,
        inserted = report.inserted,
        duplicates = report.duplicates_dropped,
        rejected = report.rejected.len(),
        "bulk load finished"
    );
    Ok(report)
}

fn resolve_columns(spec: &TableSpec, headers: &csv::StringRecord) -> Result<Vec<ColumnSpec>> {
    let mut columns = Vec::with_capacity(headers.len());
    for header in headers {
        let column = spec.column(header).ok_or_else(|| {
            Error::InvalidInput(format!(
                "column '{header}' is not part of table {}",
                spec.name
            ))
        })?;
        if columns.iter().any(|c: &ColumnSpec| c.name == column.name) {
            return Err(Error::InvalidInput(format!("column '{header}' appears twice")));
        }
        columns.push(*column);
    }
    Ok(columns)
}

fn existing_keys(conn: &Connection, spec: &TableSpec) -> Result<BTreeSet<i64>> {
    let sql = format!("SELECT {} FROM {}", spec.primary_key, spec.name);
    let mut stmt = conn.prepare(&sql)?;
    let keys = stmt
        .query_map([], |row| row.get::<_, i64>(0))?
        .collect::<rusqlite::Result<BTreeSet<_>>>()?;
    Ok(keys)
}

// Identifiers come from the static table spec, never from the CSV itself.
fn insert_statement(spec: &TableSpec, columns: &[ColumnSpec]) -> String {
    let names: Vec<&str> = columns.iter().map(|c| c.name).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        spec.name,
        names.join(", "),
        placeholders.join(", ")
    )
}

fn coerce_record(
    columns: &[ColumnSpec],
    record: &csv::StringRecord,
) -> std::result::Result<Vec<SqlValue>, String> {
    columns
        .iter()
        .enumerate()
        .map(|(idx, column)| coerce_cell(column, record.get(idx).unwrap_or_default()))
        .collect()
}

/// Convert one raw CSV cell per its column kind.
///
/// Missing text becomes `""`; missing numbers and unparseable dates become NULL.
/// Numbers that do not parse, and negative quantities, are errors.
pub fn coerce_cell(column: &ColumnSpec, raw: &str) -> std::result::Result<SqlValue, String> {
    let missing = is_null_marker(raw);
    match column.kind {
        ColumnKind::Text if missing => Ok(SqlValue::Text(String::new())),
        ColumnKind::Text => Ok(SqlValue::Text(raw.to_string())),
        _ if missing => Ok(SqlValue::Null),
        ColumnKind::Integer => parse_integer(raw)
            .map(SqlValue::Integer)
            .ok_or_else(|| format!("{} '{raw}' is not an integer", column.name)),
        ColumnKind::Quantity => match parse_integer(raw) {
            Some(qty) if qty >= 0 => Ok(SqlValue::Integer(qty)),
            Some(qty) => Err(format!("{} {qty} is negative", column.name)),
            None => Err(format!("{} '{raw}' is not an integer", column.name)),
        },
        ColumnKind::Date => Ok(normalize_date(raw).map_or(SqlValue::Null, SqlValue::Text)),
        ColumnKind::Timestamp => {
            Ok(normalize_timestamp(raw).map_or(SqlValue::Null, SqlValue::Text))
        }
    }
}

pub fn is_null_marker(raw: &str) -> bool {
    NULL_MARKERS.contains(&raw.trim())
}

/// Integers, also accepting float spellings of whole numbers such as `12.0`.
fn parse_integer(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return Some(value);
    }
    let float = trimmed.parse::<f64>().ok()?;
    (float.is_finite() && float.fract() == 0.0 && float.abs() < 9.0e15).then(|| float as i64)
}

/// Coerce a date or datetime string to `YYYY-MM-DD`; `None` when unparseable.
pub fn normalize_date(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| parse_datetime(trimmed).map(|dt| dt.date()))
        .map(|date| date.format("%Y-%m-%d").to_string())
}

/// Coerce a timestamp string to `YYYY-MM-DD HH:MM:SS`; bare dates become midnight.
pub fn normalize_timestamp(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    parse_datetime(trimmed)
        .or_else(|| {
            DATE_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        schema::ensure_schema(&conn).unwrap();
        conn
    }

    fn count(conn: &Connection, table: &str) -> i64 {
        conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))
            .unwrap()
    }

    #[test]
    fn dates_normalize_or_become_none() {
        assert_eq!(normalize_date("2025-03-17").as_deref(), Some("2025-03-17"));
        assert_eq!(normalize_date("3/7/2025").as_deref(), Some("2025-03-07"));
        assert_eq!(
            normalize_date("2025-03-17 18:45:00").as_deref(),
            Some("2025-03-17")
        );
        assert_eq!(normalize_date("next tuesday"), None);
    }

    #[test]
    fn timestamps_normalize_or_become_none() {
        assert_eq!(
            normalize_timestamp("2025-03-05T10:15:30").as_deref(),
            Some("2025-03-05 10:15:30")
        );
        assert_eq!(
            normalize_timestamp("3/5/2025 10:15").as_deref(),
            Some("2025-03-05 10:15:00")
        );
        assert_eq!(
            normalize_timestamp("2025-03-05").as_deref(),
            Some("2025-03-05 00:00:00")
        );
        assert_eq!(normalize_timestamp("soon"), None);
    }

    #[test]
    fn cells_follow_null_policy() {
        let name = schema::PROVIDERS.column("Name").unwrap();
        let qty = schema::FOOD_LISTINGS.column("Quantity").unwrap();
        let expiry = schema::FOOD_LISTINGS.column("Expiry_Date").unwrap();

        assert_eq!(coerce_cell(name, "NaN"), Ok(SqlValue::Text(String::new())));
        assert_eq!(coerce_cell(qty, ""), Ok(SqlValue::Null));
        assert_eq!(coerce_cell(qty, "12.0"), Ok(SqlValue::Integer(12)));
        assert!(coerce_cell(qty, "-1").is_err());
        assert!(coerce_cell(qty, "lots").is_err());
        assert_eq!(coerce_cell(expiry, "garbage"), Ok(SqlValue::Null));
    }

    #[test]
    fn in_batch_duplicates_keep_the_first_row() {
        let mut c = conn();
        let csv = "Provider_ID,Name,City\n1,First,Pune\n2,Other,Delhi\n1,Second,Pune\n";
        let report = load_reader(&mut c, &schema::PROVIDERS, csv.as_bytes()).unwrap();
        assert_eq!(report.rows_read, 3);
        assert_eq!(report.inserted, 2);
        assert_eq!(report.duplicates_dropped, 1);
        assert!(report.is_clean());
        let name: String = c
            .query_row("SELECT Name FROM providers WHERE Provider_ID = 1", [], |r| r.get(0))
            .unwrap();
        assert_eq!(name, "First");
    }

    #[test]
    fn reload_rejects_existing_keys() {
        let mut c = conn();
        let csv = "Provider_ID,Name\n1,A\n2,B\n";
        load_reader(&mut c, &schema::PROVIDERS, csv.as_bytes()).unwrap();
        let again = load_reader(&mut c, &schema::PROVIDERS, "Provider_ID,Name\n2,B\n3,C\n".as_bytes())
            .unwrap();
        assert_eq!(again.inserted, 1);
        assert_eq!(again.rejected.len(), 1);
        assert_eq!(again.rejected[0].key, Some(2));
        assert_eq!(again.rejected[0].line, 2);
        assert_eq!(count(&c, "providers"), 3);
    }

    #[test]
    fn dangling_foreign_key_rejects_only_that_row() {
        let mut c = conn();
        load_reader(&mut c, &schema::PROVIDERS, "Provider_ID,Name\n1,A\n".as_bytes()).unwrap();
        let csv = "Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID\n\
                   10,Rice,5,2025-03-17,1\n\
                   11,Bread,3,2025-03-18,99\n";
        let report = load_reader(&mut c, &schema::FOOD_LISTINGS, csv.as_bytes()).unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.rejected.len(), 1);
        assert!(report.rejected[0].reason.contains("FOREIGN KEY"), "{:?}", report.rejected);
        assert_eq!(count(&c, "food_listings"), 1);
    }

    #[test]
    fn unopenable_file_names_the_path() {
        let mut c = conn();
        let missing = Path::new("no/such/dir/providers_data.csv");
        let err = load_csv(&mut c, &schema::PROVIDERS, missing).unwrap_err();
        assert!(
            matches!(err, Error::InvalidInput(ref m) if m.contains("providers_data.csv")),
            "{err}"
        );
    }

    #[test]
    fn unknown_header_rejects_the_file() {
        let mut c = conn();
        let err = load_reader(&mut c, &schema::PROVIDERS, "Provider_ID,Nickname\n1,x\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, Error::InvalidInput(ref m) if m.contains("Nickname")));
        assert_eq!(count(&c, "providers"), 0);
    }

    #[test]
    fn short_rows_and_bad_keys_are_reported() {
        let mut c = conn();
        let csv = "Provider_ID,Name,City\n1,A,Pune\n2,B\nabc,C,Delhi\n";
        let report = load_reader(&mut c, &schema::PROVIDERS, csv.as_bytes()).unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].line, 3);
        assert_eq!(report.rejected[1].line, 4);
    }
}
