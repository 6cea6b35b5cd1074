//! Table definitions for the donation schema.
//!
//! The specs drive both `CREATE TABLE IF NOT EXISTS` and the bulk loader's
//! header matching and cell coercion, so column names live in one place.

use crate::error::Result;
use rusqlite::Connection;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    /// Integer that must not be negative.
    Quantity,
    Text,
    /// Calendar date stored as `YYYY-MM-DD`.
    Date,
    /// Stored as `YYYY-MM-DD HH:MM:SS`.
    Timestamp,
}

#[derive(Clone, Copy, Debug)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub kind: ColumnKind,
    pub sql_type: &'static str,
}

#[derive(Debug)]
pub struct TableSpec {
    pub name: &'static str,
    pub primary_key: &'static str,
    pub columns: &'static [ColumnSpec],
    pub foreign_keys: &'static [&'static str],
}

const fn col(name: &'static str, kind: ColumnKind, sql_type: &'static str) -> ColumnSpec {
    ColumnSpec {
        name,
        kind,
        sql_type,
    }
}

pub const PROVIDERS: TableSpec = TableSpec {
    name: "providers",
    primary_key: "Provider_ID",
    columns: &[
        col("Provider_ID", ColumnKind::Integer, "INTEGER PRIMARY KEY"),
        col("Name", ColumnKind::Text, "VARCHAR(255)"),
        col("Type", ColumnKind::Text, "VARCHAR(100)"),
        col("Address", ColumnKind::Text, "TEXT"),
        col("City", ColumnKind::Text, "VARCHAR(100)"),
        col("Contact", ColumnKind::Text, "VARCHAR(50)"),
    ],
    foreign_keys: &[],
};

pub const RECEIVERS: TableSpec = TableSpec {
    name: "receivers",
    primary_key: "Receiver_ID",
    columns: &[
        col("Receiver_ID", ColumnKind::Integer, "INTEGER PRIMARY KEY"),
        col("Name", ColumnKind::Text, "VARCHAR(255)"),
        col("Type", ColumnKind::Text, "VARCHAR(100)"),
        col("City", ColumnKind::Text, "VARCHAR(100)"),
        col("Contact", ColumnKind::Text, "VARCHAR(50)"),
    ],
    foreign_keys: &[],
};

pub const FOOD_LISTINGS: TableSpec = TableSpec {
    name: "food_listings",
    primary_key: "Food_ID",
    columns: &[
        col("Food_ID", ColumnKind::Integer, "INTEGER PRIMARY KEY"),
        col("Food_Name", ColumnKind::Text, "VARCHAR(255)"),
        col(
            "Quantity",
            ColumnKind::Quantity,
            "INTEGER CHECK (Quantity >= 0)",
        ),
        col("Expiry_Date", ColumnKind::Date, "DATE"),
        col("Provider_ID", ColumnKind::Integer, "INTEGER"),
        col("Provider_Type", ColumnKind::Text, "VARCHAR(100)"),
        col("Location", ColumnKind::Text, "VARCHAR(100)"),
        col("Food_Type", ColumnKind::Text, "VARCHAR(100)"),
        col("Meal_Type", ColumnKind::Text, "VARCHAR(100)"),
    ],
    foreign_keys: &["FOREIGN KEY (Provider_ID) REFERENCES providers(Provider_ID)"],
};

pub const CLAIMS: TableSpec = TableSpec {
    name: "claims",
    primary_key: "Claim_ID",
    columns: &[
        col("Claim_ID", ColumnKind::Integer, "INTEGER PRIMARY KEY"),
        col("Food_ID", ColumnKind::Integer, "INTEGER"),
        col("Receiver_ID", ColumnKind::Integer, "INTEGER"),
        col("Status", ColumnKind::Text, "VARCHAR(50)"),
        col("Timestamp", ColumnKind::Timestamp, "DATETIME"),
    ],
    foreign_keys: &[
        "FOREIGN KEY (Food_ID) REFERENCES food_listings(Food_ID)",
        "FOREIGN KEY (Receiver_ID) REFERENCES receivers(Receiver_ID)",
    ],
};

/// All tables in foreign-key dependency order.
pub const TABLES: [&TableSpec; 4] = [&PROVIDERS, &RECEIVERS, &FOOD_LISTINGS, &CLAIMS];

impl TableSpec {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn create_statement(&self) -> String {
        let mut lines: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("  {} {}", c.name, c.sql_type))
            .collect();
        lines.extend(self.foreign_keys.iter().map(|fk| format!("  {fk}")));
        format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);",
            self.name,
            lines.join(",\n")
        )
    }
}

/// Create any missing tables. Existing tables are left untouched.
pub fn ensure_schema(conn: &Connection) -> Result<()> {
    let batch = TABLES
        .iter()
        .map(|t| t.create_statement())
        .collect::<Vec<_>>()
        .join("\n");
    conn.execute_batch(&batch)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_table_has_its_primary_key_first() {
        for spec in TABLES {
            assert_eq!(spec.columns[0].name, spec.primary_key, "{}", spec.name);
            assert_eq!(spec.columns[0].kind, ColumnKind::Integer);
        }
    }

    #[test]
    fn ensure_schema_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        conn.execute(
            "INSERT INTO providers (Provider_ID, Name) VALUES (1, 'Kept')",
            [],
        )
        .unwrap();
        ensure_schema(&conn).unwrap();
        let name: String = conn
            .query_row("SELECT Name FROM providers WHERE Provider_ID = 1", [], |r| {
                r.get(0)
            })
            .unwrap();
        assert_eq!(name, "Kept");
    }

    #[test]
    fn negative_quantity_is_rejected_by_the_engine() {
        let conn = Connection::open_in_memory().unwrap();
        ensure_schema(&conn).unwrap();
        let err = conn
            .execute(
                "INSERT INTO food_listings (Food_ID, Quantity) VALUES (1, -5)",
                [],
            )
            .unwrap_err();
        assert!(err.to_string().contains("CHECK"), "{err}");
    }
}
