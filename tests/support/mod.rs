use foodshare::loader::{SOURCE_FILES, load_reader};
use foodshare::schema::{self, TableSpec};
use foodshare::{Database, DbConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

pub const PROVIDERS_CSV: &str = "\
Provider_ID,Name,Type,Address,City,Contact
1,Green Grocer,Supermarket,12 Main St,Hyderabad,555-0101
2,Daily Bread,Bakery,4 Mill Rd,Chennai,555-0102
3,Spice Route,Restaurant,9 Park Ave,Hyderabad,555-0103
";

pub const RECEIVERS_CSV: &str = "\
Receiver_ID,Name,Type,City,Contact
1,Hope Shelter,Shelter,Hyderabad,555-0201
2,City Food Bank,NGO,Pune,555-0202
";

pub const LISTINGS_CSV: &str = "\
Food_ID,Food_Name,Quantity,Expiry_Date,Provider_ID,Provider_Type,Location,Food_Type,Meal_Type
10,Rice,40,2025-03-12,1,Supermarket,Hyderabad,Vegetarian,Lunch
11,Bread,25,2025-03-11,2,Bakery,Chennai,Vegan,Breakfast
12,Curry,15,2025-03-20,3,Restaurant,Hyderabad,Non-Vegetarian,Dinner
";

// Three completed claims and one pending.
pub const CLAIMS_CSV: &str = "\
Claim_ID,Food_ID,Receiver_ID,Status,Timestamp
100,10,1,Completed,2025-03-01 10:00:00
101,10,2,Completed,2025-03-02 11:30:00
102,11,1,Completed,2025-03-02 15:00:00
103,12,2,Pending,2025-03-03 09:15:00
";

/// A fresh database file with all tables created, living as long as the `TempDir`.
pub fn empty_db() -> (TempDir, Database) {
    let dir = TempDir::new().expect("tempdir");
    let db = Database::new(&DbConfig::new(dir.path().join("foodshare.sqlite3")));
    db.ensure_schema().expect("schema");
    (dir, db)
}

/// [`empty_db`] loaded with the fixture rows above.
pub fn seeded_db() -> (TempDir, Database) {
    let (dir, db) = empty_db();
    for (spec, csv) in fixture_tables() {
        load_str(&db, spec, csv);
    }
    (dir, db)
}

pub fn load_str(db: &Database, spec: &'static TableSpec, csv: &str) {
    let mut conn = db.connect().expect("connect");
    let report = load_reader(&mut conn, spec, csv.as_bytes()).expect("load");
    assert!(report.is_clean(), "fixture rows rejected: {:?}", report.rejected);
}

/// Write the fixture CSVs under their standard file names into `dir`.
pub fn write_fixture_files(dir: &Path) {
    for ((spec, file), (fixture_spec, csv)) in SOURCE_FILES.iter().zip(fixture_tables()) {
        assert_eq!(spec.name, fixture_spec.name);
        fs::write(dir.join(file), csv).expect("write fixture csv");
    }
}

pub fn count(db: &Database, table: &str) -> i64 {
    let conn = db.connect().expect("connect");
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .expect("count")
}

fn fixture_tables() -> [(&'static TableSpec, &'static str); 4] {
    [
        (&schema::PROVIDERS, PROVIDERS_CSV),
        (&schema::RECEIVERS, RECEIVERS_CSV),
        (&schema::FOOD_LISTINGS, LISTINGS_CSV),
        (&schema::CLAIMS, CLAIMS_CSV),
    ]
}
