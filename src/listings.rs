//! Single-row mutations and reads on `food_listings`.
//!
//! Each mutation is one bound statement in its own transaction. Deletes do
//! not cascade: removing a listing that a claim still references fails with
//! [`Error::Constraint`] and nothing changes.

use crate::db::Database;
use crate::error::{Error, Result};
use crate::model::{FilterOptions, FoodListing, ListingFilter, ListingUpdate, NewListing};
use crate::query::{Bindings, ResultTable, SqlValue, execute_read, execute_write};
use rusqlite::{Connection, OptionalExtension};
use tracing::info;

const INSERT_LISTING: &str = "INSERT INTO food_listings \
    (Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type) \
    VALUES (:id, :name, :qty, :expiry, :pid, :ptype, :loc, :ftype, :mtype)";
const UPDATE_LISTING: &str =
    "UPDATE food_listings SET Quantity = :qty, Expiry_Date = :expiry WHERE Food_ID = :id";
const DELETE_LISTING: &str = "DELETE FROM food_listings WHERE Food_ID = :id";
const SELECT_LISTING: &str = "SELECT * FROM food_listings WHERE Food_ID = ?1";
const VIEW_LISTINGS: &str = "SELECT f.*, p.Name AS Provider_Name, p.Contact AS Provider_Contact \
    FROM food_listings f LEFT JOIN providers p ON f.Provider_ID = p.Provider_ID";

pub fn add_listing(db: &Database, listing: &NewListing) -> Result<()> {
    let bindings = Bindings::from([
        ("id".to_string(), SqlValue::Integer(listing.food_id)),
        ("name".to_string(), listing.food_name.clone().into()),
        ("qty".to_string(), SqlValue::Integer(i64::from(listing.quantity))),
        ("expiry".to_string(), date_value(listing.expiry_date)),
        ("pid".to_string(), SqlValue::Integer(listing.provider_id)),
        ("ptype".to_string(), listing.provider_type.clone().into()),
        ("loc".to_string(), listing.location.clone().into()),
        ("ftype".to_string(), listing.food_type.clone().into()),
        ("mtype".to_string(), listing.meal_type.clone().into()),
    ]);
    db.with_transaction(|tx| execute_write(tx, INSERT_LISTING, Some(&bindings)))?;
    info!(food_id = listing.food_id, "added food listing");
    Ok(())
}

/// Set quantity and expiry. Fails with [`Error::ListingNotFound`] when no row matches.
pub fn update_listing(db: &Database, food_id: i64, update: &ListingUpdate) -> Result<()> {
    let bindings = Bindings::from([
        ("id".to_string(), SqlValue::Integer(food_id)),
        ("qty".to_string(), SqlValue::Integer(i64::from(update.quantity))),
        ("expiry".to_string(), date_value(update.expiry_date)),
    ]);
    db.with_transaction(|tx| {
        match execute_write(tx, UPDATE_LISTING, Some(&bindings))? {
            0 => Err(Error::ListingNotFound(food_id)),
            _ => Ok(()),
        }
    })?;
    info!(food_id, quantity = update.quantity, "updated food listing");
    Ok(())
}

pub fn delete_listing(db: &Database, food_id: i64) -> Result<()> {
    let bindings = Bindings::from([("id".to_string(), SqlValue::Integer(food_id))]);
    db.with_transaction(|tx| match execute_write(tx, DELETE_LISTING, Some(&bindings))? {
        0 => Err(Error::ListingNotFound(food_id)),
        _ => Ok(()),
    })?;
    info!(food_id, "deleted food listing");
    Ok(())
}

pub fn get_listing(conn: &Connection, food_id: i64) -> Result<Option<FoodListing>> {
    let listing = conn
        .query_row(SELECT_LISTING, [food_id], FoodListing::from_row)
        .optional()?;
    Ok(listing)
}

/// SQL and bindings for the joined listings view under `filter`.
///
/// Each selected value gets its own placeholder (`:city0`, `:city1`, ...).
pub fn view_query(filter: &ListingFilter) -> (String, Bindings) {
    let mut sql = String::from(VIEW_LISTINGS);
    let mut bindings = Bindings::new();
    let mut clauses = Vec::new();
    for (column, prefix, values) in [
        ("f.Location", "city", &filter.cities),
        ("f.Food_Type", "food_type", &filter.food_types),
    ] {
        if values.is_empty() {
            continue;
        }
        let placeholders: Vec<String> = values
            .iter()
            .enumerate()
            .map(|(idx, value)| {
                let name = format!("{prefix}{idx}");
                let placeholder = format!(":{name}");
                bindings.insert(name, SqlValue::Text(value.clone()));
                placeholder
            })
            .collect();
        clauses.push(format!("{column} IN ({})", placeholders.join(", ")));
    }
    if !clauses.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&clauses.join(" AND "));
    }
    sql.push_str(" ORDER BY f.Food_ID");
    (sql, bindings)
}

/// All listings with provider name and contact, narrowed by `filter`.
pub fn view_listings(conn: &Connection, filter: &ListingFilter) -> Result<ResultTable> {
    let (sql, bindings) = view_query(filter);
    execute_read(conn, &sql, Some(&bindings))
}

pub fn filter_options(conn: &Connection) -> Result<FilterOptions> {
    Ok(FilterOptions {
        cities: distinct_text(
            conn,
            "SELECT DISTINCT Location FROM food_listings WHERE Location IS NOT NULL AND Location <> '' ORDER BY Location",
        )?,
        food_types: distinct_text(
            conn,
            "SELECT DISTINCT Food_Type FROM food_listings WHERE Food_Type IS NOT NULL AND Food_Type <> '' ORDER BY Food_Type",
        )?,
    })
}

/// Distinct provider cities, for choosing the city of the provider-contacts report.
pub fn provider_cities(conn: &Connection) -> Result<Vec<String>> {
    distinct_text(
        conn,
        "SELECT DISTINCT City FROM providers WHERE City IS NOT NULL AND City <> '' ORDER BY City",
    )
}

fn distinct_text(conn: &Connection, sql: &str) -> Result<Vec<String>> {
    let table = execute_read(conn, sql, None)?;
    Ok(table
        .rows
        .into_iter()
        .filter_map(|mut row| match row.pop() {
            Some(SqlValue::Text(value)) => Some(value),
            Some(other) if !other.is_null() => Some(other.to_string()),
            _ => None,
        })
        .collect())
}

fn date_value(date: chrono::NaiveDate) -> SqlValue {
    SqlValue::Text(date.format("%Y-%m-%d").to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unfiltered_view_has_no_where_clause() {
        let (sql, bindings) = view_query(&ListingFilter::default());
        assert!(!sql.contains("WHERE"));
        assert!(bindings.is_empty());
    }

    #[test]
    fn filters_become_bound_placeholders() {
        let filter = ListingFilter {
            cities: vec!["Pune".into(), "O'Fallon".into()],
            food_types: vec!["Vegan".into()],
        };
        let (sql, bindings) = view_query(&filter);
        assert!(sql.contains("f.Location IN (:city0, :city1) AND f.Food_Type IN (:food_type0)"));
        assert!(!sql.contains("O'Fallon"));
        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings.get("city1"), Some(&SqlValue::Text("O'Fallon".into())));
    }
}
