//! Typed rows for the food listing CRUD surface.

use chrono::NaiveDate;
use rusqlite::Row;
use serde::Serialize;

/// Input for a manual listing insert.
///
/// `quantity` is unsigned so a negative amount cannot be expressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewListing {
    pub food_id: i64,
    pub food_name: String,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub provider_id: i64,
    pub provider_type: String,
    pub location: String,
    pub food_type: String,
    pub meal_type: String,
}

/// The two mutable fields of a listing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListingUpdate {
    pub quantity: u32,
    pub expiry_date: NaiveDate,
}

/// A stored listing. Bulk-loaded rows may carry NULL numbers and dates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FoodListing {
    pub food_id: i64,
    pub food_name: String,
    pub quantity: Option<i64>,
    pub expiry_date: Option<NaiveDate>,
    pub provider_id: Option<i64>,
    pub provider_type: String,
    pub location: String,
    pub food_type: String,
    pub meal_type: String,
}

impl FoodListing {
    pub(crate) fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        let text = |name: &str| -> rusqlite::Result<String> {
            Ok(row.get::<_, Option<String>>(name)?.unwrap_or_default())
        };
        let expiry: Option<String> = row.get("Expiry_Date")?;
        Ok(Self {
            food_id: row.get("Food_ID")?,
            food_name: text("Food_Name")?,
            quantity: row.get("Quantity")?,
            expiry_date: expiry.and_then(|raw| NaiveDate::parse_from_str(&raw, "%Y-%m-%d").ok()),
            provider_id: row.get("Provider_ID")?,
            provider_type: text("Provider_Type")?,
            location: text("Location")?,
            food_type: text("Food_Type")?,
            meal_type: text("Meal_Type")?,
        })
    }
}

/// Multi-select filters for the listings view. Empty means "no filter".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingFilter {
    pub cities: Vec<String>,
    pub food_types: Vec<String>,
}

impl ListingFilter {
    pub fn is_empty(&self) -> bool {
        self.cities.is_empty() && self.food_types.is_empty()
    }
}

/// Distinct values available to the listing filters, sorted.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub cities: Vec<String>,
    pub food_types: Vec<String>,
}
