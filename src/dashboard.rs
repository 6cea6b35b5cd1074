//! A user session over the store: listings CRUD plus the report catalog.
//!
//! Each action opens its own connection. Reads go through a session-local
//! [`QueryCache`]; every successful or failed write clears it, so the next
//! read always reflects committed state.

use crate::catalog::{ParamOverrides, ReportCatalog, ReportKey};
use crate::db::Database;
use crate::error::Result;
use crate::listings;
use crate::model::{FilterOptions, ListingFilter, ListingUpdate, NewListing};
use crate::query::{QueryCache, ResultTable, execute_read};
use crate::reports::ReportOutput;
use tracing::warn;

pub struct Dashboard {
    db: Database,
    catalog: ReportCatalog,
    cache: QueryCache,
}

impl Dashboard {
    pub fn new(db: Database, catalog: ReportCatalog) -> Self {
        Self {
            db,
            catalog,
            cache: QueryCache::new(),
        }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn catalog(&self) -> &ReportCatalog {
        &self.catalog
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    pub fn view_listings(&mut self, filter: &ListingFilter) -> Result<ResultTable> {
        let (sql, bindings) = listings::view_query(filter);
        let db = &self.db;
        self.cache.get_or_try_insert(&sql, Some(&bindings), || {
            let conn = db.connect()?;
            execute_read(&conn, &sql, Some(&bindings))
        })
    }

    pub fn filter_options(&self) -> Result<FilterOptions> {
        listings::filter_options(&self.db.connect()?)
    }

    pub fn provider_cities(&self) -> Result<Vec<String>> {
        listings::provider_cities(&self.db.connect()?)
    }

    pub fn add_listing(&mut self, listing: &NewListing) -> Result<()> {
        let outcome = listings::add_listing(&self.db, listing);
        self.cache.clear();
        outcome
    }

    pub fn update_listing(&mut self, food_id: i64, update: &ListingUpdate) -> Result<()> {
        let outcome = listings::update_listing(&self.db, food_id, update);
        self.cache.clear();
        outcome
    }

    pub fn delete_listing(&mut self, food_id: i64) -> Result<()> {
        let outcome = listings::delete_listing(&self.db, food_id);
        self.cache.clear();
        outcome
    }

    /// Run one report. Overrides addressed to unknown reports fail the run.
    pub fn run_report(&mut self, key: &ReportKey, overrides: &ParamOverrides) -> Result<ReportOutput> {
        self.catalog.check_overrides(overrides)?;
        let entry = self.catalog.get(key)?;
        let bindings = entry.bind(overrides)?;
        let db = &self.db;
        let table = self
            .cache
            .get_or_try_insert(entry.sql(), Some(&bindings), || {
                let conn = db.connect()?;
                execute_read(&conn, entry.sql(), Some(&bindings))
            })?;
        Ok(ReportOutput {
            key: entry.key().clone(),
            description: entry.description().to_string(),
            table,
        })
    }

    /// Run every catalog entry in order. One failing report does not stop the rest.
    pub fn run_all_reports(
        &mut self,
        overrides: &ParamOverrides,
    ) -> Vec<(ReportKey, Result<ReportOutput>)> {
        let keys: Vec<ReportKey> = self.catalog.keys().cloned().collect();
        keys.into_iter()
            .map(|key| {
                let outcome = self.run_report(&key, overrides);
                if let Err(err) = &outcome {
                    warn!(report = %key, error = %err, "report failed");
                }
                (key, outcome)
            })
            .collect()
    }
}
