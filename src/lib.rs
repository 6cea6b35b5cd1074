//! Shared library for the foodshare dashboard.
//!
//! The crate owns the SQLite schema for providers, receivers, food listings
//! and claims, a validated catalog of read-only analytical reports, a
//! parameterized execution layer, the bulk CSV loader and listing CRUD. The
//! binaries under `src/bin` are thin front ends over [`Dashboard`] and
//! [`loader`].

pub mod catalog;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod error;
pub mod listings;
pub mod loader;
pub mod logging;
pub mod model;
pub mod query;
pub mod reports;
pub mod schema;

pub use catalog::{ParamName, ParamOverrides, ReportCatalog, ReportEntry, ReportKey};
pub use config::DbConfig;
pub use dashboard::Dashboard;
pub use db::Database;
pub use error::{Error, Result};
pub use loader::{LoadReport, RowRejection, load_all, load_csv};
pub use model::{FilterOptions, FoodListing, ListingFilter, ListingUpdate, NewListing};
pub use query::{Bindings, QueryCache, ResultTable, SqlValue};
pub use reports::{ReportOutput, export_csv, run_report};
