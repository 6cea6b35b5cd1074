//! Report catalog wiring.
//!
//! This module wraps the JSON catalog under `catalog/reports.json`: a fixed,
//! ordered set of read-only analytical queries with descriptions and optional
//! parameter defaults. The loaded [`ReportCatalog`] is immutable; per-request
//! parameter choices travel separately as [`ParamOverrides`].

pub mod identity;
pub mod index;
pub mod model;
pub mod overrides;

pub use identity::{ParamName, ReportKey};
pub use index::ReportCatalog;
pub use model::{ParamMap, ReportCatalogFile, ReportEntry, ReportSpec};
pub use overrides::ParamOverrides;
