//! Execution layer: bound statements in, [`ResultTable`]s out.

pub mod cache;
pub mod exec;
pub mod table;
pub mod value;

use std::collections::BTreeMap;

/// Named parameter values keyed by placeholder name without its `:` prefix.
pub type Bindings = BTreeMap<String, SqlValue>;

pub use cache::QueryCache;
pub use exec::{execute, execute_read, execute_write};
pub use table::ResultTable;
pub use value::SqlValue;
