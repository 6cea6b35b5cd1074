//! Session-local memoization of read queries.
//!
//! Keys are the SQL text plus its bindings, so two reports share an entry
//! only when they would run the identical statement. Any write through the
//! owning session must call [`QueryCache::clear`].

use crate::error::Result;
use crate::query::{Bindings, ResultTable};
use std::collections::BTreeMap;

#[derive(Debug, Default)]
pub struct QueryCache {
    entries: BTreeMap<String, ResultTable>,
    hits: u64,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the cached table for `(sql, bindings)` or compute and remember it.
    ///
    /// Failures are not cached.
    pub fn get_or_try_insert<F>(
        &mut self,
        sql: &str,
        bindings: Option<&Bindings>,
        compute: F,
    ) -> Result<ResultTable>
    where
        F: FnOnce() -> Result<ResultTable>,
    {
        let key = cache_key(sql, bindings);
        if let Some(table) = self.entries.get(&key) {
            self.hits += 1;
            return Ok(table.clone());
        }
        let table = compute()?;
        self.entries.insert(key, table.clone());
        Ok(table)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }
}

fn cache_key(sql: &str, bindings: Option<&Bindings>) -> String {
    let mut key = sql.trim().to_string();
    key.push('\u{1f}');
    if let Some(bindings) = bindings.filter(|b| !b.is_empty()) {
        key.push_str(&serde_json::to_string(bindings).unwrap_or_default());
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::query::SqlValue;

    fn table(n: i64) -> ResultTable {
        ResultTable {
            columns: vec!["n".into()],
            rows: vec![vec![SqlValue::Integer(n)]],
        }
    }

    #[test]
    fn identical_reads_hit_the_cache() {
        let mut cache = QueryCache::new();
        let first = cache
            .get_or_try_insert("SELECT 1", None, || Ok(table(1)))
            .unwrap();
        let second = cache
            .get_or_try_insert("SELECT 1", Some(&Bindings::new()), || Ok(table(99)))
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn bindings_distinguish_entries() {
        let mut cache = QueryCache::new();
        let mut pune = Bindings::new();
        pune.insert("city".into(), SqlValue::Text("Pune".into()));
        let mut delhi = Bindings::new();
        delhi.insert("city".into(), SqlValue::Text("Delhi".into()));

        cache.get_or_try_insert("q", Some(&pune), || Ok(table(1))).unwrap();
        let other = cache.get_or_try_insert("q", Some(&delhi), || Ok(table(2))).unwrap();
        assert_eq!(other, table(2));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn failures_are_not_remembered_and_clear_empties() {
        let mut cache = QueryCache::new();
        let err = cache.get_or_try_insert("bad", None, || Err(Error::Sql("boom".into())));
        assert!(err.is_err());
        assert!(cache.is_empty());

        cache.get_or_try_insert("ok", None, || Ok(table(1))).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }
}
