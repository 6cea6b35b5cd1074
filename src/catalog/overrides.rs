//! Per-request parameter overrides.
//!
//! The catalog itself never changes. A caller that wants a different city
//! for one report builds a `ParamOverrides` for that request and passes it to
//! [`ReportEntry::bind`](crate::catalog::ReportEntry::bind).

use crate::catalog::identity::{ParamName, ReportKey, is_valid_identifier};
use crate::query::SqlValue;
use anyhow::{Result, bail};
use std::collections::BTreeMap;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParamOverrides {
    by_report: BTreeMap<ReportKey, BTreeMap<ParamName, SqlValue>>,
}

impl ParamOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, report: ReportKey, param: ParamName, value: SqlValue) -> &mut Self {
        self.by_report
            .entry(report)
            .or_default()
            .insert(param, value);
        self
    }

    pub fn for_report(&self, report: &ReportKey) -> Option<&BTreeMap<ParamName, SqlValue>> {
        self.by_report.get(report)
    }

    pub fn is_empty(&self) -> bool {
        self.by_report.is_empty()
    }

    /// Every report key that carries at least one override.
    pub fn reports(&self) -> impl Iterator<Item = &ReportKey> {
        self.by_report.keys()
    }

    /// Apply a `REPORT.PARAM=VALUE` assignment, e.g. `q3.city=Chennai`.
    ///
    /// Numeric values bind as numbers; everything else binds as text.
    pub fn apply_assignment(&mut self, raw: &str) -> Result<()> {
        let Some((target, value)) = raw.split_once('=') else {
            bail!("expected REPORT.PARAM=VALUE, got '{raw}'");
        };
        let Some((report, param)) = target.trim().split_once('.') else {
            bail!("expected REPORT.PARAM before '=', got '{target}'");
        };
        if !is_valid_identifier(report) || !is_valid_identifier(param) {
            bail!("report and parameter names must match ^[A-Za-z0-9_.-]+$, got '{target}'");
        }
        self.set(
            ReportKey::new(report),
            ParamName::new(param),
            SqlValue::parse_literal(value),
        );
        Ok(())
    }
}
