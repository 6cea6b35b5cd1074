//! Deserializable representation of `catalog/reports.json` and the entries built from it.

use crate::catalog::identity::{ParamName, ReportKey};
use crate::catalog::overrides::ParamOverrides;
use crate::error::{Error, Result};
use crate::query::{Bindings, SqlValue};
use serde::Deserialize;
use std::collections::BTreeMap;

/// Default values for an entry's named parameters.
pub type ParamMap = BTreeMap<ParamName, SqlValue>;

#[derive(Clone, Debug, Deserialize)]
/// Report catalog as stored on disk.
pub struct ReportCatalogFile {
    pub schema_version: String,
    pub reports: Vec<ReportSpec>,
}

#[derive(Clone, Debug, Deserialize)]
/// One report as written in the catalog file. `params` may be absent.
pub struct ReportSpec {
    pub key: ReportKey,
    pub description: String,
    pub sql: String,
    #[serde(default)]
    pub params: Option<ParamMap>,
}

#[derive(Clone, Debug, PartialEq)]
/// A validated, immutable catalog entry.
pub struct ReportEntry {
    key: ReportKey,
    description: String,
    sql: String,
    defaults: ParamMap,
}

impl ReportEntry {
    pub(crate) fn from_spec(spec: ReportSpec) -> Self {
        Self {
            key: spec.key,
            description: spec.description,
            sql: spec.sql,
            defaults: spec.params.unwrap_or_default(),
        }
    }

    pub fn key(&self) -> &ReportKey {
        &self.key
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Declared parameters with defaults; `None` when the entry takes none.
    ///
    /// An absent `params` field and an empty object both come back as `None`.
    pub fn params(&self) -> Option<&ParamMap> {
        (!self.defaults.is_empty()).then_some(&self.defaults)
    }

    /// Merge per-request overrides over the defaults.
    ///
    /// Overrides addressed to other reports are ignored; an override naming a
    /// parameter this entry does not declare is an error.
    pub fn bind(&self, overrides: &ParamOverrides) -> Result<Bindings> {
        let mut bindings: Bindings = self
            .defaults
            .iter()
            .map(|(name, value)| (name.0.clone(), value.clone()))
            .collect();

        if let Some(requested) = overrides.for_report(&self.key) {
            for (name, value) in requested {
                if !self.defaults.contains_key(name) {
                    return Err(Error::UnknownParameter {
                        report: self.key.clone(),
                        param: name.clone(),
                    });
                }
                bindings.insert(name.0.clone(), value.clone());
            }
        }
        Ok(bindings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(json: &str) -> ReportSpec {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn absent_and_empty_params_are_equivalent() {
        let absent = ReportEntry::from_spec(spec(
            r#"{"key":"q5","description":"d","sql":"SELECT 1"}"#,
        ));
        let empty = ReportEntry::from_spec(spec(
            r#"{"key":"q5","description":"d","sql":"SELECT 1","params":{}}"#,
        ));
        assert_eq!(absent, empty);
        assert!(absent.params().is_none());
        assert!(absent.bind(&ParamOverrides::new()).unwrap().is_empty());
    }

    #[test]
    fn overrides_replace_defaults_without_touching_the_entry() {
        let entry = ReportEntry::from_spec(spec(
            r#"{"key":"q3","description":"d","sql":"SELECT :city","params":{"city":"Hyderabad"}}"#,
        ));
        let mut overrides = ParamOverrides::new();
        overrides.set(ReportKey::new("q3"), ParamName::new("city"), "Chennai".into());

        let bound = entry.bind(&overrides).unwrap();
        assert_eq!(bound.get("city"), Some(&SqlValue::Text("Chennai".into())));
        let defaults = entry.bind(&ParamOverrides::new()).unwrap();
        assert_eq!(defaults.get("city"), Some(&SqlValue::Text("Hyderabad".into())));
    }

    #[test]
    fn undeclared_override_is_rejected() {
        let entry = ReportEntry::from_spec(spec(
            r#"{"key":"q3","description":"d","sql":"SELECT :city","params":{"city":"Hyderabad"}}"#,
        ));
        let mut overrides = ParamOverrides::new();
        overrides.set(ReportKey::new("q3"), ParamName::new("town"), "Pune".into());
        let err = entry.bind(&overrides).unwrap_err();
        assert!(matches!(err, Error::UnknownParameter { ref param, .. } if param.as_str() == "town"));
    }
}
