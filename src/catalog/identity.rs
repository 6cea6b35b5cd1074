use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable key of a catalog entry (e.g. `q10`). Also names its CSV export.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportKey(pub String);

/// Name of a bound parameter, without the `:` placeholder prefix.
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamName(pub String);

impl ReportKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl ParamName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for ParamName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Keys and parameter names share the same charset: `^[A-Za-z0-9_.-]+$`.
pub(crate) fn is_valid_identifier(value: &str) -> bool {
    !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_and_param_serialize_transparently() {
        let key = ReportKey::new("q3");
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"q3\"");
        let parsed: ParamName = serde_json::from_str("\"city\"").unwrap();
        assert_eq!(parsed, ParamName::new("city"));
    }

    #[test]
    fn identifier_charset() {
        assert!(is_valid_identifier("q14"));
        assert!(is_valid_identifier("as_of"));
        assert!(!is_valid_identifier(""));
        assert!(!is_valid_identifier("q 1"));
        assert!(!is_valid_identifier("../q1"));
    }
}
