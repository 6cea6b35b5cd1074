//! Typed cell values shared by result sets and bound parameters.

use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl SqlValue {
    /// Interpret command-line input: integers and decimals keep their type, anything else is text.
    pub fn parse_literal(raw: &str) -> Self {
        let trimmed = raw.trim();
        if let Ok(int) = trimmed.parse::<i64>() {
            return SqlValue::Integer(int);
        }
        if let Ok(real) = trimmed.parse::<f64>() {
            if real.is_finite() {
                return SqlValue::Real(real);
            }
        }
        SqlValue::Text(raw.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(v) => Some(*v as f64),
            SqlValue::Real(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(v) => Some(v.as_str()),
            _ => None,
        }
    }
}

impl From<ValueRef<'_>> for SqlValue {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(v) => SqlValue::Integer(v),
            ValueRef::Real(v) => SqlValue::Real(v),
            ValueRef::Text(bytes) => SqlValue::Text(String::from_utf8_lossy(bytes).into_owned()),
            ValueRef::Blob(bytes) => SqlValue::Blob(bytes.to_vec()),
        }
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl ToSql for SqlValue {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            SqlValue::Null => ToSqlOutput::Borrowed(ValueRef::Null),
            SqlValue::Integer(v) => ToSqlOutput::from(*v),
            SqlValue::Real(v) => ToSqlOutput::from(*v),
            SqlValue::Text(v) => ToSqlOutput::from(v.as_str()),
            SqlValue::Blob(v) => ToSqlOutput::from(v.as_slice()),
        })
    }
}

/// Renders cells the way CSV export and terminal tables show them; NULL is empty.
impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => Ok(()),
            SqlValue::Integer(v) => write!(f, "{v}"),
            SqlValue::Real(v) => write!(f, "{v:?}"),
            SqlValue::Text(v) => f.write_str(v),
            SqlValue::Blob(v) => write!(f, "<{} bytes>", v.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn literals_keep_numeric_types() {
        assert_eq!(SqlValue::parse_literal("42"), SqlValue::Integer(42));
        assert_eq!(SqlValue::parse_literal("2.5"), SqlValue::Real(2.5));
        assert_eq!(
            SqlValue::parse_literal("Hyderabad"),
            SqlValue::Text("Hyderabad".into())
        );
        assert_eq!(SqlValue::parse_literal("NaN"), SqlValue::Text("NaN".into()));
    }

    #[test]
    fn json_defaults_deserialize_untagged() {
        let parsed: Vec<SqlValue> = serde_json::from_str(r#"[null, 3, 1.5, "now"]"#).unwrap();
        assert_eq!(
            parsed,
            vec![
                SqlValue::Null,
                SqlValue::Integer(3),
                SqlValue::Real(1.5),
                SqlValue::Text("now".into())
            ]
        );
    }

    #[test]
    fn display_matches_export_format() {
        assert_eq!(SqlValue::Null.to_string(), "");
        assert_eq!(SqlValue::Real(75.0).to_string(), "75.0");
        assert_eq!(SqlValue::Integer(-3).to_string(), "-3");
    }
}
