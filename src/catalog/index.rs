//! Validated, ordered view of the report catalog.
//!
//! Loading checks the document against `schema/report_catalog.schema.json`,
//! rejects duplicate keys, and requires each entry's declared parameters to
//! match the `:name` placeholders in its SQL exactly. Entries keep file order.

use crate::catalog::identity::{ParamName, ReportKey, is_valid_identifier};
use crate::catalog::model::{ReportCatalogFile, ReportEntry, ReportSpec};
use crate::catalog::overrides::ParamOverrides;
use crate::error::Error;
use anyhow::{Context, Result, anyhow, bail};
use jsonschema::JSONSchema;
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

const BUILTIN_CATALOG: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/catalog/reports.json"));
const CATALOG_SCHEMA: &str = include_str!(concat!(
    env!("CARGO_MANIFEST_DIR"),
    "/schema/report_catalog.schema.json"
));

#[derive(Debug, Clone)]
pub struct ReportCatalog {
    schema_version: String,
    entries: Vec<ReportEntry>,
    by_key: BTreeMap<ReportKey, usize>,
}

impl ReportCatalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(BUILTIN_CATALOG).context("loading built-in report catalog")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let data =
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
        Self::from_json_str(&data).with_context(|| format!("loading {}", path.display()))
    }

    pub fn from_json_str(data: &str) -> Result<Self> {
        let value: Value = serde_json::from_str(data).context("parsing report catalog JSON")?;
        validate_against_schema(&value)?;
        let file: ReportCatalogFile =
            serde_json::from_value(value).context("decoding report catalog")?;
        Self::from_file(file)
    }

    fn from_file(file: ReportCatalogFile) -> Result<Self> {
        if file.reports.is_empty() {
            bail!("catalog contains no reports");
        }
        let mut entries = Vec::with_capacity(file.reports.len());
        let mut by_key = BTreeMap::new();
        for spec in file.reports {
            validate_spec(&spec)?;
            if by_key.contains_key(&spec.key) {
                bail!("duplicate report key {}", spec.key);
            }
            by_key.insert(spec.key.clone(), entries.len());
            entries.push(ReportEntry::from_spec(spec));
        }
        Ok(Self {
            schema_version: file.schema_version,
            entries,
            by_key,
        })
    }

    pub fn schema_version(&self) -> &str {
        &self.schema_version
    }

    /// Resolve an entry by key, or `None` when the key is unknown.
    pub fn lookup(&self, key: &ReportKey) -> Option<&ReportEntry> {
        self.by_key.get(key).map(|idx| &self.entries[*idx])
    }

    /// Resolve an entry by key, failing with [`Error::ReportNotFound`].
    pub fn get(&self, key: &ReportKey) -> crate::Result<&ReportEntry> {
        self.lookup(key)
            .ok_or_else(|| Error::ReportNotFound(key.clone()))
    }

    /// Check that every override names a known report and a parameter it declares.
    pub fn check_overrides(&self, overrides: &ParamOverrides) -> crate::Result<()> {
        for key in overrides.reports() {
            self.get(key)?.bind(overrides)?;
        }
        Ok(())
    }

    /// Entries in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &ReportKey> {
        self.entries.iter().map(ReportEntry::key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn validate_spec(spec: &ReportSpec) -> Result<()> {
    if !is_valid_identifier(spec.key.as_str()) {
        bail!("report key must match ^[A-Za-z0-9_.-]+$, got '{}'", spec.key);
    }
    if spec.description.trim().is_empty() {
        bail!("report {} has an empty description", spec.key);
    }
    if spec.sql.trim().is_empty() {
        bail!("report {} has empty SQL", spec.key);
    }

    let declared: BTreeSet<String> = spec
        .params
        .iter()
        .flat_map(|params| params.keys())
        .map(|name: &ParamName| name.0.clone())
        .collect();
    let used = placeholder_names(&spec.sql);
    if let Some(missing) = used.difference(&declared).next() {
        bail!(
            "report {} uses placeholder :{} without a default",
            spec.key,
            missing
        );
    }
    if let Some(unused) = declared.difference(&used).next() {
        bail!(
            "report {} declares parameter '{}' that its SQL never uses",
            spec.key,
            unused
        );
    }
    Ok(())
}

/// Names of `:name` placeholders in `sql`, ignoring quoted text, comments and `::` casts.
pub(crate) fn placeholder_names(sql: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut chars = sql.chars().peekable();
    let mut quote: Option<char> = None;
    while let Some(c) = chars.next() {
        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            continue;
        }
        match c {
            '\'' | '"' | '`' => quote = Some(c),
            '-' if chars.peek() == Some(&'-') => {
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek() == Some(&'*') => {
                chars.next();
                let mut prev = '\0';
                for skipped in chars.by_ref() {
                    if prev == '*' && skipped == '/' {
                        break;
                    }
                    prev = skipped;
                }
            }
            ':' => {
                if chars.peek() == Some(&':') {
                    chars.next();
                    continue;
                }
                let mut name = String::new();
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                if !name.is_empty() {
                    names.insert(name);
                }
            }
            _ => {}
        }
    }
    names
}

fn validate_against_schema(catalog: &Value) -> Result<()> {
    let schema: Value =
        serde_json::from_str(CATALOG_SCHEMA).context("parsing report catalog schema")?;
    let compiled = JSONSchema::compile(&schema)
        .map_err(|err| anyhow!("compiling report catalog schema: {err}"))?;
    if let Err(errors) = compiled.validate(catalog) {
        let details = errors
            .map(|err| err.to_string())
            .collect::<Vec<_>>()
            .join("\n");
        bail!("report catalog failed schema validation:\n{details}");
    }
    Ok(())
}
