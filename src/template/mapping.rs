// template/mapping.rs

//! # Column Mapping Module
//!
//! Resolves logical template fields to real spreadsheet columns.
//!
//! Column names in payroll sheets are inconsistent (`"HR EMP CODE "`,
//! `"Hr Emp Code\n"`, `"HR EMP CODE (NEW)"`), so matching is a
//! case-insensitive substring test, trying the shortest candidate first so the
//! most specific column wins.
//!
//! A `FieldMapping` is built once per batch from a JSON mapping file
//! (`{"Name": "Employee Name", "Basic": "BASIC PAY"}`) and reused for every row.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use log::{debug, warn};
use serde_json::Value as JsonValue;

use crate::app::{BRANCH_KEY, CODE_COL};
use crate::template::{TemplateError, TemplateResult};

/// Returns the shortest candidate containing `target` (case-insensitive).
///
/// Length counts characters. Candidates of equal length keep their original
/// order.
pub fn map_column<S: AsRef<str>>(candidates: &[S], target: &str) -> Option<String> {
    let target = target.to_lowercase();
    let mut ordered: Vec<&str> = candidates.iter().map(AsRef::as_ref).collect();
    ordered.sort_by_key(|c| c.chars().count());

    ordered
        .into_iter()
        .find(|candidate| candidate.to_lowercase().contains(&target))
        .map(str::to_string)
}

/// Where a field's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSource {
    /// A column of the dataset
    Column(String),

    /// A fixed value
    Literal(String),

    /// The requested column matched nothing; binds to the missing-value sentinel
    Unresolved(String),
}

/// Raw field specification as read from a JSON mapping file.
pub type FieldSpec = BTreeMap<String, Option<String>>;

/// Reads a JSON mapping file into a field specification.
///
/// Values may be strings, numbers or booleans (stored as their text) or
/// `null` (no column requested).
pub fn load_field_spec(path: &Path) -> TemplateResult<FieldSpec> {
    let text = fs::read_to_string(path).map_err(|e| {
        TemplateError::Other(format!("cannot read mapping {}: {}", path.display(), e))
    })?;
    parse_field_spec(&text)
}

/// Parses the text of a JSON mapping file.
pub fn parse_field_spec(text: &str) -> TemplateResult<FieldSpec> {
    let value: JsonValue = serde_json::from_str(text)?;
    let object = match value {
        JsonValue::Object(map) => map,
        _ => {
            return Err(TemplateError::Other(
                "field mapping must be a JSON object".to_string(),
            ))
        }
    };

    Ok(object
        .into_iter()
        .map(|(field, value)| {
            let source = match value {
                JsonValue::Null => None,
                JsonValue::String(s) => Some(s),
                other => Some(other.to_string()),
            };
            (field, source)
        })
        .collect())
}

/// Logical field name to value source, fixed for one batch.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldMapping {
    fields: BTreeMap<String, FieldSource>,
}

impl FieldMapping {
    /// Resolves every requested column against the dataset's columns.
    pub fn resolve(spec: &FieldSpec, columns: &[String]) -> Self {
        let mut fields = BTreeMap::new();

        for (field, requested) in spec {
            let source = match requested.as_deref().map(str::trim) {
                None | Some("") => FieldSource::Unresolved(String::new()),
                Some(target) => match map_column(columns, target) {
                    Some(column) => {
                        debug!("[PARSE] field '{}' -> column '{}'", field, column);
                        FieldSource::Column(column)
                    }
                    None => {
                        warn!("[PARSE] field '{}': no column matches '{}'", field, target);
                        FieldSource::Unresolved(target.to_string())
                    }
                },
            };
            fields.insert(field.clone(), source);
        }

        Self { fields }
    }

    /// Injects the synthetic identifier field, resolved against `columns`.
    pub fn with_identifier(mut self, identifier_column: &str, columns: &[String]) -> Self {
        let source = match map_column(columns, identifier_column) {
            Some(column) => FieldSource::Column(column),
            None => {
                warn!("[PARSE] identifier column '{}' not found", identifier_column);
                FieldSource::Unresolved(identifier_column.to_string())
            }
        };
        self.fields.insert(CODE_COL.to_string(), source);
        self
    }

    /// Injects the literal branch/site tag.
    pub fn with_branch(mut self, branch: &str) -> Self {
        self.fields
            .insert(BRANCH_KEY.to_string(), FieldSource::Literal(branch.to_string()));
        self
    }

    /// Sets or replaces a single field.
    pub fn insert(&mut self, field: &str, source: FieldSource) {
        self.fields.insert(field.to_string(), source);
    }

    /// The resolved identifier column, when the identifier field was injected and matched.
    pub fn identifier_column(&self) -> Option<&str> {
        match self.fields.get(CODE_COL) {
            Some(FieldSource::Column(column)) => Some(column),
            _ => None,
        }
    }

    pub fn get(&self, field: &str) -> Option<&FieldSource> {
        self.fields.get(field)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldSource)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Tokens that no field of this mapping (nor any of `extra_keys`) will provide.
    pub fn uncovered<'a, I>(&self, tokens: I, extra_keys: &[&str]) -> Vec<&'a str>
    where
        I: IntoIterator<Item = &'a String>,
    {
        tokens
            .into_iter()
            .map(String::as_str)
            .filter(|t| !self.fields.contains_key(*t) && !extra_keys.contains(t))
            .collect()
    }
}
