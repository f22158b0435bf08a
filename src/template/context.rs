// template/context.rs

//! # Render Context Module
//!
//! The concrete key/value map used to render one slip, and the field binder
//! that builds it from a row and a field mapping.
//!
//! Binding is total: every field of the mapping ends up in the context. A
//! field whose column exists binds to the cleaned cell text (possibly empty),
//! anything else binds to its literal or to `"-"`.

use std::collections::HashMap;

use crate::app::MISSING_VALUE;
use crate::core::utils::clean_cell;
use crate::dataset::Row;

use super::mapping::{FieldMapping, FieldSource};

/// Variables for one render.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct RenderContext {
    variables: HashMap<String, String>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            variables: HashMap::new(),
        }
    }

    /// Adds a variable, replacing any previous value.
    pub fn add_variable(&mut self, name: String, value: String) {
        self.variables.insert(name, value);
    }

    pub fn get_variable(&self, name: &str) -> Option<&String> {
        self.variables.get(name)
    }

    pub fn get_variables(&self) -> &HashMap<String, String> {
        &self.variables
    }

    /// Merges `other` into this context; `other` wins on conflicts.
    pub fn merge(&mut self, other: &RenderContext) {
        for (name, value) in &other.variables {
            self.variables.insert(name.clone(), value.clone());
        }
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Binds one row through `mapping`, then merges `extras` over the result.
pub fn bind(mapping: &FieldMapping, row: &Row, extras: &RenderContext) -> RenderContext {
    let mut context = RenderContext::new();

    for (field, source) in mapping.iter() {
        let value = match source {
            FieldSource::Column(column) => match row.get(column) {
                Some(cell) => clean_cell(cell),
                None => MISSING_VALUE.to_string(),
            },
            FieldSource::Literal(literal) if !literal.is_empty() => literal.clone(),
            FieldSource::Literal(_) | FieldSource::Unresolved(_) => MISSING_VALUE.to_string(),
        };
        context.add_variable(field.to_string(), value);
    }

    context.merge(extras);
    context
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{BRANCH_KEY, CODE_COL};
    use crate::dataset::Table;
    use crate::template::mapping::parse_field_spec;

    fn table() -> Table {
        Table::new(
            vec!["HR EMP CODE".into(), "Name".into(), "Basic".into()],
            vec![vec!["E100".into(), " Jane\nDoe ".into(), "".into()]],
        )
    }

    #[test]
    fn test_bind_is_total() {
        let table = table();
        let spec =
            parse_field_spec(r#"{"Name": "name", "Basic": "basic", "HRA": "hra", "Nil": null}"#)
                .unwrap();
        let mapping = FieldMapping::resolve(&spec, table.columns())
            .with_identifier("HR EMP CODE", table.columns())
            .with_branch("Sion");

        let ctx = bind(&mapping, &table.rows()[0], &RenderContext::new());

        for (field, _) in mapping.iter() {
            assert!(ctx.get_variable(field).is_some(), "missing {}", field);
        }
        assert_eq!(ctx.get_variable("Name"), Some(&"JaneDoe".to_string()));
        assert_eq!(ctx.get_variable("Basic"), Some(&String::new()));
        assert_eq!(ctx.get_variable("HRA"), Some(&"-".to_string()));
        assert_eq!(ctx.get_variable("Nil"), Some(&"-".to_string()));
        assert_eq!(ctx.get_variable(CODE_COL), Some(&"E100".to_string()));
        assert_eq!(ctx.get_variable(BRANCH_KEY), Some(&"Sion".to_string()));
    }

    #[test]
    fn test_extras_override() {
        let table = table();
        let mut mapping = FieldMapping::default();
        mapping.insert("month", FieldSource::Literal("Jan".into()));
        mapping.insert("empty", FieldSource::Literal(String::new()));

        let mut extras = RenderContext::new();
        extras.add_variable("month".into(), "March".into());
        extras.add_variable("year".into(), "2024".into());

        let ctx = bind(&mapping, &table.rows()[0], &extras);
        assert_eq!(ctx.get_variable("month"), Some(&"March".to_string()));
        assert_eq!(ctx.get_variable("year"), Some(&"2024".to_string()));
        assert_eq!(ctx.get_variable("empty"), Some(&"-".to_string()));
        assert_eq!(ctx.len(), 3);
    }

    #[test]
    fn test_column_absent_from_row() {
        let table = table();
        let mut mapping = FieldMapping::default();
        mapping.insert("Gone", FieldSource::Column("Deleted Column".into()));
        let ctx = bind(&mapping, &table.rows()[0], &RenderContext::new());
        assert_eq!(ctx.get_variable("Gone"), Some(&"-".to_string()));
    }
}
