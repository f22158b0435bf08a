// dataset/mod.rs

//! # Dataset Module
//!
//! In-memory payroll data: a `Dataset` is an ordered list of named sheets,
//! each a `Table` of text rows sharing one column set. Datasets come from the
//! spreadsheet loader or the payroll store and live for one operation.
//!
//! A `Row` is a typed mapping from column name to value; asking for a column
//! the table does not have is `None`, never an error.

pub mod loader;

use std::sync::Arc;

use crate::core::utils::{clean_cell, text_clean};

/// One record of a table.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// Returns the value stored under `column`, or `None` when the column does not exist.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.columns
            .iter()
            .position(|c| c == column)
            .and_then(|i| self.values.get(i))
            .map(String::as_str)
    }

    /// Column names, in table order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values, aligned with `columns()`.
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Iterates `(column, value)` pairs in table order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.columns
            .iter()
            .map(String::as_str)
            .zip(self.values.iter().map(String::as_str))
    }
}

/// A sheet of rows sharing one column set.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds a table. Short rows are padded with empty cells and long rows
    /// truncated so every row has exactly one value per column.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns: Arc<[String]> = columns.into();
        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut values| {
                values.resize(width, String::new());
                Row {
                    columns: Arc::clone(&columns),
                    values,
                }
            })
            .collect();
        Self { columns, rows }
    }

    /// Builds a table whose column names are cleaned (newlines removed, trimmed).
    pub fn with_refined_columns(columns: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let columns = columns.iter().map(|c| text_clean(c)).collect();
        Self::new(columns, rows)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Finds the first row whose cleaned `column` value equals `value`.
    pub fn find_by(&self, column: &str, value: &str) -> Option<&Row> {
        let wanted = value.trim();
        self.rows
            .iter()
            .find(|row| row.get(column).map(clean_cell).as_deref() == Some(wanted))
    }
}

/// An ordered collection of named tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    sheets: Vec<(String, Table)>,
}

impl Dataset {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a sheet, replacing any sheet with the same name.
    pub fn insert(&mut self, name: String, table: Table) {
        match self.sheets.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = table,
            None => self.sheets.push((name, table)),
        }
    }

    pub fn sheet(&self, name: &str) -> Option<&Table> {
        self.sheets.iter().find(|(n, _)| n == name).map(|(_, t)| t)
    }

    pub fn sheet_names(&self) -> impl Iterator<Item = &str> {
        self.sheets.iter().map(|(n, _)| n.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Takes the named sheet, or the first sheet when `name` is `None`.
    pub fn into_table(self, name: Option<&str>) -> Option<Table> {
        match name {
            Some(name) => self.sheets.into_iter().find(|(n, _)| n == name).map(|(_, t)| t),
            None => self.sheets.into_iter().next().map(|(_, t)| t),
        }
    }
}
