// template/authoring.rs

//! # Template Authoring
//!
//! Builds a slip template from a layout workbook. The workbook has one sheet
//! per page section (`Personal Left`, `Personal Right`, `Earning`,
//! `Deductions`, `Salary Left`, `Salary Right`), each listing a `Name`
//! (label printed on the slip) and a `Column` (data column holding the value).
//!
//! Every listed row becomes a numbered token, numbered across all sheets:
//!
//! ```text
//! <tr><td>Basic Pay:</td>
//! <td><span>{{4}}</span></td></tr>
//! ```
//!
//! and the generated mapping binds `"4"` to the listed column.

use std::collections::BTreeMap;

use log::{debug, warn};

use crate::app::{BRANCH_KEY, CODE_COL, TEMPLATE_DATA_COLUMN, TEMPLATE_LABEL_COLUMN, TEMPLATE_SHEETS};
use crate::core::utils::{html_escape, text_clean};
use crate::dataset::{Dataset, Table};

use super::context::RenderContext;
use super::defaults::SCAFFOLD_HTML;
use super::engine::render;
use super::mapping::map_column;
use super::parser::parse;
use super::TemplateResult;

/// A generated template and its field mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthoredTemplate {
    pub html: String,
    pub mapping: BTreeMap<String, String>,
}

impl AuthoredTemplate {
    /// The mapping as pretty JSON, ready to be written to `json/<name>.json`.
    pub fn mapping_json(&self) -> TemplateResult<String> {
        Ok(serde_json::to_string_pretty(&self.mapping)?)
    }
}

/// Generates the template HTML and mapping from a layout workbook.
pub fn make_template(layout: &Dataset) -> TemplateResult<AuthoredTemplate> {
    let mut counter = 0usize;
    let mut mapping = BTreeMap::new();
    let mut sections = RenderContext::new();

    for sheet in TEMPLATE_SHEETS {
        let mut section = String::new();

        for (label, column) in sheet_entries(layout, sheet) {
            section.push_str(&format!(
                "<tr><td>{}:</td>\n<td><span>{{{{{}}}}}</span></td></tr>\n",
                html_escape(&label),
                counter
            ));
            mapping.insert(counter.to_string(), column);
            counter += 1;
        }

        sections.add_variable(sheet.replace(' ', "_"), section);
    }

    // Keep the per-slip fields as tokens in the generated page.
    for key in ["month", "year", BRANCH_KEY, CODE_COL] {
        sections.add_variable(key.to_string(), format!("{{{{{}}}}}", key));
    }

    let html = render(&parse(SCAFFOLD_HTML).format, &sections)?;
    debug!("[PARSE] authored template with {} field(s)", counter);

    Ok(AuthoredTemplate { html, mapping })
}

/// Every data column named in the layout workbook, in sheet order.
pub fn needed_columns(layout: &Dataset) -> Vec<String> {
    TEMPLATE_SHEETS
        .iter()
        .flat_map(|sheet| sheet_entries(layout, sheet))
        .map(|(_, column)| column)
        .collect()
}

/// `(label, column)` pairs listed on one sheet; empty when the sheet or either
/// header is missing.
fn sheet_entries(layout: &Dataset, sheet: &str) -> Vec<(String, String)> {
    let Some(table) = layout.sheet(sheet) else {
        debug!("[PARSE] layout sheet '{}' not present", sheet);
        return Vec::new();
    };

    let (Some(label_col), Some(data_col)) = (
        map_column(table.columns(), TEMPLATE_LABEL_COLUMN),
        map_column(table.columns(), TEMPLATE_DATA_COLUMN),
    ) else {
        warn!(
            "[PARSE] layout sheet '{}' needs '{}' and '{}' columns",
            sheet, TEMPLATE_LABEL_COLUMN, TEMPLATE_DATA_COLUMN
        );
        return Vec::new();
    };

    entries(table, &label_col, &data_col)
}

fn entries(table: &Table, label_col: &str, data_col: &str) -> Vec<(String, String)> {
    table
        .rows()
        .iter()
        .filter_map(|row| {
            let label = text_clean(row.get(label_col).unwrap_or_default());
            let column = text_clean(row.get(data_col).unwrap_or_default());
            if label.is_empty() && column.is_empty() {
                None
            } else {
                Some((label, column))
            }
        })
        .collect()
}
