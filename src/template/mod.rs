// template/mod.rs

//! # Template Module
//!
//! The slip template pipeline: column mapping, template parsing, field binding
//! and rendering, plus template authoring and the workspace template folders.
//!
//! ## Features
//! - Fuzzy mapping of logical fields to spreadsheet columns
//! - `{{ token }}` templates compiled to `%(token)s` format strings
//! - Total field binding with `"-"` for anything without a value
//! - Authoring templates from a spec workbook
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let parsed = parser::load(&workspace.html_path("teaching"));
//! let spec = mapping::load_field_spec(&workspace.json_path("teaching"))?;
//! let mapping = FieldMapping::resolve(&spec, table.columns())
//!     .with_identifier("HR EMP CODE", table.columns())
//!     .with_branch("Sion");
//! let context = context::bind(&mapping, &table.rows()[0], &extras);
//! let html = engine::render(&parsed.format, &context)?;
//! ```

pub mod authoring;
pub mod context;
pub mod defaults;
pub mod engine;
pub mod mapping;
pub mod parser;
pub mod workspace;

use thiserror::Error;

pub use context::RenderContext;
pub use engine::RenderError;
pub use mapping::FieldMapping;
pub use parser::ParsedTemplate;

/// Errors raised by template handling outside of per-row rendering.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Render error: {0}")]
    Render(#[from] RenderError),

    #[error("Invalid JSON mapping: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    OutsideWorkspace(String),

    #[error("{0}")]
    Other(String),
}

pub type TemplateResult<T> = Result<T, TemplateError>;
