// pipeline/mod.rs

//! # Generation Pipeline
//!
//! Bulk PDF generation: output naming, PDF rendering backends, cancellation
//! and the batch orchestrator.

pub mod cancel;
pub mod naming;
pub mod orchestrator;
pub mod pdf;

use std::path::PathBuf;

use thiserror::Error;

pub use cancel::CancelToken;
pub use orchestrator::{BatchJob, BatchReport, BatchState, BulkGenerator, GenerationOutcome};
pub use pdf::{DryRunRenderer, PdfRenderer, WkhtmltopdfRenderer};

/// Errors that stop a batch before any row is processed.
#[derive(Error, Debug)]
pub enum BatchError {
    #[error("Template unavailable: {0}")]
    TemplateUnavailable(PathBuf),

    #[error("Employee Code '{0}' was not found")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Batch runtime error: {0}")]
    Runtime(String),
}
