// error.rs

//! # Error Handling Module
//!
//! This module provides the application-level error type for payslip.
//! Each subsystem defines its own error enum; `AppError` folds them together so
//! command handlers can propagate anything with `?` and report it in one place.
//!
//! Per-row generation failures are never `AppError`s: they are recorded as
//! outcomes by the batch orchestrator.
//!
//! # Usage Example
//! ```rust
//! use crate::error::AppError;
//!
//! fn example_function() -> Result<(), AppError> {
//!     Err(AppError::InvalidInput("year must have four digits".to_string()))
//! }
//! ```

use std::error::Error;
use std::fmt;

use crate::core::config::ConfigError;
use crate::dataset::loader::LoadError;
use crate::mail::MailError;
use crate::pipeline::BatchError;
use crate::store::StoreError;
use crate::template::TemplateError;

// ============================
// Application Error Definitions
// ============================

/// Represents errors that may occur within the application.
#[derive(Debug)]
pub enum AppError {
    /// Workspace configuration could not be loaded.
    Config(ConfigError),

    /// A spreadsheet could not be loaded.
    Load(LoadError),

    /// Template or field-mapping failure outside of a batch.
    Template(TemplateError),

    /// A batch could not start.
    Batch(BatchError),

    /// Payroll store failure.
    Store(StoreError),

    /// Mail failure outside of a mass-mail run.
    Mail(MailError),

    /// A user-supplied argument is invalid.
    InvalidInput(String),

    /// An external program (`wkhtmltopdf`, `sendmail`) could not be found.
    BinaryNotFound(String),

    /// Wrapper for standard I/O errors.
    IoError(std::io::Error),
}

// ============================
// Display Trait Implementation
// ============================

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Config(err) => write!(f, "Configuration error: {}", err),
            Self::Load(err) => write!(f, "Spreadsheet error: {}", err),
            Self::Template(err) => write!(f, "Template error: {}", err),
            Self::Batch(err) => write!(f, "Batch error: {}", err),
            Self::Store(err) => write!(f, "Database error: {}", err),
            Self::Mail(err) => write!(f, "Mail error: {}", err),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
            Self::BinaryNotFound(name) => write!(
                f,
                "'{}' was not found. Install it or set its path in payslip.yml.",
                name
            ),
            Self::IoError(err) => write!(f, "IO error: {}", err),
        }
    }
}

// ============================
// Error Trait Implementation
// ============================

impl Error for AppError {}

// ============================
// Conversions
// ============================

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::IoError(error)
    }
}

impl From<ConfigError> for AppError {
    fn from(error: ConfigError) -> Self {
        Self::Config(error)
    }
}

impl From<LoadError> for AppError {
    fn from(error: LoadError) -> Self {
        Self::Load(error)
    }
}

impl From<TemplateError> for AppError {
    fn from(error: TemplateError) -> Self {
        Self::Template(error)
    }
}

impl From<BatchError> for AppError {
    fn from(error: BatchError) -> Self {
        Self::Batch(error)
    }
}

impl From<StoreError> for AppError {
    fn from(error: StoreError) -> Self {
        Self::Store(error)
    }
}

impl From<MailError> for AppError {
    fn from(error: MailError) -> Self {
        Self::Mail(error)
    }
}
