// pipeline/naming.rs

//! Output file naming for generated slips.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

use crate::app::{FILE_PATTERN, PDF_PREFIX, PDF_SUFFIX};
use crate::core::utils::file_clean;

static FILE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(FILE_PATTERN).expect("valid file pattern"));

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    #[error("'{0}' is not a valid output file name")]
    Rejected(String),
}

/// Derives `employee_<identifier>.pdf`, sanitizing the identifier first.
pub fn output_filename(identifier: &str) -> Result<String, NamingError> {
    let name = format!("{}{}{}", PDF_PREFIX, file_clean(identifier), PDF_SUFFIX);
    if is_slip_filename(&name) {
        Ok(name)
    } else {
        Err(NamingError::Rejected(name))
    }
}

/// True when `name` is a generated slip file name.
pub fn is_slip_filename(name: &str) -> bool {
    FILE_RE.is_match(name)
}
