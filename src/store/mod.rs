// store/mod.rs

//! # Payroll Store Module
//!
//! Persistent payroll tables keyed by institute, staff type, month and year.
//!
//! ## Features
//! - Table keys with validated parts and pattern-checked names
//! - Create, upsert, fetch, drop and list operations on SQLite
//! - One closed result type per write operation
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let key = TableKey::from_parts("somaiya", "teaching", "jan", "2024")?;
//! let mut store = PayrollStore::open(&settings.database_path(workspace_dir()))?;
//! println!("{}", store.create_table(&key, table.columns()));
//! println!("{}", store.upsert_rows(&key, &table));
//! ```

pub mod database;
pub mod key;

use std::fmt;

use thiserror::Error;

pub use database::{PayrollStore, TableListing};
pub use key::{Institute, Month, StaffType, TableKey};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Table does not exist: {0}")]
    TableNotFound(String),

    #[error("{0}")]
    InvalidKey(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

const NO_IDENTIFIER: &str = "HR Emp Code column was not found!";
const COLUMNS_MISMATCH: &str = "Table exists, but columns do not match to those in database";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateResult {
    Success,
    Exists,
    ColumnsMismatch,
    NoIdentifier,
    Error(String),
}

impl CreateResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, CreateResult::Success | CreateResult::Exists)
    }
}

impl fmt::Display for CreateResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreateResult::Success => write!(f, "Table Generated Successfully"),
            CreateResult::Exists => write!(f, "Table Already Exists"),
            CreateResult::ColumnsMismatch => write!(f, "{}", COLUMNS_MISMATCH),
            CreateResult::NoIdentifier => write!(f, "{}", NO_IDENTIFIER),
            CreateResult::Error(e) => write!(f, "Database error: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpsertResult {
    /// Number of rows inserted or updated
    Success(usize),
    ColumnsMismatch,
    NoIdentifier,
    Error(String),
}

impl fmt::Display for UpsertResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpsertResult::Success(n) => {
                write!(f, "Records were successfully inserted or updated! ({} rows)", n)
            }
            UpsertResult::ColumnsMismatch => write!(f, "{}", COLUMNS_MISMATCH),
            UpsertResult::NoIdentifier => write!(f, "{}", NO_IDENTIFIER),
            UpsertResult::Error(e) => write!(f, "Database error: {}", e),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropResult {
    Success,
    TableNotFound,
    Error(String),
}

impl fmt::Display for DropResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DropResult::Success => write!(f, "Table was successfully deleted!"),
            DropResult::TableNotFound => write!(f, "Table does not exists!"),
            DropResult::Error(e) => write!(f, "Database error: {}", e),
        }
    }
}
