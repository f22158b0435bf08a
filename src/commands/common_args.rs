// commands/common_args.rs

//! # Common Command Arguments
//!
//! Command-line arguments shared across commands, plus the helpers commands
//! use to turn them into data: the payroll period, the input table (from a
//! spreadsheet or from the store) and the async runtime.

use std::path::{Path, PathBuf};

use clap::{Arg, ArgAction, ArgMatches};
use log::debug;

use crate::app::{DEFAULT_ENV_FILE, DEFAULT_LOG_LEVEL, DEFAULT_WORKSPACE, LOG_LEVELS};
use crate::core::utils::year_check;
use crate::dataset::loader::load_table;
use crate::dataset::Table;
use crate::error::AppError;
use crate::globals::{settings, workspace_dir};
use crate::store::{Month, PayrollStore, TableKey};
use crate::template::context::RenderContext;

// ============================
// Global arguments
// ============================

/// Workspace directory holding `html/`, `json/`, `excel/` and `payslip.yml`
pub fn workspace() -> Arg {
    Arg::new("workspace")
        .long("workspace")
        .short('w')
        .help("Workspace directory")
        .global(true)
        .default_value(DEFAULT_WORKSPACE)
}

pub fn log_level() -> Arg {
    Arg::new("log-level")
        .long("log-level")
        .help("Set the logging level")
        .global(true)
        .value_parser(clap::builder::PossibleValuesParser::new(LOG_LEVELS))
        .ignore_case(true)
        .default_value(DEFAULT_LOG_LEVEL)
}

/// Append log records to a file instead of stderr
pub fn log_file() -> Arg {
    Arg::new("log-file")
        .long("log-file")
        .help("Write log records to this file")
        .global(true)
}

pub fn env_file() -> Arg {
    Arg::new("env-file")
        .long("env-file")
        .help("Environment variables file")
        .global(true)
        .default_value(DEFAULT_ENV_FILE)
}

pub fn env_var() -> Arg {
    Arg::new("env")
        .short('e')
        .long("env")
        .help("Set additional environment variables (format: KEY=VALUE)")
        .global(true)
        .action(ArgAction::Append)
}

// ============================
// Data source arguments
// ============================

/// Positional spreadsheet path; optional when `--from-db` is given.
pub fn data() -> Arg {
    Arg::new("data")
        .help("Payroll spreadsheet (.xlsx, .xls, .ods, .csv)")
        .required_unless_present("from-db")
}

pub fn sheet() -> Arg {
    Arg::new("sheet")
        .long("sheet")
        .help("Sheet to read (default: first sheet)")
}

pub fn password() -> Arg {
    Arg::new("password")
        .long("password")
        .help("Workbook password")
}

pub fn from_db() -> Arg {
    Arg::new("from-db")
        .long("from-db")
        .help("Read the table stored for this institute and staff type")
        .num_args(2)
        .value_names(["INSTITUTE", "TYPE"])
        .conflicts_with("data")
}

pub fn month() -> Arg {
    Arg::new("month")
        .long("month")
        .short('m')
        .help("Payroll month (e.g. jan, sept, March)")
        .required(true)
}

pub fn year() -> Arg {
    Arg::new("year")
        .long("year")
        .short('y')
        .help("Payroll year (four digits)")
        .required(true)
}

pub fn identifier() -> Arg {
    Arg::new("identifier")
        .long("identifier")
        .help("Identifier column (default: identifier_column from payslip.yml)")
}

pub fn id() -> Arg {
    Arg::new("id")
        .long("id")
        .help("Employee code")
        .required(true)
}

pub fn institute() -> Arg {
    Arg::new("institute")
        .long("institute")
        .help("Institute (somaiya, svv)")
        .required(true)
}

pub fn staff_type() -> Arg {
    Arg::new("type")
        .long("type")
        .help("Staff type (teaching, nonteaching, temporary, svv)")
        .required(true)
}

pub fn dry_run() -> Arg {
    Arg::new("dry-run")
        .long("dry-run")
        .help("Bind and render every row without writing PDFs")
        .action(ArgAction::SetTrue)
}

// ============================
// Helpers
// ============================

/// Returns a required string argument.
pub fn required<'a>(matches: &'a ArgMatches, name: &str) -> Result<&'a str, AppError> {
    matches
        .get_one::<String>(name)
        .map(String::as_str)
        .ok_or_else(|| AppError::InvalidInput(format!("missing argument '{}'", name)))
}

pub fn optional<'a>(matches: &'a ArgMatches, name: &str) -> Option<&'a str> {
    matches.get_one::<String>(name).map(String::as_str)
}

/// Payroll month and year given on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Period {
    pub month: Month,
    pub year: u32,
}

impl Period {
    pub fn parse(month: &str, year: &str) -> Result<Self, AppError> {
        let month: Month = month.parse()?;
        if !year_check(year.trim()) {
            return Err(AppError::InvalidInput(format!("invalid year '{}'", year.trim())));
        }
        let year = year
            .trim()
            .parse()
            .map_err(|_| AppError::InvalidInput(format!("invalid year '{}'", year.trim())))?;
        Ok(Self { month, year })
    }

    pub fn from_matches(matches: &ArgMatches) -> Result<Self, AppError> {
        Self::parse(required(matches, "month")?, required(matches, "year")?)
    }

    /// `None` unless both `--month` and `--year` were given.
    pub fn from_optional(matches: &ArgMatches) -> Result<Option<Self>, AppError> {
        match (optional(matches, "month"), optional(matches, "year")) {
            (Some(month), Some(year)) => Self::parse(month, year).map(Some),
            _ => Ok(None),
        }
    }

    /// `Jan-2024`, as used in mail subjects.
    pub fn label(&self) -> String {
        format!("{}-{}", self.month.label(), self.year)
    }

    /// The `month` and `year` values bound into every slip.
    pub fn extras(&self) -> RenderContext {
        let mut extras = RenderContext::new();
        extras.add_variable("month".to_string(), self.month.label());
        extras.add_variable("year".to_string(), self.year.to_string());
        extras
    }
}

/// Opens the configured payroll store.
pub fn open_store() -> Result<PayrollStore, AppError> {
    let path = settings().database_path(workspace_dir());
    Ok(PayrollStore::open(&path)?.with_identifier_column(&settings().identifier_column))
}

/// Loads the input table from the spreadsheet argument or, with `--from-db`,
/// from the store table of the given period.
pub fn load_source(matches: &ArgMatches, period: Option<Period>) -> Result<Table, AppError> {
    if let Some(mut parts) = matches.get_many::<String>("from-db") {
        let (institute, staff_type) = match (parts.next(), parts.next()) {
            (Some(i), Some(t)) => (i, t),
            _ => {
                return Err(AppError::InvalidInput(
                    "--from-db expects INSTITUTE and TYPE".to_string(),
                ))
            }
        };
        let period = period.ok_or_else(|| {
            AppError::InvalidInput("--from-db requires --month and --year".to_string())
        })?;
        let key = TableKey::new(
            institute.parse()?,
            staff_type.parse()?,
            period.month,
            period.year,
        );
        debug!("Reading stored table {}", key);
        return Ok(open_store()?.fetch_all(&key)?);
    }

    let path = resolve_path(required(matches, "data")?);
    Ok(load_table(&path, optional(matches, "password"), optional(matches, "sheet"))?)
}

/// Relative paths that do not exist from the current directory are tried
/// against the workspace's `excel/` folder.
pub fn resolve_path(path: &str) -> PathBuf {
    let given = Path::new(path);
    if given.is_absolute() || given.exists() {
        return given.to_path_buf();
    }
    let in_workspace = workspace_dir().join(crate::app::EXCEL_DIR).join(given);
    if in_workspace.exists() {
        in_workspace
    } else {
        given.to_path_buf()
    }
}

/// Identifier column from `--identifier` or the settings.
pub fn identifier_column(matches: &ArgMatches) -> String {
    optional(matches, "identifier")
        .map(str::to_string)
        .unwrap_or_else(|| settings().identifier_column.clone())
}

/// Multi-thread runtime for batch work.
pub fn runtime() -> Result<tokio::runtime::Runtime, AppError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}
