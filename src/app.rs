// app.rs

//! # Application Constants
//!
//! Names, defaults and fixed patterns shared across the payslip application.

/// Application name as shown in `--help`.
pub const APP_NAME: &str = "payslip";

/// Application version, taken from Cargo metadata.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application description.
pub const APP_DESCRIPTION: &str =
    "Generate per-employee salary slip PDFs from payroll spreadsheets, store payroll tables and mail the slips";

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Accepted log levels.
pub const LOG_LEVELS: &[&str] = &["error", "warn", "info", "debug", "trace"];

/// Default workspace directory.
pub const DEFAULT_WORKSPACE: &str = ".";

/// Default environment file.
pub const DEFAULT_ENV_FILE: &str = ".env";

/// Workspace configuration file name.
pub const CONFIG_FILE_NAME: &str = "payslip.yml";

/// Workspace sub-directories.
pub const HTML_DIR: &str = "html";
pub const JSON_DIR: &str = "json";
pub const EXCEL_DIR: &str = "excel";

/// Synthetic render-context key holding the record identifier.
pub const CODE_COL: &str = "__id__";

/// Render-context key holding the branch/site tag.
pub const BRANCH_KEY: &str = "branch";

/// Default branch/site tag.
pub const DEFAULT_BRANCH: &str = "Sion";

/// Default identifier column hint (matched fuzzily).
pub const DEFAULT_IDENTIFIER_COLUMN: &str = "HR EMP CODE";

/// Sentinel bound for fields without a value.
pub const MISSING_VALUE: &str = "-";

/// Output PDF file name prefix and suffix.
pub const PDF_PREFIX: &str = "employee_";
pub const PDF_SUFFIX: &str = ".pdf";

/// Pattern every generated PDF file name must match.
pub const FILE_PATTERN: &str = r"^employee_(\w+|\d+)\.pdf$";

/// Characters removed from identifiers before they are used in file names.
pub const FILENAME_DENY: &str = "<>:\"/\\?*'\n";

/// Replacement file stem when sanitizing empties the identifier.
pub const EMPTY_FILENAME: &str = "none";

/// Default PDF engine binary.
pub const DEFAULT_WKHTMLTOPDF: &str = "wkhtmltopdf";

/// Default sendmail-compatible binary.
pub const DEFAULT_SENDMAIL: &str = "sendmail";

/// Default payroll database file (relative to the workspace).
pub const DEFAULT_DATABASE: &str = "payroll.db";

/// Stored payroll table name pattern: `institute_type_month_year`.
pub const TABLE_PATTERN: &str = r"^(somaiya|svv)_(teaching|nonteaching|temporary|svv)_(jan|feb|mar|apr|may|jun|jul|aug|sept|oct|nov|dec)_(\d{4})$";

/// Sheets read from a template-authoring workbook, in section order.
pub const TEMPLATE_SHEETS: &[&str] = &[
    "Personal Left",
    "Personal Right",
    "Earning",
    "Deductions",
    "Salary Left",
    "Salary Right",
];

/// Label and data-column headers expected on each authoring sheet.
pub const TEMPLATE_LABEL_COLUMN: &str = "Name";
pub const TEMPLATE_DATA_COLUMN: &str = "Column";

/// Default output folder for generated slips, inside the workspace.
pub const PDF_DIR: &str = "pdf";

/// Default recipient column for mailing, matched fuzzily.
pub const DEFAULT_EMAIL_COLUMN: &str = "Email";
