// commands/upload.rs

//! # Upload Command Module
//!
//! Stores a payroll spreadsheet in the payroll database: the table for the
//! given institute, staff type, month and year is created if needed, then
//! every row is inserted or updated by employee code.
//!
//! ## Example Usage
//! ```bash
//! ./payslip upload excel/jan.xlsx --institute somaiya --type teaching -m jan -y 2024
//! ```

use std::process;

use clap::{Arg, ArgMatches, Command};

use crate::commands::common_args::{
    institute, month, open_store, optional, password, required, resolve_path, sheet,
    staff_type, year,
};
use crate::dataset::loader::load_table;
use crate::error::AppError;
use crate::store::{TableKey, UpsertResult};
use crate::utils::display::print_unicode_box;
use crate::{print_error, print_info, print_success};

/// Configures the `upload` command for the CLI application.
pub fn command() -> Command {
    Command::new("upload")
        .about("Store a payroll spreadsheet in the database")
        .arg(
            Arg::new("data")
                .help("Payroll spreadsheet (.xlsx, .xls, .ods, .csv)")
                .required(true),
        )
        .arg(sheet())
        .arg(password())
        .arg(institute())
        .arg(staff_type())
        .arg(month())
        .arg(year())
}

/// Executes the `upload` command.
pub fn execute(matches: &ArgMatches) {
    if let Err(e) = run(matches) {
        print_error!("{}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), AppError> {
    let key = TableKey::from_parts(
        required(matches, "institute")?,
        required(matches, "type")?,
        required(matches, "month")?,
        required(matches, "year")?,
    )?;
    print_unicode_box(&format!("🗄️ Uploading to table: [{}]", key));

    let table = load_table(
        &resolve_path(required(matches, "data")?),
        optional(matches, "password"),
        optional(matches, "sheet"),
    )?;

    let mut store = open_store()?;

    let created = store.create_table(&key, table.columns());
    if !created.is_ok() {
        return Err(AppError::InvalidInput(created.to_string()));
    }
    print_info!("{}", created);

    match store.upsert_rows(&key, &table) {
        result @ UpsertResult::Success(_) => {
            print_success!("{}", result);
            Ok(())
        }
        result => Err(AppError::InvalidInput(result.to_string())),
    }
}
