// commands/drop.rs

//! # Drop Command Module
//!
//! Deletes one stored payroll table.
//!
//! ## Example Usage
//! ```bash
//! ./payslip drop --institute svv --type temporary -m feb -y 2023
//! ```

use std::process;

use clap::{ArgMatches, Command};

use crate::commands::common_args::{institute, month, open_store, required, staff_type, year};
use crate::error::AppError;
use crate::store::{DropResult, TableKey};
use crate::{print_error, print_success};

/// Configures the `drop` command for the CLI application.
pub fn command() -> Command {
    Command::new("drop")
        .about("Delete a stored payroll table")
        .arg(institute())
        .arg(staff_type())
        .arg(month())
        .arg(year())
}

/// Executes the `drop` command.
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

    match open_store()?.drop_table(&key) {
        DropResult::Success => {
            print_success!("{}: {}", key, DropResult::Success);
            Ok(())
        }
        other => Err(AppError::InvalidInput(format!("{}: {}", key, other))),
    }
}
