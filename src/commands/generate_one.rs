// commands/generate_one.rs

//! # Generate-One Command Module
//!
//! Generates the salary slip of a single employee, found by employee code in
//! the identifier column.
//!
//! ## Example Usage
//! ```bash
//! ./payslip generate-one excel/jan.xlsx --id E100 --template teaching -m jan -y 2024
//! ```

use std::process;

use clap::{ArgMatches, Command};

use crate::commands::common_args::{
    data, dry_run, from_db, id, identifier, load_source, month, password, required, runtime,
    sheet, year, Period,
};
use crate::commands::generate::{build_job, mapping, out, renderer, template};
use crate::error::AppError;
use crate::globals::settings;
use crate::pipeline::BulkGenerator;
use crate::{print_error, print_success};

/// Configures the `generate-one` command for the CLI application.
pub fn command() -> Command {
    Command::new("generate-one")
        .about("Generate the salary slip of one employee")
        .arg(data())
        .arg(from_db())
        .arg(sheet())
        .arg(password())
        .arg(id())
        .arg(template())
        .arg(mapping())
        .arg(month())
        .arg(year())
        .arg(identifier())
        .arg(out())
        .arg(dry_run())
}

/// Executes the `generate-one` command.
pub fn execute(matches: &ArgMatches) {
    if let Err(e) = run(matches) {
        print_error!("{}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), AppError> {
    let period = Period::from_matches(matches)?;
    let job = build_job(matches)?;
    let code = required(matches, "id")?;
    let table = load_source(matches, Some(period))?;

    let generator = BulkGenerator::new(renderer(matches.get_flag("dry-run"))?, settings().workers);
    let extras = period.extras();
    let outcome = runtime()?.block_on(generator.generate_one(&table, &job, code, |_| extras.clone()))?;

    if outcome.success {
        print_success!("{}: {}", outcome.identifier, outcome.message);
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "{}: {}",
            outcome.identifier, outcome.message
        )))
    }
}
