// commands/lookup.rs

//! # Lookup Command Module
//!
//! Prints the record of one employee, found by employee code.
//!
//! ## Example Usage
//! ```bash
//! ./payslip lookup excel/jan.xlsx --id E100
//! ./payslip lookup --from-db svv teaching -m jan -y 2024 --id E100
//! ```

use std::process;

use clap::{ArgMatches, Command};
use unicode_width::UnicodeWidthStr;

use crate::commands::common_args::{
    data, from_db, id, identifier, identifier_column, load_source, month, password, required,
    sheet, year, Period,
};
use crate::dataset::Row;
use crate::error::AppError;
use crate::pipeline::orchestrator::find_row;
use crate::pipeline::BatchError;
use crate::print_error;
use crate::utils::display::print_unicode_box;

/// Configures the `lookup` command for the CLI application.
pub fn command() -> Command {
    Command::new("lookup")
        .about("Show the record of one employee")
        .arg(data())
        .arg(from_db())
        .arg(sheet())
        .arg(password())
        .arg(id())
        .arg(identifier())
        .arg(month().required(false).help("Payroll month (with --from-db)"))
        .arg(year().required(false).help("Payroll year (with --from-db)"))
}

/// Executes the `lookup` command.
pub fn execute(matches: &ArgMatches) {
    if let Err(e) = run(matches) {
        print_error!("{}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), AppError> {
    let code = required(matches, "id")?;
    let table = load_source(matches, Period::from_optional(matches)?)?;

    let row = find_row(&table, &identifier_column(matches), code)
        .ok_or_else(|| BatchError::NotFound(code.to_string()))?;

    print_unicode_box(&format_row(row));
    Ok(())
}

/// One `column : value` line per column, with the colons aligned.
fn format_row(row: &Row) -> String {
    let width = row
        .columns()
        .iter()
        .map(|c| UnicodeWidthStr::width(c.as_str()))
        .max()
        .unwrap_or(0);

    row.iter()
        .map(|(column, value)| {
            let padding = width - UnicodeWidthStr::width(column);
            format!("{}{} : {}", column, " ".repeat(padding), value)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::Table;

    #[test]
    fn test_format_row_aligns_values() {
        let table = Table::new(
            vec!["HR EMP CODE".into(), "Name".into()],
            vec![vec!["E1".into(), "Jane".into()]],
        );
        assert_eq!(
            format_row(&table.rows()[0]),
            "HR EMP CODE : E1\nName        : Jane"
        );
    }
}
