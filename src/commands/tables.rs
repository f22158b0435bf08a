// commands/tables.rs

//! # Tables Command Module
//!
//! Lists the stored payroll tables grouped by institute, staff type and year.

use std::process;

use clap::{ArgMatches, Command};

use crate::commands::common_args::open_store;
use crate::error::AppError;
use crate::store::TableListing;
use crate::{print_error, print_info};

/// Configures the `tables` command for the CLI application.
pub fn command() -> Command {
    Command::new("tables").about("List stored payroll tables")
}

/// Executes the `tables` command.
pub fn execute(_matches: &ArgMatches) {
    if let Err(e) = run() {
        print_error!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let listing = open_store()?.list_tables()?;
    if listing.is_empty() {
        print_info!("No payroll tables stored yet");
        return Ok(());
    }
    println!("{}", format_listing(&listing));
    Ok(())
}

fn format_listing(listing: &TableListing) -> String {
    let mut lines = Vec::new();
    for (institute, types) in listing {
        lines.push(institute.clone());
        for (staff_type, years) in types {
            lines.push(format!("  {}", staff_type));
            for (year, months) in years {
                let months: Vec<String> = months.iter().map(|m| m.label()).collect();
                lines.push(format!("    {}: {}", year, months.join(", ")));
            }
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{Institute, Month, PayrollStore, StaffType, TableKey};

    #[test]
    fn test_format_listing() {
        let store = PayrollStore::open_in_memory().unwrap();
        for month in [Month::Mar, Month::Jan] {
            let key = TableKey::new(Institute::Svv, StaffType::Teaching, month, 2024);
            assert!(store.create_table(&key, &["HR EMP CODE".to_string()]).is_ok());
        }

        let text = format_listing(&store.list_tables().unwrap());
        assert_eq!(text, "svv\n  teaching\n    2024: Jan, Mar");
    }
}
