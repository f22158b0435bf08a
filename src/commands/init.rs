// commands/init.rs

//! # Init Command Module
//!
//! Creates the workspace folders (`html/`, `json/`, `excel/`) and writes the
//! built-in `teaching` and `svv` templates with their field mappings.
//! Existing files are left untouched and reported as already existing.
//!
//! ## Example Usage
//! ```bash
//! ./payslip --workspace /srv/payroll init
//! ```

use std::process;

use clap::{ArgMatches, Command};

use crate::error::AppError;
use crate::globals::workspace_dir;
use crate::template::workspace::{FileStatus, TemplateWorkspace};
use crate::utils::display::print_unicode_box;
use crate::{print_error, print_info, print_success};

/// Configures the `init` command for the CLI application.
pub fn command() -> Command {
    Command::new("init").about("Create the workspace folders and default templates")
}

/// Executes the `init` command.
pub fn execute(_matches: &ArgMatches) {
    print_unicode_box(&format!(
        "📁 Initializing workspace: [{}]",
        workspace_dir().display()
    ));

    if let Err(e) = run() {
        print_error!("{}", e);
        process::exit(1);
    }
}

fn run() -> Result<(), AppError> {
    let workspace = TemplateWorkspace::new(workspace_dir());
    for status in workspace.init()? {
        match status {
            FileStatus::Created(_) => print_success!("{}", status),
            FileStatus::AlreadyExists(_) => print_info!("{}", status),
        }
    }
    Ok(())
}
