// commands/templates.rs

//! # Templates Command Module
//!
//! Lists the HTML templates and JSON field mappings of the workspace.

use clap::{ArgMatches, Command};

use crate::globals::workspace_dir;
use crate::print_info;
use crate::template::workspace::TemplateWorkspace;

/// Configures the `templates` command for the CLI application.
pub fn command() -> Command {
    Command::new("templates").about("List available templates and field mappings")
}

/// Executes the `templates` command.
pub fn execute(_matches: &ArgMatches) {
    let workspace = TemplateWorkspace::new(workspace_dir());

    for (title, dir, names) in [
        ("HTML templates", workspace.html_dir(), workspace.list_html()),
        ("Field mappings", workspace.json_dir(), workspace.list_json()),
    ] {
        print_info!("{} ({}):", title, dir.display());
        if names.is_empty() {
            println!("  (none, run `payslip init`)");
        }
        for name in names {
            println!("  - {}", name);
        }
    }
}
