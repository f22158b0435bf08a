// main.rs

//! # Payslip - Main Entry Point
//!
//! Initializes the CLI, loads the workspace settings and dispatches to the
//! subcommands (`init`, `generate`, `upload`, `mail`, ...).
//!
//! ## Global Arguments
//!
//! These arguments can be specified for **any command**.
//!
//! - `--workspace`, `-w` - Workspace directory (default: `.`).
//! - `--log-level` - The logging level (default: `info`). Possible values: `error`, `warn`, `info`, `debug`, `trace`.
//! - `--log-file` - Append log records to this file instead of stderr.
//! - `--env-file` - Environment file with `PAYSLIP_*` overrides (default: `.env`).
//! - `--env`, `-e` - Additional `KEY=VALUE` overrides.
//!
//! ## Example Usage
//! ```bash
//! ./payslip --workspace /srv/payroll init
//! ./payslip generate excel/jan.xlsx --template teaching --month jan --year 2024
//! ./payslip -e PAYSLIP_WORKERS=8 generate excel/jan.xlsx -t svv -m jan -y 2024
//! ```
//!
//! For detailed help, use the `--help` flag.

mod app;
mod commands;
mod core;
mod dataset;
mod error;
mod globals;
mod mail;
mod pipeline;
mod store;
mod template;
mod utils;

use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgMatches, Command};
use log::debug;

use crate::app::{APP_DESCRIPTION, APP_NAME, APP_VERSION, DEFAULT_LOG_LEVEL};
use crate::commands::common_args;
use crate::core::config::Settings;
use crate::core::env::load_env_vars;
use crate::error::AppError;
use crate::utils::logging::initialize_logger;

/// Main function that initializes the CLI and handles command execution.
fn main() {
    let matches = Command::new(APP_NAME)
        .version(APP_VERSION)
        .about(APP_DESCRIPTION)
        // ====================
        // Global Flags
        // ====================
        .arg(common_args::workspace())
        .arg(common_args::log_level())
        .arg(common_args::log_file())
        .arg(common_args::env_file())
        .arg(common_args::env_var())
        .subcommand_required(true)
        .arg_required_else_help(true)
        // ====================
        // Subcommand Definitions
        // ====================
        .subcommand(commands::init::command())
        .subcommand(commands::templates::command())
        .subcommand(commands::generate::command())
        .subcommand(commands::generate_one::command())
        .subcommand(commands::lookup::command())
        .subcommand(commands::make_template::command())
        .subcommand(commands::make_template::sheet_command())
        .subcommand(commands::upload::command())
        .subcommand(commands::tables::command())
        .subcommand(commands::drop::command())
        .subcommand(commands::mail::command())
        .get_matches();

    // ====================
    // Initialize Logger
    // ====================
    let log_level = matches
        .get_one::<String>("log-level")
        .map(String::as_str)
        .unwrap_or(DEFAULT_LOG_LEVEL);
    let log_file = matches.get_one::<String>("log-file").map(Path::new);
    if let Err(e) = initialize_logger(log_level, log_file) {
        print_error!("Cannot open log file: {}", e);
        process::exit(1);
    }
    debug!("Logger initialized with level: {}", log_level);

    // ====================
    // Load Settings
    // ====================
    match load_settings(&matches) {
        Ok((workspace, settings)) => {
            debug!("Workspace: {}", workspace.display());
            debug!("Settings: {:?}", settings);
            globals::init_globals(workspace, settings);
        }
        Err(e) => {
            print_error!("{}", e);
            process::exit(1);
        }
    }

    // ====================
    // Command Execution
    // ====================
    match matches.subcommand() {
        Some(("init", sub_matches)) => commands::init::execute(sub_matches),
        Some(("templates", sub_matches)) => commands::templates::execute(sub_matches),
        Some(("generate", sub_matches)) => commands::generate::execute(sub_matches),
        Some(("generate-one", sub_matches)) => commands::generate_one::execute(sub_matches),
        Some(("lookup", sub_matches)) => commands::lookup::execute(sub_matches),
        Some(("make-template", sub_matches)) => commands::make_template::execute(sub_matches),
        Some(("make-sheet", sub_matches)) => commands::make_template::execute_sheet(sub_matches),
        Some(("upload", sub_matches)) => commands::upload::execute(sub_matches),
        Some(("tables", sub_matches)) => commands::tables::execute(sub_matches),
        Some(("drop", sub_matches)) => commands::drop::execute(sub_matches),
        Some(("mail", sub_matches)) => commands::mail::execute(sub_matches),
        _ => {
            print_error!("Unknown command. Use --help for usage.");
            process::exit(1);
        }
    }
}

/// Resolves the workspace and builds the settings from `payslip.yml`, the
/// env file and `-e` overrides.
fn load_settings(matches: &ArgMatches) -> Result<(PathBuf, Settings), AppError> {
    let workspace = PathBuf::from(
        matches
            .get_one::<String>("workspace")
            .map(String::as_str)
            .unwrap_or(app::DEFAULT_WORKSPACE),
    );
    if !workspace.is_dir() && matches.subcommand_name() != Some("init") {
        return Err(AppError::InvalidInput(format!(
            "workspace '{}' does not exist",
            workspace.display()
        )));
    }

    let env_file = matches
        .get_one::<String>("env-file")
        .map(String::as_str)
        .unwrap_or(app::DEFAULT_ENV_FILE);
    let env_path = Path::new(env_file);
    let env_path = if env_path.is_absolute() || env_path.exists() {
        env_path.to_path_buf()
    } else {
        workspace.join(env_path)
    };

    let overrides: Vec<String> = matches
        .get_many::<String>("env")
        .map(|vars| vars.cloned().collect())
        .unwrap_or_default();

    let mut settings = Settings::load_from_workspace(&workspace)?;
    settings.apply_env(&load_env_vars(&env_path, &overrides))?;
    Ok((workspace, settings))
}
