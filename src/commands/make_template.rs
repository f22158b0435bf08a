// commands/make_template.rs

//! # Template Authoring Commands
//!
//! `make-template` turns a layout workbook into `html/<name>.html` and
//! `json/<name>.json`. `make-sheet` writes `excel/<name>.csv`, a blank data
//! sheet whose header lists every column the layout workbook refers to.
//!
//! The layout workbook has the sheets `Personal Left`, `Personal Right`,
//! `Earning`, `Deductions`, `Salary Left` and `Salary Right`, each with a
//! `Name` and a `Column` column. Existing files are never overwritten.
//!
//! ## Example Usage
//! ```bash
//! ./payslip make-template excel/teaching_layout.xlsx --name "teaching v2"
//! ./payslip make-sheet excel/teaching_layout.xlsx --name teaching_jan
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use clap::{Arg, ArgMatches, Command};
use log::info;

use crate::commands::common_args::{optional, password, required, resolve_path};
use crate::dataset::loader::load;
use crate::error::AppError;
use crate::globals::workspace_dir;
use crate::template::authoring::{make_template, needed_columns};
use crate::template::workspace::{FileStatus, TemplateWorkspace};
use crate::{print_error, print_info, print_success};

fn layout() -> Arg {
    Arg::new("layout")
        .help("Spec workbook listing labels and data columns per section")
        .required(true)
}

fn name() -> Arg {
    Arg::new("name")
        .long("name")
        .short('n')
        .help("Name of the files to create")
        .required(true)
}

/// Configures the `make-template` command for the CLI application.
pub fn command() -> Command {
    Command::new("make-template")
        .about("Create an HTML template and field mapping from a layout workbook")
        .arg(layout())
        .arg(name())
        .arg(password())
}

/// Configures the `make-sheet` command for the CLI application.
pub fn sheet_command() -> Command {
    Command::new("make-sheet")
        .about("Create a blank data sheet with the columns a layout workbook needs")
        .arg(layout())
        .arg(name())
        .arg(password())
}

/// Executes the `make-template` command.
pub fn execute(matches: &ArgMatches) {
    if let Err(e) = run_template(matches) {
        print_error!("{}", e);
        process::exit(1);
    }
}

/// Executes the `make-sheet` command.
pub fn execute_sheet(matches: &ArgMatches) {
    if let Err(e) = run_sheet(matches) {
        print_error!("{}", e);
        process::exit(1);
    }
}

fn run_template(matches: &ArgMatches) -> Result<(), AppError> {
    let layout = load(&resolve_path(required(matches, "layout")?), optional(matches, "password"))?;
    let authored = make_template(&layout)?;

    let workspace = TemplateWorkspace::new(workspace_dir());
    let (html, json) = workspace.save_authored(required(matches, "name")?, &authored)?;
    report(&html);
    report(&json);
    Ok(())
}

fn run_sheet(matches: &ArgMatches) -> Result<(), AppError> {
    let layout = load(&resolve_path(required(matches, "layout")?), optional(matches, "password"))?;
    let columns = needed_columns(&layout);
    if columns.is_empty() {
        return Err(AppError::InvalidInput(
            "the layout workbook does not name any data column".to_string(),
        ));
    }

    let workspace = TemplateWorkspace::new(workspace_dir());
    let path = sheet_path(workspace.excel_dir(), required(matches, "name")?);
    report(&write_sheet(&path, &columns)?);
    Ok(())
}

fn sheet_path(excel_dir: &Path, name: &str) -> PathBuf {
    let name = name.trim().replace(' ', "_");
    if name.ends_with(".csv") {
        excel_dir.join(name)
    } else {
        excel_dir.join(format!("{}.csv", name))
    }
}

/// Writes a CSV holding only the header row, unless `path` exists.
fn write_sheet(path: &Path, columns: &[String]) -> Result<FileStatus, AppError> {
    if path.exists() {
        return Ok(FileStatus::AlreadyExists(path.to_path_buf()));
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let write_error = |e: csv::Error| {
        AppError::InvalidInput(format!("cannot write {}: {}", path.display(), e))
    };
    let mut writer = csv::Writer::from_path(path).map_err(write_error)?;
    writer.write_record(columns).map_err(write_error)?;
    writer.flush()?;

    info!("[PARSE] wrote {} column(s) to {}", columns.len(), path.display());
    Ok(FileStatus::Created(path.to_path_buf()))
}

fn report(status: &FileStatus) {
    match status {
        FileStatus::Created(_) => print_success!("{}", status),
        FileStatus::AlreadyExists(_) => print_info!("{}", status),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sheet_path() {
        let dir = Path::new("/ws/excel");
        assert_eq!(sheet_path(dir, "teaching jan"), dir.join("teaching_jan.csv"));
        assert_eq!(sheet_path(dir, "svv.csv"), dir.join("svv.csv"));
    }

    #[test]
    fn test_write_sheet_never_overwrites() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("excel").join("jan.csv");
        let columns = vec!["Name".to_string(), "BASIC".to_string()];

        assert!(matches!(write_sheet(&path, &columns).unwrap(), FileStatus::Created(_)));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Name,BASIC\n");

        assert!(matches!(
            write_sheet(&path, &["Other".to_string()]).unwrap(),
            FileStatus::AlreadyExists(_)
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "Name,BASIC\n");
    }
}
