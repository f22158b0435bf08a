// commands/generate.rs

//! # Generate Command Module
//!
//! Generates one salary slip PDF per row of a payroll table.
//!
//! ## Features
//! - Reads the table from a spreadsheet or, with `--from-db`, from the store.
//! - Binds every row through the JSON field mapping and renders the template.
//! - Renders PDFs concurrently (`workers` in `payslip.yml`) with a progress bar.
//! - Ctrl-C stops dispatching new rows; a second Ctrl-C aborts.
//!
//! ## Example Usage
//! ```bash
//! ./payslip generate excel/jan.xlsx --template teaching --month jan --year 2024
//! ./payslip generate --from-db somaiya teaching --template teaching -m jan -y 2024 --dry-run
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Arg, ArgAction, ArgMatches, Command};
use indicatif::{ProgressBar, ProgressStyle};
use log::debug;

use crate::app::PDF_DIR;
use crate::commands::common_args::{
    data, dry_run, from_db, identifier, identifier_column, load_source, month, optional,
    password, required, runtime, sheet, year, Period,
};
use crate::error::AppError;
use crate::globals::{settings, workspace_dir};
use crate::pipeline::{
    BatchJob, BatchReport, BatchState, BulkGenerator, CancelToken, DryRunRenderer, PdfRenderer,
    WkhtmltopdfRenderer,
};
use crate::template::mapping::load_field_spec;
use crate::template::workspace::TemplateWorkspace;
use crate::utils::binary::find_binary;
use crate::utils::display::print_unicode_box;
use crate::utils::signal::setup_signal_handler;
use crate::{print_error, print_info, print_success};

pub fn template() -> Arg {
    Arg::new("template")
        .long("template")
        .short('t')
        .help("HTML template name under html/ (e.g. teaching)")
        .required(true)
}

pub fn mapping() -> Arg {
    Arg::new("mapping")
        .long("mapping")
        .help("Field mapping name under json/ (default: the template name)")
}

pub fn out() -> Arg {
    Arg::new("out")
        .long("out")
        .short('o')
        .help("Output directory for the PDFs (default: <workspace>/pdf)")
}

/// Configures the `generate` command for the CLI application.
pub fn command() -> Command {
    Command::new("generate")
        .about("Generate one salary slip per employee")
        .arg(data())
        .arg(from_db())
        .arg(sheet())
        .arg(password())
        .arg(template())
        .arg(mapping())
        .arg(month())
        .arg(year())
        .arg(identifier())
        .arg(out())
        .arg(dry_run())
        .arg(
            Arg::new("skip-existing")
                .long("skip-existing")
                .help("Leave slips that already exist untouched")
                .action(ArgAction::SetTrue),
        )
}

/// Executes the `generate` command.
pub fn execute(matches: &ArgMatches) {
    if let Err(e) = run(matches) {
        print_error!("{}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), AppError> {
    let period = Period::from_matches(matches)?;
    let job = build_job(matches)?;
    let dry_run = matches.get_flag("dry-run");

    print_unicode_box(&format!(
        "📄 Generating salary slips for {}\nTemplate: {}\nOutput: {}",
        period.label(),
        job.template.display(),
        job.output_dir.display()
    ));

    let table = load_source(matches, Some(period))?;
    let renderer = renderer(dry_run)?;

    let progress = ProgressBar::new(table.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} slips")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-"),
    );

    let cancel = CancelToken::new();
    setup_signal_handler(cancel.clone());

    let generator = BulkGenerator::new(renderer, settings().workers)
        .with_cancel(cancel)
        .skip_existing(matches.get_flag("skip-existing"))
        .with_progress(progress);

    let extras = period.extras();
    let report = runtime()?.block_on(generator.generate_batch(&table, &job, |_| extras.clone()))?;

    print_report(&report, dry_run);
    Ok(())
}

/// Builds the batch job from the `--template`, `--mapping`, `--identifier`
/// and `--out` arguments. The mapping file is read here, so a missing or
/// invalid mapping fails before any row is processed.
pub fn build_job(matches: &ArgMatches) -> Result<BatchJob, AppError> {
    let workspace = TemplateWorkspace::new(workspace_dir());
    let template_name = required(matches, "template")?;
    let mapping_name = optional(matches, "mapping").unwrap_or(template_name);

    let template = workspace.html_path(template_name);
    let mapping_path = workspace.json_path(mapping_name);
    debug!("Template: {}, mapping: {}", template.display(), mapping_path.display());
    let field_spec = load_field_spec(&mapping_path)?;

    let output_dir = optional(matches, "out")
        .map(PathBuf::from)
        .unwrap_or_else(|| workspace_dir().join(PDF_DIR));

    Ok(BatchJob {
        template,
        field_spec,
        identifier_column: identifier_column(matches),
        branch: settings().branch.clone(),
        output_dir,
    })
}

/// The PDF renderer for this run; checks that `wkhtmltopdf` is reachable
/// unless nothing will be written.
pub fn renderer(dry_run: bool) -> Result<Arc<dyn PdfRenderer>, AppError> {
    if dry_run {
        print_info!("Dry run: no PDF will be written");
        return Ok(Arc::new(DryRunRenderer));
    }
    let config = &settings().renderer;
    let path = find_binary(&config.binary)
        .ok_or_else(|| AppError::BinaryNotFound(config.binary.clone()))?;
    debug!("Using PDF engine at {}", path.display());
    Ok(Arc::new(WkhtmltopdfRenderer::new(config).with_binary(&path)))
}

fn print_report(report: &BatchReport, dry_run: bool) {
    for failure in report.failures() {
        print_error!("  {}: {}", failure.identifier, failure.message);
    }
    if report.state == BatchState::Cancelled {
        print_info!("Generation cancelled");
    }

    let summary = if dry_run {
        format!("{} (dry run)", report)
    } else {
        report.to_string()
    };
    if report.succeeded == report.total {
        print_success!("{}", summary);
    } else {
        print_info!("{}", summary);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_arguments() {
        let matches = command()
            .try_get_matches_from([
                "generate", "jan.xlsx", "--template", "svv", "-m", "jan", "-y", "2024", "--dry-run",
            ])
            .unwrap();
        assert_eq!(optional(&matches, "template"), Some("svv"));
        assert_eq!(optional(&matches, "mapping"), None);
        assert!(matches.get_flag("dry-run"));
        assert!(!matches.get_flag("skip-existing"));

        assert!(command()
            .try_get_matches_from(["generate", "jan.xlsx", "-m", "jan", "-y", "2024"])
            .is_err());
    }

    #[test]
    fn test_dry_run_renderer_needs_no_binary() {
        assert!(renderer(true).is_ok());
    }
}
