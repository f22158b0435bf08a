// commands/mail.rs

//! # Mail Command Module
//!
//! Mails every generated salary slip to the employee it belongs to. Rows
//! whose `employee_<code>.pdf` is not in the PDF folder are skipped.
//!
//! ## Example Usage
//! ```bash
//! ./payslip mail excel/jan.xlsx --email-column "Email ID" -m jan -y 2024
//! ./payslip mail --from-db somaiya teaching -m jan -y 2024 --pdf-dir out/jan
//! ```

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::{Arg, ArgMatches, Command};
use log::debug;

use crate::app::{DEFAULT_EMAIL_COLUMN, PDF_DIR};
use crate::commands::common_args::{
    data, from_db, identifier, identifier_column, load_source, month, optional, password,
    required, runtime, sheet, year, Period,
};
use crate::error::AppError;
use crate::globals::{settings, workspace_dir};
use crate::mail::{mass_mail, MailError, MailJob, MailReport, MailTransport, SendmailTransport};
use crate::pipeline::CancelToken;
use crate::utils::binary::find_binary;
use crate::utils::display::print_unicode_box;
use crate::utils::signal::setup_signal_handler;
use crate::{print_error, print_info, print_success};

/// Configures the `mail` command for the CLI application.
pub fn command() -> Command {
    Command::new("mail")
        .about("Mail generated salary slips to employees")
        .arg(data())
        .arg(from_db())
        .arg(sheet())
        .arg(password())
        .arg(month())
        .arg(year())
        .arg(identifier())
        .arg(
            Arg::new("pdf-dir")
                .long("pdf-dir")
                .help("Folder holding the generated slips (default: <workspace>/pdf)"),
        )
        .arg(
            Arg::new("email-column")
                .long("email-column")
                .help("Column holding the recipient address")
                .default_value(DEFAULT_EMAIL_COLUMN),
        )
}

/// Executes the `mail` command.
pub fn execute(matches: &ArgMatches) {
    if let Err(e) = run(matches) {
        print_error!("{}", e);
        process::exit(1);
    }
}

fn run(matches: &ArgMatches) -> Result<(), AppError> {
    let period = Period::from_matches(matches)?;
    let config = &settings().mail;
    if config.sender.trim().is_empty() {
        return Err(MailError::MissingSender.into());
    }

    let job = MailJob {
        sender: config.sender.clone(),
        identifier_column: identifier_column(matches),
        email_column: required(matches, "email-column")?.to_string(),
        pdf_dir: optional(matches, "pdf-dir")
            .map(PathBuf::from)
            .unwrap_or_else(|| workspace_dir().join(PDF_DIR)),
        period: period.label(),
    };

    print_unicode_box(&format!(
        "✉️ Mailing salary slips of {}\nFrom: {}\nSlips: {}",
        job.period,
        job.sender,
        job.pdf_dir.display()
    ));

    let path = find_binary(&config.binary)
        .ok_or_else(|| AppError::BinaryNotFound(config.binary.clone()))?;
    debug!("Using mailer at {}", path.display());
    let transport: Arc<dyn MailTransport> =
        Arc::new(SendmailTransport::new(config).with_binary(&path));

    let table = load_source(matches, Some(period))?;

    let cancel = CancelToken::new();
    setup_signal_handler(cancel.clone());

    let report = runtime()?.block_on(mass_mail(transport, &table, &job, config.workers, &cancel))?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &MailReport) {
    for outcome in report.outcomes.iter().filter(|o| !o.success) {
        print_error!("  {} <{}>: {}", outcome.identifier, outcome.recipient, outcome.message);
    }
    if report.sent == report.total {
        print_success!("{}", report);
    } else {
        print_info!("{}", report);
    }
}
