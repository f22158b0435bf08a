// mail/mod.rs

//! # Mail Module
//!
//! Sends generated salary slips to employees.
//!
//! ## Features
//! - MIME message assembly with the slip PDF attached
//! - Delivery through a sendmail-compatible binary
//! - Mass mailing driven by a payroll table, sent concurrently
//!
//! `mass_mail` walks the table in row order. A row whose
//! `employee_<id>.pdf` does not exist in the PDF folder is skipped and not
//! counted; a row with an invalid address is counted as a failure.

pub mod message;
pub mod transport;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info, warn};
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::core::utils::{clean_cell, email_check};
use crate::dataset::Table;
use crate::pipeline::naming::output_filename;
use crate::pipeline::CancelToken;
use crate::template::mapping::map_column;

pub use message::OutgoingMail;
pub use transport::{MailTransport, SendmailTransport};

#[derive(Error, Debug)]
pub enum MailError {
    #[error("failed to start '{binary}': {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    #[error("mailer exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },

    #[error("cannot read attachment {path}: {source}")]
    Attachment {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid e-mail address: '{0}'")]
    InvalidAddress(String),

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("No sender address configured (set mail.sender or PAYSLIP_SENDER)")]
    MissingSender,

    #[error("Mail runtime error: {0}")]
    Runtime(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type MailResult<T> = Result<T, MailError>;

/// What to send and where to find it.
#[derive(Debug, Clone)]
pub struct MailJob {
    pub sender: String,
    pub identifier_column: String,
    pub email_column: String,
    pub pdf_dir: PathBuf,
    /// `Month-year`, used in subject and body
    pub period: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailOutcome {
    pub identifier: String,
    pub recipient: String,
    pub success: bool,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailReport {
    pub sent: usize,
    pub total: usize,
    pub outcomes: Vec<MailOutcome>,
}

impl fmt::Display for MailReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} of {} mailed", self.sent, self.total)
    }
}

/// Mails every existing slip of `table` to the address in its row.
pub async fn mass_mail(
    transport: Arc<dyn MailTransport>,
    table: &Table,
    job: &MailJob,
    workers: usize,
    cancel: &CancelToken,
) -> MailResult<MailReport> {
    if job.sender.trim().is_empty() {
        return Err(MailError::MissingSender);
    }
    let id_column = map_column(table.columns(), &job.identifier_column)
        .ok_or_else(|| MailError::ColumnNotFound(job.identifier_column.clone()))?;
    let email_column = map_column(table.columns(), &job.email_column)
        .ok_or_else(|| MailError::ColumnNotFound(job.email_column.clone()))?;

    let semaphore = Arc::new(Semaphore::new(workers.max(1)));
    let mut tasks = JoinSet::new();
    let mut outcomes: Vec<(usize, MailOutcome)> = Vec::new();
    let mut total = 0;

    for (index, row) in table.rows().iter().enumerate() {
        if cancel.is_cancelled() {
            warn!("[SMTP] mailing cancelled");
            break;
        }

        let identifier = clean_cell(row.get(&id_column).unwrap_or_default());
        let Some(pdf) = output_filename(&identifier)
            .ok()
            .map(|name| job.pdf_dir.join(name))
            .filter(|path| path.is_file())
        else {
            debug!("[SMTP] no slip for '{}', skipping", identifier);
            continue;
        };
        total += 1;

        let recipient = clean_cell(row.get(&email_column).unwrap_or_default());
        if !email_check(&recipient) {
            let message = MailError::InvalidAddress(recipient.clone()).to_string();
            warn!("[SMTP] {}: {}", identifier, message);
            outcomes.push((
                index,
                MailOutcome {
                    identifier,
                    recipient,
                    success: false,
                    message,
                },
            ));
            continue;
        }

        let permit = Arc::clone(&semaphore)
            .acquire_owned()
            .await
            .map_err(|e| MailError::Runtime(e.to_string()))?;

        let transport = Arc::clone(&transport);
        let sender = job.sender.clone();
        let period = job.period.clone();
        tasks.spawn_blocking(move || {
            let _permit = permit;
            let result = OutgoingMail::salary_slip(&sender, &recipient, &period, &pdf)
                .and_then(|mail| transport.send(&mail));
            let (success, message) = match result {
                Ok(()) => (true, format!("Sent {}", pdf.display())),
                Err(e) => (false, e.to_string()),
            };
            (
                index,
                MailOutcome {
                    identifier,
                    recipient,
                    success,
                    message,
                },
            )
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, outcome)) => {
                if !outcome.success {
                    warn!("[SMTP] {}: {}", outcome.identifier, outcome.message);
                }
                outcomes.push((index, outcome));
            }
            Err(e) => warn!("[SMTP] mail task failed: {}", e),
        }
    }

    outcomes.sort_by_key(|(index, _)| *index);
    let outcomes: Vec<MailOutcome> = outcomes.into_iter().map(|(_, o)| o).collect();
    let sent = outcomes.iter().filter(|o| o.success).count();

    info!("[SMTP] {} of {} mailed", sent, total);
    Ok(MailReport {
        sent,
        total,
        outcomes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::tempdir;

    #[derive(Default)]
    struct FakeTransport {
        sent: Mutex<Vec<OutgoingMail>>,
        reject: Option<String>,
    }

    impl MailTransport for FakeTransport {
        fn send(&self, mail: &OutgoingMail) -> MailResult<()> {
            if self.reject.as_deref() == Some(mail.to.as_str()) {
                return Err(MailError::Failed {
                    status: "exit status: 75".to_string(),
                    stderr: "deferred".to_string(),
                });
            }
            self.sent.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn table() -> Table {
        let rows = [
            ["E1", "Jane", "jane@x.com"],
            ["E2", "John", "not-an-address"],
            ["E3", "Ravi", "ravi@x.com"],
            ["E4", "Mira", "mira@x.com"],
        ];
        Table::new(
            vec!["HR EMP CODE".into(), "Name".into(), "Email ID".into()],
            rows.iter()
                .map(|r| r.iter().map(|s| s.to_string()).collect())
                .collect(),
        )
    }

    fn job(dir: &std::path::Path) -> MailJob {
        MailJob {
            sender: "hr@x.org".to_string(),
            identifier_column: "HR EMP CODE".to_string(),
            email_column: "email".to_string(),
            pdf_dir: dir.to_path_buf(),
            period: "Jan-2024".to_string(),
        }
    }

    #[tokio::test]
    async fn test_mass_mail_counts() {
        let dir = tempdir().unwrap();
        for id in ["E1", "E2", "E3"] {
            fs::write(dir.path().join(format!("employee_{}.pdf", id)), b"%PDF").unwrap();
        }
        let transport = Arc::new(FakeTransport {
            reject: Some("ravi@x.com".to_string()),
            ..FakeTransport::default()
        });

        let report = mass_mail(transport.clone(), &table(), &job(dir.path()), 2, &CancelToken::new())
            .await
            .unwrap();

        // E4 has no PDF and is not counted; E2 has a bad address; E3 is rejected.
        assert_eq!((report.sent, report.total), (1, 3));
        assert_eq!(report.to_string(), "1 of 3 mailed");
        let ids: Vec<&str> = report.outcomes.iter().map(|o| o.identifier.as_str()).collect();
        assert_eq!(ids, vec!["E1", "E2", "E3"]);

        let sent = transport.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "jane@x.com");
        assert_eq!(sent[0].subject, "Salary slip of Jan-2024");
        assert_eq!(sent[0].attachments[0].filename, "employee_E1.pdf");
    }

    #[tokio::test]
    async fn test_missing_columns_and_sender() {
        let dir = tempdir().unwrap();
        let transport: Arc<dyn MailTransport> = Arc::new(FakeTransport::default());

        let mut bad = job(dir.path());
        bad.email_column = "phone".to_string();
        let result = mass_mail(transport.clone(), &table(), &bad, 1, &CancelToken::new()).await;
        assert!(matches!(result, Err(MailError::ColumnNotFound(_))));

        let mut no_sender = job(dir.path());
        no_sender.sender = String::new();
        let result = mass_mail(transport, &table(), &no_sender, 1, &CancelToken::new()).await;
        assert!(matches!(result, Err(MailError::MissingSender)));
    }

    #[tokio::test]
    async fn test_cancelled_sends_nothing() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("employee_E1.pdf"), b"%PDF").unwrap();
        let transport = Arc::new(FakeTransport::default());
        let token = CancelToken::new();
        token.cancel();

        let report = mass_mail(transport.clone(), &table(), &job(dir.path()), 1, &token)
            .await
            .unwrap();
        assert_eq!((report.sent, report.total), (0, 0));
        assert!(transport.sent.lock().unwrap().is_empty());
    }
}
