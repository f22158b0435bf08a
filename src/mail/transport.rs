// mail/transport.rs

//! Mail delivery backends.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use log::{debug, info};

use crate::core::config::MailSettings;

use super::message::OutgoingMail;
use super::{MailError, MailResult};

/// Delivers one message. Shared across blocking tasks.
pub trait MailTransport: Send + Sync {
    fn send(&self, mail: &OutgoingMail) -> MailResult<()>;
}

/// Pipes messages into a sendmail-compatible binary (`sendmail -t -i`).
#[derive(Debug, Clone)]
pub struct SendmailTransport {
    binary: String,
    args: Vec<String>,
}

impl SendmailTransport {
    pub fn new(settings: &MailSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            args: settings.args.clone(),
        }
    }

    /// Runs the mailer found at `path` instead of the configured name.
    pub fn with_binary(mut self, path: &Path) -> Self {
        self.binary = path.to_string_lossy().to_string();
        self
    }
}

impl MailTransport for SendmailTransport {
    fn send(&self, mail: &OutgoingMail) -> MailResult<()> {
        debug!("[SMTP] {} {}", self.binary, self.args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| MailError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        let writer = child.stdin.take().map(|mut stdin| {
            let mime = mail.to_mime();
            thread::spawn(move || stdin.write_all(mime.as_bytes()))
        });

        let output = child.wait_with_output()?;
        let written = match writer {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))
            }),
            None => Ok(()),
        };

        if !output.status.success() {
            return Err(MailError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;

        info!("[SMTP] Email to ({}) was sent successfully", mail.to);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_binary() {
        let settings = MailSettings {
            binary: "/no/such/sendmail".to_string(),
            ..MailSettings::default()
        };
        let transport = SendmailTransport::new(&settings);
        let mail = OutgoingMail::new("a@b.co", "c@d.co", "subject");
        assert!(matches!(transport.send(&mail), Err(MailError::Spawn { .. })));
    }

    #[cfg(unix)]
    #[test]
    fn test_sends_through_resolved_binary() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let captured = dir.path().join("captured.eml");
        let mailer = dir.path().join("fake-sendmail");
        std::fs::write(&mailer, format!("#!/bin/sh\ncat > '{}'\n", captured.display())).unwrap();
        std::fs::set_permissions(&mailer, std::fs::Permissions::from_mode(0o755)).unwrap();

        let resolved = crate::utils::binary::find_binary(mailer.to_str().unwrap()).unwrap();
        let transport =
            SendmailTransport::new(&MailSettings::default()).with_binary(&resolved);
        transport
            .send(&OutgoingMail::new("a@b.co", "c@d.co", "Salary slip"))
            .unwrap();

        let mime = std::fs::read_to_string(&captured).unwrap();
        assert!(mime.contains("c@d.co"));
        assert!(mime.contains("Salary slip"));
    }
}
