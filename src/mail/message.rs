// mail/message.rs

//! Outgoing mail assembly as a `multipart/mixed` MIME message.

use std::fs;
use std::path::Path;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use uuid::Uuid;

use super::{MailError, MailResult};

const LINE_WIDTH: usize = 76;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub filename: String,
    pub content_type: String,
    pub content: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

impl OutgoingMail {
    pub fn new(from: &str, to: &str, subject: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            subject: subject.to_string(),
            body: String::new(),
            attachments: Vec::new(),
        }
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// Attaches the file at `path` under its own file name.
    pub fn attach_file(mut self, path: &Path, content_type: &str) -> MailResult<Self> {
        let content = fs::read(path).map_err(|e| MailError::Attachment {
            path: path.display().to_string(),
            source: e,
        })?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "attachment".to_string());
        self.attachments.push(Attachment {
            filename,
            content_type: content_type.to_string(),
            content,
        });
        Ok(self)
    }

    /// The salary slip mail for `period` (`Jan-2024`) with the PDF attached.
    pub fn salary_slip(from: &str, to: &str, period: &str, pdf: &Path) -> MailResult<Self> {
        OutgoingMail::new(from, to, &format!("Salary slip of {}", period))
            .with_body(&format!(
                "Please find attached below the salary slip of {}",
                period
            ))
            .attach_file(pdf, "application/pdf")
    }

    /// Renders the message with a fresh boundary.
    pub fn to_mime(&self) -> String {
        self.to_mime_with_boundary(&format!("=_{}", Uuid::new_v4().simple()))
    }

    pub fn to_mime_with_boundary(&self, boundary: &str) -> String {
        let mut out = String::new();
        let date = chrono::Local::now().to_rfc2822();

        for (name, value) in [
            ("From", self.from.as_str()),
            ("To", self.to.as_str()),
            ("Subject", self.subject.as_str()),
            ("Date", date.as_str()),
            ("MIME-Version", "1.0"),
        ] {
            out.push_str(&format!("{}: {}\r\n", name, value));
        }
        out.push_str(&format!(
            "Content-Type: multipart/mixed; boundary=\"{}\"\r\n\r\n",
            boundary
        ));

        out.push_str(&format!("--{}\r\n", boundary));
        out.push_str("Content-Type: text/plain; charset=\"utf-8\"\r\n");
        out.push_str("Content-Transfer-Encoding: 8bit\r\n\r\n");
        out.push_str(&self.body.replace('\n', "\r\n"));
        out.push_str("\r\n");

        for attachment in &self.attachments {
            out.push_str(&format!("--{}\r\n", boundary));
            out.push_str(&format!(
                "Content-Type: {}; name=\"{}\"\r\n",
                attachment.content_type, attachment.filename
            ));
            out.push_str("Content-Transfer-Encoding: base64\r\n");
            out.push_str(&format!(
                "Content-Disposition: attachment; filename=\"{}\"\r\n\r\n",
                attachment.filename
            ));
            let encoded = STANDARD.encode(&attachment.content);
            for line in encoded.as_bytes().chunks(LINE_WIDTH) {
                out.push_str(&String::from_utf8_lossy(line));
                out.push_str("\r\n");
            }
        }

        out.push_str(&format!("--{}--\r\n", boundary));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_salary_slip_message() {
        let dir = tempdir().unwrap();
        let pdf = dir.path().join("employee_E1.pdf");
        fs::write(&pdf, vec![7u8; 100]).unwrap();

        let mail = OutgoingMail::salary_slip("hr@x.org", "jane@x.com", "Jan-2024", &pdf).unwrap();
        assert_eq!(mail.subject, "Salary slip of Jan-2024");
        assert_eq!(mail.body, "Please find attached below the salary slip of Jan-2024");

        let mime = mail.to_mime_with_boundary("BOUNDARY");
        assert!(mime.contains("To: jane@x.com\r\n"));
        assert!(mime.contains("Content-Type: multipart/mixed; boundary=\"BOUNDARY\""));
        assert!(mime.contains("filename=\"employee_E1.pdf\""));
        assert!(mime.ends_with("--BOUNDARY--\r\n"));
        assert!(mime.lines().all(|l| l.trim_end_matches('\r').len() <= 998));

        let encoded: String = mime
            .split("filename=\"employee_E1.pdf\"\r\n\r\n")
            .nth(1)
            .unwrap()
            .split("--BOUNDARY--")
            .next()
            .unwrap()
            .split("\r\n")
            .collect();
        assert_eq!(STANDARD.decode(encoded).unwrap(), vec![7u8; 100]);
    }

    #[test]
    fn test_missing_attachment() {
        let result = OutgoingMail::salary_slip("a@b.co", "c@d.co", "Jan-2024", Path::new("/no/file.pdf"));
        assert!(matches!(result, Err(MailError::Attachment { .. })));
    }

    #[test]
    fn test_boundaries_are_unique() {
        let mail = OutgoingMail::new("a@b.co", "c@d.co", "s");
        assert_ne!(mail.to_mime(), mail.to_mime());
    }
}
