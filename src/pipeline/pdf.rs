// pipeline/pdf.rs

//! # PDF Renderer Module
//!
//! Turns rendered slip HTML into a PDF file.
//!
//! The production renderer pipes the HTML into `wkhtmltopdf` over stdin and
//! lets it write the destination file directly. Renderers are shared across
//! blocking worker tasks, so they must be `Send + Sync`.

use std::io::{self, Write};
use std::path::Path;
use std::process::{Command, Stdio};
use std::thread;

use log::debug;
use thiserror::Error;

use crate::core::config::RendererSettings;

#[derive(Error, Debug)]
pub enum PdfError {
    #[error("failed to start '{binary}': {source}")]
    Spawn {
        binary: String,
        source: std::io::Error,
    },

    #[error("I/O error while rendering: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF engine exited with {status}: {stderr}")]
    Failed { status: String, stderr: String },
}

/// Renders HTML to a PDF file at `dest`.
pub trait PdfRenderer: Send + Sync {
    fn render_to_file(&self, html: &str, dest: &Path) -> Result<(), PdfError>;
}

/// `wkhtmltopdf` driven through a child process.
#[derive(Debug, Clone)]
pub struct WkhtmltopdfRenderer {
    binary: String,
    page_size: String,
    margin: String,
    extra_args: Vec<String>,
}

impl WkhtmltopdfRenderer {
    pub fn new(settings: &RendererSettings) -> Self {
        Self {
            binary: settings.binary.clone(),
            page_size: settings.page_size.clone(),
            margin: settings.margin.clone(),
            extra_args: settings.extra_args.clone(),
        }
    }

    /// Runs the engine found at `path` instead of the configured name.
    pub fn with_binary(mut self, path: &Path) -> Self {
        self.binary = path.to_string_lossy().to_string();
        self
    }

    fn args(&self, dest: &Path) -> Vec<String> {
        let mut args = vec![
            "--quiet".to_string(),
            "--encoding".to_string(),
            "UTF-8".to_string(),
            "--page-size".to_string(),
            self.page_size.clone(),
        ];
        for side in ["top", "right", "bottom", "left"] {
            args.push(format!("--margin-{}", side));
            args.push(self.margin.clone());
        }
        args.push("--no-outline".to_string());
        args.extend(self.extra_args.iter().cloned());
        args.push("-".to_string());
        args.push(dest.to_string_lossy().to_string());
        args
    }
}

impl PdfRenderer for WkhtmltopdfRenderer {
    fn render_to_file(&self, html: &str, dest: &Path) -> Result<(), PdfError> {
        let args = self.args(dest);
        debug!("[PDF] {} {}", self.binary, args.join(" "));

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| PdfError::Spawn {
                binary: self.binary.clone(),
                source,
            })?;

        // Feed stdin from its own thread so stderr keeps draining.
        let writer = child.stdin.take().map(|mut stdin| {
            let bytes = html.as_bytes().to_vec();
            thread::spawn(move || stdin.write_all(&bytes))
        });

        let output = child.wait_with_output()?;
        let written = match writer {
            Some(handle) => handle.join().unwrap_or_else(|_| {
                Err(io::Error::new(io::ErrorKind::Other, "stdin writer panicked"))
            }),
            None => Ok(()),
        };

        if !output.status.success() {
            return Err(PdfError::Failed {
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        written?;
        Ok(())
    }
}

/// Renders nothing and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunRenderer;

impl PdfRenderer for DryRunRenderer {
    fn render_to_file(&self, html: &str, dest: &Path) -> Result<(), PdfError> {
        debug!("[PDF] dry run: {} bytes -> {}", html.len(), dest.display());
        Ok(())
    }
}
