// utils/logging.rs

//! # Logging Utility Module
//!
//! Initializes `env_logger` with the application record format:
//!
//! ```text
//! [17-10-2026 14:05]:[INFO]:[PDF] generating 42 slip(s) into ./out
//! ```
//!
//! The area tag is part of the message (`[PDF] ...`); records without one get
//! the module path instead. With a log file, records are appended to the file
//! rather than written to stderr.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::Path;

use chrono::Local;
use log::{LevelFilter, Record};

/// Maps a `--log-level` value onto a level filter.
pub fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "info" => LevelFilter::Info,
        "warn" | "warning" => LevelFilter::Warn,
        "error" => LevelFilter::Error,
        _ => LevelFilter::Info,
    }
}

/// Sets up the global logger. Fails only when the log file cannot be opened.
pub fn initialize_logger(log_level: &str, log_file: Option<&Path>) -> io::Result<()> {
    let mut builder = env_logger::Builder::new();
    builder
        .filter(None, parse_level(log_level))
        .format(|buf, record| writeln!(buf, "{}", format_record(record)));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
    Ok(())
}

fn format_record(record: &Record) -> String {
    let message = record.args().to_string();
    let (area, text) = split_area(&message).unwrap_or_else(|| {
        (
            record.module_path().unwrap_or("app").to_string(),
            message.clone(),
        )
    });
    format!(
        "[{}]:[{}]:[{}] {}",
        Local::now().format("%d-%m-%Y %H:%M"),
        record.level(),
        area,
        text
    )
}

/// Splits `"[PDF] message"` into `("PDF", "message")`.
fn split_area(message: &str) -> Option<(String, String)> {
    let rest = message.strip_prefix('[')?;
    let (area, text) = rest.split_once(']')?;
    if area.is_empty() || !area.chars().all(|c| c.is_ascii_uppercase()) {
        return None;
    }
    Some((area.to_string(), text.trim_start().to_string()))
}
