// utils/display.rs

//! # Display Utility Module
//!
//! Styled terminal output: Unicode message boxes and color-coded messages for
//! errors, successes and information. Uses `colored` for styling and
//! `unicode_width` so boxes stay aligned around wide characters.
//!
//! ## Example Usage
//! ```rust,ignore
//! use crate::utils::display::print_unicode_box;
//!
//! print_unicode_box("📄 Generating salary slips...");
//! print_error!("Template unavailable.");
//! print_success!("12 of 12 generated");
//! print_info!("Using template html/teaching.html");
//! ```

use unicode_width::UnicodeWidthStr;

/// Builds the lines of a box around `message`, one entry per output line.
pub fn unicode_box(message: &str) -> Vec<String> {
    let lines: Vec<&str> = message.split('\n').collect();
    let max_length = lines
        .iter()
        .map(|line| UnicodeWidthStr::width(*line))
        .max()
        .unwrap_or(0);

    let mut out = Vec::with_capacity(lines.len() + 2);
    out.push(format!("┌{}┐", "─".repeat(max_length + 2)));
    for line in lines {
        let padding = max_length - UnicodeWidthStr::width(line);
        out.push(format!("│ {}{} │", line, " ".repeat(padding)));
    }
    out.push(format!("└{}┘", "─".repeat(max_length + 2)));
    out
}

/// Prints `message` inside a yellow Unicode box.
pub fn print_unicode_box(message: &str) {
    let border_color = "\x1b[93m";
    let reset_color = "\x1b[0m";
    for line in unicode_box(message) {
        println!("{}{}{}", border_color, line, reset_color);
    }
}

#[macro_export]
macro_rules! print_info {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        println!("{}", format!($($arg)*).blue())
    }};
}

#[macro_export]
macro_rules! print_error {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        eprintln!("{}", format!($($arg)*).red())
    }};
}

#[macro_export]
macro_rules! print_success {
    ($($arg:tt)*) => {{
        use colored::Colorize;
        println!("{}", format!($($arg)*).green())
    }};
}
