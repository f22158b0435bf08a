// core/utils.rs

//! # Utility Functions
//!
//! Text cleaning and validation helpers shared by the loader, binder,
//! store and mailer.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::app::{EMPTY_FILENAME, FILENAME_DENY};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").expect("valid email regex")
});

static YEAR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid year regex"));

static DATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{4})[-,/](\d{1,2})[-,/](\d{1,2})").expect("valid date regex")
});

static INTEGRAL_FLOAT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(-?\d+)\.0+$").expect("valid float regex"));

/// Removes newlines and surrounding whitespace. Used for column names.
pub fn text_clean(text: &str) -> String {
    text.replace('\n', "").trim().to_string()
}

/// Removes every control character and surrounding whitespace.
/// This is the "cleaned text" bound into templates.
pub fn clean_cell(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Strips characters that are unsafe in file names.
///
/// Returns `"none"` when nothing is left.
pub fn file_clean(text: &str) -> String {
    let cleaned: String = text.chars().filter(|c| !FILENAME_DENY.contains(*c)).collect();
    if cleaned.is_empty() {
        EMPTY_FILENAME.to_string()
    } else {
        cleaned
    }
}

/// Normalizes a cell value before it is written to the payroll store.
///
/// A value containing an ISO-like date (`YYYY-MM-DD`, `YYYY/MM/DD`) is replaced
/// by that date as `DD-MM-YYYY`, an integral float (`12.0`) loses its
/// fraction and double quotes become single quotes.
pub fn clean_value(value: &str) -> String {
    let value = match DATE_RE.captures(value) {
        Some(caps) => format!("{}-{}-{}", &caps[3], &caps[2], &caps[1]),
        None => match INTEGRAL_FLOAT_RE.captures(value.trim()) {
            Some(caps) => caps[1].to_string(),
            None => value.to_string(),
        },
    };
    value.replace('"', "'")
}

/// Checks an e-mail address shape.
pub fn email_check(address: &str) -> bool {
    EMAIL_RE.is_match(address)
}

/// Checks a four-digit year.
pub fn year_check(year: &str) -> bool {
    YEAR_RE.is_match(year)
}

/// Escapes the HTML special characters in text placed into markup.
pub fn html_escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

/// Capitalizes the first character, lower-casing the rest (`"JAN"` -> `"Jan"`).
pub fn capitalize(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
