// template/parser.rs

//! # Template Parser Module
//!
//! Turns an HTML slip template into a format string plus the set of field
//! tokens it uses.
//!
//! ## Format
//!
//! Tokens are written `{{ identifier }}` where the identifier is made of
//! `[A-Za-z0-9._+-/%]`. Parsing happens line by line: every literal `%` is
//! first doubled, then each token becomes a `%(identifier)s` placeholder. The
//! result is rendered by [`super::engine::render`].
//!
//! ```text
//! <td>{{ Name }}</td><td>50%</td>   =>   <td>%(Name)s</td><td>50%%</td>
//! ```
//!
//! Anything that does not look like a token (a lone `{`, `{{ }}`, `{{a b}}`)
//! is kept as text.

use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use log::{debug, error};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*([A-Za-z0-9._+\-/%]+)\s*\}\}").expect("valid token regex")
});

/// A template ready for rendering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTemplate {
    /// Format string with `%(name)s` placeholders and `%%` escapes
    pub format: String,

    /// Distinct field identifiers used by the template, unescaped
    pub tokens: BTreeSet<String>,
}

impl ParsedTemplate {
    /// True when the template has no content at all.
    pub fn is_empty(&self) -> bool {
        self.format.is_empty()
    }
}

/// Parses template text.
pub fn parse(html: &str) -> ParsedTemplate {
    let mut tokens = BTreeSet::new();

    let lines: Vec<String> = html
        .lines()
        .map(|line| {
            let escaped = line.replace('%', "%%");
            TOKEN_RE
                .replace_all(&escaped, |caps: &Captures| {
                    let name = &caps[1];
                    tokens.insert(name.replace("%%", "%"));
                    format!("%({})s", name)
                })
                .into_owned()
        })
        .collect();

    let format = lines.join("\n").trim_end_matches(&[' ', '\n'][..]).to_string();
    ParsedTemplate { format, tokens }
}

/// Reads and parses the template at `path`.
///
/// A missing or unreadable file yields an empty template; the failure is logged.
pub fn load(path: &Path) -> ParsedTemplate {
    match fs::read_to_string(path) {
        Ok(html) => {
            let parsed = parse(&html);
            debug!(
                "[PARSE] {} has {} token(s)",
                path.display(),
                parsed.tokens.len()
            );
            parsed
        }
        Err(e) => {
            error!("[PARSE] cannot read template {}: {}", path.display(), e);
            ParsedTemplate::default()
        }
    }
}
