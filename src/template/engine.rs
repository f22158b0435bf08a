// template/engine.rs

//! # Row Renderer Module
//!
//! Fills a parsed template's format string with the values of one render
//! context.
//!
//! Only two directives exist in a format string: `%(name)s`, replaced with the
//! value bound to `name`, and `%%`, a literal percent sign. Values are inserted
//! verbatim and never interpreted, so a value containing `%` or `%(x)s` comes
//! out unchanged.
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! let parsed = parser::parse("<b>{{Name}}</b> 100%");
//! let mut context = RenderContext::new();
//! context.add_variable("Name".to_string(), "Jane".to_string());
//! assert_eq!(render(&parsed.format, &context)?, "<b>Jane</b> 100%");
//! ```

use std::collections::HashMap;
use std::str::Chars;

use thiserror::Error;

use super::context::RenderContext;

/// Errors that can occur while rendering one row.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("no value bound for field '{0}'")]
    MissingKey(String),

    #[error("unsupported format directive '{0}'")]
    BadDirective(String),
}

/// Renders `format` with the values of `context`.
///
/// Placeholder names are matched against the context keys with `%` escaped
/// to `%%`, which is how the parser writes names containing `%`.
pub fn render(format: &str, context: &RenderContext) -> Result<String, RenderError> {
    let values: HashMap<String, &str> = context
        .get_variables()
        .iter()
        .map(|(k, v)| (k.replace('%', "%%"), v.as_str()))
        .collect();

    let mut result = String::with_capacity(format.len());
    let mut chars = format.chars();

    while let Some(c) = chars.next() {
        if c != '%' {
            result.push(c);
            continue;
        }

        match chars.next() {
            Some('%') => result.push('%'),
            Some('(') => {
                let name = extract_placeholder_name(&mut chars)?;
                match values.get(&name) {
                    Some(value) => result.push_str(value),
                    None => return Err(RenderError::MissingKey(name.replace("%%", "%"))),
                }
            }
            Some(other) => return Err(RenderError::BadDirective(format!("%{}", other))),
            None => return Err(RenderError::BadDirective("%".to_string())),
        }
    }

    Ok(result)
}

/// Reads a placeholder name up to `)` and checks the trailing `s`.
///
/// Assumes the opening `%(` has already been consumed.
fn extract_placeholder_name(chars: &mut Chars<'_>) -> Result<String, RenderError> {
    let mut name = String::new();

    loop {
        match chars.next() {
            Some(')') => break,
            Some(c) => name.push(c),
            None => return Err(RenderError::BadDirective(format!("%({}", name))),
        }
    }

    match chars.next() {
        Some('s') => Ok(name),
        Some(other) => Err(RenderError::BadDirective(format!("%({}){}", name, other))),
        None => Err(RenderError::BadDirective(format!("%({})", name))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parser::parse;

    fn context(pairs: &[(&str, &str)]) -> RenderContext {
        let mut context = RenderContext::new();
        for (k, v) in pairs {
            context.add_variable(k.to_string(), v.to_string());
        }
        context
    }

    #[test]
    fn test_simple_substitution() {
        let ctx = context(&[("Name", "Jane Doe")]);
        assert_eq!(render("<b>%(Name)s</b>", &ctx).unwrap(), "<b>Jane Doe</b>");
    }

    #[test]
    fn test_round_trip_with_percent_in_markup_and_values() {
        let html = "<td width=\"50%\">{{Name}}</td><td>{{PF%}}</td>";
        let parsed = parse(html);
        let ctx = context(&[("Name", "100% %(x)s"), ("PF%", "12")]);

        let rendered = render(&parsed.format, &ctx).unwrap();
        assert_eq!(
            rendered,
            "<td width=\"50%\">100% %(x)s</td><td>12</td>"
        );
    }

    #[test]
    fn test_template_without_tokens_renders_unchanged() {
        let html = "<p>Total: 100%</p>\n<p>{ not a token }</p>";
        let parsed = parse(html);
        assert_eq!(render(&parsed.format, &RenderContext::new()).unwrap(), html);
    }

    #[test]
    fn test_missing_key() {
        let parsed = parse("<p>{{Missing}}</p>");
        match render(&parsed.format, &RenderContext::new()) {
            Err(RenderError::MissingKey(key)) => assert_eq!(key, "Missing"),
            other => panic!("Expected MissingKey, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_key_with_percent_reports_unescaped() {
        let parsed = parse("{{PF%}}");
        assert_eq!(
            render(&parsed.format, &RenderContext::new()),
            Err(RenderError::MissingKey("PF%".to_string()))
        );
    }

    #[test]
    fn test_bad_directives() {
        let ctx = context(&[("a", "1")]);
        assert!(matches!(render("%d", &ctx), Err(RenderError::BadDirective(_))));
        assert!(matches!(render("50%", &ctx), Err(RenderError::BadDirective(_))));
        assert!(matches!(render("%(a", &ctx), Err(RenderError::BadDirective(_))));
        assert!(matches!(render("%(a)d", &ctx), Err(RenderError::BadDirective(_))));
    }

    #[test]
    fn test_extra_keys_ignored() {
        let ctx = context(&[("a", "1"), ("unused", "2")]);
        assert_eq!(render("%(a)s%%", &ctx).unwrap(), "1%");
    }
}
