//! Best-effort message formatting for log-originated notifications:
//! placeholder extraction, admin-safe markup filtering and translation.
//! None of these steps fail; a message that cannot be improved passes
//! through unchanged.

use std::collections::HashMap;

use serde_json::Value;

/// Markup elements an administrator-facing message may keep. Everything else
/// is stripped.
const ALLOWED_TAGS: &[&str] = &[
    "a", "b", "blockquote", "br", "code", "dd", "del", "div", "dl", "dt", "em", "h2", "h3", "h4",
    "h5", "h6", "hr", "i", "img", "li", "ol", "p", "pre", "q", "small", "span", "strong", "sub",
    "sup", "table", "tbody", "td", "th", "thead", "tr", "ul",
];

/// Extracts the placeholder entries of a log context map: keys prefixed with
/// `@`, `%` or `:` that actually occur in the message, stringified for
/// display. Other context entries are metadata, not placeholders.
pub fn parse_placeholders(message: &str, context: &HashMap<String, Value>) -> HashMap<String, String> {
    context
        .iter()
        .filter(|(key, _)| {
            key.starts_with(['@', '%', ':']) && message.contains(key.as_str())
        })
        .map(|(key, value)| (key.clone(), value_to_display(value)))
        .collect()
}

fn value_to_display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Strips markup not on the admin allow-list. Allowed tags pass through
/// verbatim, including their attributes, which are NOT sanitized: the output
/// is only ever rendered as plain-text email, never as HTML. Disallowed tags
/// are removed while their inner text is kept. A lone `<` with no closing
/// `>` is treated as literal text.
pub fn filter_admin(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut rest = markup;

    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];

        match tail.find('>') {
            Some(close) => {
                let tag = &tail[..=close];
                if is_allowed_tag(tag) {
                    out.push_str(tag);
                }
                rest = &tail[close + 1..];
            }
            None => {
                out.push_str(tail);
                rest = "";
            }
        }
    }

    out.push_str(rest);
    out
}

fn is_allowed_tag(tag: &str) -> bool {
    let inner = tag.trim_start_matches('<').trim_end_matches('>');
    let inner = inner.strip_prefix('/').unwrap_or(inner).trim_end_matches('/');

    let name: String = inner
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();

    !name.is_empty() && ALLOWED_TAGS.contains(&name.to_ascii_lowercase().as_str())
}

/// Translation lookup applied as the final formatting step. Implementations
/// must substitute the supplied placeholders into the (possibly translated)
/// message.
pub trait Translator: Send + Sync {
    fn translate(&self, message: &str, placeholders: &HashMap<String, String>) -> String;
}

/// No translation catalog: substitutes placeholders into the message as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassthroughTranslator;

impl Translator for PassthroughTranslator {
    fn translate(&self, message: &str, placeholders: &HashMap<String, String>) -> String {
        let mut result = message.to_string();

        for (placeholder, replacement) in placeholders {
            result = result.replace(placeholder.as_str(), replacement);
        }

        result
    }
}
