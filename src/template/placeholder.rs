//! `{{FIELD NAME}}` placeholder substitution for template documents
//!
//! Template documents are authored by people, not programmers, and arrive
//! as exported HTML. Placeholders are the uppercased header name wrapped in
//! double braces (`{{DOLLAR AMOUNT}}`). Substitution is literal: no
//! expressions, no escaping, and anything that is not a known placeholder
//! is copied through untouched.

use crate::sheet::Row;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

/// Replace every known placeholder in `template` with the row's value
///
/// The template is scanned once, so text inserted for one field is never
/// re-examined for placeholders. When two headers uppercase to the same
/// token the first header wins.
pub fn substitute(template: &str, row: &Row<'_>) -> String {
    let mut values: HashMap<String, &str> = HashMap::new();
    for (header, value) in row.fields() {
        if header.is_empty() {
            continue;
        }
        values.entry(header.to_uppercase()).or_insert(value);
    }

    substitute_with(template, &values)
}

/// Single-pass substitution against a prepared token map (keys without braces)
pub fn substitute_with(template: &str, values: &HashMap<String, &str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find("{{") {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 2..];

        let replacement = after_open
            .find("}}")
            .and_then(|close| values.get(&after_open[..close]).map(|v| (close, *v)));

        match replacement {
            Some((close, value)) => {
                out.push_str(value);
                rest = &after_open[close + 2..];
            }
            None => {
                // Not a known token; emit one brace and rescan so "{{{NAME}}" still matches
                out.push('{');
                rest = &rest[open + 1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Placeholder-looking tokens still present after substitution, each once in first-seen order
pub fn unmatched_placeholders(rendered: &str) -> Vec<String> {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    let re = PLACEHOLDER_RE.get_or_init(|| {
        Regex::new(r"\{\{([^{}]+)\}\}").expect("placeholder pattern is valid")
    });

    let mut seen = HashSet::new();
    re.captures_iter(rendered)
        .map(|c| c[1].to_string())
        .filter(|token| seen.insert(token.clone()))
        .collect()
}
