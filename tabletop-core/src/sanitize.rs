//! Markup scrubbing for externally supplied scenario JSON.
//!
//! Applied to every string value of an imported document before schema
//! validation. Built-in scenarios bypass it.
use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

const PATTERNS: [&str; 4] = [
    // HTML tags
    r"<[^>]*>",
    // javascript: protocol
    r"(?i)javascript\s*:",
    // inline on* event handlers
    r"(?i)\bon\w+\s*=",
    // base64 data: URIs
    r"(?i)data\s*:[^,]*base64",
];

fn patterns() -> &'static [Regex] {
    static COMPILED: OnceLock<Vec<Regex>> = OnceLock::new();
    COMPILED.get_or_init(|| {
        PATTERNS
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(err) => {
                    log::error!("sanitizer pattern {pattern:?} disabled: {err}");
                    None
                }
            })
            .collect()
    })
}

/// Strip dangerous markup from a single string.
#[must_use]
pub fn sanitize_str(input: &str) -> String {
    let mut clean = input.to_string();
    for pattern in patterns() {
        if pattern.is_match(&clean) {
            clean = pattern.replace_all(&clean, "").into_owned();
        }
    }
    clean
}

/// Recursively sanitize every string value reachable from `value`.
///
/// Object keys are left untouched; numbers, booleans and nulls pass through.
pub fn sanitize_value(value: &mut Value) {
    match value {
        Value::String(text) => {
            let clean = sanitize_str(text);
            if clean != *text {
                *text = clean;
            }
        }
        Value::Array(items) => items.iter_mut().for_each(sanitize_value),
        Value::Object(map) => map.values_mut().for_each(sanitize_value),
        Value::Null | Value::Bool(_) | Value::Number(_) => {}
    }
}

/// Owned variant of [`sanitize_value`].
#[must_use]
pub fn sanitized(mut value: Value) -> Value {
    sanitize_value(&mut value);
    value
}
