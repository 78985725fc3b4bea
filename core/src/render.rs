//! Diagnostic rendering of values and failure messages.
//!
//! Output is bounded and deterministic; it is meant for humans reading a
//! failed assertion, never for parsing back.

use crate::{Diagnostic, Value};

/// Strings up to this many characters are shown whole.
pub const MAX_STRING_PREVIEW: usize = 32;

/// Characters kept from a string longer than [`MAX_STRING_PREVIEW`].
const TRUNCATED_PREVIEW: usize = 29;

/// Render a value as a bracketed tag, e.g. `[number 4]` or `[array (3)]`.
///
/// ```
/// use vouch::{render, Value};
///
/// assert_eq!(render(&Value::Bool(true)), "[boolean true]");
/// assert_eq!(render(&Value::Number(-0.0)), "[number -0]");
/// assert_eq!(render(&Value::from("hi")), "[string \"hi\"]");
/// ```
#[must_use]
pub fn render(value: &Value) -> String {
    match value {
        Value::Undefined => "[undefined]".to_owned(),
        Value::Null => "[null]".to_owned(),
        Value::Bool(b) => format!("[boolean {b}]"),
        Value::BigInt(n) => format!("[bigint {n}]"),
        Value::Number(n) => format!("[number {}]", number_literal(*n)),
        Value::String(s) => render_string(s),
        Value::Symbol(Some(desc)) => format!("[symbol ({desc})]"),
        Value::Symbol(None) => "[symbol]".to_owned(),
        Value::Function(f) => render_function_name(f.name.as_deref()),
        Value::Array(items) => format!("[array ({})]", items.len()),
        other => format!("[object {}]", other.class_name().unwrap_or("Object")),
    }
}

/// Render a function label: `[function name]` or `[function (anonymous)]`.
#[must_use]
pub fn render_function_name(name: Option<&str>) -> String {
    match name {
        Some(name) if !name.is_empty() => format!("[function {name}]"),
        _ => "[function (anonymous)]".to_owned(),
    }
}

fn render_string(s: &str) -> String {
    let len = s.chars().count();
    if len <= MAX_STRING_PREVIEW {
        format!("[string \"{s}\"]")
    } else {
        let head: String = s.chars().take(TRUNCATED_PREVIEW).collect();
        format!("[string \"{head}...\" ({len})]")
    }
}

/// Number literal as a script engine would print it. Negative zero keeps its
/// sign so it can be told apart from `0`; magnitudes outside `[1e-6, 1e21)`
/// switch to exponent form (`1e+300`, `5e-324`).
fn number_literal(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_owned()
    } else if n == 0.0 {
        if n.is_sign_negative() { "-0" } else { "0" }.to_owned()
    } else if (1e-6..1e21).contains(&n.abs()) {
        format!("{n}")
    } else {
        exponent_literal(n)
    }
}

/// `{:e}` with an explicit exponent sign: `1e300` becomes `1e+300`.
fn exponent_literal(n: f64) -> String {
    let raw = format!("{n:e}");
    match raw.split_once('e') {
        Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
        _ => raw,
    }
}

/// Compose `<prefix> <description> expected <type> but got <value>`.
///
/// Empty prefix or description are dropped together with their separator.
///
/// ```
/// use vouch::{format_expected, Value};
///
/// let msg = format_expected("User:", "age", "number", &Value::from("x"));
/// assert_eq!(msg, "User: age expected number but got [string \"x\"]");
///
/// let bare = format_expected("", "", "number", &Value::Null);
/// assert_eq!(bare, "expected number but got [null]");
/// ```
#[must_use]
pub fn format_expected(prefix: &str, description: &str, expected: &str, value: &Value) -> String {
    compose(prefix, description, expected, &render(value))
}

pub(crate) fn compose(prefix: &str, description: &str, expected: &str, actual: &str) -> String {
    let mut out = String::new();
    for part in [prefix, description] {
        if !part.is_empty() {
            out.push_str(part);
            out.push(' ');
        }
    }
    out.push_str("expected ");
    out.push_str(expected);
    out.push_str(" but got ");
    out.push_str(actual);
    out
}

impl Diagnostic {
    /// The full human-readable message.
    #[must_use]
    pub fn message(&self) -> String {
        compose(&self.prefix, &self.description, &self.expected, &self.actual)
    }
}
