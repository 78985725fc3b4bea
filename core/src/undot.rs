//! Match options and the `undot` transform.
//!
//! Flattened records (`{"db.host": "x", "db.port": 5432}`) can be matched
//! against nested shapes by expanding dotted keys before field lookup. The
//! expansion builds a copy; the checked value is never touched.

use std::borrow::Cow;
use std::collections::BTreeMap;

use serde::Deserialize;

use crate::{Object, Value};

/// How dotted keys are expanded before shape matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Undot {
    /// Split each dotted key once: `"a.b.c"` becomes `a: {"b.c": ...}`.
    Shallow,
    /// Split every dot, and expand nested objects too.
    Deep,
}

/// Options shared by every walk of a dispatcher.
///
/// ```
/// use vouch::{MatchOptions, Undot};
///
/// let opts: MatchOptions = serde_json::from_str(r#"{ "undot": "deep" }"#).unwrap();
/// assert_eq!(opts.undot, Some(Undot::Deep));
///
/// let none: MatchOptions = serde_json::from_str("{}").unwrap();
/// assert_eq!(none.undot, None);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct MatchOptions {
    /// Dotted-key expansion; `None` leaves values as they are.
    #[serde(default)]
    pub undot: Option<Undot>,
}

impl MatchOptions {
    /// Options with the given undot mode.
    #[must_use]
    pub fn with_undot(mut self, undot: Undot) -> Self {
        self.undot = Some(undot);
        self
    }
}

/// Expand dotted keys of an object according to `mode`.
///
/// Returns the value borrowed when there is nothing to expand. Colliding
/// keys merge when both sides are objects; otherwise the expanded entry wins.
///
/// ```
/// use vouch::{undot, Undot, Value};
/// use serde_json::json;
///
/// let flat = Value::from(json!({ "a.b.c": 1 }));
///
/// let shallow = undot(&flat, Some(Undot::Shallow));
/// assert_eq!(*shallow, Value::from(json!({ "a": { "b.c": 1 } })));
///
/// let deep = undot(&flat, Some(Undot::Deep));
/// assert_eq!(*deep, Value::from(json!({ "a": { "b": { "c": 1 } } })));
/// ```
#[must_use]
pub fn undot(value: &Value, mode: Option<Undot>) -> Cow<'_, Value> {
    let (Some(mode), Value::Object(object)) = (mode, value) else {
        return Cow::Borrowed(value);
    };
    if !needs_expansion(object, mode) {
        return Cow::Borrowed(value);
    }
    Cow::Owned(Value::Object(expand(object, mode)))
}

fn needs_expansion(object: &Object, mode: Undot) -> bool {
    object.fields.iter().any(|(key, field)| {
        is_dotted(key)
            || (mode == Undot::Deep
                && field
                    .as_object()
                    .is_some_and(|inner| needs_expansion(inner, mode)))
    })
}

/// A key with a non-empty segment on both sides of some dot.
fn is_dotted(key: &str) -> bool {
    key.split_once('.')
        .is_some_and(|(head, rest)| !head.is_empty() && !rest.is_empty())
}

fn expand(object: &Object, mode: Undot) -> Object {
    let mut fields = BTreeMap::new();
    for (key, field) in &object.fields {
        let field = match (mode, field) {
            (Undot::Deep, Value::Object(inner)) => Value::Object(expand(inner, mode)),
            _ => field.clone(),
        };
        if !is_dotted(key) {
            merge_into(&mut fields, key.clone(), field);
            continue;
        }
        let segments: Vec<&str> = match mode {
            Undot::Shallow => key.splitn(2, '.').collect(),
            Undot::Deep => key.split('.').collect(),
        };
        let Some((head, tail)) = segments.split_first() else {
            merge_into(&mut fields, key.clone(), field);
            continue;
        };
        let nested = tail.iter().rev().fold(field, |inner, segment| {
            Value::object([((*segment).to_owned(), inner)])
        });
        merge_into(&mut fields, (*head).to_owned(), nested);
    }
    Object {
        class: object.class.clone(),
        fields,
    }
}

fn merge_into(fields: &mut BTreeMap<String, Value>, key: String, value: Value) {
    if let Value::Object(incoming) = value {
        if let Some(Value::Object(existing)) = fields.get_mut(&key) {
            for (k, v) in incoming.fields {
                merge_into(&mut existing.fields, k, v);
            }
            return;
        }
        fields.insert(key, Value::Object(incoming));
    } else {
        fields.insert(key, value);
    }
}
