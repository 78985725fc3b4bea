//! Default leaf checkers.

use crate::{RegistryBuilder, Value};

/// Register the default checkers on `builder`.
///
/// | Group | Names |
/// |-------|-------|
/// | Presence | `any`, `undefined`, `null`, `nil`, `defined` |
/// | Primitives | `boolean`, `number`, `integer`, `finite`, `bigint`, `string`, `symbol`, `primitive` |
/// | Strings | `numericString`, `emptyString`, `nonEmptyString` |
/// | Sequences | `array`, `emptyArray`, `nonEmptyArray`, `iterable` |
/// | Composites | `object`, `plainObject`, `emptyObject`, `nonEmptyObject`, `regexp`, `error`, `promise` |
/// | Collections | `set`, `emptySet`, `nonEmptySet`, `map`, `emptyMap`, `nonEmptyMap` |
/// | Size | `empty`, `nonEmpty` |
/// | Truthiness | `truthy`, `falsy` |
/// | Functions | `function`, `syncFunction`, `asyncFunction` |
///
/// `number` rejects `NaN` but accepts infinities and `-0`. Arrays are not
/// `object`s, but they are `iterable`.
#[must_use]
pub fn register_defaults(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        // Presence
        .register("any", |_| true)
        .register("undefined", Value::is_undefined)
        .register("null", Value::is_null)
        .register("nil", |v| v.is_null() || v.is_undefined())
        .register("defined", |v| !v.is_undefined())
        // Primitives
        .register("boolean", |v| matches!(v, Value::Bool(_)))
        .register("number", is_number)
        .register("integer", |v| {
            v.as_f64().is_some_and(|n| n.is_finite() && n.fract() == 0.0)
        })
        .register("finite", |v| v.as_f64().is_some_and(f64::is_finite))
        .register("bigint", |v| matches!(v, Value::BigInt(_)))
        .register("string", |v| v.as_str().is_some())
        .register("symbol", |v| matches!(v, Value::Symbol(_)))
        .register("primitive", Value::is_primitive)
        // Strings
        .register("numericString", |v| v.as_str().is_some_and(is_numeric))
        .register("emptyString", |v| v.as_str().is_some_and(str::is_empty))
        .register("nonEmptyString", |v| v.as_str().is_some_and(|s| !s.is_empty()))
        // Sequences
        .register("array", Value::is_array)
        .register("emptyArray", |v| v.as_array().is_some_and(<[Value]>::is_empty))
        .register("nonEmptyArray", |v| v.as_array().is_some_and(|a| !a.is_empty()))
        .register("iterable", |v| {
            matches!(
                v,
                Value::String(_) | Value::Array(_) | Value::Set(_) | Value::Map(_)
            )
        })
        // Composites
        .register("object", Value::is_composite)
        .register("plainObject", is_plain_object)
        .register("emptyObject", |v| is_plain_object(v) && v.len() == Some(0))
        .register("nonEmptyObject", |v| {
            is_plain_object(v) && v.len().is_some_and(|n| n > 0)
        })
        .register("regexp", |v| matches!(v, Value::Regex(_)))
        .register("error", |v| matches!(v, Value::Error(_)))
        .register("promise", |v| matches!(v, Value::Promise))
        // Collections
        .register("set", |v| matches!(v, Value::Set(_)))
        .register("emptySet", |v| matches!(v, Value::Set(s) if s.is_empty()))
        .register("nonEmptySet", |v| matches!(v, Value::Set(s) if !s.is_empty()))
        .register("map", |v| matches!(v, Value::Map(_)))
        .register("emptyMap", |v| matches!(v, Value::Map(m) if m.is_empty()))
        .register("nonEmptyMap", |v| matches!(v, Value::Map(m) if !m.is_empty()))
        // Size
        .register("empty", |v| v.len() == Some(0))
        .register("nonEmpty", |v| v.len().is_some_and(|n| n > 0))
        // Truthiness
        .register("truthy", |v| !v.is_falsy())
        .register("falsy", Value::is_falsy)
        // Functions
        .register("function", |v| matches!(v, Value::Function(_)))
        .register("syncFunction", |v| matches!(v, Value::Function(f) if !f.is_async))
        .register("asyncFunction", |v| matches!(v, Value::Function(f) if f.is_async))
}

fn is_number(v: &Value) -> bool {
    v.as_f64().is_some_and(|n| !n.is_nan())
}

fn is_plain_object(v: &Value) -> bool {
    v.as_object().is_some_and(crate::Object::is_plain)
}

/// Trimmed, non-empty, and parses to a finite number.
fn is_numeric(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.parse::<f64>().is_ok_and(f64::is_finite)
}
