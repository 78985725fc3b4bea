//! `Value` — Type-erased data that flows through the matcher
//!
//! Rust has no ambient dynamic value, so checked data is lifted into [`Value`]
//! before matching. Every kind that a checker or the diagnostic renderer
//! distinguishes has its own variant: `NaN`, `-0`, `undefined` and friends are
//! all representable.
//!
//! Plain data usually arrives as JSON; `From<serde_json::Value>` lifts it with
//! numbers as `f64` and objects as class-less plain objects.

use std::collections::BTreeMap;
use std::fmt;

use regex::Regex;

/// A dynamically typed value under test.
///
/// # Example
///
/// ```
/// use vouch::Value;
///
/// let v = Value::from(serde_json::json!({ "name": "alice", "age": 30 }));
/// assert!(v.is_object());
/// assert_eq!(v.field("age"), Some(&Value::Number(30.0)));
/// ```
#[derive(Debug, Clone)]
pub enum Value {
    /// Absent value.
    Undefined,

    /// Explicit null.
    Null,

    /// Boolean.
    Bool(bool),

    /// IEEE-754 double. `NaN` and `-0.0` are preserved as-is.
    Number(f64),

    /// Arbitrary-precision integer (bounded to `i128` here).
    BigInt(i128),

    /// Text.
    String(String),

    /// Symbol with an optional description.
    Symbol(Option<String>),

    /// Ordered sequence.
    Array(Vec<Value>),

    /// Keyed composite, optionally tagged with its class name.
    Object(Object),

    /// Callable reference. Only its name and sync/async kind are observable.
    Function(Function),

    /// Compiled pattern.
    Regex(Regex),

    /// Exception value.
    Error(ErrorValue),

    /// Pending asynchronous completion.
    Promise,

    /// Unordered collection of unique values.
    Set(Vec<Value>),

    /// Keyed collection with arbitrary keys.
    Map(Vec<(Value, Value)>),
}

/// Fields of a [`Value::Object`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Object {
    /// Constructor name; `None` for plain literals.
    pub class: Option<String>,
    /// Own fields.
    pub fields: BTreeMap<String, Value>,
}

/// A function reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Function {
    /// Declared name; `None` for anonymous functions.
    pub name: Option<String>,
    /// `true` for `async` functions.
    pub is_async: bool,
}

/// An exception value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorValue {
    /// Error class name, e.g. `TypeError`.
    pub name: String,
    /// Error message.
    pub message: String,
}

// Manual PartialEq because `Regex` has none; patterns compare by source text.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Undefined, Self::Undefined)
            | (Self::Null, Self::Null)
            | (Self::Promise, Self::Promise) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::BigInt(a), Self::BigInt(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::Symbol(a), Self::Symbol(b)) => a == b,
            (Self::Array(a), Self::Array(b)) | (Self::Set(a), Self::Set(b)) => a == b,
            (Self::Object(a), Self::Object(b)) => a == b,
            (Self::Function(a), Self::Function(b)) => a == b,
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            (Self::Error(a), Self::Error(b)) => a == b,
            (Self::Map(a), Self::Map(b)) => a == b,
            _ => false,
        }
    }
}

impl Value {
    /// Build a plain (class-less) object from key/value pairs.
    pub fn object<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(Object {
            class: None,
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// Build an object tagged with a class name.
    pub fn instance<K, I>(class: impl Into<String>, fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Object(Object {
            class: Some(class.into()),
            fields: fields.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        })
    }

    /// A named synchronous function.
    pub fn function(name: impl Into<String>) -> Self {
        Self::Function(Function {
            name: Some(name.into()),
            is_async: false,
        })
    }

    /// A named `async` function.
    pub fn async_function(name: impl Into<String>) -> Self {
        Self::Function(Function {
            name: Some(name.into()),
            is_async: true,
        })
    }

    /// An anonymous synchronous function.
    #[must_use]
    pub fn anonymous_function() -> Self {
        Self::Function(Function::default())
    }

    /// Compile a pattern value.
    ///
    /// # Errors
    ///
    /// Returns the `regex` compile error for an invalid pattern.
    pub fn regex(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Regex)
    }

    /// An exception value.
    pub fn error(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Error(ErrorValue {
            name: name.into(),
            message: message.into(),
        })
    }

    /// A symbol with an optional description.
    pub fn symbol(description: Option<&str>) -> Self {
        Self::Symbol(description.map(str::to_owned))
    }

    /// Returns `true` for `Undefined`.
    #[inline]
    #[must_use]
    pub fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// Returns `true` for `Null`.
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Returns `true` for `Array`.
    #[inline]
    #[must_use]
    pub fn is_array(&self) -> bool {
        matches!(self, Self::Array(_))
    }

    /// Returns `true` for `Object`.
    #[inline]
    #[must_use]
    pub fn is_object(&self) -> bool {
        matches!(self, Self::Object(_))
    }

    /// Returns `true` for non-null, non-array, non-function composites.
    ///
    /// These are the values a shape spec may be matched against.
    #[must_use]
    pub fn is_composite(&self) -> bool {
        matches!(
            self,
            Self::Object(_)
                | Self::Regex(_)
                | Self::Error(_)
                | Self::Promise
                | Self::Set(_)
                | Self::Map(_)
        )
    }

    /// Returns `true` for values without identity (everything but composites,
    /// arrays and functions).
    #[must_use]
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Self::Undefined
                | Self::Null
                | Self::Bool(_)
                | Self::Number(_)
                | Self::BigInt(_)
                | Self::String(_)
                | Self::Symbol(_)
        )
    }

    /// Falsiness: `undefined`, `null`, `false`, `0`, `-0`, `NaN`, `""` and `0n`.
    #[must_use]
    pub fn is_falsy(&self) -> bool {
        match self {
            Self::Undefined | Self::Null => true,
            Self::Bool(b) => !b,
            Self::Number(n) => *n == 0.0 || n.is_nan(),
            Self::BigInt(n) => *n == 0,
            Self::String(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Try to get the value as a string slice.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s.as_str()),
            _ => None,
        }
    }

    /// Try to get the value as a number.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Try to get the elements of an array.
    #[inline]
    #[must_use]
    pub fn as_array(&self) -> Option<&[Value]> {
        match self {
            Self::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Try to get the fields of an object.
    #[inline]
    #[must_use]
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Self::Object(o) => Some(o),
            _ => None,
        }
    }

    /// Look up an own field. Only `Object` values expose fields.
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&Value> {
        self.as_object().and_then(|o| o.fields.get(key))
    }

    /// Length of a string (in chars), array, set or map, or field count of a
    /// plain object. `None` for kinds without a notion of size.
    #[must_use]
    pub fn len(&self) -> Option<usize> {
        match self {
            Self::String(s) => Some(s.chars().count()),
            Self::Array(items) | Self::Set(items) => Some(items.len()),
            Self::Map(entries) => Some(entries.len()),
            Self::Object(o) if o.is_plain() => Some(o.fields.len()),
            _ => None,
        }
    }

    /// Returns a short name for this value's kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Undefined => "undefined",
            Self::Null => "null",
            Self::Bool(_) => "boolean",
            Self::Number(_) => "number",
            Self::BigInt(_) => "bigint",
            Self::String(_) => "string",
            Self::Symbol(_) => "symbol",
            Self::Array(_) => "array",
            Self::Object(_) => "object",
            Self::Function(_) => "function",
            Self::Regex(_) => "regexp",
            Self::Error(_) => "error",
            Self::Promise => "promise",
            Self::Set(_) => "set",
            Self::Map(_) => "map",
        }
    }

    /// Constructor name of a composite, as shown in diagnostics.
    ///
    /// Returns `None` for primitives, arrays and functions.
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        match self {
            Self::Object(o) => Some(o.class.as_deref().unwrap_or("Object")),
            Self::Regex(_) => Some("RegExp"),
            Self::Error(e) => Some(e.name.as_str()),
            Self::Promise => Some("Promise"),
            Self::Set(_) => Some("Set"),
            Self::Map(_) => Some("Map"),
            _ => None,
        }
    }
}

impl Object {
    /// `true` when the object has no class or the class is `Object`.
    #[must_use]
    pub fn is_plain(&self) -> bool {
        self.class.as_deref().map_or(true, |c| c == "Object")
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::render::render(self))
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Conversions
// ═══════════════════════════════════════════════════════════════════════════════

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<i64> for Value {
    #[allow(clippy::cast_precision_loss)] // numbers are doubles
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Self::String(s.to_owned())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Self::String(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Self::Array(items)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Self::Undefined, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Self {
        match json {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(b),
            serde_json::Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            serde_json::Value::String(s) => Self::String(s),
            serde_json::Value::Array(items) => {
                Self::Array(items.into_iter().map(Self::from).collect())
            }
            serde_json::Value::Object(map) => Self::Object(Object {
                class: None,
                fields: map.into_iter().map(|(k, v)| (k, Self::from(v))).collect(),
            }),
        }
    }
}

impl From<&serde_json::Value> for Value {
    fn from(json: &serde_json::Value) -> Self {
        Self::from(json.clone())
    }
}
