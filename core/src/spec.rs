//! `TypeSpec` — parsed, immutable type specifications.
//!
//! Specs are written as plain nested data and parsed once into a sum type:
//!
//! ```json
//! "string|number"                        // Leaf (union)
//! ["string"]                             // Homogeneous
//! ["$any", "null", "string"]             // Operator, list form
//! { "$not": "null" }                     // Operator, single-key map form
//! { "$tuple": ["string", "number"] }     // Tuple
//! { "name": "string", "tags": ["string"] } // Shape
//! ```
//!
//! Predicates cannot be written as data; build them with
//! [`TypeSpec::predicate`].

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Deserializer};

use crate::render::render_function_name;
use crate::{GuardError, Operator, Path, Value};

/// Arbitrary value predicate used as a spec.
pub type PredicateFn = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

/// A predicate spec with an optional name for diagnostics.
#[derive(Clone)]
pub struct SpecPredicate {
    name: Option<String>,
    f: PredicateFn,
}

impl SpecPredicate {
    /// Name shown in diagnostics, if any.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Invoke the predicate.
    #[must_use]
    pub fn call(&self, value: &Value) -> bool {
        (self.f)(value)
    }
}

impl fmt::Debug for SpecPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SpecPredicate").field(&self.name).finish()
    }
}

/// A parsed type specification.
///
/// # Variants
///
/// - `Leaf` — registry name, or `|`-joined union of names
/// - `Homogeneous` — every element of a sequence matches the inner spec
/// - `Operator` — `$all` / `$any` / `$not` over operands
/// - `Tuple` — operand *i* matches element *i*
/// - `Shape` — declared fields match; undeclared fields are ignored
/// - `Predicate` — arbitrary function
#[derive(Clone)]
pub enum TypeSpec {
    /// Registry name or union of names.
    Leaf(String),

    /// Sequence whose every element matches the inner spec.
    Homogeneous(Box<TypeSpec>),

    /// Logical combinator.
    Operator {
        /// The combinator.
        op: Operator,
        /// Its operands, in declared order.
        operands: Vec<TypeSpec>,
    },

    /// Positional sequence match.
    Tuple(Vec<TypeSpec>),

    /// Open field shape, in declared order.
    Shape(Vec<(String, TypeSpec)>),

    /// Arbitrary predicate.
    Predicate(SpecPredicate),
}

impl TypeSpec {
    /// A leaf spec. `|` inside the name makes a union.
    pub fn leaf(name: impl Into<String>) -> Self {
        Self::Leaf(name.into())
    }

    /// A union leaf of several names.
    #[must_use]
    pub fn union(names: &[&str]) -> Self {
        Self::Leaf(names.join("|"))
    }

    /// A homogeneous sequence spec.
    #[must_use]
    pub fn array_of(inner: TypeSpec) -> Self {
        Self::Homogeneous(Box::new(inner))
    }

    /// An operator spec. `Operator::Tuple` builds a [`TypeSpec::Tuple`].
    #[must_use]
    pub fn operator(op: Operator, operands: Vec<TypeSpec>) -> Self {
        match op {
            Operator::Tuple => Self::Tuple(operands),
            op => Self::Operator { op, operands },
        }
    }

    /// `$all` over operands.
    #[must_use]
    pub fn all(operands: Vec<TypeSpec>) -> Self {
        Self::operator(Operator::All, operands)
    }

    /// `$any` over operands.
    #[must_use]
    pub fn any(operands: Vec<TypeSpec>) -> Self {
        Self::operator(Operator::Any, operands)
    }

    /// `$not` over operands.
    #[must_use]
    pub fn not(operands: Vec<TypeSpec>) -> Self {
        Self::operator(Operator::Not, operands)
    }

    /// `$tuple` over operands.
    #[must_use]
    pub fn tuple(operands: Vec<TypeSpec>) -> Self {
        Self::Tuple(operands)
    }

    /// A shape from `(field, spec)` pairs, in declared order.
    pub fn shape<K, I>(fields: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, TypeSpec)>,
    {
        Self::Shape(fields.into_iter().map(|(k, s)| (k.into(), s)).collect())
    }

    /// A named predicate spec.
    pub fn predicate<F>(name: impl Into<String>, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(SpecPredicate {
            name: Some(name.into()),
            f: Arc::new(f),
        })
    }

    /// An anonymous predicate spec.
    pub fn anonymous<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::Predicate(SpecPredicate {
            name: None,
            f: Arc::new(f),
        })
    }

    /// Parse a spec written as JSON data.
    ///
    /// # Errors
    ///
    /// - [`GuardError::EmptySpec`] — `[]` anywhere in the spec
    /// - [`GuardError::UnknownOperator`] — a list head or `$`-key that is not a keyword
    /// - [`GuardError::InvalidSpec`] — numbers, booleans, null or empty names
    pub fn parse(raw: &serde_json::Value) -> Result<Self, GuardError> {
        parse_at(raw, &mut Path::root())
    }

    /// Parse a spec from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::InvalidSpec`] for malformed JSON, otherwise the
    /// errors of [`parse`](Self::parse).
    pub fn from_json_str(json: &str) -> Result<Self, GuardError> {
        let raw: serde_json::Value =
            serde_json::from_str(json).map_err(|e| GuardError::InvalidSpec {
                at: Path::root(),
                reason: e.to_string(),
            })?;
        Self::parse(&raw)
    }

    /// Calculate the nesting depth of this spec.
    #[must_use]
    pub fn depth(&self) -> usize {
        match self {
            Self::Leaf(_) | Self::Predicate(_) => 1,
            Self::Homogeneous(inner) => 1 + inner.depth(),
            Self::Operator { operands, .. } | Self::Tuple(operands) => {
                1 + operands.iter().map(Self::depth).max().unwrap_or(0)
            }
            Self::Shape(fields) => 1 + fields.iter().map(|(_, s)| s.depth()).max().unwrap_or(0),
        }
    }

    /// Returns `true` if this is a `Leaf`.
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Self::Leaf(_))
    }

    /// Returns `true` if this is a `Shape`.
    #[must_use]
    pub fn is_shape(&self) -> bool {
        matches!(self, Self::Shape(_))
    }
}

/// The names joined in a union leaf.
pub(crate) fn leaf_names(leaf: &str) -> impl Iterator<Item = &str> {
    leaf.split('|').map(str::trim)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Parsing
// ═══════════════════════════════════════════════════════════════════════════════

fn parse_at(raw: &serde_json::Value, at: &mut Path) -> Result<TypeSpec, GuardError> {
    use serde_json::Value as J;

    match raw {
        J::String(name) => {
            if leaf_names(name).any(str::is_empty) {
                return Err(GuardError::InvalidSpec {
                    at: at.clone(),
                    reason: format!("empty type name in \"{name}\""),
                });
            }
            Ok(TypeSpec::Leaf(name.clone()))
        }
        J::Array(items) => match items.as_slice() {
            [] => Err(GuardError::EmptySpec { at: at.clone() }),
            [inner] => {
                at.push_index(0);
                let inner = parse_at(inner, at);
                at.pop();
                Ok(TypeSpec::array_of(inner?))
            }
            [head, rest @ ..] => {
                let op = match head {
                    J::String(keyword) => Operator::from_keyword(keyword),
                    _ => None,
                }
                .ok_or_else(|| GuardError::UnknownOperator {
                    keyword: head_label(head),
                    at: at.clone(),
                })?;
                let operands = parse_operands(rest, at, 1)?;
                Ok(TypeSpec::operator(op, operands))
            }
        },
        J::Object(map) => {
            if map.len() == 1 {
                if let Some((key, operands)) = map.iter().next() {
                    if key.starts_with('$') {
                        let op = Operator::from_keyword(key).ok_or_else(|| {
                            GuardError::UnknownOperator {
                                keyword: key.clone(),
                                at: at.clone(),
                            }
                        })?;
                        at.push_key(key.as_str());
                        let operands = match operands {
                            J::Array(items) => parse_operands(items, at, 0),
                            single => parse_at(single, at).map(|s| vec![s]),
                        };
                        at.pop();
                        return Ok(TypeSpec::operator(op, operands?));
                    }
                }
            }
            let mut fields = Vec::with_capacity(map.len());
            for (key, field) in map {
                at.push_key(key.as_str());
                let parsed = parse_at(field, at);
                at.pop();
                fields.push((key.clone(), parsed?));
            }
            Ok(TypeSpec::Shape(fields))
        }
        other => Err(GuardError::InvalidSpec {
            at: at.clone(),
            reason: format!("expected a type name, list or map, found {other}"),
        }),
    }
}

fn parse_operands(
    items: &[serde_json::Value],
    at: &mut Path,
    offset: usize,
) -> Result<Vec<TypeSpec>, GuardError> {
    let mut operands = Vec::with_capacity(items.len());
    for (i, item) in items.iter().enumerate() {
        at.push_index(i + offset);
        let parsed = parse_at(item, at);
        at.pop();
        operands.push(parsed?);
    }
    Ok(operands)
}

fn head_label(head: &serde_json::Value) -> String {
    match head {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl<'de> Deserialize<'de> for TypeSpec {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = serde_json::Value::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        Self::leaf(name)
    }
}

impl From<String> for TypeSpec {
    fn from(name: String) -> Self {
        Self::Leaf(name)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Labels
// ═══════════════════════════════════════════════════════════════════════════════

/// The label used as "expected type" in diagnostics.
impl fmt::Display for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(name) => f.write_str(name),
            Self::Homogeneous(inner) => write!(f, "[{inner}]"),
            Self::Operator { op, operands } => write_operands(f, op.keyword(), operands),
            Self::Tuple(operands) => write_operands(f, Operator::Tuple.keyword(), operands),
            Self::Shape(fields) => {
                f.write_str("{")?;
                for (i, (key, spec)) in fields.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key}: {spec}")?;
                }
                f.write_str("}")
            }
            Self::Predicate(p) => f.write_str(&render_function_name(p.name())),
        }
    }
}

fn write_operands(f: &mut fmt::Formatter<'_>, keyword: &str, operands: &[TypeSpec]) -> fmt::Result {
    write!(f, "{keyword}(")?;
    for (i, operand) in operands.iter().enumerate() {
        if i > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{operand}")?;
    }
    f.write_str(")")
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Leaf(name) => f.debug_tuple("Leaf").field(name).finish(),
            Self::Homogeneous(inner) => f.debug_tuple("Homogeneous").field(inner).finish(),
            Self::Operator { op, operands } => f
                .debug_struct("Operator")
                .field("op", op)
                .field("operands", operands)
                .finish(),
            Self::Tuple(operands) => f.debug_tuple("Tuple").field(operands).finish(),
            Self::Shape(fields) => f.debug_tuple("Shape").field(fields).finish(),
            Self::Predicate(p) => f.debug_tuple("Predicate").field(p).finish(),
        }
    }
}
