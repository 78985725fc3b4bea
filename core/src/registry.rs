//! Checker registry — named leaf predicates.
//!
//! Leaf specs such as `"string"` or `"nonEmptyArray"` resolve to a [`Checker`]
//! by name. Callers extend the defaults with their own table; on a name
//! collision the entry merged last wins.
//!
//! # Immutability after build
//!
//! Merging happens in [`RegistryBuilder`], in call order. A built
//! [`Registry`] is a plain map: lookup has no fallback chain and nothing can
//! be registered while checks are in flight.
//!
//! # Example
//!
//! ```
//! use vouch::{Registry, RegistryBuilder, Value};
//!
//! let registry = RegistryBuilder::with_defaults()
//!     .register("even", |v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0))
//!     .build();
//!
//! assert_eq!(registry.check("even", &Value::from(4)), Some(true));
//! assert_eq!(registry.check("string", &Value::from("x")), Some(true));
//! assert_eq!(registry.check("missing", &Value::Null), None);
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::spec::leaf_names;
use crate::{GuardError, TypeSpec, Value, MAX_SPEC_DEPTH};

/// A named leaf predicate. Must be total and side-effect free.
pub type Checker = Arc<dyn Fn(&Value) -> bool + Send + Sync>;

// ═══════════════════════════════════════════════════════════════════════════════
// Builder
// ═══════════════════════════════════════════════════════════════════════════════

/// Builder for constructing a [`Registry`].
#[derive(Default)]
pub struct RegistryBuilder {
    checkers: HashMap<String, Checker>,
}

impl RegistryBuilder {
    /// Create a new empty registry builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder pre-filled with the default checkers.
    ///
    /// See [`register_defaults`](crate::register_defaults) for the list.
    #[must_use]
    pub fn with_defaults() -> Self {
        crate::register_defaults(Self::new())
    }

    /// Install a checker under `name`, replacing any earlier entry.
    #[must_use]
    pub fn register<F>(self, name: &str, checker: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        self.register_checker(name, Arc::new(checker))
    }

    /// Install an already shared checker under `name`, replacing any earlier entry.
    #[must_use]
    pub fn register_checker(mut self, name: &str, checker: Checker) -> Self {
        self.checkers.insert(name.to_owned(), checker);
        self
    }

    /// Merge a caller table over the current entries, in iteration order.
    #[must_use]
    pub fn extend<K, I>(mut self, table: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Checker)>,
    {
        for (name, checker) in table {
            self.checkers.insert(name.into(), checker);
        }
        self
    }

    /// Freeze the registry. No further registration is possible.
    #[must_use]
    pub fn build(self) -> Registry {
        tracing::debug!(checkers = self.checkers.len(), "type registry built");
        Registry {
            checkers: self.checkers,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Registry
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable map from leaf name to [`Checker`].
pub struct Registry {
    checkers: HashMap<String, Checker>,
}

impl Registry {
    /// Start a new empty builder.
    #[must_use]
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// A registry holding exactly the default checkers.
    #[must_use]
    pub fn with_defaults() -> Self {
        RegistryBuilder::with_defaults().build()
    }

    /// Look up a checker by name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<&Checker> {
        self.checkers.get(name)
    }

    /// Run the checker `name` on `value`; `None` if the name is unknown.
    #[must_use]
    pub fn check(&self, name: &str, value: &Value) -> Option<bool> {
        self.lookup(name).map(|checker| checker(value))
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.checkers.contains_key(name)
    }

    /// Returns the number of registered checkers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.checkers.len()
    }

    /// Returns `true` if no checkers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.checkers.is_empty()
    }

    /// Returns the registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.checkers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Verify every leaf name in `spec` is registered and the spec is not
    /// nested deeper than [`MAX_SPEC_DEPTH`].
    ///
    /// Runs before each dispatch, so the outcome never depends on the value.
    ///
    /// # Errors
    ///
    /// - [`GuardError::UnknownType`] — a leaf names an unregistered checker
    /// - [`GuardError::DepthExceeded`] — the spec is too deeply nested
    pub fn validate(&self, spec: &TypeSpec) -> Result<(), GuardError> {
        let depth = spec.depth();
        if depth > MAX_SPEC_DEPTH {
            return Err(GuardError::DepthExceeded {
                depth,
                max: MAX_SPEC_DEPTH,
            });
        }
        self.validate_names(spec)
    }

    fn validate_names(&self, spec: &TypeSpec) -> Result<(), GuardError> {
        match spec {
            TypeSpec::Leaf(leaf) => {
                for name in leaf_names(leaf) {
                    if !self.contains(name) {
                        return Err(self.unknown(name));
                    }
                }
                Ok(())
            }
            TypeSpec::Homogeneous(inner) => self.validate_names(inner),
            TypeSpec::Operator { operands, .. } | TypeSpec::Tuple(operands) => {
                operands.iter().try_for_each(|s| self.validate_names(s))
            }
            TypeSpec::Shape(fields) => fields.iter().try_for_each(|(_, s)| self.validate_names(s)),
            TypeSpec::Predicate(_) => Ok(()),
        }
    }

    pub(crate) fn unknown(&self, name: &str) -> GuardError {
        GuardError::UnknownType {
            name: name.to_owned(),
            available: self.names().into_iter().map(str::to_owned).collect(),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("names", &self.names())
            .finish()
    }
}
