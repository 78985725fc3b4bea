//! Outcome dispatch — Query, Assert and Check over one walker.
//!
//! Every mode runs the same [`Walker`]; only the [`OutcomeHandler`] differs:
//!
//! | Mode | Failing leaf | Returns |
//! |------|--------------|---------|
//! | [`Query`] | nothing | `Ok(bool)` |
//! | [`Assert`] | `Err(GuardError::Assertion)`, walk aborted | `Ok(())` |
//! | [`Check`] | warning written to the sink, walk stops | `Ok(bool)` |
//!
//! Negated variants (`not`) evaluate the spec silently and invert the final
//! result once; a failure is labeled `not <spec>`.
//!
//! Configuration errors (unknown leaf names, excessive depth) are returned
//! as `Err` in every mode before the value is inspected.

use std::fmt;
use std::sync::Arc;

use crate::render::render;
use crate::trace::TraceHandler;
use crate::walker::{Outcome, OutcomeHandler, QueryHandler, Walker};
use crate::{
    Diagnostic, DiagnosticSink, GuardError, MatchOptions, MatchTrace, Path, Registry, TypeSpec,
    Value,
};

/// Produces the context prefix of a diagnostic, e.g. `"Account(42):"`.
///
/// Evaluated each time a diagnostic is built.
pub type PrefixFn = Arc<dyn Fn() -> String + Send + Sync>;

fn no_prefix() -> PrefixFn {
    Arc::new(String::new)
}

/// State shared by all modes: the registry and the match options.
#[derive(Clone)]
struct Core {
    registry: Arc<Registry>,
    options: MatchOptions,
}

impl Core {
    fn walk<H: OutcomeHandler>(
        &self,
        spec: &TypeSpec,
        value: &Value,
        handler: &mut H,
    ) -> Result<bool, GuardError> {
        self.registry.validate(spec)?;
        Walker::new(&self.registry, &self.options, handler).walk(spec, value)
    }

    fn query(&self, spec: &TypeSpec, value: &Value) -> Result<bool, GuardError> {
        self.walk(spec, value, &mut QueryHandler)
    }
}

fn failure(prefix: &PrefixFn, description: &str, outcome: &Outcome<'_>) -> Diagnostic {
    Diagnostic {
        prefix: prefix(),
        description: outcome.path.describe(description),
        expected: outcome.spec.to_string(),
        actual: render(outcome.value),
        path: outcome.path.clone(),
    }
}

fn negated_failure(prefix: &PrefixFn, description: &str, spec: &TypeSpec, value: &Value) -> Diagnostic {
    Diagnostic {
        prefix: prefix(),
        description: description.to_owned(),
        expected: format!("not {spec}"),
        actual: render(value),
        path: Path::root(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Handlers
// ═══════════════════════════════════════════════════════════════════════════════

/// Raises on the first failing outcome.
struct Raise<'a> {
    prefix: &'a PrefixFn,
    description: &'a str,
}

impl OutcomeHandler for Raise<'_> {
    fn report(&mut self, outcome: &Outcome<'_>) -> Result<bool, GuardError> {
        if outcome.pass {
            Ok(true)
        } else {
            Err(GuardError::Assertion(failure(
                self.prefix,
                self.description,
                outcome,
            )))
        }
    }
}

/// Writes failing outcomes to a sink; the pass flag is the continuation.
struct Warn<'a> {
    prefix: &'a PrefixFn,
    description: &'a str,
    sink: &'a dyn DiagnosticSink,
}

impl OutcomeHandler for Warn<'_> {
    fn report(&mut self, outcome: &Outcome<'_>) -> Result<bool, GuardError> {
        if !outcome.pass {
            let diagnostic = failure(self.prefix, self.description, outcome);
            self.sink.warn(&diagnostic.message());
        }
        Ok(outcome.pass)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Query
// ═══════════════════════════════════════════════════════════════════════════════

/// Silent boolean checks.
///
/// ```
/// use std::sync::Arc;
/// use vouch::{Query, Registry, TypeSpec, Value};
///
/// let query = Query::new(Arc::new(Registry::with_defaults()));
/// assert!(query.is(&TypeSpec::leaf("string|number"), &Value::from(1))?);
/// assert!(query.not_named("null", &Value::from(1))?);
/// # Ok::<(), vouch::GuardError>(())
/// ```
#[derive(Clone)]
pub struct Query {
    core: Core,
}

impl Query {
    /// A query dispatcher over `registry`.
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            core: Core {
                registry,
                options: MatchOptions::default(),
            },
        }
    }

    /// Replace the match options.
    #[must_use]
    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.core.options = options;
        self
    }

    /// The registry leaf names resolve against.
    #[must_use]
    pub fn registry(&self) -> &Registry {
        &self.core.registry
    }

    /// Does `value` match `spec`?
    ///
    /// # Errors
    ///
    /// Configuration errors only; a mismatch is `Ok(false)`.
    pub fn is(&self, spec: &TypeSpec, value: &Value) -> Result<bool, GuardError> {
        self.core.query(spec, value)
    }

    /// Does `value` fail to match `spec`?
    ///
    /// # Errors
    ///
    /// Configuration errors only.
    pub fn not(&self, spec: &TypeSpec, value: &Value) -> Result<bool, GuardError> {
        self.is(spec, value).map(|matched| !matched)
    }

    /// [`is`](Self::is) with the leaf spec `name`.
    ///
    /// # Errors
    ///
    /// [`GuardError::UnknownType`] if `name` is not registered.
    pub fn is_named(&self, name: &str, value: &Value) -> Result<bool, GuardError> {
        self.is(&TypeSpec::leaf(name), value)
    }

    /// [`not`](Self::not) with the leaf spec `name`.
    ///
    /// # Errors
    ///
    /// [`GuardError::UnknownType`] if `name` is not registered.
    pub fn not_named(&self, name: &str, value: &Value) -> Result<bool, GuardError> {
        self.not(&TypeSpec::leaf(name), value)
    }

    /// Evaluate with full trace for debugging.
    ///
    /// Unlike [`is()`](Self::is), conjunctions are not short-circuited: every
    /// reachable outcome is recorded. `matched` is still exact.
    ///
    /// # Errors
    ///
    /// Configuration errors only.
    pub fn trace(&self, spec: &TypeSpec, value: &Value) -> Result<MatchTrace, GuardError> {
        let matched = self.is(spec, value)?;
        let mut handler = TraceHandler::default();
        self.core.walk(spec, value, &mut handler)?;
        Ok(MatchTrace {
            matched,
            steps: handler.steps,
        })
    }
}

impl fmt::Debug for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("options", &self.core.options)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Assert
// ═══════════════════════════════════════════════════════════════════════════════

/// Fail-fast checks: the first failing leaf becomes an error.
///
/// ```
/// use std::sync::Arc;
/// use vouch::{Assert, Registry, TypeSpec, Value};
///
/// let assert = Assert::new(Arc::new(Registry::with_defaults()))
///     .with_prefix(|| "Config:".to_string());
///
/// let err = assert.is_named("number", &Value::from("80"), "port").unwrap_err();
/// assert_eq!(err.to_string(), "Config: port expected number but got [string \"80\"]");
/// ```
#[derive(Clone)]
pub struct Assert {
    core: Core,
    prefix: PrefixFn,
}

impl Assert {
    /// An assert dispatcher over `registry` with an empty prefix.
    #[must_use]
    pub fn new(registry: Arc<Registry>) -> Self {
        Self {
            core: Core {
                registry,
                options: MatchOptions::default(),
            },
            prefix: no_prefix(),
        }
    }

    /// Replace the match options.
    #[must_use]
    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.core.options = options;
        self
    }

    /// Set the prefix provider.
    #[must_use]
    pub fn with_prefix<F>(self, prefix: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.with_prefix_fn(Arc::new(prefix))
    }

    /// Set an already shared prefix provider.
    #[must_use]
    pub fn with_prefix_fn(mut self, prefix: PrefixFn) -> Self {
        self.prefix = prefix;
        self
    }

    /// The current prefix.
    #[must_use]
    pub fn prefix(&self) -> String {
        (self.prefix)()
    }

    /// Require `value` to match `spec`.
    ///
    /// `description` names the value in the message and is joined with the
    /// failing path: `"user"` + `tags.1` reads `user.tags.1`.
    ///
    /// # Errors
    ///
    /// - [`GuardError::Assertion`] for the first failing leaf
    /// - configuration errors for a malformed spec
    pub fn is(&self, spec: &TypeSpec, value: &Value, description: &str) -> Result<(), GuardError> {
        let mut handler = Raise {
            prefix: &self.prefix,
            description,
        };
        self.core.walk(spec, value, &mut handler).map(|_| ())
    }

    /// Require `value` NOT to match `spec`.
    ///
    /// # Errors
    ///
    /// - [`GuardError::Assertion`] labeled `not <spec>` if it matches
    /// - configuration errors for a malformed spec
    pub fn not(&self, spec: &TypeSpec, value: &Value, description: &str) -> Result<(), GuardError> {
        if self.core.query(spec, value)? {
            return Err(GuardError::Assertion(negated_failure(
                &self.prefix,
                description,
                spec,
                value,
            )));
        }
        Ok(())
    }

    /// [`is`](Self::is) with the leaf spec `name`.
    ///
    /// # Errors
    ///
    /// As [`is`](Self::is).
    pub fn is_named(&self, name: &str, value: &Value, description: &str) -> Result<(), GuardError> {
        self.is(&TypeSpec::leaf(name), value, description)
    }

    /// [`not`](Self::not) with the leaf spec `name`.
    ///
    /// # Errors
    ///
    /// As [`not`](Self::not).
    pub fn not_named(&self, name: &str, value: &Value, description: &str) -> Result<(), GuardError> {
        self.not(&TypeSpec::leaf(name), value, description)
    }
}

impl fmt::Debug for Assert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Assert")
            .field("prefix", &self.prefix())
            .field("options", &self.core.options)
            .finish_non_exhaustive()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Check
// ═══════════════════════════════════════════════════════════════════════════════

/// Non-fatal checks: failures are written to a [`DiagnosticSink`] and the
/// caller carries on.
///
/// ```
/// use std::sync::Arc;
/// use vouch::{Check, MemorySink, Registry, TypeSpec, Value};
///
/// let sink = Arc::new(MemorySink::new());
/// let check = Check::new(Arc::new(Registry::with_defaults()), sink.clone());
///
/// assert!(!check.is_named("string", &Value::Null, "name")?);
/// assert_eq!(sink.warnings(), ["name expected string but got [null]"]);
/// # Ok::<(), vouch::GuardError>(())
/// ```
#[derive(Clone)]
pub struct Check {
    core: Core,
    prefix: PrefixFn,
    sink: Arc<dyn DiagnosticSink>,
}

impl Check {
    /// A check dispatcher over `registry` writing to `sink`.
    #[must_use]
    pub fn new(registry: Arc<Registry>, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            core: Core {
                registry,
                options: MatchOptions::default(),
            },
            prefix: no_prefix(),
            sink,
        }
    }

    /// Replace the match options.
    #[must_use]
    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.core.options = options;
        self
    }

    /// Set the prefix provider.
    #[must_use]
    pub fn with_prefix<F>(self, prefix: F) -> Self
    where
        F: Fn() -> String + Send + Sync + 'static,
    {
        self.with_prefix_fn(Arc::new(prefix))
    }

    /// Set an already shared prefix provider.
    #[must_use]
    pub fn with_prefix_fn(mut self, prefix: PrefixFn) -> Self {
        self.prefix = prefix;
        self
    }

    /// The current prefix.
    #[must_use]
    pub fn prefix(&self) -> String {
        (self.prefix)()
    }

    /// Check that `value` matches `spec`, warning on the first failing leaf.
    ///
    /// # Errors
    ///
    /// Configuration errors, which are also written to the sink's error
    /// channel. A mismatch is `Ok(false)`.
    pub fn is(&self, spec: &TypeSpec, value: &Value, description: &str) -> Result<bool, GuardError> {
        let mut handler = Warn {
            prefix: &self.prefix,
            description,
            sink: self.sink.as_ref(),
        };
        let result = self.core.walk(spec, value, &mut handler);
        self.surface(result)
    }

    /// Check that `value` does NOT match `spec`.
    ///
    /// # Errors
    ///
    /// Configuration errors, also written to the sink's error channel.
    pub fn not(&self, spec: &TypeSpec, value: &Value, description: &str) -> Result<bool, GuardError> {
        let matched = self.surface(self.core.query(spec, value))?;
        if matched {
            let diagnostic = negated_failure(&self.prefix, description, spec, value);
            self.sink.warn(&diagnostic.message());
        }
        Ok(!matched)
    }

    /// [`is`](Self::is) with the leaf spec `name`.
    ///
    /// # Errors
    ///
    /// As [`is`](Self::is).
    pub fn is_named(&self, name: &str, value: &Value, description: &str) -> Result<bool, GuardError> {
        self.is(&TypeSpec::leaf(name), value, description)
    }

    /// [`not`](Self::not) with the leaf spec `name`.
    ///
    /// # Errors
    ///
    /// As [`not`](Self::not).
    pub fn not_named(&self, name: &str, value: &Value, description: &str) -> Result<bool, GuardError> {
        self.not(&TypeSpec::leaf(name), value, description)
    }

    /// Configuration errors are never swallowed: they go to the error channel
    /// and back to the caller.
    fn surface(&self, result: Result<bool, GuardError>) -> Result<bool, GuardError> {
        if let Err(err) = &result {
            let prefix = self.prefix();
            if prefix.is_empty() {
                self.sink.error(&err.to_string());
            } else {
                self.sink.error(&format!("{prefix} {err}"));
            }
        }
        result
    }
}

impl fmt::Debug for Check {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Check")
            .field("prefix", &self.prefix())
            .field("options", &self.core.options)
            .finish_non_exhaustive()
    }
}
