//! Spec matcher — the recursive walker shared by every dispatch mode.
//!
//! The walker interprets a [`TypeSpec`] against a [`Value`] and hands each
//! leaf outcome to an [`OutcomeHandler`]. The handler's answer steers the
//! traversal:
//!
//! - `Ok(true)` — keep going
//! - `Ok(false)` — stop the enclosing conjunction; the walk yields `false`
//! - `Err(_)` — abort the whole walk (assertions)
//!
//! # Outcomes
//!
//! One outcome is reported per leaf, per predicate, per `$any`/`$not`
//! aggregate, and per container rejected before recursion (a non-sequence
//! under a homogeneous or tuple spec, a tuple length mismatch, or a
//! non-composite under a shape).

use std::borrow::Cow;

use crate::spec::leaf_names;
use crate::{undot, GuardError, MatchOptions, Path, Registry, TypeSpec, Undot, Value};

static UNDEFINED: Value = Value::Undefined;

/// One evaluated test inside a walk.
#[derive(Debug, Clone, Copy)]
pub struct Outcome<'a> {
    /// Whether the test passed.
    pub pass: bool,
    /// The spec fragment that was tested; its `Display` is the type label.
    pub spec: &'a TypeSpec,
    /// The value it was tested against.
    pub value: &'a Value,
    /// Where the value sits inside the checked root.
    pub path: &'a Path,
}

/// Reacts to each [`Outcome`] of a walk.
///
/// Implementations decide what a failing outcome means: a boolean, an error,
/// or a warning. The returned flag is the continuation signal.
pub trait OutcomeHandler {
    /// Handle one outcome.
    ///
    /// # Errors
    ///
    /// Returning `Err` aborts the walk and propagates to the caller.
    fn report(&mut self, outcome: &Outcome<'_>) -> Result<bool, GuardError>;
}

impl<H: OutcomeHandler + ?Sized> OutcomeHandler for &mut H {
    fn report(&mut self, outcome: &Outcome<'_>) -> Result<bool, GuardError> {
        (**self).report(outcome)
    }
}

/// Silent boolean handler: the continuation signal is the pass flag.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct QueryHandler;

impl OutcomeHandler for QueryHandler {
    fn report(&mut self, outcome: &Outcome<'_>) -> Result<bool, GuardError> {
        Ok(outcome.pass)
    }
}

/// Recursive spec interpreter bound to one handler.
pub(crate) struct Walker<'a, H> {
    pub(crate) registry: &'a Registry,
    pub(crate) options: &'a MatchOptions,
    pub(crate) path: Path,
    /// Set below the first shape; `Shallow` undot does not split again there.
    pub(crate) expanded: bool,
    handler: &'a mut H,
}

impl<'a, H: OutcomeHandler> Walker<'a, H> {
    pub(crate) fn new(registry: &'a Registry, options: &'a MatchOptions, handler: &'a mut H) -> Self {
        Self {
            registry,
            options,
            path: Path::root(),
            expanded: false,
            handler,
        }
    }

    /// Match `value` against `spec` at the current path.
    pub(crate) fn walk(&mut self, spec: &TypeSpec, value: &Value) -> Result<bool, GuardError> {
        match spec {
            TypeSpec::Leaf(leaf) => {
                let pass = self.leaf(leaf, value)?;
                self.report(pass, spec, value)
            }
            TypeSpec::Homogeneous(inner) => self.walk_homogeneous(spec, inner, value),
            TypeSpec::Operator { op, operands } => self.apply_operator(spec, *op, operands, value),
            TypeSpec::Tuple(operands) => self.walk_tuple(spec, operands, value),
            TypeSpec::Shape(fields) => self.walk_shape(spec, fields, value),
            TypeSpec::Predicate(predicate) => {
                let pass = predicate.call(value);
                self.report(pass, spec, value)
            }
        }
    }

    pub(crate) fn report(
        &mut self,
        pass: bool,
        spec: &TypeSpec,
        value: &Value,
    ) -> Result<bool, GuardError> {
        self.handler.report(&Outcome {
            pass,
            spec,
            value,
            path: &self.path,
        })
    }

    /// A union passes if any named checker accepts the value.
    fn leaf(&self, leaf: &str, value: &Value) -> Result<bool, GuardError> {
        for name in leaf_names(leaf) {
            let checker = self
                .registry
                .lookup(name)
                .ok_or_else(|| self.registry.unknown(name))?;
            if checker(value) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn walk_homogeneous(
        &mut self,
        spec: &TypeSpec,
        inner: &TypeSpec,
        value: &Value,
    ) -> Result<bool, GuardError> {
        let Some(items) = value.as_array() else {
            return self.report(false, spec, value);
        };
        for (index, item) in items.iter().enumerate() {
            self.path.push_index(index);
            let pass = self.walk(inner, item);
            self.path.pop();
            if !pass? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn walk_shape(
        &mut self,
        spec: &TypeSpec,
        fields: &[(String, TypeSpec)],
        value: &Value,
    ) -> Result<bool, GuardError> {
        if !value.is_composite() {
            return self.report(false, spec, value);
        }
        let mode = match self.options.undot {
            Some(Undot::Shallow) if self.expanded => None,
            mode => mode,
        };
        let target: Cow<'_, Value> = undot(value, mode);
        let outer = std::mem::replace(&mut self.expanded, true);
        let pass = self.walk_fields(fields, &target);
        self.expanded = outer;
        pass
    }

    fn walk_fields(
        &mut self,
        fields: &[(String, TypeSpec)],
        target: &Value,
    ) -> Result<bool, GuardError> {
        for (key, field_spec) in fields {
            let field = target.field(key).unwrap_or(&UNDEFINED);
            self.path.push_key(key.as_str());
            let pass = self.walk(field_spec, field);
            self.path.pop();
            if !pass? {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
