//! vouch - runtime type-spec matching for dynamic values
//!
//! Declare what a value should look like as plain nested data, then query,
//! assert or check it. One recursive walker interprets every spec; the three
//! dispatch modes differ only in how they react to a failing leaf.
//!
//! # Architecture
//!
//! - [`Value`] — Erased data under test (primitives, sequences, composites)
//! - [`TypeSpec`] — Parsed spec: leaf, homogeneous list, operator, tuple, shape, predicate
//! - [`Registry`] — Named leaf checkers (`string`, `number`, `plainObject`, ...)
//! - [`OutcomeHandler`] — Reacts to each leaf outcome: continue, stop, or raise
//! - [`Query`] / [`Assert`] / [`Check`] — The three dispatch modes
//! - [`Installer`] / [`ValidationContext`] — Prefixed dispatchers for a host type
//!
//! # Key Design Insights
//!
//! 1. **Parse once**: operator keywords and single-key maps are recognized when the
//!    spec is built, never re-sniffed during matching.
//!
//! 2. **Configuration errors are not validation failures**: `[]`, unknown operators
//!    and unknown leaf names surface as `Err` in every mode, before the value is
//!    looked at.
//!
//! 3. **Alternatives stay quiet**: `$any` and `$not` probe their operands silently
//!    and report only the aggregate.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use vouch::prelude::*;
//!
//! let registry = Arc::new(Registry::with_defaults());
//! let query = Query::new(Arc::clone(&registry));
//!
//! let spec = TypeSpec::parse(&serde_json::json!({
//!     "name": "string",
//!     "tags": ["string"],
//! }))?;
//!
//! let user = Value::from(serde_json::json!({ "name": "alice", "tags": ["admin"] }));
//! assert!(query.is(&spec, &user)?);
//!
//! let assert = Assert::new(registry).with_prefix(|| "User:".to_string());
//! let err = assert
//!     .is(&TypeSpec::leaf("string|number"), &Value::Bool(true), "id")
//!     .unwrap_err();
//! assert_eq!(
//!     err.to_string(),
//!     "User: id expected string|number but got [boolean true]"
//! );
//! # Ok::<(), vouch::GuardError>(())
//! ```

// ═══════════════════════════════════════════════════════════════════════════════
// Modules
// ═══════════════════════════════════════════════════════════════════════════════

mod checkers;
mod context;
mod dispatch;
mod operator;
mod path;
mod registry;
mod render;
mod sink;
mod spec;
mod trace;
mod undot;
mod value;
mod walker;


// ═══════════════════════════════════════════════════════════════════════════════
// Public API
// ═══════════════════════════════════════════════════════════════════════════════

// Data
pub use path::{Path, PathSegment};
pub use value::{ErrorValue, Function, Object, Value};

// Specs
pub use operator::Operator;
pub use spec::{PredicateFn, SpecPredicate, TypeSpec};

// Registry
pub use checkers::register_defaults;
pub use registry::{Checker, Registry, RegistryBuilder};

// Matching
pub use undot::{undot, MatchOptions, Undot};
pub use walker::{Outcome, OutcomeHandler};

// Dispatch
pub use context::{ContextConfig, InstanceLabelFn, Installer, Scope, ValidationContext};
pub use dispatch::{Assert, Check, PrefixFn, Query};
pub use sink::{DiagnosticSink, Level, MemorySink, SinkLine, TracingSink};
pub use trace::{MatchTrace, TraceStep};

// Diagnostics
pub use render::{format_expected, render, MAX_STRING_PREVIEW};

// ═══════════════════════════════════════════════════════════════════════════════
// Prelude
// ═══════════════════════════════════════════════════════════════════════════════

/// Prelude module for convenient imports.
///
/// ```
/// use vouch::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Dispatch
        Assert,
        Check,
        // Context
        ContextConfig,
        // Diagnostics
        Diagnostic,
        DiagnosticSink,
        // Errors
        GuardError,
        Installer,
        MatchOptions,
        MemorySink,
        Query,
        // Registry
        Registry,
        RegistryBuilder,
        TracingSink,
        // Specs
        TypeSpec,
        Undot,
        ValidationContext,
        // Data
        Value,
    };
}

// ═══════════════════════════════════════════════════════════════════════════════
// Constants
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum allowed nesting depth of a [`TypeSpec`].
///
/// Checked by the validation pass that runs before every dispatch, so a
/// runaway spec is rejected before the walker recurses into it.
pub const MAX_SPEC_DEPTH: usize = 64;

// ═══════════════════════════════════════════════════════════════════════════════
// Errors
// ═══════════════════════════════════════════════════════════════════════════════

/// A failed expectation, ready to be shown to a human.
///
/// Carried by [`GuardError::Assertion`] and written to the sink by [`Check`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Context prefix, e.g. `"Account(42):"`. May be empty.
    pub prefix: String,
    /// Caller description joined with the failing path, dotted. May be empty.
    pub description: String,
    /// The expected type label, e.g. `"string|number"` or `"not null"`.
    pub expected: String,
    /// The rendered offending value, e.g. `"[boolean true]"`.
    pub actual: String,
    /// Location of the failing leaf inside the checked value.
    pub path: Path,
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message())
    }
}

/// Errors raised by spec parsing and dispatch.
///
/// Everything except [`GuardError::Assertion`] is a configuration error: the
/// spec itself is malformed, independent of any checked value. Configuration
/// errors are returned in every dispatch mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GuardError {
    /// The spec `[]` names no element type.
    #[error("empty type spec `[]` at {at} — use `[\"any\"]` for a list of anything")]
    EmptySpec {
        /// Where the empty list sits inside the spec.
        at: Path,
    },

    /// An operator position holds something that is not a known keyword.
    #[error(
        "unknown operator \"{keyword}\" at {at} — known operators: {}",
        Operator::KEYWORDS.join(", ")
    )]
    UnknownOperator {
        /// The offending keyword (or a rendering of the non-string head).
        keyword: String,
        /// Where the operator sits inside the spec.
        at: Path,
    },

    /// A leaf names a checker the registry does not have.
    #[error("unknown type \"{name}\"{}", available_suffix(.available))]
    UnknownType {
        /// The unregistered name.
        name: String,
        /// Names that ARE registered (for self-correcting error messages).
        available: Vec<String>,
    },

    /// The spec contains a fragment that is not a spec at all.
    #[error("invalid type spec at {at}: {reason}")]
    InvalidSpec {
        /// Where the fragment sits inside the spec.
        at: Path,
        /// What was wrong with it.
        reason: String,
    },

    /// Spec nesting exceeds [`MAX_SPEC_DEPTH`].
    #[error("type spec nesting depth is {depth}, but maximum allowed is {max}")]
    DepthExceeded {
        /// Actual depth.
        depth: usize,
        /// Maximum allowed depth.
        max: usize,
    },

    /// A value failed an assertion.
    #[error("{0}")]
    Assertion(Diagnostic),
}

fn available_suffix(available: &[String]) -> String {
    if available.is_empty() {
        " — no types are registered".to_owned()
    } else {
        format!(" — registered: {}", available.join(", "))
    }
}

impl GuardError {
    /// `true` for errors caused by a malformed spec rather than a bad value.
    #[must_use]
    pub fn is_config_error(&self) -> bool {
        !matches!(self, Self::Assertion(_))
    }

    /// The diagnostic of a failed assertion.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&Diagnostic> {
        match self {
            Self::Assertion(d) => Some(d),
            _ => None,
        }
    }
}
