//! Evaluation trace types for debugging spec behavior.
//!
//! [`Query::trace`](crate::Query::trace) walks a spec with a handler that
//! records every outcome and never stops early, so a trace shows all
//! failing fields at once. `matched` is computed by a regular query and is
//! always what [`Query::is`](crate::Query::is) would return.
//!
//! # Example
//!
//! ```ignore
//! let trace = query.trace(&spec, &value)?;
//! for step in trace.failures() {
//!     println!("{}: expected {} but got {}", step.path, step.expected, step.actual);
//! }
//! ```

use crate::render::render;
use crate::walker::{Outcome, OutcomeHandler};
use crate::{GuardError, Path};

/// One recorded outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceStep {
    /// Whether the test passed.
    pub pass: bool,
    /// The type label of the tested spec fragment.
    pub expected: String,
    /// The rendered value.
    pub actual: String,
    /// Where the value sits.
    pub path: Path,
}

/// Trace of a full walk.
///
/// # INV: `matched` == `Query::is()` result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchTrace {
    /// The final result.
    pub matched: bool,
    /// Every outcome, in traversal order. Conjunctions are not
    /// short-circuited, so this lists every failing leaf.
    pub steps: Vec<TraceStep>,
}

impl MatchTrace {
    /// The failing steps.
    pub fn failures(&self) -> impl Iterator<Item = &TraceStep> {
        self.steps.iter().filter(|s| !s.pass)
    }
}

/// Records outcomes and always continues.
#[derive(Debug, Default)]
pub(crate) struct TraceHandler {
    pub(crate) steps: Vec<TraceStep>,
}

impl OutcomeHandler for TraceHandler {
    fn report(&mut self, outcome: &Outcome<'_>) -> Result<bool, GuardError> {
        self.steps.push(TraceStep {
            pass: outcome.pass,
            expected: outcome.spec.to_string(),
            actual: render(outcome.value),
            path: outcome.path.clone(),
        });
        Ok(true)
    }
}
