//! Operator set — logical combinators over sub-specs.
//!
//! Keywords are recognized once, at parse time. Each canonical operator has
//! aliases:
//!
//! | Operator | Keywords |
//! |----------|----------|
//! | [`Operator::All`] | `$all`, `$every`, `$and` |
//! | [`Operator::Any`] | `$any`, `$some`, `$or` |
//! | [`Operator::Not`] | `$not` |
//! | [`Operator::Tuple`] | `$tuple` |

use std::fmt;

use crate::walker::{QueryHandler, Walker};
use crate::{GuardError, OutcomeHandler, TypeSpec, Value};

/// A logical combinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// Every operand must match the same value.
    All,
    /// At least one operand must match. Operands are probed silently.
    Any,
    /// No operand may match. Operands are probed silently.
    Not,
    /// Operand *i* matches element *i* of a sequence of equal length.
    Tuple,
}

impl Operator {
    /// Every recognized keyword, aliases included.
    pub const KEYWORDS: &'static [&'static str] = &[
        "$all", "$every", "$and", "$any", "$some", "$or", "$not", "$tuple",
    ];

    /// Resolve a keyword (with its `$` sigil) to an operator.
    ///
    /// ```
    /// use vouch::Operator;
    ///
    /// assert_eq!(Operator::from_keyword("$or"), Some(Operator::Any));
    /// assert_eq!(Operator::from_keyword("or"), None);
    /// ```
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "$all" | "$every" | "$and" => Some(Self::All),
            "$any" | "$some" | "$or" => Some(Self::Any),
            "$not" => Some(Self::Not),
            "$tuple" => Some(Self::Tuple),
            _ => None,
        }
    }

    /// Canonical keyword.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::All => "$all",
            Self::Any => "$any",
            Self::Not => "$not",
            Self::Tuple => "$tuple",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// Evaluation
// ═══════════════════════════════════════════════════════════════════════════════

impl<H: OutcomeHandler> Walker<'_, H> {
    /// Apply `op` to `operands` against one value at the current path.
    ///
    /// `spec` is the whole operator spec; it labels aggregate outcomes.
    pub(crate) fn apply_operator(
        &mut self,
        spec: &TypeSpec,
        op: Operator,
        operands: &[TypeSpec],
        value: &Value,
    ) -> Result<bool, GuardError> {
        match op {
            Operator::All => {
                for operand in operands {
                    if !self.walk(operand, value)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            Operator::Any => {
                let mut pass = false;
                for operand in operands {
                    if self.probe(operand, value)? {
                        pass = true;
                        break;
                    }
                }
                self.report(pass, spec, value)
            }
            Operator::Not => {
                let mut pass = true;
                for operand in operands {
                    if self.probe(operand, value)? {
                        pass = false;
                        break;
                    }
                }
                self.report(pass, spec, value)
            }
            Operator::Tuple => self.walk_tuple(spec, operands, value),
        }
    }

    /// Positional match of `operands` against a sequence of the same length.
    pub(crate) fn walk_tuple(
        &mut self,
        spec: &TypeSpec,
        operands: &[TypeSpec],
        value: &Value,
    ) -> Result<bool, GuardError> {
        let items = match value.as_array() {
            Some(items) if items.len() == operands.len() => items,
            _ => return self.report(false, spec, value),
        };
        for (index, (operand, item)) in operands.iter().zip(items).enumerate() {
            self.path.push_index(index);
            let pass = self.walk(operand, item);
            self.path.pop();
            if !pass? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Evaluate a sub-spec as a silent boolean: no outcome reaches this
    /// walker's handler.
    fn probe(&self, spec: &TypeSpec, value: &Value) -> Result<bool, GuardError> {
        let mut quiet = QueryHandler;
        let mut walker = Walker::new(self.registry, self.options, &mut quiet);
        walker.path = self.path.clone();
        walker.expanded = self.expanded;
        walker.walk(spec, value)
    }
}
