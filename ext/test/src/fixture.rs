//! Conformance test fixture runner
//!
//! Loads YAML fixtures and runs every case through all six entry points:
//! `Query::is`/`not`, `Assert::is`/`not` and `Check::is`/`not`. A case only
//! states whether the value matches; the runner derives what each mode must
//! do from that.
//!
//! ```yaml
//! name: union leaf
//! description: a union passes if any alternative does
//! spec: "string|number"
//! cases:
//!   - name: boolean is neither
//!     value: true
//!     expect: false
//!     message: "expected string|number but got [boolean true]"
//! ```
//!
//! A fixture with `error` instead expects every mode to reject the spec with
//! a configuration error whose message contains the given text.

use serde::Deserialize;
use vouch::prelude::*;

use crate::Harness;

/// A complete test fixture
#[derive(Debug, Deserialize)]
pub struct Fixture {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// The raw spec, parsed with [`TypeSpec::parse`].
    pub spec: serde_json::Value,
    #[serde(default)]
    pub options: MatchOptions,
    /// Expected configuration error substring.
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub cases: Vec<TestCase>,
}

/// Test case
#[derive(Debug, Deserialize)]
pub struct TestCase {
    pub name: String,
    #[serde(default)]
    pub value: serde_json::Value,
    /// Whether the value matches. Ignored by error fixtures.
    #[serde(default)]
    pub expect: bool,
    /// Substring of the assert/check message when `expect` is false.
    #[serde(default)]
    pub message: Option<String>,
    /// Dotted path of the failing leaf when `expect` is false.
    #[serde(default)]
    pub path: Option<String>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// Runner
// ═══════════════════════════════════════════════════════════════════════════════

/// Result of running a single test case
#[derive(Debug)]
pub struct CaseResult {
    pub case_name: String,
    /// One line per mode that disagreed with the case.
    pub mismatches: Vec<String>,
}

impl CaseResult {
    #[must_use]
    pub fn passed(&self) -> bool {
        self.mismatches.is_empty()
    }
}

impl Fixture {
    /// Parse a fixture from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Parse multiple fixtures from a YAML file with `---` separators
    pub fn from_yaml_multi(yaml: &str) -> Result<Vec<Self>, serde_yaml::Error> {
        let mut fixtures = Vec::new();
        for doc in serde_yaml::Deserializer::from_str(yaml) {
            fixtures.push(Self::deserialize(doc)?);
        }
        Ok(fixtures)
    }

    /// Run all test cases and return results
    pub fn run(&self) -> Vec<CaseResult> {
        match &self.error {
            Some(expected) => self.run_error_cases(expected),
            None => match TypeSpec::parse(&self.spec) {
                Ok(spec) => self
                    .cases
                    .iter()
                    .map(|case| self.run_case(&spec, case))
                    .collect(),
                Err(err) => vec![CaseResult {
                    case_name: "(parse)".into(),
                    mismatches: vec![format!("spec did not parse: {err}")],
                }],
            },
        }
    }

    /// Run all test cases and panic on first failure
    pub fn run_and_assert(&self) {
        let results = self.run();
        for result in results {
            assert!(
                result.passed(),
                "Fixture '{}' case '{}' failed:\n  {}",
                self.name,
                result.case_name,
                result.mismatches.join("\n  ")
            );
        }
    }

    fn run_case(&self, spec: &TypeSpec, case: &TestCase) -> CaseResult {
        let harness = Harness::with_options(self.options);
        let value = Value::from(&case.value);
        let expect = case.expect;
        let mut mismatches = Vec::new();
        let mut mismatch = |mode: &str, detail: String| mismatches.push(format!("{mode}: {detail}"));

        match harness.query.is(spec, &value) {
            Ok(actual) if actual == expect => {}
            other => mismatch("query.is", format!("expected Ok({expect}), got {other:?}")),
        }
        match harness.query.not(spec, &value) {
            Ok(actual) if actual != expect => {}
            other => mismatch("query.not", format!("expected Ok({}), got {other:?}", !expect)),
        }

        match (harness.assert.is(spec, &value, ""), expect) {
            (Ok(()), true) => {}
            (Err(GuardError::Assertion(diag)), false) => {
                if let Some(message) = &case.message {
                    let text = diag.message();
                    if !text.contains(message.as_str()) {
                        mismatch("assert.is", format!("message {text:?} lacks {message:?}"));
                    }
                }
                if let Some(path) = &case.path {
                    if diag.path.dotted() != *path {
                        mismatch("assert.is", format!("failed at {:?}, expected {path:?}", diag.path.dotted()));
                    }
                }
            }
            (other, _) => mismatch("assert.is", format!("unexpected {other:?}")),
        }
        match (harness.assert.not(spec, &value, ""), expect) {
            (Ok(()), false) => {}
            (Err(GuardError::Assertion(diag)), true) if diag.expected.starts_with("not ") => {}
            (other, _) => mismatch("assert.not", format!("unexpected {other:?}")),
        }

        match harness.check.is(spec, &value, "") {
            Ok(actual) if actual == expect => {}
            other => mismatch("check.is", format!("expected Ok({expect}), got {other:?}")),
        }
        let warnings = harness.warnings();
        if warnings.len() != usize::from(!expect) {
            mismatch("check.is", format!("expected {} warning(s), got {warnings:?}", usize::from(!expect)));
        } else if let (Some(message), Some(warning)) = (&case.message, warnings.first()) {
            if !warning.contains(message.as_str()) {
                mismatch("check.is", format!("warning {warning:?} lacks {message:?}"));
            }
        }
        harness.sink.clear();

        match harness.check.not(spec, &value, "") {
            Ok(actual) if actual != expect => {}
            other => mismatch("check.not", format!("expected Ok({}), got {other:?}", !expect)),
        }
        let warnings = harness.warnings();
        if warnings.len() != usize::from(expect) {
            mismatch("check.not", format!("expected {} warning(s), got {warnings:?}", usize::from(expect)));
        }

        CaseResult {
            case_name: case.name.clone(),
            mismatches,
        }
    }

    /// Every mode must return a configuration error. Parse errors count too:
    /// a spec can be malformed before any value is seen.
    fn run_error_cases(&self, expected: &str) -> Vec<CaseResult> {
        let spec = match TypeSpec::parse(&self.spec) {
            Ok(spec) => spec,
            Err(err) => {
                let mut mismatches = Vec::new();
                if !err.is_config_error() || !err.to_string().contains(expected) {
                    mismatches.push(format!("parse: {err} lacks {expected:?}"));
                }
                return vec![CaseResult {
                    case_name: "(parse)".into(),
                    mismatches,
                }];
            }
        };

        let values: Vec<(String, Value)> = if self.cases.is_empty() {
            vec![("(null)".into(), Value::Null)]
        } else {
            self.cases
                .iter()
                .map(|case| (case.name.clone(), Value::from(&case.value)))
                .collect()
        };

        values
            .into_iter()
            .map(|(case_name, value)| {
                let harness = Harness::with_options(self.options);
                let outcomes = [
                    ("query.is", harness.query.is(&spec, &value).map(|_| ())),
                    ("query.not", harness.query.not(&spec, &value).map(|_| ())),
                    ("assert.is", harness.assert.is(&spec, &value, "")),
                    ("assert.not", harness.assert.not(&spec, &value, "")),
                    ("check.is", harness.check.is(&spec, &value, "").map(|_| ())),
                    ("check.not", harness.check.not(&spec, &value, "").map(|_| ())),
                ];
                let mut mismatches: Vec<String> = outcomes
                    .into_iter()
                    .filter_map(|(mode, outcome)| match outcome {
                        Err(err) if err.is_config_error() && err.to_string().contains(expected) => None,
                        other => Some(format!("{mode}: expected error containing {expected:?}, got {other:?}")),
                    })
                    .collect();
                if harness.errors().len() != 2 {
                    mismatches.push(format!("check: expected 2 sink errors, got {:?}", harness.errors()));
                }
                if !harness.warnings().is_empty() {
                    mismatches.push(format!("check: unexpected warnings {:?}", harness.warnings()));
                }
                CaseResult {
                    case_name,
                    mismatches,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_fixture() {
        let fixture = Fixture::from_yaml(
            r#"
name: minimal
spec: number
cases:
  - name: one
    value: 1
    expect: true
"#,
        )
        .unwrap();
        assert_eq!(fixture.cases.len(), 1);
        assert!(fixture.error.is_none());
        assert!(fixture.run().iter().all(CaseResult::passed));
    }

    #[test]
    fn wrong_expectation_is_reported_per_mode() {
        let fixture = Fixture::from_yaml(
            r#"
name: wrong
spec: string
cases:
  - name: lies
    value: 1
    expect: true
"#,
        )
        .unwrap();
        let results = fixture.run();
        assert!(!results[0].passed());
        assert!(results[0].mismatches.iter().any(|m| m.starts_with("query.is")));
        assert!(results[0].mismatches.iter().any(|m| m.starts_with("assert.is")));
    }

    #[test]
    fn error_fixture_accepts_parse_errors() {
        let fixture = Fixture::from_yaml(
            r#"
name: empty
spec: []
error: empty type spec
"#,
        )
        .unwrap();
        assert!(fixture.run().iter().all(CaseResult::passed));
    }

    #[test]
    fn options_are_deserialized() {
        let fixture = Fixture::from_yaml(
            r#"
name: undot
spec: { a: { b: number } }
options: { undot: shallow }
cases:
  - name: flat
    value: { "a.b": 1 }
    expect: true
"#,
        )
        .unwrap();
        assert_eq!(fixture.options.undot, Some(Undot::Shallow));
        assert!(fixture.run().iter().all(CaseResult::passed));
    }
}
