//! End-to-end scenarios through the public API.
//!
//! Each test drives a realistic call site: a registry with custom checkers,
//! a host type with an embedded context, or a spec loaded from YAML.

use std::sync::Arc;

use serde_json::json;
use vouch_test::prelude::*;

fn spec(raw: serde_json::Value) -> TypeSpec {
    TypeSpec::parse(&raw).unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════════
// Union leaf against a boolean
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn union_rejects_boolean_in_every_mode() {
    let harness = Harness::new();
    let union = TypeSpec::leaf("string|number");
    let value = Value::Bool(true);

    assert!(!harness.query.is(&union, &value).unwrap());

    let err = harness.assert.is(&union, &value, "").unwrap_err();
    assert!(err
        .to_string()
        .contains("expected string|number but got [boolean true]"));

    assert!(!harness.check.is(&union, &value, "").unwrap());
    assert_eq!(
        harness.warnings(),
        ["Fixture: expected string|number but got [boolean true]"]
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// $any over custom checkers
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn any_passes_via_first_branch_without_naming_the_other() {
    let harness = Harness::new();
    let parity = spec(json!({ "$any": ["even", "odd"] }));

    harness.assert.is(&parity, &Value::from(4), "n").unwrap();
    assert!(harness.check.is(&parity, &Value::from(4), "n").unwrap());
    assert!(harness.sink.is_empty());

    let trace = harness.query.trace(&parity, &Value::from(4)).unwrap();
    assert!(trace.matched);
    assert!(trace.steps.iter().all(|s| !s.expected.contains("odd") || s.pass));
}

#[test]
fn any_failure_names_the_combinator_once() {
    let harness = Harness::new();
    let parity = spec(json!({ "$any": ["even", "odd"] }));

    assert!(!harness.check.is(&parity, &Value::from(1.5), "n").unwrap());
    let warnings = harness.warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(
        warnings[0],
        "Fixture: n expected $any(even, odd) but got [number 1.5]"
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Fail-fast shapes
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn assert_reports_first_declared_field_only() {
    let harness = Harness::new();
    let pair = spec(json!({ "a": "number", "b": "number" }));
    let err = harness
        .assert
        .is(&pair, &Value::from(json!({ "a": "x", "b": "y" })), "")
        .unwrap_err();

    let diag = err.diagnostic().unwrap();
    assert_eq!(diag.path.dotted(), "a");
    assert_eq!(diag.expected, "number");
    assert_eq!(diag.actual, "[string \"x\"]");
    assert!(!err.to_string().contains("\"y\""));
}

#[test]
fn negated_assert_raises_only_on_full_match() {
    let harness = Harness::new();
    let pair = spec(json!({ "a": "number", "b": "string" }));

    harness
        .assert
        .not(&pair, &Value::from(json!({ "a": 1, "b": 2 })), "row")
        .unwrap();

    let err = harness
        .assert
        .not(&pair, &Value::from(json!({ "a": 1, "b": "x" })), "row")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "Fixture: row expected not {a: number, b: string} but got [object Object]"
    );
}

// ═══════════════════════════════════════════════════════════════════════════════
// Configuration errors
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn config_errors_are_never_swallowed_by_check() {
    let harness = Harness::new();
    let bogus = TypeSpec::leaf("strng");

    let err = harness.check.is(&bogus, &Value::from("x"), "name").unwrap_err();
    assert!(matches!(err, GuardError::UnknownType { ref name, .. } if name == "strng"));
    assert!(harness.warnings().is_empty());
    assert_eq!(harness.errors().len(), 1);
    assert!(harness.errors()[0].starts_with("Fixture: unknown type \"strng\""));
}

#[test]
fn empty_list_spec_is_rejected_at_parse() {
    let err = TypeSpec::parse(&json!({ "items": [] })).unwrap_err();
    assert!(matches!(err, GuardError::EmptySpec { .. }));
    assert!(err.is_config_error());
}

// ═══════════════════════════════════════════════════════════════════════════════
// Host types
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn widgets_carry_their_own_prefix() {
    let sink = Arc::new(MemorySink::new());
    let installer = Widget::installer(Arc::clone(&sink));

    let mut knob = Widget::new(&installer, "knob", Value::from(4)).unwrap();
    let err = knob.resize(Value::from("big")).unwrap_err();
    assert_eq!(
        err.to_string(),
        "Widget(knob): size expected positive but got [string \"big\"]"
    );

    let dial = Widget::new(&installer, "dial", Value::Null).unwrap();
    assert!(!dial.size_ok());
    assert_eq!(
        sink.warnings(),
        ["Widget(dial): size expected positive but got [null]"]
    );
}

#[test]
fn contexts_are_shareable_across_threads() {
    let installer = Widget::installer(Arc::new(MemorySink::new()));
    let context = Arc::new(installer.class_context());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let context = Arc::clone(&context);
            std::thread::spawn(move || context.query.is_named("even", &Value::from(i)).unwrap())
        })
        .collect();
    let results: Vec<bool> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(results, [true, false, true, false]);
}

// ═══════════════════════════════════════════════════════════════════════════════
// Specs from YAML
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn spec_loaded_from_yaml() {
    let yaml = r#"
id: integer
email: "string|null"
roles: [{ $any: [admin, viewer] }]
"#;
    let registry = Arc::new(
        register(RegistryBuilder::with_defaults())
            .register("admin", |v| v.as_str() == Some("admin"))
            .register("viewer", |v| v.as_str() == Some("viewer"))
            .build(),
    );
    let user_spec: TypeSpec = serde_yaml::from_str(yaml).unwrap();
    let assert = Assert::new(registry).with_prefix(|| "User(7):".to_string());

    assert
        .is(&user_spec, &Value::from(json!({ "id": 7, "email": null, "roles": ["admin"] })), "user")
        .unwrap();

    let err = assert
        .is(&user_spec, &Value::from(json!({ "id": 7, "roles": ["root"] })), "user")
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "User(7): user.email expected string|null but got [undefined]"
    );
}
