//! vouch-test: Test domain for conformance testing
//!
//! Provides a numeric test registry, a capturing [`Harness`] and a small host
//! type, [`Widget`], that embeds a [`ValidationContext`] the way an
//! application type would.
//!
//! # Example
//!
//! ```
//! use vouch_test::prelude::*;
//!
//! let harness = Harness::new();
//! assert!(harness.query.is_named("even", &Value::from(4)).unwrap());
//!
//! assert!(!harness.check.is_named("odd", &Value::from(4), "n").unwrap());
//! assert_eq!(harness.warnings(), ["Fixture: n expected odd but got [number 4]"]);
//! ```

use std::sync::Arc;

use vouch::prelude::*;

#[cfg(feature = "fixtures")]
pub mod fixture;

/// Prefix carried by every [`Harness`] diagnostic.
pub const HARNESS_PREFIX: &str = "Fixture:";

/// Register the test-domain checkers over the defaults:
/// - `even` / `odd`: integral numbers by parity
/// - `positive`: numbers greater than zero
#[must_use]
pub fn register(builder: RegistryBuilder) -> RegistryBuilder {
    builder
        .register("even", |v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0))
        .register("odd", |v| v.as_f64().is_some_and(|n| n.abs() % 2.0 == 1.0))
        .register("positive", |v| v.as_f64().is_some_and(|n| n > 0.0))
}

/// The default registry plus the test-domain checkers.
#[must_use]
pub fn test_registry() -> Arc<Registry> {
    Arc::new(register(RegistryBuilder::with_defaults()).build())
}

/// All three dispatchers over [`test_registry()`], with check output
/// captured in memory.
#[derive(Debug, Clone)]
pub struct Harness {
    /// Receives every check diagnostic.
    pub sink: Arc<MemorySink>,
    /// Silent boolean checks.
    pub query: Query,
    /// Fail-fast checks, prefixed with [`HARNESS_PREFIX`].
    pub assert: Assert,
    /// Warning checks writing to [`sink`](Self::sink).
    pub check: Check,
}

impl Harness {
    /// A harness with default match options.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(MatchOptions::default())
    }

    /// A harness with the given match options.
    #[must_use]
    pub fn with_options(options: MatchOptions) -> Self {
        let registry = test_registry();
        let sink = Arc::new(MemorySink::new());
        let prefix = || HARNESS_PREFIX.to_string();
        Self {
            query: Query::new(Arc::clone(&registry)).with_options(options),
            assert: Assert::new(Arc::clone(&registry))
                .with_options(options)
                .with_prefix(prefix),
            check: Check::new(registry, sink.clone())
                .with_options(options)
                .with_prefix(prefix),
            sink,
        }
    }

    /// Warnings captured so far.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.sink.warnings()
    }

    /// Errors captured so far.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.sink.errors()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// A host type that validates its own inputs.
///
/// Diagnostics are prefixed `Widget(<name>):`.
#[derive(Debug)]
pub struct Widget {
    name: String,
    size: Value,
    size_ok: bool,
    guard: ValidationContext,
}

impl Widget {
    /// The installer shared by all widgets writing to `sink`.
    #[must_use]
    pub fn installer(sink: Arc<MemorySink>) -> Installer<Widget> {
        Installer::new(
            ContextConfig::new("Widget")
                .with_instance_label(|w: &Widget| (!w.name.is_empty()).then(|| w.name.clone())),
        )
        .with_registry(test_registry())
        .with_sink(sink)
    }

    /// Create a widget; the size is checked, not enforced. A rejected size
    /// is logged and remembered in [`size_ok`](Self::size_ok).
    ///
    /// # Errors
    ///
    /// A configuration error if the installer's registry lacks `positive`.
    pub fn new(installer: &Installer<Widget>, name: &str, size: Value) -> Result<Self, GuardError> {
        let mut widget = Self {
            name: name.to_owned(),
            size,
            size_ok: false,
            guard: installer.class_context(),
        };
        widget.guard = installer.instance_context(&widget);
        widget.size_ok = widget.guard.check.is_named("positive", &widget.size, "size")?;
        Ok(widget)
    }

    /// Resize, refusing anything but a positive even number.
    ///
    /// # Errors
    ///
    /// [`GuardError::Assertion`] if `size` is rejected.
    pub fn resize(&mut self, size: Value) -> Result<(), GuardError> {
        self.guard
            .assert
            .is(&TypeSpec::all(vec!["positive".into(), "even".into()]), &size, "size")?;
        self.size = size;
        self.size_ok = true;
        Ok(())
    }

    /// The widget name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The current size.
    #[must_use]
    pub fn size(&self) -> &Value {
        &self.size
    }

    /// Whether the current size passed its checks.
    #[must_use]
    pub fn size_ok(&self) -> bool {
        self.size_ok
    }

    /// The widget's dispatchers.
    #[must_use]
    pub fn guard(&self) -> &ValidationContext {
        &self.guard
    }
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use super::{register, test_registry, Harness, Widget, HARNESS_PREFIX};
    pub use vouch::prelude::*;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_extends_defaults() {
        let registry = test_registry();
        assert!(registry.contains("string"));
        assert!(registry.contains("even"));
        assert_eq!(registry.check("odd", &Value::from(-3)), Some(true));
        assert_eq!(registry.check("positive", &Value::from(0)), Some(false));
    }

    #[test]
    fn harness_captures_check_output() {
        let harness = Harness::new();
        assert!(!harness.check.is_named("string", &Value::Null, "name").unwrap());
        assert_eq!(harness.warnings(), ["Fixture: name expected string but got [null]"]);
        assert!(harness.errors().is_empty());
    }

    #[test]
    fn widget_warns_on_construction() {
        let sink = Arc::new(MemorySink::new());
        let installer = Widget::installer(Arc::clone(&sink));
        let ok = Widget::new(&installer, "knob", Value::from(2)).unwrap();
        let bad = Widget::new(&installer, "dial", Value::from(-1)).unwrap();
        assert_eq!(ok.size(), &Value::from(2));
        assert!(ok.size_ok());
        assert_eq!(bad.name(), "dial");
        assert!(!bad.size_ok());
        assert_eq!(
            sink.warnings(),
            ["Widget(dial): size expected positive but got [number -1]"]
        );
    }

    #[test]
    fn widget_resize_is_guarded() {
        let installer = Widget::installer(Arc::new(MemorySink::new()));
        let mut widget = Widget::new(&installer, "", Value::from(2)).unwrap();
        assert_eq!(widget.guard().prefix(), "Widget:");

        widget.resize(Value::from(8)).unwrap();
        let err = widget.resize(Value::from(3)).unwrap_err();
        assert_eq!(err.to_string(), "Widget: size expected even but got [number 3]");
        assert_eq!(widget.size(), &Value::from(8));
    }

    #[test]
    fn widget_surfaces_config_errors() {
        let sink = Arc::new(MemorySink::new());
        let installer = Widget::installer(Arc::clone(&sink))
            .with_registry(Arc::new(Registry::with_defaults()));
        let err = Widget::new(&installer, "knob", Value::from(2)).unwrap_err();
        assert!(matches!(err, GuardError::UnknownType { ref name, .. } if name == "positive"));
        assert!(sink.warnings().is_empty());
        assert_eq!(sink.errors().len(), 1);
    }
}
