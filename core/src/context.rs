//! Context installer — prefixed dispatchers bound to a host type.
//!
//! A host type describes itself once with a [`ContextConfig`] (a class label
//! and an optional per-instance label). An [`Installer`] turns that into
//! dispatchers whose diagnostics start with `"Class:"` or
//! `"Class(instance):"`. Hosts hold the resulting [`ValidationContext`] as a
//! field.
//!
//! ```
//! use std::sync::Arc;
//! use vouch::{ContextConfig, Installer, MemorySink, Value, ValidationContext};
//!
//! struct Port {
//!     name: String,
//!     guard: ValidationContext,
//! }
//!
//! let sink = Arc::new(MemorySink::new());
//! let installer = Installer::new(
//!     ContextConfig::new("Port").with_instance_label(|p: &Port| Some(p.name.clone())),
//! )
//! .with_sink(sink.clone());
//!
//! let mut port = Port { name: "http".into(), guard: installer.class_context() };
//! port.guard = installer.instance_context(&port);
//!
//! assert!(!port.guard.check.is_named("number", &Value::from("80"), "value")?);
//! assert_eq!(
//!     sink.warnings(),
//!     ["Port(http): value expected number but got [string \"80\"]"]
//! );
//! # Ok::<(), vouch::GuardError>(())
//! ```

use std::fmt;
use std::sync::Arc;

use crate::{
    Assert, Check, DiagnosticSink, MatchOptions, PrefixFn, Query, Registry, TracingSink,
};

/// Derives an instance label; `None` falls back to the class prefix.
pub type InstanceLabelFn<T> = Arc<dyn Fn(&T) -> Option<String> + Send + Sync>;

/// How a host type labels its diagnostics.
pub struct ContextConfig<T> {
    /// Class-level label, e.g. `"Account"`.
    pub class_label: String,
    /// Optional per-instance label, e.g. the account id.
    pub instance_label: Option<InstanceLabelFn<T>>,
}

impl<T> ContextConfig<T> {
    /// A config with only a class label.
    #[must_use]
    pub fn new(class_label: impl Into<String>) -> Self {
        Self {
            class_label: class_label.into(),
            instance_label: None,
        }
    }

    /// Set the instance label function.
    #[must_use]
    pub fn with_instance_label<F>(mut self, label: F) -> Self
    where
        F: Fn(&T) -> Option<String> + Send + Sync + 'static,
    {
        self.instance_label = Some(Arc::new(label));
        self
    }

    fn class_prefix(&self) -> String {
        format!("{}:", self.class_label)
    }

    fn instance_prefix(&self, instance: &T) -> String {
        match self.instance_label.as_ref().and_then(|label| label(instance)) {
            Some(label) => format!("{}({label}):", self.class_label),
            None => self.class_prefix(),
        }
    }
}

impl<T> Clone for ContextConfig<T> {
    fn clone(&self) -> Self {
        Self {
            class_label: self.class_label.clone(),
            instance_label: self.instance_label.clone(),
        }
    }
}

impl<T> fmt::Debug for ContextConfig<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ContextConfig")
            .field("class_label", &self.class_label)
            .field("instance_label", &self.instance_label.is_some())
            .finish()
    }
}

/// Which prefix an installed dispatcher carries.
#[derive(Debug)]
pub enum Scope<'a, T> {
    /// `"<Class>:"`.
    Class,
    /// `"<Class>(<label>):"`, label computed once from the instance.
    Instance(&'a T),
}

impl<T> Clone for Scope<'_, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Scope<'_, T> {}

/// Builds prefixed dispatchers for one host type.
pub struct Installer<T> {
    config: ContextConfig<T>,
    registry: Arc<Registry>,
    sink: Arc<dyn DiagnosticSink>,
    options: MatchOptions,
}

impl<T> Installer<T> {
    /// An installer over the default registry, logging through `tracing`.
    #[must_use]
    pub fn new(config: ContextConfig<T>) -> Self {
        Self {
            config,
            registry: Arc::new(Registry::with_defaults()),
            sink: Arc::new(TracingSink),
            options: MatchOptions::default(),
        }
    }

    /// Resolve leaf names against `registry`.
    #[must_use]
    pub fn with_registry(mut self, registry: Arc<Registry>) -> Self {
        self.registry = registry;
        self
    }

    /// Send check diagnostics to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Match options for every installed dispatcher.
    #[must_use]
    pub fn with_options(mut self, options: MatchOptions) -> Self {
        self.options = options;
        self
    }

    /// The host configuration.
    #[must_use]
    pub fn config(&self) -> &ContextConfig<T> {
        &self.config
    }

    /// A query dispatcher. Queries emit nothing, so they carry no prefix.
    #[must_use]
    pub fn install_query_api(&self) -> Query {
        Query::new(Arc::clone(&self.registry)).with_options(self.options)
    }

    /// An assert dispatcher prefixed for `scope`.
    #[must_use]
    pub fn install_assert_api(&self, scope: Scope<'_, T>) -> Assert {
        Assert::new(Arc::clone(&self.registry))
            .with_options(self.options)
            .with_prefix_fn(self.prefix(scope))
    }

    /// A check dispatcher prefixed for `scope`.
    #[must_use]
    pub fn install_check_api(&self, scope: Scope<'_, T>) -> Check {
        Check::new(Arc::clone(&self.registry), Arc::clone(&self.sink))
            .with_options(self.options)
            .with_prefix_fn(self.prefix(scope))
    }

    /// All three dispatchers with the class prefix.
    #[must_use]
    pub fn class_context(&self) -> ValidationContext {
        self.context(Scope::Class)
    }

    /// All three dispatchers with the prefix of `instance`.
    ///
    /// The instance label is computed here, once; later changes to the
    /// instance do not alter the prefix.
    #[must_use]
    pub fn instance_context(&self, instance: &T) -> ValidationContext {
        self.context(Scope::Instance(instance))
    }

    fn context(&self, scope: Scope<'_, T>) -> ValidationContext {
        // One provider per installation, shared by its assert and check.
        let prefix = self.prefix(scope);
        ValidationContext {
            query: self.install_query_api(),
            assert: Assert::new(Arc::clone(&self.registry))
                .with_options(self.options)
                .with_prefix_fn(Arc::clone(&prefix)),
            check: Check::new(Arc::clone(&self.registry), Arc::clone(&self.sink))
                .with_options(self.options)
                .with_prefix_fn(prefix),
        }
    }

    fn prefix(&self, scope: Scope<'_, T>) -> PrefixFn {
        let prefix = match scope {
            Scope::Class => self.config.class_prefix(),
            Scope::Instance(instance) => self.config.instance_prefix(instance),
        };
        Arc::new(move || prefix.clone())
    }
}

impl<T> fmt::Debug for Installer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Installer")
            .field("config", &self.config)
            .field("registry", &self.registry.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// The three dispatchers of one installation, held by a host as a field.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// Silent checks.
    pub query: Query,
    /// Fail-fast checks.
    pub assert: Assert,
    /// Warning checks.
    pub check: Check,
}

impl ValidationContext {
    /// The prefix diagnostics of this context start with.
    #[must_use]
    pub fn prefix(&self) -> String {
        self.assert.prefix()
    }
}
