//! Diagnostic sinks — where non-fatal findings go.
//!
//! [`Check`](crate::Check) never writes to a global console; it is handed a
//! [`DiagnosticSink`] at construction. [`TracingSink`] forwards to `tracing`,
//! [`MemorySink`] keeps lines for inspection in tests.

use std::sync::{Mutex, PoisonError};

/// A line-oriented warning/error/log channel.
pub trait DiagnosticSink: Send + Sync {
    /// A failed check.
    fn warn(&self, message: &str);

    /// A malformed spec met during a check.
    fn error(&self, message: &str);

    /// Informational output from the host. The dispatchers never call it.
    fn log(&self, _message: &str) {}
}

/// Forwards diagnostics to `tracing` under the `vouch` target.
///
/// The library never installs a subscriber; hosts choose where events go.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn warn(&self, message: &str) {
        tracing::warn!(target: "vouch", "{message}");
    }

    fn error(&self, message: &str) {
        tracing::error!(target: "vouch", "{message}");
    }

    fn log(&self, message: &str) {
        tracing::info!(target: "vouch", "{message}");
    }
}

/// Severity of a captured line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    /// From [`DiagnosticSink::warn`].
    Warn,
    /// From [`DiagnosticSink::error`].
    Error,
    /// From [`DiagnosticSink::log`].
    Log,
}

/// One captured diagnostic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkLine {
    /// Severity.
    pub level: Level,
    /// The formatted message.
    pub message: String,
}

/// Captures diagnostics in memory.
///
/// ```
/// use vouch::{DiagnosticSink, MemorySink};
///
/// let sink = MemorySink::new();
/// sink.warn("age expected number but got [null]");
/// assert_eq!(sink.warnings(), ["age expected number but got [null]"]);
/// ```
#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<SinkLine>>,
}

impl MemorySink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every captured line, oldest first.
    #[must_use]
    pub fn lines(&self) -> Vec<SinkLine> {
        self.lock().clone()
    }

    /// Captured warning messages, oldest first.
    #[must_use]
    pub fn warnings(&self) -> Vec<String> {
        self.messages(Level::Warn)
    }

    /// Captured error messages, oldest first.
    #[must_use]
    pub fn errors(&self) -> Vec<String> {
        self.messages(Level::Error)
    }

    /// Captured log messages, oldest first.
    #[must_use]
    pub fn logs(&self) -> Vec<String> {
        self.messages(Level::Log)
    }

    /// Returns `true` if nothing was captured.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.lock().clear();
    }

    fn messages(&self, level: Level) -> Vec<String> {
        self.lock()
            .iter()
            .filter(|line| line.level == level)
            .map(|line| line.message.clone())
            .collect()
    }

    fn push(&self, level: Level, message: &str) {
        self.lock().push(SinkLine {
            level,
            message: message.to_owned(),
        });
    }

    // A panic while holding the lock cannot leave a Vec half-pushed.
    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SinkLine>> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DiagnosticSink for MemorySink {
    fn warn(&self, message: &str) {
        self.push(Level::Warn, message);
    }

    fn error(&self, message: &str) {
        self.push(Level::Error, message);
    }

    fn log(&self, message: &str) {
        self.push(Level::Log, message);
    }
}
