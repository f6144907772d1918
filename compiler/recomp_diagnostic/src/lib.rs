//! Diagnostic channel for the recompilation engine.
//!
//! Nothing in the engine aborts a build. Corrupt persisted state, units
//! that were never recorded and failed write-backs are all recovered from
//! locally (by rebuilding more than strictly necessary) and surfaced here
//! instead of being returned as fatal errors.
//!
//! Sinks are shared across worker threads, so [`DiagnosticSink::report`]
//! takes `&self`.

use std::fmt;

use parking_lot::Mutex;

/// What went wrong.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Persisted state was unreadable or malformed; it was discarded.
    CorruptState,
    /// A candidate unit has no recorded dependency set.
    MissingRecord,
    /// Writing the next session's state failed.
    WriteFailed,
}

impl DiagnosticKind {
    /// Stable code for searchability.
    pub const fn code(self) -> &'static str {
        match self {
            DiagnosticKind::CorruptState => "R0001",
            DiagnosticKind::MissingRecord => "R0002",
            DiagnosticKind::WriteFailed => "R0003",
        }
    }
}

/// A single report.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            message: message.into(),
        }
    }

    pub fn corrupt_state(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::CorruptState, message)
    }

    pub fn missing_record(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::MissingRecord, message)
    }

    pub fn write_failed(message: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::WriteFailed, message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind.code(), self.message)
    }
}

/// Receiver for engine diagnostics.
pub trait DiagnosticSink: Send + Sync {
    fn report(&self, diagnostic: Diagnostic);
}

/// Forwards every diagnostic to `tracing` at `warn` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn report(&self, diagnostic: Diagnostic) {
        tracing::warn!(code = diagnostic.kind.code(), "{}", diagnostic.message);
    }
}

/// Buffers diagnostics for later inspection.
#[derive(Debug, Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drain everything reported so far.
    pub fn take(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.diagnostics.lock())
    }

    pub fn len(&self) -> usize {
        self.diagnostics.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.lock().is_empty()
    }

    /// Whether any diagnostic of `kind` is buffered.
    pub fn has(&self, kind: DiagnosticKind) -> bool {
        self.diagnostics.lock().iter().any(|d| d.kind == kind)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diagnostic: Diagnostic) {
        self.diagnostics.lock().push(diagnostic);
    }
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &S {
    fn report(&self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

#[cfg(test)]
mod tests;
