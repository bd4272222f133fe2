//! # Diagnostics
//!
//! Non-fatal findings of the resolution passes. A pass reports each finding to a
//! [`DiagnosticSink`] and carries on; nothing here aborts a pass.
//!
//! Two sinks are provided:
//! - `Vec<Diagnostic>` collects everything, which is what tests and batch tools want
//! - [`LogSink`] forwards to the `log` facade at warn level

use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum DiagnosticKind {
    /// A tie end that does not fit the open tie it matched, or matched none
    MalformedTie,
    /// A tie still open when the pass ended
    DanglingTie,
    /// An underscore extender that ends on the note it starts on
    LyricExtender,
}

/// One finding, tied to the id of the element it concerns
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub message: String,
    pub context_id: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, message: impl Into<String>, context_id: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            context_id: context_id.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.message, self.context_id)
    }
}

/// Receiver for diagnostics. Reporting is fire-and-forget.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Sink that writes every diagnostic as a `log` warning
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{}", diagnostic);
    }
}
