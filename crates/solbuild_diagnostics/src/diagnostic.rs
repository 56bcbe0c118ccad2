//! Structured compiler diagnostics.

use crate::severity::Severity;
use serde::{Deserialize, Serialize};

/// A byte range in one source unit, as reported by the compiler.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    /// Reference path of the source unit.
    pub file: String,
    /// Start byte offset.
    pub start: i64,
    /// End byte offset.
    pub end: i64,
}

/// A single diagnostic reported by the compiler for one version batch.
///
/// `formatted_message` is the compiler's own pre-rendered text (with source
/// excerpt) and is preferred for display when present.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// The severity level of this diagnostic.
    pub severity: Severity,
    /// Error class reported by the compiler (e.g. `TypeError`).
    pub kind: Option<String>,
    /// Compiler component that produced it (e.g. `general`).
    pub component: Option<String>,
    /// The short message.
    pub message: String,
    /// The compiler's pre-rendered message, if any.
    pub formatted_message: Option<String>,
    /// Where in the sources the problem was found.
    pub location: Option<SourceLocation>,
    /// Compiler version of the batch that produced this diagnostic.
    pub compiler_version: Option<String>,
}

impl Diagnostic {
    /// Creates a diagnostic with the given severity and message.
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind: None,
            component: None,
            message: message.into(),
            formatted_message: None,
            location: None,
            compiler_version: None,
        }
    }

    /// Creates an error diagnostic.
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    /// Creates a warning diagnostic.
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    /// Sets the error class.
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Sets the producing component.
    pub fn with_component(mut self, component: impl Into<String>) -> Self {
        self.component = Some(component.into());
        self
    }

    /// Sets the compiler's pre-rendered text.
    pub fn with_formatted_message(mut self, formatted: impl Into<String>) -> Self {
        self.formatted_message = Some(formatted.into());
        self
    }

    /// Sets the source location.
    pub fn with_location(mut self, location: SourceLocation) -> Self {
        self.location = Some(location);
        self
    }

    /// Tags the diagnostic with the compiler version that produced it.
    pub fn with_compiler_version(mut self, version: impl Into<String>) -> Self {
        self.compiler_version = Some(version.into());
        self
    }

    /// Returns `true` if this diagnostic fails its batch.
    pub fn is_fatal(&self) -> bool {
        self.severity.is_fatal()
    }
}
