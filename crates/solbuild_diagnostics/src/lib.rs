//! Compiler diagnostics: severity classification, accumulation and rendering.
//!
//! The external compiler reports problems as a list of severity-tagged
//! records. This crate gives them a typed [`Diagnostic`] shape, a
//! thread-safe [`DiagnosticSink`] to collect them across version batches,
//! and a [`TerminalRenderer`] for human-readable output.

#![warn(missing_docs)]

pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use diagnostic::{Diagnostic, SourceLocation};
pub use renderer::{DiagnosticRenderer, TerminalRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
