//! Diagnostic severity levels ordered from least to most severe.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The severity level of a compiler diagnostic.
///
/// Ordered from least severe (`Info`) to most severe (`Error`), matching the
/// derived `PartialOrd`/`Ord` implementation based on declaration order.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// An informational message.
    Info,
    /// A potential issue that does not stop the build.
    Warning,
    /// A problem that fails the compilation.
    Error,
}

impl Severity {
    /// Parses a compiler severity tag.
    ///
    /// Unknown tags map to [`Error`](Severity::Error): anything the compiler
    /// does not explicitly call a warning must stop the build.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "warning" => Severity::Warning,
            "info" => Severity::Info,
            _ => Severity::Error,
        }
    }

    /// Returns `true` for every severity except [`Warning`](Severity::Warning).
    pub fn is_fatal(self) -> bool {
        self != Severity::Warning
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Warning => write!(f, "warning"),
            Severity::Error => write!(f, "error"),
        }
    }
}
