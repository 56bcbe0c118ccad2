//! Diagnostic rendering for terminal output.

use crate::diagnostic::Diagnostic;
use crate::severity::Severity;

/// Trait for rendering diagnostics into formatted output strings.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a formatted string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics for a terminal.
///
/// Uses the compiler's pre-rendered text when available, otherwise a
/// compact `severity[Kind]: message` line followed by the location:
///
/// ```text
/// error[TypeError]: Type uint256 is not implicitly convertible to bool.
///   --> Token.sol:120..131
/// ```
pub struct TerminalRenderer {
    /// Whether to use ANSI color codes in output.
    pub color: bool,
}

impl TerminalRenderer {
    /// Creates a new terminal renderer.
    pub fn new(color: bool) -> Self {
        Self { color }
    }

    fn paint(&self, severity: Severity, text: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        let code = match severity {
            Severity::Error => "1;31",
            Severity::Warning => "1;33",
            Severity::Info => "1;36",
        };
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

impl DiagnosticRenderer for TerminalRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        if let Some(formatted) = &diag.formatted_message {
            let mut out = formatted.trim_end().to_string();
            if let Some(version) = &diag.compiler_version {
                out.push_str(&format!("\n   = note: reported by compiler {version}"));
            }
            return self.paint_first_line(diag.severity, &out);
        }

        let header = match &diag.kind {
            Some(kind) => format!("{}[{kind}]", diag.severity),
            None => diag.severity.to_string(),
        };
        let mut out = format!("{}: {}", self.paint(diag.severity, &header), diag.message);
        if let Some(loc) = &diag.location {
            out.push_str(&format!("\n  --> {}:{}..{}", loc.file, loc.start, loc.end));
        }
        if let Some(version) = &diag.compiler_version {
            out.push_str(&format!("\n   = note: reported by compiler {version}"));
        }
        out
    }
}

impl TerminalRenderer {
    fn paint_first_line(&self, severity: Severity, text: &str) -> String {
        match text.split_once('\n') {
            Some((first, rest)) => format!("{}\n{rest}", self.paint(severity, first)),
            None => self.paint(severity, text),
        }
    }
}
