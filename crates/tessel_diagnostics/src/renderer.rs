//! Text rendering of diagnostics.

use crate::diagnostic::Diagnostic;

/// Formats diagnostics for output.
pub trait DiagnosticRenderer {
    /// Renders a single diagnostic into a string.
    fn render(&self, diag: &Diagnostic) -> String;
}

/// Renders diagnostics in a compact compiler-style format:
///
/// ```text
/// warning[W300]: unsupported operator 'add_8' imported as sub-circuit
///   --> rtl/top.v:42
///    = note: ...
/// ```
#[derive(Default)]
pub struct PlainRenderer;

impl DiagnosticRenderer for PlainRenderer {
    fn render(&self, diag: &Diagnostic) -> String {
        let mut out = format!("{}[{}]: {}\n", diag.severity, diag.code, diag.message);
        if let Some(loc) = &diag.location {
            out.push_str(&format!("  --> {loc}\n"));
        }
        for note in &diag.notes {
            out.push_str(&format!("   = note: {note}\n"));
        }
        for help in &diag.help {
            out.push_str(&format!("   = help: {help}\n"));
        }
        out
    }
}
