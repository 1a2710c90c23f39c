//! Import failures and the diagnostic codes they map to.
//!
//! Codes `E300`--`E312` are fatal and abort the run. Warnings `W300` and
//! `W301` are emitted to the [`DiagnosticSink`](tessel_diagnostics::DiagnosticSink)
//! and never stop processing.

use tessel_diagnostics::{Category, Diagnostic, DiagnosticCode};
use tessel_ir::IrError;
use tessel_netlist::{InstanceType, PortRole};

/// A net is referenced outside the scope that owns it.
pub const E300: DiagnosticCode = DiagnosticCode::new(Category::Error, 300);
/// A memory port accesses words of a different width than the memory.
pub const E301: DiagnosticCode = DiagnosticCode::new(Category::Error, 301);
/// A RAM net is connected to something other than a memory port.
pub const E302: DiagnosticCode = DiagnosticCode::new(Category::Error, 302);
/// A RAM initializer uses a radix other than binary.
pub const E303: DiagnosticCode = DiagnosticCode::new(Category::Error, 303);
/// A carry-in does not match any supported pattern.
pub const E304: DiagnosticCode = DiagnosticCode::new(Category::Error, 304);
/// A sampler is not fed by an edge detector.
pub const E305: DiagnosticCode = DiagnosticCode::new(Category::Error, 305);
/// A primitive has no lowering.
pub const E306: DiagnosticCode = DiagnosticCode::new(Category::Error, 306);
/// A non-operator module name is imported twice.
pub const E307: DiagnosticCode = DiagnosticCode::new(Category::Error, 307);
/// A configured top sub-circuit does not exist.
pub const E308: DiagnosticCode = DiagnosticCode::new(Category::Error, 308);
/// A required pin of a primitive or operator is unconnected.
pub const E309: DiagnosticCode = DiagnosticCode::new(Category::Error, 309);
/// A net owned by the current scope was never given a signal.
pub const E310: DiagnosticCode = DiagnosticCode::new(Category::Error, 310);
/// The target IR rejected a construction.
pub const E311: DiagnosticCode = DiagnosticCode::new(Category::Error, 311);
/// An instance reached a lowering path that does not handle its type.
pub const E312: DiagnosticCode = DiagnosticCode::new(Category::Error, 312);

/// An operator has no cell lowering; its structural expansion is imported instead.
pub const W300: DiagnosticCode = DiagnosticCode::new(Category::Warning, 300);
/// A primitive has no lowering and is kept as an opaque cell.
pub const W301: DiagnosticCode = DiagnosticCode::new(Category::Warning, 301);

/// A fatal condition that aborts the import run.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ImportError {
    /// A net is referenced from a scope that does not own it.
    #[error("net `{net}` is owned by `{owner}` but referenced from `{scope}`")]
    ExternalReference {
        /// Name of the net.
        net: String,
        /// Hierarchical name of the owning sub-circuit.
        owner: String,
        /// Hierarchical name of the sub-circuit being imported.
        scope: String,
    },

    /// A memory port's data width differs from the inferred word width.
    #[error(
        "asymmetric memory access by `{instance}` on `{memory}`: port is {port_width} bits, words are {word_width}"
    )]
    UnsupportedAsymmetricMemory {
        /// The read or write port instance.
        instance: String,
        /// Name of the RAM net.
        memory: String,
        /// Data width of the port.
        port_width: u32,
        /// Word width of the memory.
        word_width: u32,
    },

    /// A RAM net is touched by an instance that is not a memory port.
    #[error("RAM net `{net}` is connected to unsupported instance `{instance}` of type {kind}")]
    UnsupportedMemoryAccess {
        /// Name of the RAM net.
        net: String,
        /// The offending instance.
        instance: String,
        /// Its type tag.
        kind: String,
    },

    /// The initial contents of a RAM net are not a binary literal.
    #[error("unsupported initial value `{value}` on RAM net `{net}`")]
    UnsupportedInitValue {
        /// Name of the RAM net.
        net: String,
        /// The initializer text.
        value: String,
    },

    /// A carry-in is connected in a way the lowering cannot express.
    #[error("cannot import {kind} instance `{instance}`: carry-in is {reason}")]
    UnsupportedCarryPattern {
        /// The instance.
        instance: String,
        /// Its type tag.
        kind: String,
        /// What the carry-in was expected to be.
        reason: &'static str,
    },

    /// A sampler is not driven by a recognized edge detector.
    #[error("sampler `{instance}` has no edge-detected clock input")]
    MissingClockPattern {
        /// The sampler instance.
        instance: String,
    },

    /// No lowering exists for a primitive.
    #[error("unsupported primitive `{instance}` of type `{kind}`")]
    UnsupportedPrimitive {
        /// The instance.
        instance: String,
        /// Name of the primitive's view.
        kind: String,
    },

    /// A non-operator module is imported a second time.
    #[error("re-definition of module `{module}`")]
    Redefinition {
        /// The module name.
        module: String,
    },

    /// A configured top sub-circuit is not in the netlist.
    #[error("top sub-circuit `{name}` not found")]
    UnknownTop {
        /// The requested name.
        name: String,
    },

    /// A pin the lowering needs is not connected.
    #[error("instance `{instance}` has no connection for its {role:?} pin")]
    MissingConnection {
        /// The instance.
        instance: String,
        /// The role of the missing pin.
        role: PortRole,
    },

    /// A net of the current scope has no signal, e.g. a RAM net used as a plain net.
    #[error("net `{net}` of `{scope}` has no signal")]
    UnmappedNet {
        /// Name of the net.
        net: String,
        /// Hierarchical name of the sub-circuit being imported.
        scope: String,
    },

    /// Internal: an instance was routed to a lowering that does not handle its type.
    #[error("internal error: instance `{instance}` of type {kind} reached the wrong lowering path")]
    Misrouted {
        /// The instance.
        instance: String,
        /// Its type tag.
        kind: InstanceType,
    },

    /// The target IR rejected a construction.
    #[error(transparent)]
    Ir(#[from] IrError),
}

impl ImportError {
    /// The stable diagnostic code of this error.
    pub fn code(&self) -> DiagnosticCode {
        match self {
            ImportError::ExternalReference { .. } => E300,
            ImportError::UnsupportedAsymmetricMemory { .. } => E301,
            ImportError::UnsupportedMemoryAccess { .. } => E302,
            ImportError::UnsupportedInitValue { .. } => E303,
            ImportError::UnsupportedCarryPattern { .. } => E304,
            ImportError::MissingClockPattern { .. } => E305,
            ImportError::UnsupportedPrimitive { .. } => E306,
            ImportError::Redefinition { .. } => E307,
            ImportError::UnknownTop { .. } => E308,
            ImportError::MissingConnection { .. } => E309,
            ImportError::UnmappedNet { .. } => E310,
            ImportError::Ir(_) => E311,
            ImportError::Misrouted { .. } => E312,
        }
    }

    /// Converts the error into an error diagnostic.
    pub fn to_diagnostic(&self) -> Diagnostic {
        let diag = Diagnostic::error(self.code(), self.to_string());
        match self {
            ImportError::ExternalReference { .. } => {
                diag.with_help("enable external-net hoisting to lift the net into this scope")
            }
            ImportError::UnsupportedPrimitive { .. } => {
                diag.with_help("set `keep_going` to import it as an opaque cell")
            }
            _ => diag,
        }
    }
}

/// Warning for an operator imported through its structural expansion.
pub(crate) fn unsupported_operator(view_name: &str) -> Diagnostic {
    Diagnostic::warning(
        W300,
        format!("unsupported operator `{view_name}`, falling back to its structural implementation"),
    )
}

/// Warning for a primitive kept as an opaque cell.
pub(crate) fn kept_primitive(instance: &str, view_name: &str) -> Diagnostic {
    Diagnostic::warning(
        W301,
        format!("unsupported primitive `{instance}` of type `{view_name}` kept as an opaque cell"),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_diagnostics::Severity;

    #[test]
    fn external_reference_message() {
        let err = ImportError::ExternalReference {
            net: "leaf.n".into(),
            owner: "top.u_mid.u_leaf".into(),
            scope: "top".into(),
        };
        assert_eq!(
            err.to_string(),
            "net `leaf.n` is owned by `top.u_mid.u_leaf` but referenced from `top`"
        );
        let diag = err.to_diagnostic();
        assert_eq!(diag.code, E300);
        assert_eq!(diag.severity, Severity::Error);
        assert_eq!(diag.help.len(), 1);
    }

    #[test]
    fn codes_are_distinct() {
        let errors = [
            ImportError::Redefinition { module: "m".into() },
            ImportError::UnknownTop { name: "t".into() },
            ImportError::MissingClockPattern { instance: "i".into() },
            ImportError::Ir(IrError::WidthMismatch { target: 1, value: 2 }),
            ImportError::Misrouted {
                instance: "u".into(),
                kind: InstanceType::Adder,
            },
        ];
        let codes: Vec<String> = errors.iter().map(|e| e.code().to_string()).collect();
        assert_eq!(codes, vec!["E307", "E308", "E305", "E311", "E312"]);
    }

    #[test]
    fn warnings() {
        let diag = unsupported_operator("$op$pow");
        assert_eq!(diag.code, W300);
        assert_eq!(diag.severity, Severity::Warning);
        assert!(kept_primitive("u1", "$prim$pullup").message.contains("u1"));
    }
}
