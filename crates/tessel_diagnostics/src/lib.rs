//! Diagnostics reported while importing a netlist.
//!
//! A [`Diagnostic`] carries a severity, a stable [`DiagnosticCode`], a message
//! and an optional source location in the original design files. Recoverable
//! conditions are collected in a [`DiagnosticSink`]; [`PlainRenderer`] turns
//! them into text for the surrounding driver.

#![warn(missing_docs)]

pub mod code;
pub mod diagnostic;
pub mod renderer;
pub mod severity;
pub mod sink;

pub use code::{Category, DiagnosticCode};
pub use diagnostic::Diagnostic;
pub use renderer::{DiagnosticRenderer, PlainRenderer};
pub use severity::Severity;
pub use sink::DiagnosticSink;
