//! Errors raised by IR mutation helpers.

use tessel_common::Ident;

/// A structural rule of the IR was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IrError {
    /// A wire, cell or memory name is already taken in the module.
    #[error("name {0:?} is already used in this module")]
    DuplicateName(Ident),

    /// A module with this name already exists in the design.
    #[error("module {0:?} already exists in the design")]
    DuplicateModule(Ident),

    /// Both sides of an assignment must have the same width.
    #[error("assignment width mismatch: target is {target} bits, value is {value} bits")]
    WidthMismatch {
        /// Width of the assignment target.
        target: u32,
        /// Width of the assigned value.
        value: u32,
    },
}
