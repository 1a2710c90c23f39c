//! Which path lowers an instance, as a pure function of its tag and the run's mode.

use tessel_config::LoweringMode;
use tessel_netlist::InstanceType;

/// How one instance is lowered.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Route {
    /// Handled the same way in both modes: constants, buffers, memory ports
    /// and verification primitives.
    Special,
    /// Lowered by the table of the selected mode.
    Table,
    /// An operator without a cell lowering; its structural expansion is
    /// imported as a sub-circuit after a warning.
    OperatorFallback,
    /// A primitive without a lowering; fatal unless keep-going is enabled.
    PrimitiveFallback,
    /// An opaque cell referencing another sub-circuit.
    Hierarchy,
}

/// Returns `true` for tags lowered outside the per-mode tables.
pub fn is_special(kind: InstanceType) -> bool {
    use InstanceType::*;
    matches!(
        kind,
        Pwr | Gnd
            | X
            | Z
            | Buf
            | ReadPort
            | WritePort
            | ClockedWritePort
            | SvaPosedge
            | SvaAt
            | SvaImmediateAssert
            | SvaAssert
            | SvaImmediateAssume
            | SvaAssume
            | SvaImmediateCover
            | SvaCover
    )
}

/// Returns `true` if the gate-level table lowers `kind`.
pub fn gate_table_covers(kind: InstanceType) -> bool {
    use InstanceType::*;
    match kind {
        And | Nand | Or | Nor | Xor | Xnor | Inv | Mux | Tri | FullAdder | DffRs => true,
        Buf | DlatchRs | Pwr | Gnd | X | Z | Pullup | Pulldown | SvaPosedge | SvaAt
        | SvaImmediateAssert | SvaAssert | SvaImmediateAssume | SvaAssume | SvaImmediateCover
        | SvaCover | Adder | Multiplier | Divider | Modulo | Remainder | ShiftLeft | ShiftRight
        | Decoder | EnabledDecoder | ReduceAnd | ReduceOr | ReduceXor | ReduceXnor | LessThan
        | WideAnd | WideOr | WideXor | WideXnor | WideBuf | WideInv | Minus | UnaryMinus
        | Equal | NotEqual | WideMux | WideTri | WideDffRs | ReadPort | WritePort
        | ClockedWritePort | Selector | WideSelector | PrioritySelector | Power | User => false,
    }
}

/// Returns `true` if the cell-level table lowers `kind`.
pub fn cell_table_covers(kind: InstanceType) -> bool {
    use InstanceType::*;
    match kind {
        And | Nand | Or | Nor | Xor | Xnor | Inv | Mux | Tri | FullAdder | DffRs | DlatchRs
        | Adder | Multiplier | Divider | Modulo | Remainder | ShiftLeft | ShiftRight | Decoder
        | EnabledDecoder | ReduceAnd | ReduceOr | ReduceXor | ReduceXnor | LessThan | WideAnd
        | WideOr | WideXor | WideXnor | WideBuf | WideInv | Minus | UnaryMinus | Equal
        | NotEqual | WideMux | WideTri | WideDffRs => true,
        Buf | Pwr | Gnd | X | Z | Pullup | Pulldown | SvaPosedge | SvaAt | SvaImmediateAssert
        | SvaAssert | SvaImmediateAssume | SvaAssume | SvaImmediateCover | SvaCover | ReadPort
        | WritePort | ClockedWritePort | Selector | WideSelector | PrioritySelector | Power
        | User => false,
    }
}

/// Routes an instance of type `kind` under `mode`.
pub fn dispatch(kind: InstanceType, mode: LoweringMode) -> Route {
    if is_special(kind) {
        return Route::Special;
    }
    let covered = match mode {
        LoweringMode::Cells => cell_table_covers(kind),
        LoweringMode::Gates => gate_table_covers(kind),
    };
    if covered {
        Route::Table
    } else if kind.is_primitive() {
        Route::PrimitiveFallback
    } else if kind.is_operator() && mode == LoweringMode::Cells {
        Route::OperatorFallback
    } else {
        Route::Hierarchy
    }
}
