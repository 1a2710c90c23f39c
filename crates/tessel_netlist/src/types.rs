//! Tags and small enumerations of the external netlist model.

use crate::ids::{InstanceId, NetBusId, NetId, NetlistId, PortBusId, PortId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a port or port-bus.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum Direction {
    /// Data flows into the netlist.
    In,
    /// Data flows out of the netlist.
    Out,
    /// Bidirectional.
    InOut,
}

impl Direction {
    /// Returns `true` for `In` and `InOut`.
    pub fn is_input(self) -> bool {
        matches!(self, Direction::In | Direction::InOut)
    }

    /// Returns `true` for `Out` and `InOut`.
    pub fn is_output(self) -> bool {
        matches!(self, Direction::Out | Direction::InOut)
    }
}

/// The function of a port on a primitive or operator, used by the typed pin accessors.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum PortRole {
    /// Single data input, or the combined input bus of an operator.
    Input,
    /// First operand.
    Input1,
    /// Second operand.
    Input2,
    /// Result.
    Output,
    /// Select, enable or write-enable.
    Control,
    /// Clock.
    Clock,
    /// Asynchronous set.
    Set,
    /// Asynchronous reset.
    Reset,
    /// Carry in.
    Cin,
    /// Carry out.
    Cout,
}

impl PortRole {
    /// The port name used for this role by [`NetlistDb`](crate::NetlistDb) views.
    pub fn default_name(self) -> &'static str {
        match self {
            PortRole::Input => "i",
            PortRole::Input1 => "a",
            PortRole::Input2 => "b",
            PortRole::Output => "o",
            PortRole::Control => "c",
            PortRole::Clock => "clk",
            PortRole::Set => "set",
            PortRole::Reset => "reset",
            PortRole::Cin => "cin",
            PortRole::Cout => "cout",
        }
    }

    /// The direction of a port playing this role.
    pub fn direction(self) -> Direction {
        match self {
            PortRole::Output | PortRole::Cout => Direction::Out,
            _ => Direction::In,
        }
    }
}

macro_rules! instance_types {
    ($($(#[$meta:meta])* $variant:ident => $name:literal, $operator:literal;)+) => {
        /// Closed enumeration of the type tags the front end assigns to netlists.
        ///
        /// Every netlist has a tag; an instance has the tag of the netlist it
        /// instantiates. `User` marks an ordinary hierarchical sub-circuit.
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
        pub enum InstanceType {
            $($(#[$meta])* $variant,)+
        }

        impl InstanceType {
            /// Every tag, in declaration order.
            pub const ALL: &'static [InstanceType] = &[$(InstanceType::$variant,)+];

            /// Short lowercase name of the tag.
            pub fn name(self) -> &'static str {
                match self {
                    $(InstanceType::$variant => $name,)+
                }
            }

            /// Returns `true` for word-level operators.
            pub fn is_operator(self) -> bool {
                match self {
                    $(InstanceType::$variant => $operator,)+
                }
            }
        }
    };
}

instance_types! {
    /// 2-input AND.
    And => "and", false;
    /// 2-input NAND.
    Nand => "nand", false;
    /// 2-input OR.
    Or => "or", false;
    /// 2-input NOR.
    Nor => "nor", false;
    /// 2-input XOR.
    Xor => "xor", false;
    /// 2-input XNOR.
    Xnor => "xnor", false;
    /// Buffer.
    Buf => "buf", false;
    /// Inverter.
    Inv => "inv", false;
    /// 2-to-1 multiplexer.
    Mux => "mux", false;
    /// Tri-state buffer.
    Tri => "tri", false;
    /// 1-bit full adder.
    FullAdder => "fadd", false;
    /// Flip-flop with asynchronous set and reset.
    DffRs => "dffrs", false;
    /// Latch with asynchronous set and reset.
    DlatchRs => "dlatchrs", false;
    /// Constant 1 driver.
    Pwr => "pwr", false;
    /// Constant 0 driver.
    Gnd => "gnd", false;
    /// Undefined driver.
    X => "x", false;
    /// High-impedance driver.
    Z => "z", false;
    /// Pull-up.
    Pullup => "pullup", false;
    /// Pull-down.
    Pulldown => "pulldown", false;
    /// Rising-edge detector feeding a sampler.
    SvaPosedge => "sva_posedge", false;
    /// Samples a value on a detected edge.
    SvaAt => "sva_at", false;
    /// Immediate assertion.
    SvaImmediateAssert => "sva_immediate_assert", false;
    /// Clocked assertion.
    SvaAssert => "sva_assert", false;
    /// Immediate assumption.
    SvaImmediateAssume => "sva_immediate_assume", false;
    /// Clocked assumption.
    SvaAssume => "sva_assume", false;
    /// Immediate cover.
    SvaImmediateCover => "sva_immediate_cover", false;
    /// Clocked cover.
    SvaCover => "sva_cover", false;
    /// Adder with carry in and out.
    Adder => "adder", true;
    /// Multiplier.
    Multiplier => "multiplier", true;
    /// Divider.
    Divider => "divider", true;
    /// Modulo.
    Modulo => "modulo", true;
    /// Remainder.
    Remainder => "remainder", true;
    /// Left shift.
    ShiftLeft => "shift_left", true;
    /// Right shift, logical or arithmetic depending on carry in.
    ShiftRight => "shift_right", true;
    /// Binary to one-hot decoder.
    Decoder => "decoder", true;
    /// Decoder gated by an enable.
    EnabledDecoder => "enabled_decoder", true;
    /// AND reduction.
    ReduceAnd => "reduce_and", true;
    /// OR reduction.
    ReduceOr => "reduce_or", true;
    /// XOR reduction.
    ReduceXor => "reduce_xor", true;
    /// XNOR reduction.
    ReduceXnor => "reduce_xnor", true;
    /// `<` or `<=` depending on carry in.
    LessThan => "lessthan", true;
    /// Bitwise AND.
    WideAnd => "wide_and", true;
    /// Bitwise OR.
    WideOr => "wide_or", true;
    /// Bitwise XOR.
    WideXor => "wide_xor", true;
    /// Bitwise XNOR.
    WideXnor => "wide_xnor", true;
    /// Wide buffer.
    WideBuf => "wide_buf", true;
    /// Wide inverter.
    WideInv => "wide_inv", true;
    /// Subtraction.
    Minus => "minus", true;
    /// Negation.
    UnaryMinus => "uminus", true;
    /// Equality.
    Equal => "equal", true;
    /// Inequality.
    NotEqual => "notequal", true;
    /// Wide 2-to-1 multiplexer.
    WideMux => "wide_mux", true;
    /// Wide tri-state buffer.
    WideTri => "wide_tri", true;
    /// Wide flip-flop with per-bit set and reset.
    WideDffRs => "wide_dffrs", true;
    /// Memory read port.
    ReadPort => "read_port", true;
    /// Memory write port.
    WritePort => "write_port", true;
    /// Clocked memory write port.
    ClockedWritePort => "clocked_write_port", true;
    /// One-hot selector.
    Selector => "selector", true;
    /// Wide one-hot selector.
    WideSelector => "wide_selector", true;
    /// Priority selector.
    PrioritySelector => "priority_selector", true;
    /// Exponentiation.
    Power => "power", true;
    /// A hierarchical sub-circuit.
    User => "user", false;
}

impl InstanceType {
    /// Returns `true` for bit-level primitives.
    pub fn is_primitive(self) -> bool {
        !self.is_operator() && self != InstanceType::User
    }
}

impl fmt::Display for InstanceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Any object of the netlist model that carries attributes and a source location.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Object {
    /// A netlist.
    Netlist(NetlistId),
    /// A port.
    Port(PortId),
    /// A port-bus.
    PortBus(PortBusId),
    /// A net.
    Net(NetId),
    /// A net-bus.
    NetBus(NetBusId),
    /// An instance.
    Instance(InstanceId),
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn all_is_complete_and_unique() {
        let names: HashSet<&str> = InstanceType::ALL.iter().map(|t| t.name()).collect();
        assert_eq!(names.len(), InstanceType::ALL.len());
        assert!(InstanceType::ALL.contains(&InstanceType::User));
        assert!(InstanceType::ALL.contains(&InstanceType::Power));
    }

    #[test]
    fn classification() {
        assert!(InstanceType::Adder.is_operator());
        assert!(InstanceType::ReadPort.is_operator());
        assert!(InstanceType::And.is_primitive());
        assert!(!InstanceType::User.is_primitive());
        assert!(!InstanceType::User.is_operator());
    }

    #[test]
    fn role_directions() {
        assert_eq!(PortRole::Cout.direction(), Direction::Out);
        assert_eq!(PortRole::Clock.direction(), Direction::In);
        assert!(Direction::InOut.is_input() && Direction::InOut.is_output());
    }

    #[test]
    fn kinds_serialize_by_name() {
        let json = serde_json::to_string(&InstanceType::ClockedWritePort).unwrap();
        assert_eq!(json, "\"ClockedWritePort\"");
        let back: PortRole = serde_json::from_str("\"Cout\"").unwrap();
        assert_eq!(back, PortRole::Cout);
    }
}
