//! Cells: typed primitives, word-level operators, memory ports, verification
//! directives and references to other modules.
//!
//! Port naming follows one convention across kinds: data inputs `A`, `B`,
//! select `S`, result `Y`; registers use `CLK`, `D`, `Q` with `ARST`, `SET`,
//! `CLR`; latches use `EN`; memory ports use `CLK`, `EN`, `ADDR`, `DATA`.

use crate::const_value::ConstValue;
use crate::ids::CellId;
use crate::sig::SigSpec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessel_common::{Ident, Logic};

/// The direction of a cell port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortDirection {
    /// The cell reads this port.
    Input,
    /// The cell drives this port.
    Output,
    /// Both.
    InOut,
}

/// Single-bit combinational gates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateOp {
    /// `Y = A & B`
    And,
    /// `Y = A | B`
    Or,
    /// `Y = A ^ B`
    Xor,
    /// `Y = !(A ^ B)`
    Xnor,
    /// `Y = !A`
    Not,
    /// `Y = A`
    Buf,
    /// `Y = S ? B : A`
    Mux,
}

/// Word-level operators with one operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Bitwise inversion.
    Not,
    /// Identity (wide buffer).
    Pos,
    /// Two's complement negation.
    Neg,
    /// AND of all bits.
    ReduceAnd,
    /// OR of all bits.
    ReduceOr,
    /// XOR of all bits.
    ReduceXor,
    /// XNOR of all bits.
    ReduceXnor,
}

/// Word-level operators with two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// Bitwise XNOR.
    Xnor,
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Multiplication.
    Mul,
    /// Division.
    Div,
    /// Modulo (remainder operators are lowered to this as well).
    Mod,
    /// Logical shift left.
    Shl,
    /// Logical shift right.
    Shr,
    /// Arithmetic shift right.
    Sshr,
    /// `A < B`
    Lt,
    /// `A <= B`
    Le,
    /// `A == B`
    Eq,
    /// `A != B`
    Ne,
}

/// The kind of a cell.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellKind {
    /// Single-bit combinational gate.
    Gate(GateOp),
    /// Single-bit positive-edge flip-flop (`CLK`, `D`, `Q`).
    DffGate,
    /// Single-bit flip-flop with asynchronous reset to `arst_value` (`CLK`, `ARST`, `D`, `Q`).
    AdffGate {
        /// Value loaded while `ARST` is high.
        arst_value: Logic,
    },
    /// Single-bit flip-flop with asynchronous set and clear (`CLK`, `SET`, `CLR`, `D`, `Q`).
    DffsrGate,

    /// Word-level unary operator (`A`, `Y`).
    Unary {
        /// The operation.
        op: UnaryOp,
        /// Operands are two's complement.
        signed: bool,
    },
    /// Word-level binary operator (`A`, `B`, `Y`).
    Binary {
        /// The operation.
        op: BinaryOp,
        /// Operands are two's complement.
        signed: bool,
    },
    /// Word-level 2-to-1 multiplexer (`A`, `B`, `S`, `Y`).
    Mux {
        /// Data width.
        width: u32,
    },
    /// Positive-edge register (`CLK`, `D`, `Q`).
    Dff {
        /// Data width.
        width: u32,
    },
    /// Register with asynchronous reset (`CLK`, `ARST`, `D`, `Q`).
    Adff {
        /// Data width.
        width: u32,
        /// Value loaded into every bit while `ARST` is high.
        arst_value: Logic,
    },
    /// Register with per-bit asynchronous set and clear (`CLK`, `SET`, `CLR`, `D`, `Q`).
    Dffsr {
        /// Data width.
        width: u32,
    },
    /// Transparent-high latch (`EN`, `D`, `Q`).
    Dlatch {
        /// Data width.
        width: u32,
    },
    /// Latch with per-bit asynchronous set and clear (`EN`, `SET`, `CLR`, `D`, `Q`).
    Dlatchsr {
        /// Data width.
        width: u32,
    },
    /// Unconstrained value fixed for the whole run (`Y`).
    Anyconst {
        /// Output width.
        width: u32,
    },
    /// Unconstrained value that may change every cycle (`Y`).
    Anyseq {
        /// Output width.
        width: u32,
    },

    /// Asynchronous memory read port (`CLK`, `EN`, `ADDR`, `DATA`).
    MemRead {
        /// Name of the memory in the same module.
        memory: Ident,
        /// Width of `ADDR`.
        abits: u32,
        /// Width of `DATA`.
        width: u32,
        /// `CLK` is used.
        clk_enable: bool,
        /// Active clock edge is rising.
        clk_polarity: bool,
        /// Reads see same-cycle writes.
        transparent: bool,
    },
    /// Memory write port (`CLK`, `EN`, `ADDR`, `DATA`).
    MemWrite {
        /// Name of the memory in the same module.
        memory: Ident,
        /// Width of `ADDR`.
        abits: u32,
        /// Width of `DATA` and `EN`.
        width: u32,
        /// `CLK` is used.
        clk_enable: bool,
        /// Active clock edge is rising.
        clk_polarity: bool,
        /// Ordering among write ports of the same memory.
        priority: u32,
    },
    /// Initial contents for a range of memory words (`ADDR`, `DATA`).
    MemInit {
        /// Name of the memory in the same module.
        memory: Ident,
        /// Width of `ADDR`.
        abits: u32,
        /// Bits per word.
        width: u32,
        /// Number of consecutive words in `DATA`.
        words: u32,
        /// Later initializers win over earlier overlapping ones.
        priority: u32,
    },

    /// `A` must hold whenever `EN` is high.
    Assert,
    /// `A` is assumed to hold whenever `EN` is high.
    Assume,
    /// `A` must be reachable while `EN` is high.
    Cover,

    /// A not-yet-lowered sub-circuit, referenced by module name.
    Instance {
        /// Name of the instantiated module.
        module: Ident,
    },
}

impl CellKind {
    /// Returns `true` for single-bit gates and gate-level flip-flops.
    pub fn is_gate_level(&self) -> bool {
        matches!(
            self,
            CellKind::Gate(_) | CellKind::DffGate | CellKind::AdffGate { .. } | CellKind::DffsrGate
        )
    }
}

/// A connection between a cell port and a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    /// The name of the port on the cell.
    pub port: Ident,
    /// The direction of data flow.
    pub direction: PortDirection,
    /// The bits connected to the port.
    pub signal: SigSpec,
}

/// A cell inside a module.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Cell {
    /// The ID of this cell within its module.
    pub id: CellId,
    /// The cell name, unique in the module namespace.
    pub name: Ident,
    /// What the cell computes.
    pub kind: CellKind,
    /// Port connections in insertion order.
    pub connections: Vec<Connection>,
    /// Attributes such as `src`.
    pub attributes: BTreeMap<String, ConstValue>,
}

impl Cell {
    /// Creates a cell without connections.
    pub fn new(id: CellId, name: Ident, kind: CellKind) -> Self {
        Self {
            id,
            name,
            kind,
            connections: Vec::new(),
            attributes: BTreeMap::new(),
        }
    }

    /// Returns the signal connected to `port`.
    pub fn port(&self, port: Ident) -> Option<&SigSpec> {
        self.connections
            .iter()
            .find(|c| c.port == port)
            .map(|c| &c.signal)
    }

    /// Connects `port`, replacing an existing connection of the same name.
    pub fn set_port(&mut self, port: Ident, direction: PortDirection, signal: SigSpec) {
        match self.connections.iter_mut().find(|c| c.port == port) {
            Some(conn) => {
                conn.direction = direction;
                conn.signal = signal;
            }
            None => self.connections.push(Connection {
                port,
                direction,
                signal,
            }),
        }
    }

    /// Returns the instantiated module name for [`CellKind::Instance`] cells.
    pub fn instance_of(&self) -> Option<Ident> {
        match self.kind {
            CellKind::Instance { module } => Some(module),
            _ => None,
        }
    }
}
