//! Shared helpers for the importer integration tests: configuration
//! shortcuts, a wrapper around one import run, and a small evaluator for
//! the combinational subset of the produced modules.

#![allow(dead_code)]

use std::collections::HashMap;
use tessel_common::{Ident, Interner, Logic};
use tessel_config::{load_config_from_str, ImportConfig};
use tessel_diagnostics::{Diagnostic, DiagnosticSink};
use tessel_import::{import_design, ImportError};
use tessel_ir::{BinaryOp, Cell, CellKind, Design, GateOp, Module, SigBit, SigSpec, UnaryOp, Wire};
use tessel_netlist::{Direction, InstanceId, InstanceType, NetId, NetlistDb, NetlistId, PortRole};

/// Builds an import configuration from the body of an `[import]` table.
pub fn make_config(body: &str) -> ImportConfig {
    load_config_from_str(&format!("[import]\n{body}\n"))
        .unwrap()
        .import
}

/// Default configuration with a single top.
pub fn top(name: &str) -> ImportConfig {
    make_config(&format!("top = \"{name}\""))
}

/// Outcome of one import run.
pub struct Imported {
    /// The design or the fatal error.
    pub result: Result<Design, ImportError>,
    /// Interner holding every name in the design.
    pub interner: Interner,
    /// Warnings emitted during the run.
    pub diagnostics: Vec<Diagnostic>,
}

impl Imported {
    pub fn design(&self) -> &Design {
        match &self.result {
            Ok(design) => design,
            Err(err) => panic!("import failed: {err}"),
        }
    }

    pub fn error(&self) -> &ImportError {
        match &self.result {
            Ok(_) => panic!("import unexpectedly succeeded"),
            Err(err) => err,
        }
    }

    pub fn ident(&self, name: &str) -> Ident {
        self.interner.get_or_intern(name)
    }

    pub fn name(&self, ident: Ident) -> &str {
        self.interner.resolve(ident)
    }

    pub fn module(&self, name: &str) -> &Module {
        self.design()
            .module_by_name(self.ident(name))
            .unwrap_or_else(|| panic!("no module `{name}`"))
    }

    pub fn wire<'a>(&self, module: &'a Module, name: &str) -> &'a Wire {
        module
            .wire_by_name(self.ident(name))
            .unwrap_or_else(|| panic!("no wire `{name}`"))
    }

    pub fn cell<'a>(&self, module: &'a Module, name: &str) -> &'a Cell {
        module
            .cell_by_name(self.ident(name))
            .unwrap_or_else(|| panic!("no cell `{name}`"))
    }

    /// The signal on `port` of `cell`.
    pub fn port<'a>(&self, cell: &'a Cell, port: &str) -> &'a SigSpec {
        cell.port(self.ident(port))
            .unwrap_or_else(|| panic!("no port `{port}`"))
    }

    /// All bits of the named wire, least significant first.
    pub fn bits(&self, module: &Module, name: &str) -> SigSpec {
        let wire = self.wire(module, name);
        SigSpec::from_wire(wire.id, wire.width)
    }
}

/// Runs the importer on `db` with `config`.
pub fn import(db: &mut NetlistDb, config: &ImportConfig) -> Imported {
    let interner = Interner::new();
    let sink = DiagnosticSink::new();
    let result = import_design(db, config, &interner, &sink);
    Imported {
        result,
        interner,
        diagnostics: sink.take_all(),
    }
}

/// Adds a scalar port with its net.
pub fn port(db: &mut NetlistDb, nl: NetlistId, name: &str, direction: Direction) -> NetId {
    db.add_port_with_net(nl, name, direction).1
}

/// Places a primitive and connects its roles in order.
pub fn prim(
    db: &mut NetlistDb,
    nl: NetlistId,
    kind: InstanceType,
    name: &str,
    pins: &[(PortRole, NetId)],
) -> InstanceId {
    let view = db.primitive(kind);
    let inst = db.add_instance(nl, name, view);
    for &(role, net) in pins {
        db.connect_role(inst, role, net);
    }
    inst
}

/// Bit values computed by [`evaluate`].
pub struct Values {
    bits: HashMap<SigBit, Logic>,
}

impl Values {
    pub fn bit(&self, bit: SigBit) -> Logic {
        match bit {
            SigBit::Const(value) => value,
            wire => self.bits.get(&wire).copied().unwrap_or(Logic::X),
        }
    }

    /// The signal as an unsigned number, if every bit is defined.
    pub fn read(&self, sig: &SigSpec) -> Option<u64> {
        let mut value = 0u64;
        for (i, bit) in sig.iter().enumerate() {
            match self.bit(bit) {
                Logic::Zero => {}
                Logic::One => value |= 1 << i,
                _ => return None,
            }
        }
        Some(value)
    }
}

/// Propagates `inputs` through gates, muxes, unsigned word operators and
/// assignments until nothing changes.
pub fn evaluate(module: &Module, interner: &Interner, inputs: &[(&SigSpec, u64)]) -> Values {
    let mut values = Values {
        bits: HashMap::new(),
    };
    for (sig, value) in inputs {
        for (i, bit) in sig.iter().enumerate() {
            values
                .bits
                .insert(bit, Logic::from_bool(value >> i & 1 == 1));
        }
    }
    let port = |cell: &Cell, name: &str| cell.port(interner.get_or_intern(name)).cloned();

    loop {
        let mut changed = false;
        let mut drive = |values: &mut Values, target: &SigSpec, bits: Vec<Logic>| {
            for (bit, value) in target.iter().zip(bits) {
                if bit.is_const() || values.bit(bit) == value {
                    continue;
                }
                values.bits.insert(bit, value);
                changed = true;
            }
        };

        for assign in &module.assignments {
            let bits = assign.value.iter().map(|b| values.bit(b)).collect();
            drive(&mut values, &assign.target, bits);
        }
        for cell in module.cells.values() {
            let (Some(a), Some(y)) = (port(cell, "A"), port(cell, "Y")) else {
                continue;
            };
            let a0 = values.bit(a[0]);
            let out = match &cell.kind {
                CellKind::Gate(op) => {
                    let b0 = port(cell, "B").map_or(Logic::X, |b| values.bit(b[0]));
                    let s0 = port(cell, "S").map_or(Logic::X, |s| values.bit(s[0]));
                    let bit = match op {
                        GateOp::And => a0 & b0,
                        GateOp::Or => a0 | b0,
                        GateOp::Xor => a0 ^ b0,
                        GateOp::Xnor => !(a0 ^ b0),
                        GateOp::Not => !a0,
                        GateOp::Buf => a0,
                        GateOp::Mux => match s0 {
                            Logic::Zero => a0,
                            Logic::One => b0,
                            _ => Logic::X,
                        },
                    };
                    vec![bit]
                }
                CellKind::Mux { .. } => {
                    let (Some(b), Some(s)) = (port(cell, "B"), port(cell, "S")) else {
                        continue;
                    };
                    match values.bit(s[0]) {
                        Logic::Zero => a.iter().map(|bit| values.bit(bit)).collect(),
                        Logic::One => b.iter().map(|bit| values.bit(bit)).collect(),
                        _ => vec![Logic::X; y.width() as usize],
                    }
                }
                CellKind::Unary { op, signed: false } => {
                    let bits: Vec<Logic> = a.iter().map(|bit| values.bit(bit)).collect();
                    let reduced = |init: Logic, f: fn(Logic, Logic) -> Logic| {
                        let mut out = vec![bits.iter().fold(init, |acc, &bit| f(acc, bit))];
                        out.resize(y.width() as usize, Logic::Zero);
                        out
                    };
                    match op {
                        UnaryOp::Not => bits.iter().map(|&bit| !bit).collect(),
                        UnaryOp::Pos => bits.clone(),
                        UnaryOp::ReduceAnd => reduced(Logic::One, |x, z| x & z),
                        UnaryOp::ReduceOr => reduced(Logic::Zero, |x, z| x | z),
                        UnaryOp::ReduceXor => reduced(Logic::Zero, |x, z| x ^ z),
                        UnaryOp::ReduceXnor => {
                            let mut out = reduced(Logic::Zero, |x, z| x ^ z);
                            out[0] = !out[0];
                            out
                        }
                        UnaryOp::Neg => continue,
                    }
                }
                CellKind::Binary { op, signed: false } => {
                    let Some(b) = port(cell, "B") else { continue };
                    let (Some(x), Some(z)) = (values.read(&a), values.read(&b)) else {
                        continue;
                    };
                    let result = match op {
                        BinaryOp::And => x & z,
                        BinaryOp::Or => x | z,
                        BinaryOp::Xor => x ^ z,
                        BinaryOp::Add => x + z,
                        BinaryOp::Sub => x.wrapping_sub(z),
                        BinaryOp::Mul => x * z,
                        BinaryOp::Div if z != 0 => x / z,
                        BinaryOp::Mod if z != 0 => x % z,
                        BinaryOp::Shl => u32::try_from(z)
                            .ok()
                            .and_then(|amount| x.checked_shl(amount))
                            .unwrap_or(0),
                        BinaryOp::Shr => u32::try_from(z)
                            .ok()
                            .and_then(|amount| x.checked_shr(amount))
                            .unwrap_or(0),
                        BinaryOp::Lt => u64::from(x < z),
                        BinaryOp::Le => u64::from(x <= z),
                        BinaryOp::Eq => u64::from(x == z),
                        BinaryOp::Ne => u64::from(x != z),
                        _ => continue,
                    };
                    (0..y.width()).map(|i| Logic::from_bool(result >> i & 1 == 1)).collect()
                }
                _ => continue,
            };
            drive(&mut values, &y, out);
        }
        if !changed {
            return values;
        }
    }
}
