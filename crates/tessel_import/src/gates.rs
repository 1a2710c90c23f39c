//! Gate-level lowering: every primitive becomes single-bit gates.

use crate::error::ImportError;
use crate::importer::NetlistImporter;
use tessel_common::Logic;
use tessel_ir::{GateOp, SigSpec};
use tessel_netlist::{InstanceId, InstanceType, NetlistView, PortRole};

impl<V: NetlistView + ?Sized> NetlistImporter<'_, '_, V> {
    /// Lowers `inst` with the gate-level table.
    ///
    /// Returns `false` for tags the table does not cover.
    pub(crate) fn lower_gate(&mut self, inst: InstanceId, kind: InstanceType) -> Result<bool, ImportError> {
        use InstanceType::*;
        match kind {
            And | Or | Xor | Xnor => {
                let op = match kind {
                    And => GateOp::And,
                    Or => GateOp::Or,
                    Xor => GateOp::Xor,
                    _ => GateOp::Xnor,
                };
                let (a, b, y) = self.binary_pins(inst)?;
                let name = self.instance_ident(inst);
                self.b.logic_gate(name, op, a, b, y)?;
            }
            Nand | Nor => {
                let op = if kind == Nand { GateOp::And } else { GateOp::Or };
                let (a, b, y) = self.binary_pins(inst)?;
                let tmp = self.b.auto_wire(1)?;
                let inner = self.b.auto_name();
                self.b.logic_gate(inner, op, a, b, tmp.clone())?;
                let name = self.instance_ident(inst);
                self.b.unary_gate(name, GateOp::Not, tmp, y)?;
            }
            Inv => {
                let a = self.pin_sig(inst, PortRole::Input)?;
                let y = self.pin_sig(inst, PortRole::Output)?;
                let name = self.instance_ident(inst);
                self.b.unary_gate(name, GateOp::Not, a, y)?;
            }
            Mux => {
                let a = self.pin_sig(inst, PortRole::Input1)?;
                let b = self.pin_sig(inst, PortRole::Input2)?;
                let s = self.pin_sig(inst, PortRole::Control)?;
                let y = self.pin_sig(inst, PortRole::Output)?;
                let name = self.instance_ident(inst);
                self.b.mux_gate(name, a, b, s, y)?;
            }
            Tri => {
                let b = self.pin_sig(inst, PortRole::Input)?;
                let s = self.pin_sig(inst, PortRole::Control)?;
                let y = self.pin_sig(inst, PortRole::Output)?;
                let name = self.instance_ident(inst);
                self.b.mux_gate(name, Logic::Z.into(), b, s, y)?;
            }
            FullAdder => self.lower_full_adder_gates(inst)?,
            DffRs => {
                let clk = self.pin_sig(inst, PortRole::Clock)?;
                let d = self.pin_sig(inst, PortRole::Input)?;
                let q = self.pin_sig(inst, PortRole::Output)?;
                let set_gnd = self.is_gnd(inst, PortRole::Set);
                let reset_gnd = self.is_gnd(inst, PortRole::Reset);
                let name = self.instance_ident(inst);
                match (set_gnd, reset_gnd) {
                    (true, true) => {
                        self.b.dff_gate(name, clk, d, q)?;
                    }
                    (true, false) => {
                        let reset = self.pin_sig(inst, PortRole::Reset)?;
                        self.b.adff_gate(name, clk, reset, d, q, Logic::Zero)?;
                    }
                    (false, true) => {
                        let set = self.pin_sig(inst, PortRole::Set)?;
                        self.b.adff_gate(name, clk, set, d, q, Logic::One)?;
                    }
                    (false, false) => {
                        let set = self.pin_sig(inst, PortRole::Set)?;
                        let reset = self.pin_sig(inst, PortRole::Reset)?;
                        self.b.dffsr_gate(name, clk, set, reset, d, q)?;
                    }
                }
            }
            Buf | DlatchRs | Pwr | Gnd | X | Z | Pullup | Pulldown | SvaPosedge | SvaAt
            | SvaImmediateAssert | SvaAssert | SvaImmediateAssume | SvaAssume | SvaImmediateCover
            | SvaCover | Adder | Multiplier | Divider | Modulo | Remainder | ShiftLeft
            | ShiftRight | Decoder | EnabledDecoder | ReduceAnd | ReduceOr | ReduceXor
            | ReduceXnor | LessThan | WideAnd | WideOr | WideXor | WideXnor | WideBuf | WideInv
            | Minus | UnaryMinus | Equal | NotEqual | WideMux | WideTri | WideDffRs | ReadPort
            | WritePort | ClockedWritePort | Selector | WideSelector | PrioritySelector | Power
            | User => return Ok(false),
        }
        Ok(true)
    }

    /// The two operands and the result of a 2-input primitive.
    pub(crate) fn binary_pins(
        &self,
        inst: InstanceId,
    ) -> Result<(SigSpec, SigSpec, SigSpec), ImportError> {
        Ok((
            self.pin_sig(inst, PortRole::Input1)?,
            self.pin_sig(inst, PortRole::Input2)?,
            self.pin_sig(inst, PortRole::Output)?,
        ))
    }

    /// `y = a ^ b ^ c`, `cout = (a ^ b) & c | a & b`, as five gates.
    fn lower_full_adder_gates(&mut self, inst: InstanceId) -> Result<(), ImportError> {
        let a = self.pin_sig(inst, PortRole::Input1)?;
        let b = self.pin_sig(inst, PortRole::Input2)?;
        let c = self.pin_sig(inst, PortRole::Cin)?;
        let cout = match self.opt_pin_sig(inst, PortRole::Cout)? {
            Some(sig) => sig,
            None => self.b.auto_wire(1)?,
        };
        let y = match self.opt_pin_sig(inst, PortRole::Output)? {
            Some(sig) => sig,
            None => self.b.auto_wire(1)?,
        };
        let half = self.b.auto_wire(1)?;
        let carry_from_half = self.b.auto_wire(1)?;
        let carry_from_inputs = self.b.auto_wire(1)?;

        let name = self.b.auto_name();
        self.b.logic_gate(name, GateOp::Xor, a.clone(), b.clone(), half.clone())?;
        let name = self.instance_ident(inst);
        self.b.logic_gate(name, GateOp::Xor, half.clone(), c.clone(), y)?;
        let name = self.b.auto_name();
        self.b.logic_gate(name, GateOp::And, half, c, carry_from_half.clone())?;
        let name = self.b.auto_name();
        self.b.logic_gate(name, GateOp::And, a, b, carry_from_inputs.clone())?;
        let name = self.b.auto_name();
        self.b.logic_gate(name, GateOp::Or, carry_from_half, carry_from_inputs, cout)?;
        Ok(())
    }
}
