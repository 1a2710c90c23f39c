//! Cell-level lowering: primitives and operators become word-level cells.

use crate::error::ImportError;
use crate::importer::{Carry, NetlistImporter};
use tessel_common::Logic;
use tessel_ir::{BinaryOp, SigSpec, UnaryOp};
use tessel_netlist::{InstanceId, InstanceType, NetlistView, PortRole};

use PortRole::{Clock, Control, Input, Input1, Input2, Output, Reset, Set};

impl<V: NetlistView + ?Sized> NetlistImporter<'_, '_, V> {
    /// Lowers `inst` with the cell-level table.
    ///
    /// Returns `false` for tags the table does not cover.
    pub(crate) fn lower_cell(&mut self, inst: InstanceId, kind: InstanceType) -> Result<bool, ImportError> {
        use InstanceType::*;
        match kind {
            And | Or | Xor | Xnor => {
                let (a, b, y) = self.binary_pins(inst)?;
                let name = self.instance_ident(inst);
                self.b.binary(name, bitwise(kind), false, a, b, y)?;
            }
            Nand | Nor => {
                let op = if kind == Nand { BinaryOp::And } else { BinaryOp::Or };
                let (a, b, y) = self.binary_pins(inst)?;
                let tmp = self.b.auto_wire(1)?;
                let inner = self.b.auto_name();
                self.b.binary(inner, op, false, a, b, tmp.clone())?;
                let name = self.instance_ident(inst);
                self.b.unary(name, UnaryOp::Not, false, tmp, y)?;
            }
            Inv => {
                let a = self.pin_sig(inst, Input)?;
                let y = self.pin_sig(inst, Output)?;
                let name = self.instance_ident(inst);
                self.b.unary(name, UnaryOp::Not, false, a, y)?;
            }
            Mux => {
                let a = self.pin_sig(inst, Input1)?;
                let b = self.pin_sig(inst, Input2)?;
                let s = self.pin_sig(inst, Control)?;
                let y = self.pin_sig(inst, Output)?;
                let name = self.instance_ident(inst);
                self.b.mux(name, a, b, s, y)?;
            }
            Tri => {
                let b = self.pin_sig(inst, Input)?;
                let s = self.pin_sig(inst, Control)?;
                let y = self.pin_sig(inst, Output)?;
                let name = self.instance_ident(inst);
                self.b.mux(name, Logic::Z.into(), b, s, y)?;
            }
            FullAdder => self.lower_full_adder_cells(inst)?,
            DffRs => self.lower_dff_rs(inst)?,
            DlatchRs => {
                let en = self.pin_sig(inst, Control)?;
                let d = self.pin_sig(inst, Input)?;
                let q = self.pin_sig(inst, Output)?;
                let name = self.instance_ident(inst);
                if self.is_gnd(inst, Set) && self.is_gnd(inst, Reset) {
                    self.b.dlatch(name, en, d, q)?;
                } else {
                    let set = self.pin_sig(inst, Set)?;
                    let reset = self.pin_sig(inst, Reset)?;
                    self.b.dlatchsr(name, en, set, reset, d, q)?;
                }
            }

            Adder => self.lower_adder(inst)?,
            Multiplier | Divider | Modulo | Remainder | Minus | WideAnd | WideOr | WideXor
            | WideXnor => {
                let op = match kind {
                    Multiplier => BinaryOp::Mul,
                    Divider => BinaryOp::Div,
                    Modulo | Remainder => BinaryOp::Mod,
                    Minus => BinaryOp::Sub,
                    _ => bitwise(kind),
                };
                let a = self.operand(inst, Input1)?;
                let b = self.operand(inst, Input2)?;
                let y = self.operator_output(inst)?;
                let signed = self.signed(inst);
                let name = self.instance_ident(inst);
                self.b.binary(name, op, signed, a, b, y)?;
            }
            ShiftLeft => {
                let a = self.operand(inst, Input1)?;
                let b = self.operand(inst, Input2)?;
                let y = self.operator_output(inst)?;
                let name = self.instance_ident(inst);
                self.b.binary(name, BinaryOp::Shl, false, a, b, y)?;
            }
            ShiftRight => self.lower_shift_right(inst)?,
            Decoder | EnabledDecoder => {
                let amount = self.operand(inst, Input)?;
                let y = self.operator_output(inst)?;
                let mut one_hot = if kind == EnabledDecoder {
                    self.pin_sig(inst, Control)?
                } else {
                    Logic::One.into()
                };
                one_hot.append(&SigSpec::constant(Logic::Zero, y.width().saturating_sub(1)));
                let name = self.instance_ident(inst);
                self.b.binary(name, BinaryOp::Shl, false, one_hot, amount, y)?;
            }
            ReduceAnd | ReduceOr | ReduceXor | ReduceXnor => {
                let op = match kind {
                    ReduceAnd => UnaryOp::ReduceAnd,
                    ReduceOr => UnaryOp::ReduceOr,
                    ReduceXor => UnaryOp::ReduceXor,
                    _ => UnaryOp::ReduceXnor,
                };
                let a = self.operand(inst, Input)?;
                let y = self.result(inst)?;
                let signed = self.signed(inst);
                let name = self.instance_ident(inst);
                self.b.unary(name, op, signed, a, y)?;
            }
            WideBuf | WideInv | UnaryMinus => {
                let op = match kind {
                    WideBuf => UnaryOp::Pos,
                    WideInv => UnaryOp::Not,
                    _ => UnaryOp::Neg,
                };
                let a = self.operand(inst, Input)?;
                let y = self.operator_output(inst)?;
                let signed = self.signed(inst);
                let name = self.instance_ident(inst);
                self.b.unary(name, op, signed, a, y)?;
            }
            LessThan => {
                let op = match self.carry_in(inst) {
                    Carry::Zero => BinaryOp::Lt,
                    Carry::One => BinaryOp::Le,
                    Carry::Net(_) => {
                        return Err(self.carry_error(inst, "neither constant 0 nor constant 1"))
                    }
                };
                self.compare(inst, op)?;
            }
            Equal => self.compare(inst, BinaryOp::Eq)?,
            NotEqual => self.compare(inst, BinaryOp::Ne)?,
            WideMux => {
                let a = self.operand(inst, Input1)?;
                let b = self.operand(inst, Input2)?;
                let s = self.pin_sig(inst, Control)?;
                let y = self.operator_output(inst)?;
                let name = self.instance_ident(inst);
                self.b.mux(name, a, b, s, y)?;
            }
            WideTri => {
                let b = self.operand(inst, Input)?;
                let s = self.pin_sig(inst, Control)?;
                let y = self.operator_output(inst)?;
                let a = SigSpec::constant(Logic::Z, y.width());
                let name = self.instance_ident(inst);
                self.b.mux(name, a, b, s, y)?;
            }
            WideDffRs => {
                let clk = self.pin_sig(inst, Clock)?;
                let d = self.operand(inst, Input)?;
                let q = self.operator_output(inst)?;
                let set = self.inport(inst, Set)?;
                let reset = self.inport(inst, Reset)?;
                let name = self.instance_ident(inst);
                let never = |sig: &SigSpec| sig.is_fully_const() && !sig.as_bool();
                if never(&set) && never(&reset) {
                    self.b.dff(name, clk, d, q)?;
                } else {
                    self.b.dffsr(name, clk, set, reset, d, q)?;
                }
            }

            Buf | Pwr | Gnd | X | Z | Pullup | Pulldown | SvaPosedge | SvaAt
            | SvaImmediateAssert | SvaAssert | SvaImmediateAssume | SvaAssume
            | SvaImmediateCover | SvaCover | ReadPort | WritePort | ClockedWritePort | Selector
            | WideSelector | PrioritySelector | Power | User => return Ok(false),
        }
        Ok(true)
    }

    fn carry_error(&self, inst: InstanceId, reason: &'static str) -> ImportError {
        ImportError::UnsupportedCarryPattern {
            instance: self.view.instance_name(inst).to_string(),
            kind: self.view.instance_type(inst).to_string(),
            reason,
        }
    }

    fn compare(&mut self, inst: InstanceId, op: BinaryOp) -> Result<(), ImportError> {
        let a = self.operand(inst, Input1)?;
        let b = self.operand(inst, Input2)?;
        let y = self.result(inst)?;
        let signed = self.signed(inst);
        let name = self.instance_ident(inst);
        self.b.binary(name, op, signed, a, b, y)?;
        Ok(())
    }

    /// `{cout, y} = a + b + cin` as two 2-bit additions.
    fn lower_full_adder_cells(&mut self, inst: InstanceId) -> Result<(), ImportError> {
        let a = self.pin_sig(inst, Input1)?;
        let b = self.pin_sig(inst, Input2)?;
        let cin = self.pin_sig(inst, PortRole::Cin)?;
        let a_plus_b = self.b.auto_wire(2)?;
        let mut y = match self.opt_pin_sig(inst, Output)? {
            Some(sig) => sig,
            None => self.b.auto_wire(1)?,
        };
        if let Some(cout) = self.opt_pin_sig(inst, PortRole::Cout)? {
            y.append(&cout);
        }

        let inner = self.b.auto_name();
        self.b.binary(inner, BinaryOp::Add, false, a, b, a_plus_b.clone())?;
        let name = self.instance_ident(inst);
        self.b.binary(name, BinaryOp::Add, false, a_plus_b, cin, y)?;
        Ok(())
    }

    fn lower_dff_rs(&mut self, inst: InstanceId) -> Result<(), ImportError> {
        let clk = self.pin_sig(inst, Clock)?;
        let d = self.pin_sig(inst, Input)?;
        let q = self.pin_sig(inst, Output)?;
        let set_gnd = self.is_gnd(inst, Set);
        let reset_gnd = self.is_gnd(inst, Reset);
        let name = self.instance_ident(inst);
        match (set_gnd, reset_gnd) {
            (true, true) => self.b.dff(name, clk, d, q)?,
            (true, false) => {
                let reset = self.pin_sig(inst, Reset)?;
                self.b.adff(name, clk, reset, d, q, Logic::Zero)?
            }
            (false, true) => {
                let set = self.pin_sig(inst, Set)?;
                self.b.adff(name, clk, set, d, q, Logic::One)?
            }
            (false, false) => {
                let set = self.pin_sig(inst, Set)?;
                let reset = self.pin_sig(inst, Reset)?;
                self.b.dffsr(name, clk, set, reset, d, q)?
            }
        };
        Ok(())
    }

    /// An adder with a live carry-in becomes two additions; a carry-out pin
    /// widens the result by one bit.
    fn lower_adder(&mut self, inst: InstanceId) -> Result<(), ImportError> {
        let a = self.operand(inst, Input1)?;
        let b = self.operand(inst, Input2)?;
        let mut out = self.operator_output(inst)?;
        if let Some(cout) = self.opt_pin_sig(inst, PortRole::Cout)? {
            out.append(&cout);
        }
        let signed = self.signed(inst);

        let cin = match self.carry_in(inst) {
            Carry::Zero => {
                let name = self.instance_ident(inst);
                self.b.binary(name, BinaryOp::Add, signed, a, b, out)?;
                return Ok(());
            }
            Carry::One => Logic::One.into(),
            Carry::Net(net) => self.net(net)?.into(),
        };
        let sum = self.b.auto_wire(out.width())?;
        let inner = self.b.auto_name();
        self.b.binary(inner, BinaryOp::Add, signed, a, b, sum.clone())?;
        let name = self.instance_ident(inst);
        self.b.binary(name, BinaryOp::Add, false, sum, cin, out)?;
        Ok(())
    }

    /// Logical shift for a zero fill, arithmetic when the fill is the
    /// operand's own sign bit.
    fn lower_shift_right(&mut self, inst: InstanceId) -> Result<(), ImportError> {
        let (op, signed) = match self.carry_in(inst) {
            Carry::Zero => (BinaryOp::Shr, false),
            Carry::Net(net) if self.view.pins(inst, Input1).last() == Some(&Some(net)) => {
                (BinaryOp::Sshr, true)
            }
            Carry::One | Carry::Net(_) => {
                return Err(self.carry_error(
                    inst,
                    "neither constant 0 nor the most significant bit of the left operand",
                ))
            }
        };
        let a = self.operand(inst, Input1)?;
        let b = self.operand(inst, Input2)?;
        let y = self.operator_output(inst)?;
        let name = self.instance_ident(inst);
        self.b.binary(name, op, signed, a, b, y)?;
        Ok(())
    }
}

/// The bitwise operator for a 2-input logic tag.
fn bitwise(kind: InstanceType) -> BinaryOp {
    match kind {
        InstanceType::And | InstanceType::WideAnd => BinaryOp::And,
        InstanceType::Or | InstanceType::WideOr => BinaryOp::Or,
        InstanceType::Xor | InstanceType::WideXor => BinaryOp::Xor,
        _ => BinaryOp::Xnor,
    }
}
