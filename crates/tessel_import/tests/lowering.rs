//! Primitive and operator lowering in both modes.

mod common;

use common::{evaluate, import, make_config, port, prim, top, Imported};
use tessel_common::Logic;
use tessel_config::ImportConfig;
use tessel_import::{ImportError, W300, W301};
use tessel_ir::{BinaryOp, CellKind, GateOp, Module, SigBit, SigSpec, UnaryOp};
use tessel_netlist::{Direction, InstanceType, NetId, NetlistDb, NetlistEdit, NetlistId, PortRole};

use Direction::{In, Out};
use PortRole::*;

fn gates(name: &str) -> ImportConfig {
    make_config(&format!("top = \"{name}\"\nmode = \"gates\""))
}

/// `top(a, b, c) -> (y, co)` around one full-adder primitive.
fn full_adder() -> NetlistDb {
    let mut db = NetlistDb::new();
    let top = db.add_netlist("top");
    let a = port(&mut db, top, "a", In);
    let b = port(&mut db, top, "b", In);
    let c = port(&mut db, top, "c", In);
    let y = port(&mut db, top, "y", Out);
    let co = port(&mut db, top, "co", Out);
    prim(
        &mut db,
        top,
        InstanceType::FullAdder,
        "fa",
        &[(Input1, a), (Input2, b), (Cin, c), (Output, y), (Cout, co)],
    );
    db
}

#[test]
fn full_adder_tables_agree() {
    for config in [top("top"), gates("top")] {
        let mut db = full_adder();
        let imported = import(&mut db, &config);
        let m = imported.module("top");
        let [a, b, c, y, co] = ["a", "b", "c", "y", "co"].map(|n| imported.bits(m, n));
        for bits in 0u64..8 {
            let (x0, x1, x2) = (bits & 1, bits >> 1 & 1, bits >> 2 & 1);
            let values = evaluate(m, &imported.interner, &[(&a, x0), (&b, x1), (&c, x2)]);
            let sum = x0 + x1 + x2;
            assert_eq!(values.read(&y), Some(sum & 1), "{config:?} {bits:03b}");
            assert_eq!(values.read(&co), Some(sum >> 1), "{config:?} {bits:03b}");
        }
    }
}

#[test]
fn full_adder_gate_structure() {
    let mut db = full_adder();
    let imported = import(&mut db, &gates("top"));
    let m = imported.module("top");
    let ops: Vec<_> = m.cells.values().map(|c| c.kind.clone()).collect();
    assert_eq!(ops.len(), 5);
    assert_eq!(
        imported.cell(m, "fa").kind,
        CellKind::Gate(GateOp::Xor),
        "the named gate produces the sum"
    );
    assert_eq!(
        ops.iter().filter(|k| **k == CellKind::Gate(GateOp::And)).count(),
        2
    );
}

#[test]
fn nand_is_inverted_and() {
    for (config, inner, outer) in [
        (
            top("top"),
            CellKind::Binary { op: BinaryOp::And, signed: false },
            CellKind::Unary { op: UnaryOp::Not, signed: false },
        ),
        (gates("top"), CellKind::Gate(GateOp::And), CellKind::Gate(GateOp::Not)),
    ] {
        let mut db = NetlistDb::new();
        let t = db.add_netlist("top");
        let a = port(&mut db, t, "a", In);
        let b = port(&mut db, t, "b", In);
        let y = port(&mut db, t, "y", Out);
        prim(&mut db, t, InstanceType::Nand, "n1", &[(Input1, a), (Input2, b), (Output, y)]);

        let imported = import(&mut db, &config);
        let m = imported.module("top");
        assert_eq!(m.cells.len(), 2);
        let named = imported.cell(m, "n1");
        assert_eq!(named.kind, outer);
        assert!(m.cells.values().any(|c| c.kind == inner));

        let (a, b, y) = (imported.bits(m, "a"), imported.bits(m, "b"), imported.bits(m, "y"));
        let values = evaluate(m, &imported.interner, &[(&a, 1), (&b, 1)]);
        assert_eq!(values.read(&y), Some(0));
    }
}

#[test]
fn tri_state_selects_high_impedance() {
    let mut db = NetlistDb::new();
    let t = db.add_netlist("top");
    let i = port(&mut db, t, "i", In);
    let en = port(&mut db, t, "en", In);
    let y = port(&mut db, t, "y", Out);
    prim(&mut db, t, InstanceType::Tri, "t1", &[(Input, i), (Control, en), (Output, y)]);

    let imported = import(&mut db, &top("top"));
    let m = imported.module("top");
    let cell = imported.cell(m, "t1");
    assert_eq!(cell.kind, CellKind::Mux { width: 1 });
    assert_eq!(imported.port(cell, "A"), &SigSpec::from(Logic::Z));
    assert_eq!(imported.port(cell, "B"), &imported.bits(m, "i"));
    assert_eq!(imported.port(cell, "S"), &imported.bits(m, "en"));
}

/// A flip-flop with set and reset tied as given; `None` means a live input.
fn flop(set: Option<bool>, reset: Option<bool>, config: &ImportConfig) -> CellKind {
    let mut db = NetlistDb::new();
    let t = db.add_netlist("top");
    let clk = port(&mut db, t, "clk", In);
    let d = port(&mut db, t, "d", In);
    let q = port(&mut db, t, "q", Out);
    let s = port(&mut db, t, "s", In);
    let r = port(&mut db, t, "r", In);
    let gnd = db.gnd_net(t);
    let tie = |live: NetId, tied: Option<bool>| if tied == Some(false) { gnd } else { live };
    let (set, reset) = (tie(s, set), tie(r, reset));
    prim(
        &mut db,
        t,
        InstanceType::DffRs,
        "ff",
        &[(Set, set), (Reset, reset), (Clock, clk), (Input, d), (Output, q)],
    );
    let imported = import(&mut db, config);
    let m = imported.module("top");
    imported.cell(m, "ff").kind.clone()
}

#[test]
fn flop_variants() {
    let cells = top("top");
    assert_eq!(flop(Some(false), Some(false), &cells), CellKind::Dff { width: 1 });
    assert_eq!(
        flop(Some(false), None, &cells),
        CellKind::Adff { width: 1, arst_value: Logic::Zero }
    );
    assert_eq!(
        flop(None, Some(false), &cells),
        CellKind::Adff { width: 1, arst_value: Logic::One }
    );
    assert_eq!(flop(None, None, &cells), CellKind::Dffsr { width: 1 });

    let g = gates("top");
    assert_eq!(flop(Some(false), Some(false), &g), CellKind::DffGate);
    assert_eq!(flop(Some(false), None, &g), CellKind::AdffGate { arst_value: Logic::Zero });
    assert_eq!(flop(None, None, &g), CellKind::DffsrGate);
}

/// `top` with 4-bit nets `a`, `b`, `y` and one operator instance `op`.
struct OperatorFixture {
    db: NetlistDb,
    top: NetlistId,
    a: Vec<NetId>,
    b: Vec<NetId>,
    y: Vec<NetId>,
}

impl OperatorFixture {
    fn new() -> Self {
        let mut db = NetlistDb::new();
        let top = db.add_netlist("top");
        let mut bus = |name: &str| -> Vec<NetId> {
            (0..4).map(|i| db.add_net(top, &format!("{name}{i}"))).collect()
        };
        let (a, b, y) = (bus("a"), bus("b"), bus("y"));
        Self { db, top, a, b, y }
    }

    /// Places operator `op` with its buses and scalar pins connected.
    fn place(
        &mut self,
        kind: InstanceType,
        name: &str,
        buses: &[(PortRole, &[NetId])],
        scalars: &[(PortRole, NetId)],
    ) {
        let widths: Vec<(PortRole, u32)> = buses
            .iter()
            .map(|&(role, nets)| (role, nets.len() as u32))
            .collect();
        let roles: Vec<PortRole> = scalars.iter().map(|&(role, _)| role).collect();
        let view = self.db.operator(kind, name, &widths, &roles, false);
        let inst = self.db.add_instance(self.top, "op", view);
        for &(role, nets) in buses {
            self.db.connect_role_bus(inst, role, nets);
        }
        for &(role, net) in scalars {
            self.db.connect_role(inst, role, net);
        }
    }

    /// Places a binary operator with a carry-in tied to `cin`.
    fn binary(&mut self, kind: InstanceType, name: &str, signed: bool, cin: Option<NetId>) {
        let scalars: &[PortRole] = if cin.is_some() { &[Cin] } else { &[] };
        let view = self.db.operator(
            kind,
            name,
            &[(Input1, 4), (Input2, 4), (Output, 4)],
            scalars,
            signed,
        );
        let inst = self.db.add_instance(self.top, "op", view);
        self.db.connect_role_bus(inst, Input1, &self.a);
        self.db.connect_role_bus(inst, Input2, &self.b);
        self.db.connect_role_bus(inst, Output, &self.y);
        if let Some(net) = cin {
            self.db.connect_role(inst, Cin, net);
        }
    }
}

/// The fixture nets `{prefix}0`, `{prefix}1`, ... as one signal.
fn nets(imported: &Imported, m: &Module, prefix: &str, width: u32) -> SigSpec {
    (0..width)
        .map(|i| imported.bits(m, &format!("{prefix}{i}"))[0])
        .collect()
}

#[test]
fn shift_right_carry_patterns() {
    let mut f = OperatorFixture::new();
    let gnd = f.db.gnd_net(f.top);
    f.binary(InstanceType::ShiftRight, "shr_4", false, Some(gnd));
    let imported = import(&mut f.db, &top("top"));
    let cell = imported.cell(imported.module("top"), "op");
    assert_eq!(cell.kind, CellKind::Binary { op: BinaryOp::Shr, signed: false });

    let mut f = OperatorFixture::new();
    let msb = f.a[3];
    f.binary(InstanceType::ShiftRight, "shr_4", false, Some(msb));
    let imported = import(&mut f.db, &top("top"));
    let cell = imported.cell(imported.module("top"), "op");
    assert_eq!(cell.kind, CellKind::Binary { op: BinaryOp::Sshr, signed: true });

    let mut f = OperatorFixture::new();
    let other = f.a[0];
    f.binary(InstanceType::ShiftRight, "shr_4", false, Some(other));
    let imported = import(&mut f.db, &top("top"));
    assert!(matches!(
        imported.error(),
        ImportError::UnsupportedCarryPattern { instance, .. } if instance == "op"
    ));
    assert_eq!(imported.error().code().to_string(), "E304");
}

#[test]
fn less_than_carry_selects_comparison() {
    let mut f = OperatorFixture::new();
    let pwr = f.db.pwr_net(f.top);
    f.binary(InstanceType::LessThan, "lt_4", true, Some(pwr));
    let imported = import(&mut f.db, &top("top"));
    let cell = imported.cell(imported.module("top"), "op");
    assert_eq!(cell.kind, CellKind::Binary { op: BinaryOp::Le, signed: true });

    let mut f = OperatorFixture::new();
    let live = f.db.add_net(f.top, "c");
    f.binary(InstanceType::LessThan, "lt_4", true, Some(live));
    let imported = import(&mut f.db, &top("top"));
    assert!(matches!(imported.error(), ImportError::UnsupportedCarryPattern { .. }));
}

#[test]
fn adder_with_live_carry_adds_twice() {
    let mut f = OperatorFixture::new();
    let cin = f.db.add_net(f.top, "cin");
    f.binary(InstanceType::Adder, "add_4", false, Some(cin));
    let imported = import(&mut f.db, &top("top"));
    let m = imported.module("top");
    let adds = m
        .cells
        .values()
        .filter(|c| matches!(c.kind, CellKind::Binary { op: BinaryOp::Add, .. }))
        .count();
    assert_eq!(adds, 2);

    let [a, b, y] = ["a", "b", "y"].map(|n| nets(&imported, m, n, 4));
    let c = imported.bits(m, "cin");
    let values = evaluate(m, &imported.interner, &[(&a, 5), (&b, 6), (&c, 1)]);
    assert_eq!(values.read(&y), Some(12));
}

#[test]
fn modulo_and_remainder_share_one_cell() {
    for kind in [InstanceType::Modulo, InstanceType::Remainder] {
        let mut f = OperatorFixture::new();
        f.binary(kind, "rem_4", false, None);
        let imported = import(&mut f.db, &top("top"));
        let m = imported.module("top");
        assert_eq!(
            imported.cell(m, "op").kind,
            CellKind::Binary { op: BinaryOp::Mod, signed: false },
            "{kind}"
        );
        let [a, b, y] = ["a", "b", "y"].map(|n| nets(&imported, m, n, 4));
        let values = evaluate(m, &imported.interner, &[(&a, 11), (&b, 4)]);
        assert_eq!(values.read(&y), Some(3), "{kind}");
    }
}

#[test]
fn equality_compares_whole_words() {
    for (kind, op) in [
        (InstanceType::Equal, BinaryOp::Eq),
        (InstanceType::NotEqual, BinaryOp::Ne),
    ] {
        let mut f = OperatorFixture::new();
        let (a, b, y) = (f.a.clone(), f.b.clone(), f.y.clone());
        f.place(kind, "eq_4", &[(Input1, &a[..]), (Input2, &b[..]), (Output, &y[..1])], &[]);
        let imported = import(&mut f.db, &top("top"));
        let m = imported.module("top");
        let cell = imported.cell(m, "op");
        assert_eq!(cell.kind, CellKind::Binary { op, signed: false });
        assert_eq!(imported.port(cell, "Y").width(), 1);

        let [a, b] = ["a", "b"].map(|n| nets(&imported, m, n, 4));
        let y = nets(&imported, m, "y", 1);
        for (x, z) in [(5, 5), (5, 4), (0, 8)] {
            let values = evaluate(m, &imported.interner, &[(&a, x), (&b, z)]);
            let equal = x == z;
            let expected = if kind == InstanceType::Equal { equal } else { !equal };
            assert_eq!(values.read(&y), Some(u64::from(expected)), "{kind} {x} {z}");
        }
    }
}

#[test]
fn reductions_fold_every_bit() {
    // Results for inputs 0000, 0111 and 1111.
    for (kind, op, expected) in [
        (InstanceType::ReduceAnd, UnaryOp::ReduceAnd, [0, 0, 1]),
        (InstanceType::ReduceOr, UnaryOp::ReduceOr, [0, 1, 1]),
        (InstanceType::ReduceXor, UnaryOp::ReduceXor, [0, 1, 0]),
        (InstanceType::ReduceXnor, UnaryOp::ReduceXnor, [1, 0, 1]),
    ] {
        let mut f = OperatorFixture::new();
        let (a, y) = (f.a.clone(), f.y.clone());
        f.place(kind, "reduce_4", &[(Input, &a[..]), (Output, &y[..1])], &[]);
        let imported = import(&mut f.db, &top("top"));
        let m = imported.module("top");
        assert_eq!(imported.cell(m, "op").kind, CellKind::Unary { op, signed: false });

        let a = nets(&imported, m, "a", 4);
        let y = nets(&imported, m, "y", 1);
        for (input, want) in [0b0000, 0b0111, 0b1111].into_iter().zip(expected) {
            let values = evaluate(m, &imported.interner, &[(&a, input)]);
            assert_eq!(values.read(&y), Some(want), "{kind} {input:04b}");
        }
    }
}

#[test]
fn decoder_shifts_a_constant_one() {
    let mut f = OperatorFixture::new();
    let (b, y) = (f.b.clone(), f.y.clone());
    f.place(InstanceType::Decoder, "decoder_2", &[(Input, &b[..2]), (Output, &y[..])], &[]);
    let imported = import(&mut f.db, &top("top"));
    let m = imported.module("top");
    let cell = imported.cell(m, "op");
    assert_eq!(cell.kind, CellKind::Binary { op: BinaryOp::Shl, signed: false });
    let seed = imported.port(cell, "A").as_const().map(|v| v.to_string());
    assert_eq!(seed.as_deref(), Some("0001"));

    let amount = nets(&imported, m, "b", 2);
    let y = nets(&imported, m, "y", 4);
    for shift in 0..4 {
        let values = evaluate(m, &imported.interner, &[(&amount, shift)]);
        assert_eq!(values.read(&y), Some(1 << shift));
    }
}

#[test]
fn enabled_decoder_seeds_with_enable() {
    let mut f = OperatorFixture::new();
    let en = f.db.add_net(f.top, "en");
    let (b, y) = (f.b.clone(), f.y.clone());
    f.place(
        InstanceType::EnabledDecoder,
        "enabled_decoder_2",
        &[(Input, &b[..2]), (Output, &y[..])],
        &[(Control, en)],
    );
    let imported = import(&mut f.db, &top("top"));
    let m = imported.module("top");
    let cell = imported.cell(m, "op");
    assert_eq!(cell.kind, CellKind::Binary { op: BinaryOp::Shl, signed: false });
    let en = imported.bits(m, "en");
    assert_eq!(imported.port(cell, "A")[0], en[0]);

    let amount = nets(&imported, m, "b", 2);
    let y = nets(&imported, m, "y", 4);
    let values = evaluate(m, &imported.interner, &[(&amount, 2), (&en, 1)]);
    assert_eq!(values.read(&y), Some(4));
    let values = evaluate(m, &imported.interner, &[(&amount, 2), (&en, 0)]);
    assert_eq!(values.read(&y), Some(0));
}

#[test]
fn wide_mux_selects_second_operand() {
    let mut f = OperatorFixture::new();
    let s = f.db.add_net(f.top, "s");
    let (a, b, y) = (f.a.clone(), f.b.clone(), f.y.clone());
    f.place(
        InstanceType::WideMux,
        "mux_4",
        &[(Input1, &a[..]), (Input2, &b[..]), (Output, &y[..])],
        &[(Control, s)],
    );
    let imported = import(&mut f.db, &top("top"));
    let m = imported.module("top");
    assert_eq!(imported.cell(m, "op").kind, CellKind::Mux { width: 4 });

    let [a, b, y] = ["a", "b", "y"].map(|n| nets(&imported, m, n, 4));
    let s = imported.bits(m, "s");
    let values = evaluate(m, &imported.interner, &[(&a, 3), (&b, 12), (&s, 0)]);
    assert_eq!(values.read(&y), Some(3));
    let values = evaluate(m, &imported.interner, &[(&a, 3), (&b, 12), (&s, 1)]);
    assert_eq!(values.read(&y), Some(12));
}

#[test]
fn wide_tri_state_floats_when_disabled() {
    let mut f = OperatorFixture::new();
    let en = f.db.add_net(f.top, "en");
    let (a, y) = (f.a.clone(), f.y.clone());
    f.place(InstanceType::WideTri, "tri_4", &[(Input, &a[..]), (Output, &y[..])], &[(Control, en)]);
    let imported = import(&mut f.db, &top("top"));
    let m = imported.module("top");
    let cell = imported.cell(m, "op");
    assert_eq!(cell.kind, CellKind::Mux { width: 4 });
    assert_eq!(imported.port(cell, "A"), &SigSpec::constant(Logic::Z, 4));

    let a = nets(&imported, m, "a", 4);
    let y = nets(&imported, m, "y", 4);
    let en = imported.bits(m, "en");
    let values = evaluate(m, &imported.interner, &[(&a, 9), (&en, 1)]);
    assert_eq!(values.read(&y), Some(9));
    let values = evaluate(m, &imported.interner, &[(&a, 9), (&en, 0)]);
    assert!(y.iter().all(|bit| values.bit(bit) == Logic::Z));
}

/// A 2-bit register whose second set bit is live when `live_set` is true;
/// every other set and reset bit is tied to ground.
fn wide_flop(live_set: bool) -> (Imported, CellKind) {
    let mut f = OperatorFixture::new();
    let gnd = f.db.gnd_net(f.top);
    let s1 = f.db.add_net(f.top, "s1");
    let clk = f.db.add_net(f.top, "clk");
    let set = [gnd, if live_set { s1 } else { gnd }];
    let reset = [gnd, gnd];
    let (a, y) = (f.a.clone(), f.y.clone());
    f.place(
        InstanceType::WideDffRs,
        "dffrs_2",
        &[(Input, &a[..2]), (Output, &y[..2]), (Set, &set[..]), (Reset, &reset[..])],
        &[(Clock, clk)],
    );
    let imported = import(&mut f.db, &top("top"));
    let kind = imported.cell(imported.module("top"), "op").kind.clone();
    (imported, kind)
}

#[test]
fn wide_flop_collapses_only_when_controls_are_ground() {
    let (imported, kind) = wide_flop(false);
    assert_eq!(kind, CellKind::Dff { width: 2 });
    let m = imported.module("top");
    let cell = imported.cell(m, "op");
    assert_eq!(imported.port(cell, "CLK"), &imported.bits(m, "clk"));
    assert_eq!(imported.port(cell, "D"), &nets(&imported, m, "a", 2));

    let (imported, kind) = wide_flop(true);
    assert_eq!(kind, CellKind::Dffsr { width: 2 });
    let m = imported.module("top");
    let cell = imported.cell(m, "op");
    let set: SigSpec = [SigBit::Const(Logic::Zero), imported.bits(m, "s1")[0]]
        .into_iter()
        .collect();
    assert_eq!(imported.port(cell, "SET"), &set);
    assert_eq!(imported.port(cell, "CLR"), &SigSpec::constant(Logic::Zero, 2));
}

#[test]
fn operators_are_hierarchy_in_gate_mode() {
    let mut f = OperatorFixture::new();
    f.binary(InstanceType::Multiplier, "mult_4", false, None);
    let imported = import(&mut f.db, &gates("top"));
    let m = imported.module("top");
    let cell = imported.cell(m, "op");
    assert_eq!(
        cell.kind,
        CellKind::Instance { module: imported.ident("$operator$mult_4") }
    );
    assert!(imported.design().has_module(imported.ident("$operator$mult_4")));
    assert!(imported.diagnostics.is_empty());
}

#[test]
fn unsupported_operator_warns_and_falls_back() {
    let mut f = OperatorFixture::new();
    f.binary(InstanceType::Power, "pow_4", false, None);
    let imported = import(&mut f.db, &top("top"));
    let m = imported.module("top");
    assert!(matches!(imported.cell(m, "op").kind, CellKind::Instance { .. }));
    assert_eq!(imported.diagnostics.len(), 1);
    assert_eq!(imported.diagnostics[0].code, W300);
}

#[test]
fn unsupported_primitive_needs_keep_going() {
    let build = || {
        let mut db = NetlistDb::new();
        let t = db.add_netlist("top");
        let y = port(&mut db, t, "y", Out);
        prim(&mut db, t, InstanceType::Pullup, "pu", &[(Output, y)]);
        db
    };

    let imported = import(&mut build(), &top("top"));
    assert!(matches!(
        imported.error(),
        ImportError::UnsupportedPrimitive { instance, .. } if instance == "pu"
    ));

    let imported = import(&mut build(), &make_config("top = \"top\"\nkeep_going = true"));
    let m = imported.module("top");
    assert!(matches!(imported.cell(m, "pu").kind, CellKind::Instance { .. }));
    assert_eq!(imported.diagnostics.len(), 1);
    assert_eq!(imported.diagnostics[0].code, W301);
}

#[test]
fn latch_without_set_and_reset() {
    let mut db = NetlistDb::new();
    let t = db.add_netlist("top");
    let en = port(&mut db, t, "en", In);
    let d = port(&mut db, t, "d", In);
    let q = port(&mut db, t, "q", Out);
    let gnd = db.gnd_net(t);
    prim(
        &mut db,
        t,
        InstanceType::DlatchRs,
        "lat",
        &[(Set, gnd), (Reset, gnd), (Control, en), (Input, d), (Output, q)],
    );
    let imported = import(&mut db, &top("top"));
    let m = imported.module("top");
    let cell = imported.cell(m, "lat");
    assert_eq!(cell.kind, CellKind::Dlatch { width: 1 });
    assert_eq!(imported.port(cell, "EN"), &imported.bits(m, "en"));

    // The gate-level table has no latch.
    let imported = import(&mut db, &gates("top"));
    assert!(matches!(imported.error(), ImportError::UnsupportedPrimitive { .. }));
}
