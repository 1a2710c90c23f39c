//! Lowering of one netlist into one module.
//!
//! A module is populated in a fixed order: ports, port-buses, plain nets and
//! memories, net-buses, initial values, nondeterministic inputs, the
//! edge-detector scan, and finally the instances. The per-table lowering
//! lives in [`gates`](crate::gates), [`cells`](crate::cells),
//! [`memory`](crate::memory) and [`sva`](crate::sva).

use crate::builder::{Counters, ModuleBuilder};
use crate::dispatch::{dispatch, Route};
use crate::error::{kept_primitive, unsupported_operator, ImportError};
use crate::resolver::NetMap;
use crate::session::{module_name, ImportOptions};
use log::{debug, info};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use tessel_common::{Ident, Interner, Logic, LogicVec};
use tessel_config::LoweringMode;
use tessel_diagnostics::DiagnosticSink;
use tessel_ir::{CellKind, ConstValue, MemoryId, Module, PortDirection, SigBit, SigSpec};
use tessel_netlist::{Direction, InstanceId, InstanceType, NetId, NetlistId, NetlistView, Object, PortRole};

/// Declared indices of a bus from `left` towards `right`.
pub(crate) fn left_to_right(left: i32, right: i32) -> impl Iterator<Item = i32> {
    let (low, high) = (left.min(right), left.max(right));
    let ascending = left <= right;
    (low..=high).map(move |k| if ascending { k } else { high - (k - low) })
}

/// What a carry-in pin is tied to.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum Carry {
    /// Constant 0, or unconnected.
    Zero,
    /// Constant 1.
    One,
    /// Any other net.
    Net(NetId),
}

/// Only `0` and `1` initialize a bit; anything else leaves it undefined.
fn init_bit(value: char) -> Option<Logic> {
    match value {
        '0' => Some(Logic::Zero),
        '1' => Some(Logic::One),
        _ => None,
    }
}

fn port_direction(direction: Direction) -> PortDirection {
    match direction {
        Direction::In => PortDirection::Input,
        Direction::Out => PortDirection::Output,
        Direction::InOut => PortDirection::InOut,
    }
}

/// Nets collected during net import and consolidated afterwards.
#[derive(Debug, Default)]
struct Deferred {
    init: BTreeMap<NetId, char>,
    anyconst: BTreeSet<NetId>,
    anyseq: BTreeSet<NetId>,
}

/// Connections of one opaque-cell port, gathered bit by bit.
struct PortBits {
    direction: PortDirection,
    bits: Vec<Option<SigBit>>,
}

pub(crate) struct NetlistImporter<'s, 'v, V: NetlistView + ?Sized> {
    pub(crate) view: &'v V,
    pub(crate) nl: NetlistId,
    pub(crate) b: ModuleBuilder<'s>,
    pub(crate) nets: NetMap,
    pub(crate) memories: HashMap<NetId, MemoryId>,
    /// Edge-detector output net to its input (the clock).
    pub(crate) edges: HashMap<NetId, NetId>,
    sink: &'s DiagnosticSink,
    options: ImportOptions,
}

impl<'s, 'v, V: NetlistView + ?Sized> NetlistImporter<'s, 'v, V> {
    pub(crate) fn new(
        view: &'v V,
        nl: NetlistId,
        name: Ident,
        interner: &'s Interner,
        sink: &'s DiagnosticSink,
        options: ImportOptions,
        counters: &'s mut Counters,
    ) -> Self {
        Self {
            view,
            nl,
            b: ModuleBuilder::new(Module::new(name), interner, counters),
            nets: NetMap::new(),
            memories: HashMap::new(),
            edges: HashMap::new(),
            sink,
            options,
        }
    }

    /// Builds the module, adding referenced sub-circuits to `pending`.
    pub(crate) fn run(mut self, pending: &mut BTreeSet<NetlistId>) -> Result<Module, ImportError> {
        let name = self.b.interner().resolve(self.b.module().name);
        // Kept primitives have no body.
        if self.view.is_blackbox(self.nl) || self.view.netlist_type(self.nl).is_primitive() {
            info!("importing blackbox module `{name}`");
            self.b
                .module_mut()
                .attributes
                .insert("blackbox".to_string(), ConstValue::Bool(true));
        } else {
            info!("importing module `{name}`");
        }

        self.import_ports()?;
        self.import_port_buses()?;
        let interner = self.b.interner();
        self.b.module_mut().fixup_ports(interner);

        let mut deferred = Deferred::default();
        self.import_nets(&mut deferred)?;
        self.import_net_buses(&mut deferred)?;
        self.apply_initial_values(&deferred.init)?;
        for net in &deferred.anyconst {
            let bit = self.net(*net)?;
            self.b.nondet_source(bit.into(), true)?;
        }
        for net in &deferred.anyseq {
            let bit = self.net(*net)?;
            self.b.nondet_source(bit.into(), false)?;
        }

        self.scan_edge_detectors();
        let view = self.view;
        for &inst in view.instances(self.nl) {
            if view.instance_type(inst) == InstanceType::SvaPosedge {
                continue;
            }
            self.import_instance(inst, pending)?;
        }

        Ok(self.b.finish())
    }

    fn attributes(&self, obj: Object) -> BTreeMap<String, ConstValue> {
        let mut attrs = BTreeMap::new();
        if let Some(loc) = self.view.source_loc(obj) {
            attrs.insert("src".to_string(), ConstValue::String(loc.to_string()));
        }
        for (key, value) in self.view.attributes(obj) {
            attrs.insert(key.to_string(), ConstValue::String(value.to_string()));
        }
        attrs
    }

    /// Binds `net` to `bit`, or joins the two when `net` is already bound.
    ///
    /// An input port drives the existing signal; anything else is driven by it.
    fn alias(&mut self, net: NetId, bit: SigBit, drives_existing: bool) -> Result<(), ImportError> {
        match self.nets.bind(net, bit) {
            None => Ok(()),
            Some(existing) if drives_existing => self.b.connect(existing.into(), bit.into()),
            Some(existing) => self.b.connect(bit.into(), existing.into()),
        }
    }

    fn import_ports(&mut self) -> Result<(), ImportError> {
        let view = self.view;
        for &port in view.ports(self.nl) {
            if view.port_bus(port).is_some() {
                continue;
            }
            let name = view.port_name(port);
            debug!("importing port `{name}`");
            let direction = view.port_direction(port);
            let wire = self.b.wire(name, 1)?;
            let attrs = self.attributes(Object::Port(port));
            let w = &mut self.b.module_mut().wires[wire];
            w.attributes = attrs;
            w.port_id = view.port_index(self.nl, port).map_or(0, |i| i as u32 + 1);
            w.port_input = direction.is_input();
            w.port_output = direction.is_output();

            if let Some(net) = view.port_net(port) {
                self.alias(net, SigBit::wire(wire, 0), direction.is_input())?;
            }
        }
        Ok(())
    }

    fn import_port_buses(&mut self) -> Result<(), ImportError> {
        let view = self.view;
        for &bus in view.port_buses(self.nl) {
            let name = view.port_bus_name(bus);
            debug!("importing port bus `{name}`");
            let (left, right) = (view.port_bus_left(bus), view.port_bus_right(bus));
            let start = left.min(right);
            let width = left.abs_diff(right) + 1;
            let direction = view.port_bus_direction(bus);
            let wire = self.b.wire(name, width)?;
            let attrs = self.attributes(Object::PortBus(bus));
            let w = &mut self.b.module_mut().wires[wire];
            w.start_offset = start;
            w.attributes = attrs;
            w.port_input = direction.is_input();
            w.port_output = direction.is_output();

            for index in left_to_right(left, right) {
                let Some(net) = view.port_bus_element(bus, index).and_then(|p| view.port_net(p)) else {
                    continue;
                };
                let bit = SigBit::wire(wire, (index - start) as u32);
                self.alias(net, bit, direction.is_input())?;
            }
        }
        Ok(())
    }

    fn import_nets(&mut self, deferred: &mut Deferred) -> Result<(), ImportError> {
        let view = self.view;
        for &net in view.nets(self.nl) {
            if view.net_is_ram(net) {
                self.infer_memory(net)?;
                continue;
            }
            if let Some(init) = view.net_init_value(net) {
                deferred.init.insert(net, init);
            }
            if view.net_attribute(net, "rand_const") == Some("1") {
                deferred.anyconst.insert(net);
            } else if view.net_attribute(net, "rand") == Some("1") {
                deferred.anyseq.insert(net);
            }

            if self.nets.contains(net) {
                debug!("skipping net `{}`", view.net_name(net));
                continue;
            }
            if view.net_bus(net).is_some() {
                continue;
            }
            debug!("importing net `{}`", view.net_name(net));
            let wire = self.b.wire(view.net_name(net), 1)?;
            self.b.module_mut().wires[wire].attributes = self.attributes(Object::Net(net));
            self.nets.bind(net, SigBit::wire(wire, 0));
        }
        Ok(())
    }

    fn import_net_buses(&mut self, deferred: &mut Deferred) -> Result<(), ImportError> {
        let view = self.view;
        for &bus in view.net_buses(self.nl) {
            let (left, right) = (view.net_bus_left(bus), view.net_bus_right(bus));
            let elements: Vec<(i32, Option<NetId>)> = left_to_right(left, right)
                .map(|i| (i, view.net_bus_element(bus, i)))
                .collect();
            let found_new = elements
                .iter()
                .any(|(_, net)| !matches!(net, Some(n) if self.nets.contains(*n)));

            if found_new {
                let name = view.net_bus_name(bus);
                debug!("importing net bus `{name}`");
                let start = left.min(right);
                let width = left.abs_diff(right) + 1;
                let wire = self.b.wire(name, width)?;
                let attrs = self.attributes(Object::NetBus(bus));
                let w = &mut self.b.module_mut().wires[wire];
                w.start_offset = start;
                w.attributes = attrs;

                let mut init = LogicVec::all_x(width);
                let mut init_valid = false;
                for &(index, net) in &elements {
                    let Some(net) = net else { continue };
                    let offset = (index - start) as u32;
                    if let Some(value) = deferred.init.remove(&net) {
                        if let Some(bit) = init_bit(value) {
                            init.set(offset, bit);
                        }
                        init_valid = true;
                    }
                    let bit = SigBit::wire(wire, offset);
                    if let Some(existing) = self.nets.bind(net, bit) {
                        self.b.connect(bit.into(), existing.into())?;
                    }
                }
                if init_valid {
                    self.b.set_wire_attribute(wire, "init", ConstValue::Logic(init));
                }
            } else {
                debug!("skipping net bus `{}`", view.net_bus_name(bus));
            }

            let mut anyconst = SigSpec::new();
            let mut anyseq = SigSpec::new();
            let mut lsb_first = elements;
            lsb_first.sort_by_key(|&(index, _)| index);
            for (_, net) in lsb_first {
                let Some(net) = net else { continue };
                if deferred.anyconst.remove(&net) {
                    anyconst.push(self.net(net)?);
                }
                if deferred.anyseq.remove(&net) {
                    anyseq.push(self.net(net)?);
                }
            }
            if !anyconst.is_empty() {
                self.b.nondet_source(anyconst, true)?;
            }
            if !anyseq.is_empty() {
                self.b.nondet_source(anyseq, false)?;
            }
        }
        Ok(())
    }

    /// Merges the remaining per-net initial values into the owning wires.
    fn apply_initial_values(&mut self, init: &BTreeMap<NetId, char>) -> Result<(), ImportError> {
        for (&net, &value) in init {
            let Some((wire, offset)) = self.net(net)?.as_wire() else {
                continue;
            };
            let w = &mut self.b.module_mut().wires[wire];
            let mut bits = w
                .attributes
                .get("init")
                .and_then(ConstValue::as_logic)
                .cloned()
                .unwrap_or_else(|| LogicVec::all_x(0));
            while bits.width() < w.width {
                bits.push(Logic::X);
            }
            if let Some(bit) = init_bit(value) {
                bits.set(offset, bit);
            }
            w.attributes.insert("init".to_string(), ConstValue::Logic(bits));
        }
        Ok(())
    }

    fn import_instance(
        &mut self,
        inst: InstanceId,
        pending: &mut BTreeSet<NetlistId>,
    ) -> Result<(), ImportError> {
        let view = self.view;
        let kind = view.instance_type(inst);
        let view_name = view.netlist_name(view.instance_view(inst));
        debug!("importing cell `{}` ({view_name})", view.instance_name(inst));

        match dispatch(kind, self.options.mode) {
            Route::Special => self.lower_special(inst, kind),
            Route::Table => {
                let lowered = match self.options.mode {
                    LoweringMode::Cells => self.lower_cell(inst, kind)?,
                    LoweringMode::Gates => self.lower_gate(inst, kind)?,
                };
                if lowered {
                    Ok(())
                } else {
                    self.import_hierarchy(inst, pending)
                }
            }
            Route::OperatorFallback => {
                self.sink
                    .emit(unsupported_operator(view_name).at(self.location(inst)));
                self.import_hierarchy(inst, pending)
            }
            Route::PrimitiveFallback => {
                let instance = view.instance_name(inst);
                if !self.options.keep_going {
                    return Err(ImportError::UnsupportedPrimitive {
                        instance: instance.to_string(),
                        kind: view_name.to_string(),
                    });
                }
                self.sink
                    .emit(kept_primitive(instance, view_name).at(self.location(inst)));
                self.import_hierarchy(inst, pending)
            }
            Route::Hierarchy => self.import_hierarchy(inst, pending),
        }
    }

    fn lower_special(&mut self, inst: InstanceId, kind: InstanceType) -> Result<(), ImportError> {
        use InstanceType::*;
        match kind {
            Pwr => self.drive_constant(inst, Logic::One),
            Gnd => self.drive_constant(inst, Logic::Zero),
            X => self.drive_constant(inst, Logic::X),
            Z => self.drive_constant(inst, Logic::Z),
            Buf => {
                let name = self.instance_ident(inst);
                let a = self.pin_sig(inst, PortRole::Input)?;
                let y = self.pin_sig(inst, PortRole::Output)?;
                self.b.unary_gate(name, tessel_ir::GateOp::Buf, a, y)?;
                Ok(())
            }
            ReadPort => self.lower_read_port(inst),
            WritePort => self.lower_write_port(inst, false),
            ClockedWritePort => self.lower_write_port(inst, true),
            SvaAt => self.lower_sampler(inst),
            SvaImmediateAssert | SvaAssert => self.lower_check(inst, CellKind::Assert),
            SvaImmediateAssume | SvaAssume => self.lower_check(inst, CellKind::Assume),
            SvaImmediateCover | SvaCover => self.lower_check(inst, CellKind::Cover),
            // Consumed by the edge-detector scan.
            SvaPosedge => Ok(()),
            And | Nand | Or | Nor | Xor | Xnor | Inv | Mux | Tri | FullAdder | DffRs | DlatchRs
            | Pullup | Pulldown | Adder | Multiplier | Divider | Modulo | Remainder | ShiftLeft
            | ShiftRight | Decoder | EnabledDecoder | ReduceAnd | ReduceOr | ReduceXor
            | ReduceXnor | LessThan | WideAnd | WideOr | WideXor | WideXnor | WideBuf | WideInv
            | Minus | UnaryMinus | Equal | NotEqual | WideMux | WideTri | WideDffRs | Selector
            | WideSelector | PrioritySelector | Power | User => Err(ImportError::Misrouted {
                instance: self.view.instance_name(inst).to_string(),
                kind,
            }),
        }
    }

    fn drive_constant(&mut self, inst: InstanceId, value: Logic) -> Result<(), ImportError> {
        let y = self.pin_sig(inst, PortRole::Output)?;
        self.b.connect(y, value.into())
    }

    /// Emits an opaque cell for `inst` and queues its sub-circuit.
    fn import_hierarchy(
        &mut self,
        inst: InstanceId,
        pending: &mut BTreeSet<NetlistId>,
    ) -> Result<(), ImportError> {
        let view = self.view;
        let target = view.instance_view(inst);
        pending.insert(target);

        let mut ports: BTreeMap<String, PortBits> = BTreeMap::new();
        for &(port, net) in view.instance_connections(inst) {
            let (name, offset, width, direction) = match view.port_bus(port) {
                Some(bus) => {
                    let (left, right) = (view.port_bus_left(bus), view.port_bus_right(bus));
                    let index = view.port_bus_index_of(bus, port).unwrap_or(left.min(right));
                    (
                        view.port_bus_name(bus),
                        (index - left.min(right)) as usize,
                        left.abs_diff(right) as usize + 1,
                        view.port_bus_direction(bus),
                    )
                }
                None => (view.port_name(port), 0, 1, view.port_direction(port)),
            };
            let bit = self.net(net)?;
            let entry = ports.entry(name.to_string()).or_insert_with(|| PortBits {
                direction: port_direction(direction),
                bits: vec![None; width],
            });
            if entry.bits.len() <= offset {
                entry.bits.resize(offset + 1, None);
            }
            entry.bits[offset] = Some(bit);
        }

        let mut connections = Vec::with_capacity(ports.len());
        for (name, port) in ports {
            let missing = port.bits.iter().filter(|b| b.is_none()).count() as u32;
            let mut fill = if missing > 0 {
                self.b.auto_wire(missing)?.bits().to_vec().into_iter()
            } else {
                Vec::new().into_iter()
            };
            let signal: SigSpec = port
                .bits
                .into_iter()
                .map(|b| b.or_else(|| fill.next()).unwrap_or(SigBit::Const(Logic::X)))
                .collect();
            connections.push((name, port.direction, signal));
        }

        let module = self.b.ident(&module_name(view, target));
        let name = self.instance_ident(inst);
        self.b.cell(name, CellKind::Instance { module }, connections)?;
        Ok(())
    }

    fn location(&self, inst: InstanceId) -> Option<tessel_common::SourceLoc> {
        self.view.source_loc(Object::Instance(inst)).cloned()
    }

    /// A fresh cell name derived from the instance name.
    pub(crate) fn instance_ident(&self, inst: InstanceId) -> Ident {
        self.b.unique_name(self.view.instance_name(inst))
    }

    /// The operator's signedness flag.
    pub(crate) fn signed(&self, inst: InstanceId) -> bool {
        self.view.is_signed(self.view.instance_view(inst))
    }

    pub(crate) fn net(&self, net: NetId) -> Result<SigBit, ImportError> {
        self.nets.resolve(self.view, self.nl, net)
    }

    pub(crate) fn missing(&self, inst: InstanceId, role: PortRole) -> ImportError {
        ImportError::MissingConnection {
            instance: self.view.instance_name(inst).to_string(),
            role,
        }
    }

    /// The net on a required scalar pin.
    pub(crate) fn pin_net(&self, inst: InstanceId, role: PortRole) -> Result<NetId, ImportError> {
        self.view
            .pin(inst, role)
            .ok_or_else(|| self.missing(inst, role))
    }

    /// The signal on a required scalar pin.
    pub(crate) fn pin_sig(&self, inst: InstanceId, role: PortRole) -> Result<SigSpec, ImportError> {
        Ok(self.net(self.pin_net(inst, role)?)?.into())
    }

    /// The signal on an optional scalar pin.
    pub(crate) fn opt_pin_sig(
        &self,
        inst: InstanceId,
        role: PortRole,
    ) -> Result<Option<SigSpec>, ImportError> {
        match self.view.pin(inst, role) {
            Some(net) => Ok(Some(self.net(net)?.into())),
            None => Ok(None),
        }
    }

    /// An operand bus, least significant bit first; unconnected bits are `z`.
    pub(crate) fn operand(&self, inst: InstanceId, role: PortRole) -> Result<SigSpec, ImportError> {
        self.view
            .pins(inst, role)
            .into_iter()
            .map(|net| match net {
                Some(net) => self.net(net),
                None => Ok(SigBit::Const(Logic::Z)),
            })
            .collect()
    }

    /// The output bus; each run of unconnected bits gets its own anonymous wire.
    pub(crate) fn operator_output(&mut self, inst: InstanceId) -> Result<SigSpec, ImportError> {
        let pins = self.view.pins(inst, PortRole::Output);
        let mut out = SigSpec::new();
        let mut run = 0u32;
        for net in pins {
            match net {
                Some(net) => {
                    if run > 0 {
                        out.append(&self.b.auto_wire(run)?);
                        run = 0;
                    }
                    out.push(self.net(net)?);
                }
                None => run += 1,
            }
        }
        if run > 0 {
            out.append(&self.b.auto_wire(run)?);
        }
        Ok(out)
    }

    /// A single-bit result: the scalar output pin, or the output bus if the view has one.
    pub(crate) fn result(&mut self, inst: InstanceId) -> Result<SigSpec, ImportError> {
        if self.view.pin_bus(inst, PortRole::Output).is_some() {
            self.operator_output(inst)
        } else {
            self.pin_sig(inst, PortRole::Output)
        }
    }

    /// A set or reset input with constant nets folded to `0`/`1`.
    pub(crate) fn inport(&self, inst: InstanceId, role: PortRole) -> Result<SigSpec, ImportError> {
        let view = self.view;
        let fold = |net: Option<NetId>| -> Result<SigBit, ImportError> {
            match net {
                Some(net) if view.net_is_gnd(net) => Ok(SigBit::Const(Logic::Zero)),
                Some(net) if view.net_is_pwr(net) => Ok(SigBit::Const(Logic::One)),
                Some(net) => self.net(net),
                None => Ok(SigBit::Const(Logic::Z)),
            }
        };
        if view.pin_bus(inst, role).is_some() {
            return view.pins(inst, role).into_iter().map(fold).collect();
        }
        self.pin_sig(inst, role)
    }

    /// Returns `true` if the scalar pin is tied to constant 0.
    pub(crate) fn is_gnd(&self, inst: InstanceId, role: PortRole) -> bool {
        self.view
            .pin(inst, role)
            .is_some_and(|net| self.view.net_is_gnd(net))
    }

    pub(crate) fn carry_in(&self, inst: InstanceId) -> Carry {
        match self.view.pin(inst, PortRole::Cin) {
            None => Carry::Zero,
            Some(net) if self.view.net_is_gnd(net) => Carry::Zero,
            Some(net) if self.view.net_is_pwr(net) => Carry::One,
            Some(net) => Carry::Net(net),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn declared_order() {
        assert_eq!(left_to_right(3, 0).collect::<Vec<_>>(), vec![3, 2, 1, 0]);
        assert_eq!(left_to_right(4, 6).collect::<Vec<_>>(), vec![4, 5, 6]);
        assert_eq!(left_to_right(-1, -1).collect::<Vec<_>>(), vec![-1]);
    }

    #[test]
    fn table_tags_are_rejected_by_the_special_path() {
        use tessel_netlist::NetlistDb;

        let mut db = NetlistDb::new();
        let top = db.add_netlist("top");
        let and = db.primitive(InstanceType::And);
        let inst = db.add_instance(top, "g", and);

        let interner = Interner::new();
        let sink = DiagnosticSink::new();
        let mut counters = Counters::default();
        let name = interner.get_or_intern("top");
        let options = ImportOptions::default();
        let mut importer = NetlistImporter::new(&db, top, name, &interner, &sink, options, &mut counters);
        assert_eq!(
            importer.lower_special(inst, InstanceType::And),
            Err(ImportError::Misrouted {
                instance: "g".into(),
                kind: InstanceType::And,
            })
        );
        assert!(importer.lower_special(inst, InstanceType::SvaPosedge).is_ok());
        assert!(importer.b.module().cells.is_empty());
    }

    #[test]
    fn directions_map_one_to_one() {
        assert_eq!(port_direction(Direction::In), PortDirection::Input);
        assert_eq!(port_direction(Direction::Out), PortDirection::Output);
        assert_eq!(port_direction(Direction::InOut), PortDirection::InOut);
    }
}
