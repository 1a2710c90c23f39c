//! Arena-backed in-memory netlist.
//!
//! [`NetlistDb`] implements [`NetlistView`] and [`NetlistEdit`] and offers
//! builder helpers for user netlists, port and net buses, primitive and
//! operator views, and constant nets.

use crate::ids::{InstanceId, NetBusId, NetId, NetlistId, PortBusId, PortId};
use crate::types::{Direction, InstanceType, Object, PortRole};
use crate::view::{NetlistEdit, NetlistView, PortRef};
use std::collections::{BTreeMap, HashMap};
use tessel_common::{Arena, SourceLoc};

#[derive(Debug, Default, Clone)]
struct Meta {
    attributes: BTreeMap<String, String>,
    loc: Option<SourceLoc>,
}

#[derive(Debug, Clone)]
struct NetlistData {
    name: String,
    kind: InstanceType,
    blackbox: bool,
    signed: bool,
    ports: Vec<PortId>,
    port_buses: Vec<PortBusId>,
    nets: Vec<NetId>,
    net_buses: Vec<NetBusId>,
    instances: Vec<InstanceId>,
    references: Vec<InstanceId>,
    meta: Meta,
}

#[derive(Debug, Clone)]
struct PortData {
    name: String,
    direction: Direction,
    bus: Option<PortBusId>,
    net: Option<NetId>,
    role: Option<PortRole>,
    meta: Meta,
}

#[derive(Debug, Clone)]
struct BusData<T> {
    name: String,
    left: i32,
    right: i32,
    /// Elements ordered from `min(left, right)` upwards.
    elements: Vec<T>,
    meta: Meta,
}

impl<T: Copy + PartialEq> BusData<T> {
    fn low(&self) -> i32 {
        self.left.min(self.right)
    }

    fn element(&self, index: i32) -> Option<T> {
        let pos = usize::try_from(index - self.low()).ok()?;
        self.elements.get(pos).copied()
    }

    fn index_of(&self, item: T) -> Option<i32> {
        let pos = self.elements.iter().position(|e| *e == item)?;
        Some(self.low() + pos as i32)
    }
}

#[derive(Debug, Clone)]
struct PortBusData {
    bus: BusData<PortId>,
    direction: Direction,
    role: Option<PortRole>,
}

#[derive(Debug, Clone, Default)]
struct RamShape {
    size: u32,
    ascending: bool,
    init: Option<String>,
}

#[derive(Debug, Clone)]
struct NetData {
    name: String,
    owner: NetlistId,
    bus: Option<NetBusId>,
    constant: Option<bool>,
    init: Option<char>,
    ram: Option<RamShape>,
    refs: Vec<PortRef>,
    meta: Meta,
}

#[derive(Debug, Clone)]
struct NetBusData {
    bus: BusData<NetId>,
}

#[derive(Debug, Clone)]
struct InstanceData {
    name: String,
    owner: NetlistId,
    view: NetlistId,
    connections: Vec<(PortId, NetId)>,
    meta: Meta,
}

/// An in-memory hierarchical netlist.
#[derive(Debug, Default, Clone)]
pub struct NetlistDb {
    netlists: Arena<NetlistId, NetlistData>,
    ports: Arena<PortId, PortData>,
    port_buses: Arena<PortBusId, PortBusData>,
    nets: Arena<NetId, NetData>,
    net_buses: Arena<NetBusId, NetBusData>,
    instances: Arena<InstanceId, InstanceData>,
    primitives: HashMap<InstanceType, NetlistId>,
    const_nets: HashMap<(NetlistId, bool), NetId>,
}

/// Port roles of each primitive's view, in port-list order.
fn primitive_roles(kind: InstanceType) -> &'static [PortRole] {
    use InstanceType::*;
    use PortRole::*;
    match kind {
        And | Nand | Or | Nor | Xor | Xnor | SvaAt => &[Input1, Input2, Output],
        Buf | Inv | SvaPosedge => &[Input, Output],
        Mux => &[Input1, Input2, Control, Output],
        Tri => &[Input, Control, Output],
        FullAdder => &[Input1, Input2, Cin, Output, Cout],
        DffRs => &[Set, Reset, Clock, Input, Output],
        DlatchRs => &[Set, Reset, Control, Input, Output],
        Pwr | Gnd | X | Z | Pullup | Pulldown => &[Output],
        SvaImmediateAssert | SvaImmediateAssume | SvaImmediateCover => &[Input],
        SvaAssert | SvaAssume | SvaCover => &[Input, Clock],
        _ => &[],
    }
}

impl NetlistDb {
    /// Creates an empty database.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user netlist.
    pub fn add_netlist(&mut self, name: &str) -> NetlistId {
        self.add_typed_netlist(name, InstanceType::User)
    }

    /// Adds a netlist with an explicit type tag.
    pub fn add_typed_netlist(&mut self, name: &str, kind: InstanceType) -> NetlistId {
        self.netlists.alloc(NetlistData {
            name: name.to_string(),
            kind,
            blackbox: false,
            signed: false,
            ports: Vec::new(),
            port_buses: Vec::new(),
            nets: Vec::new(),
            net_buses: Vec::new(),
            instances: Vec::new(),
            references: Vec::new(),
            meta: Meta::default(),
        })
    }

    /// Marks a netlist as a black box.
    pub fn set_blackbox(&mut self, nl: NetlistId, blackbox: bool) {
        self.netlists[nl].blackbox = blackbox;
    }

    /// Marks an operator netlist as signed.
    pub fn set_signed(&mut self, nl: NetlistId, signed: bool) {
        self.netlists[nl].signed = signed;
    }

    /// Adds a port together with an internal net of the same name.
    pub fn add_port_with_net(
        &mut self,
        nl: NetlistId,
        name: &str,
        direction: Direction,
    ) -> (PortId, NetId) {
        let port = self.add_port(nl, name, direction);
        let net = self.add_net(nl, name);
        self.attach_net(port, net);
        (port, net)
    }

    /// Adds a port-bus `name[left:right]` with one element port per index.
    pub fn add_port_bus(
        &mut self,
        nl: NetlistId,
        name: &str,
        direction: Direction,
        left: i32,
        right: i32,
    ) -> PortBusId {
        let bus = self.port_buses.alloc(PortBusData {
            bus: BusData {
                name: name.to_string(),
                left,
                right,
                elements: Vec::new(),
                meta: Meta::default(),
            },
            direction,
            role: None,
        });
        for index in left.min(right)..=left.max(right) {
            let port = self.add_port(nl, &format!("{name}[{index}]"), direction);
            self.ports[port].bus = Some(bus);
            self.port_buses[bus].bus.elements.push(port);
        }
        self.netlists[nl].port_buses.push(bus);
        bus
    }

    /// Adds a net-bus `name[left:right]` with one element net per index.
    pub fn add_net_bus(&mut self, nl: NetlistId, name: &str, left: i32, right: i32) -> NetBusId {
        let bus = self.net_buses.alloc(NetBusData {
            bus: BusData {
                name: name.to_string(),
                left,
                right,
                elements: Vec::new(),
                meta: Meta::default(),
            },
        });
        for index in left.min(right)..=left.max(right) {
            let net = self.add_net(nl, &format!("{name}[{index}]"));
            self.nets[net].bus = Some(bus);
            self.net_buses[bus].bus.elements.push(net);
        }
        self.netlists[nl].net_buses.push(bus);
        bus
    }

    /// Attaches each element of a port-bus to the element of a net-bus at the same position.
    pub fn attach_bus(&mut self, port_bus: PortBusId, net_bus: NetBusId) {
        let pairs: Vec<(PortId, NetId)> = self.port_buses[port_bus]
            .bus
            .elements
            .iter()
            .copied()
            .zip(self.net_buses[net_bus].bus.elements.iter().copied())
            .collect();
        for (port, net) in pairs {
            self.attach_net(port, net);
        }
    }

    /// Sets the initial value character of a net.
    pub fn set_net_init(&mut self, net: NetId, value: char) {
        self.nets[net].init = Some(value);
    }

    /// Sets a string attribute on a net.
    pub fn set_net_attribute(&mut self, net: NetId, key: &str, value: &str) {
        self.set_attribute(Object::Net(net), key, value);
    }

    /// Marks a net as a RAM of `size` bits.
    pub fn set_ram(&mut self, net: NetId, size: u32, ascending: bool, init: Option<&str>) {
        self.nets[net].ram = Some(RamShape {
            size,
            ascending,
            init: init.map(str::to_string),
        });
    }

    /// Sets a string attribute on any object.
    pub fn set_attribute(&mut self, obj: Object, key: &str, value: &str) {
        self.meta_mut(obj)
            .attributes
            .insert(key.to_string(), value.to_string());
    }

    /// Sets the source location of any object.
    pub fn set_source_loc(&mut self, obj: Object, loc: SourceLoc) {
        self.meta_mut(obj).loc = Some(loc);
    }

    /// Places an instance of `view` inside `nl`.
    pub fn add_instance(&mut self, nl: NetlistId, name: &str, view: NetlistId) -> InstanceId {
        let inst = self.instances.alloc(InstanceData {
            name: name.to_string(),
            owner: nl,
            view,
            connections: Vec::new(),
            meta: Meta::default(),
        });
        self.netlists[nl].instances.push(inst);
        self.netlists[view].references.push(inst);
        inst
    }

    /// Connects the scalar pin playing `role`.
    ///
    /// # Panics
    ///
    /// Panics if the instance's view has no scalar port with that role.
    pub fn connect_role(&mut self, inst: InstanceId, role: PortRole, net: NetId) {
        let view = self.instances[inst].view;
        let port = self.netlists[view]
            .ports
            .iter()
            .copied()
            .find(|p| self.ports[*p].bus.is_none() && self.ports[*p].role == Some(role));
        match port {
            Some(port) => self.connect_pin(inst, port, net),
            None => panic!("view has no scalar port with role {role:?}"),
        }
    }

    /// Connects the bus playing `role`, least significant bit first.
    ///
    /// # Panics
    ///
    /// Panics if the instance's view has no bus with that role.
    pub fn connect_role_bus(&mut self, inst: InstanceId, role: PortRole, nets: &[NetId]) {
        let bus = match self.pin_bus(inst, role) {
            Some(bus) => bus,
            None => panic!("view has no bus with role {role:?}"),
        };
        let elements = self.port_buses[bus].bus.elements.clone();
        for (port, net) in elements.into_iter().zip(nets.iter().copied()) {
            self.connect_pin(inst, port, net);
        }
    }

    /// The shared view of a bit-level primitive, created on first use.
    pub fn primitive(&mut self, kind: InstanceType) -> NetlistId {
        if let Some(nl) = self.primitives.get(&kind) {
            return *nl;
        }
        let nl = self.add_typed_netlist(&format!("$prim${}", kind.name()), kind);
        for role in primitive_roles(kind) {
            let port = self.add_port(nl, role.default_name(), role.direction());
            self.ports[port].role = Some(*role);
        }
        self.primitives.insert(kind, nl);
        nl
    }

    /// Creates an operator view with role-tagged buses `[width-1:0]` and scalar ports.
    pub fn operator(
        &mut self,
        kind: InstanceType,
        name: &str,
        buses: &[(PortRole, u32)],
        scalars: &[PortRole],
        signed: bool,
    ) -> NetlistId {
        let nl = self.add_typed_netlist(name, kind);
        self.netlists[nl].signed = signed;
        for (role, width) in buses {
            let bus = self.add_port_bus(
                nl,
                role.default_name(),
                role.direction(),
                *width as i32 - 1,
                0,
            );
            self.port_buses[bus].role = Some(*role);
            for port in self.port_buses[bus].bus.elements.clone() {
                self.ports[port].role = Some(*role);
            }
        }
        for role in scalars {
            let port = self.add_port(nl, role.default_name(), role.direction());
            self.ports[port].role = Some(*role);
        }
        nl
    }

    /// The net of `nl` driven by a constant 0, created on first use.
    pub fn gnd_net(&mut self, nl: NetlistId) -> NetId {
        self.const_net(nl, false)
    }

    /// The net of `nl` driven by a constant 1, created on first use.
    pub fn pwr_net(&mut self, nl: NetlistId) -> NetId {
        self.const_net(nl, true)
    }

    fn const_net(&mut self, nl: NetlistId, value: bool) -> NetId {
        if let Some(net) = self.const_nets.get(&(nl, value)) {
            return *net;
        }
        let (name, kind) = if value {
            ("$pwr", InstanceType::Pwr)
        } else {
            ("$gnd", InstanceType::Gnd)
        };
        let net = self.add_net(nl, name);
        self.nets[net].constant = Some(value);
        let view = self.primitive(kind);
        let driver = self.add_instance(nl, &format!("{name}_driver"), view);
        self.connect_role(driver, PortRole::Output, net);
        self.const_nets.insert((nl, value), net);
        net
    }

    fn meta(&self, obj: Object) -> &Meta {
        match obj {
            Object::Netlist(id) => &self.netlists[id].meta,
            Object::Port(id) => &self.ports[id].meta,
            Object::PortBus(id) => &self.port_buses[id].bus.meta,
            Object::Net(id) => &self.nets[id].meta,
            Object::NetBus(id) => &self.net_buses[id].bus.meta,
            Object::Instance(id) => &self.instances[id].meta,
        }
    }

    fn meta_mut(&mut self, obj: Object) -> &mut Meta {
        match obj {
            Object::Netlist(id) => &mut self.netlists[id].meta,
            Object::Port(id) => &mut self.ports[id].meta,
            Object::PortBus(id) => &mut self.port_buses[id].bus.meta,
            Object::Net(id) => &mut self.nets[id].meta,
            Object::NetBus(id) => &mut self.net_buses[id].bus.meta,
            Object::Instance(id) => &mut self.instances[id].meta,
        }
    }
}

impl NetlistView for NetlistDb {
    fn netlists(&self) -> Vec<NetlistId> {
        self.netlists.ids().collect()
    }

    fn netlist_by_name(&self, name: &str) -> Option<NetlistId> {
        self.netlists
            .iter()
            .find(|(_, nl)| nl.name == name)
            .map(|(id, _)| id)
    }

    fn netlist_name(&self, nl: NetlistId) -> &str {
        &self.netlists[nl].name
    }

    fn netlist_type(&self, nl: NetlistId) -> InstanceType {
        self.netlists[nl].kind
    }

    fn is_blackbox(&self, nl: NetlistId) -> bool {
        self.netlists[nl].blackbox
    }

    fn is_signed(&self, nl: NetlistId) -> bool {
        self.netlists[nl].signed
    }

    fn references(&self, nl: NetlistId) -> &[InstanceId] {
        &self.netlists[nl].references
    }

    fn ports(&self, nl: NetlistId) -> &[PortId] {
        &self.netlists[nl].ports
    }

    fn port_buses(&self, nl: NetlistId) -> &[PortBusId] {
        &self.netlists[nl].port_buses
    }

    fn nets(&self, nl: NetlistId) -> &[NetId] {
        &self.netlists[nl].nets
    }

    fn net_buses(&self, nl: NetlistId) -> &[NetBusId] {
        &self.netlists[nl].net_buses
    }

    fn instances(&self, nl: NetlistId) -> &[InstanceId] {
        &self.netlists[nl].instances
    }

    fn port_index(&self, nl: NetlistId, port: PortId) -> Option<usize> {
        self.netlists[nl].ports.iter().position(|p| *p == port)
    }

    fn port_by_name(&self, nl: NetlistId, name: &str) -> Option<PortId> {
        self.netlists[nl]
            .ports
            .iter()
            .copied()
            .find(|p| self.ports[*p].bus.is_none() && self.ports[*p].name == name)
    }

    fn port_bus_by_name(&self, nl: NetlistId, name: &str) -> Option<PortBusId> {
        self.netlists[nl]
            .port_buses
            .iter()
            .copied()
            .find(|b| self.port_buses[*b].bus.name == name)
    }

    fn port_name(&self, port: PortId) -> &str {
        &self.ports[port].name
    }

    fn port_direction(&self, port: PortId) -> Direction {
        self.ports[port].direction
    }

    fn port_bus(&self, port: PortId) -> Option<PortBusId> {
        self.ports[port].bus
    }

    fn port_net(&self, port: PortId) -> Option<NetId> {
        self.ports[port].net
    }

    fn port_role(&self, port: PortId) -> Option<PortRole> {
        self.ports[port].role
    }

    fn port_bus_name(&self, bus: PortBusId) -> &str {
        &self.port_buses[bus].bus.name
    }

    fn port_bus_direction(&self, bus: PortBusId) -> Direction {
        self.port_buses[bus].direction
    }

    fn port_bus_left(&self, bus: PortBusId) -> i32 {
        self.port_buses[bus].bus.left
    }

    fn port_bus_right(&self, bus: PortBusId) -> i32 {
        self.port_buses[bus].bus.right
    }

    fn port_bus_element(&self, bus: PortBusId, index: i32) -> Option<PortId> {
        self.port_buses[bus].bus.element(index)
    }

    fn port_bus_index_of(&self, bus: PortBusId, port: PortId) -> Option<i32> {
        self.port_buses[bus].bus.index_of(port)
    }

    fn port_bus_role(&self, bus: PortBusId) -> Option<PortRole> {
        self.port_buses[bus].role
    }

    fn net_name(&self, net: NetId) -> &str {
        &self.nets[net].name
    }

    fn net_owner(&self, net: NetId) -> NetlistId {
        self.nets[net].owner
    }

    fn net_bus(&self, net: NetId) -> Option<NetBusId> {
        self.nets[net].bus
    }

    fn net_is_gnd(&self, net: NetId) -> bool {
        self.nets[net].constant == Some(false)
    }

    fn net_is_pwr(&self, net: NetId) -> bool {
        self.nets[net].constant == Some(true)
    }

    fn net_init_value(&self, net: NetId) -> Option<char> {
        self.nets[net].init
    }

    fn net_wide_init_value(&self, net: NetId) -> Option<&str> {
        self.nets[net].ram.as_ref().and_then(|r| r.init.as_deref())
    }

    fn net_is_ram(&self, net: NetId) -> bool {
        self.nets[net].ram.is_some()
    }

    fn net_size(&self, net: NetId) -> u32 {
        self.nets[net].ram.as_ref().map_or(1, |r| r.size)
    }

    fn net_is_ascending(&self, net: NetId) -> bool {
        self.nets[net].ram.as_ref().is_some_and(|r| r.ascending)
    }

    fn net_attribute(&self, net: NetId, key: &str) -> Option<&str> {
        self.nets[net].meta.attributes.get(key).map(String::as_str)
    }

    fn net_port_refs(&self, net: NetId) -> &[PortRef] {
        &self.nets[net].refs
    }

    fn net_bus_name(&self, bus: NetBusId) -> &str {
        &self.net_buses[bus].bus.name
    }

    fn net_bus_left(&self, bus: NetBusId) -> i32 {
        self.net_buses[bus].bus.left
    }

    fn net_bus_right(&self, bus: NetBusId) -> i32 {
        self.net_buses[bus].bus.right
    }

    fn net_bus_element(&self, bus: NetBusId, index: i32) -> Option<NetId> {
        self.net_buses[bus].bus.element(index)
    }

    fn instance_name(&self, inst: InstanceId) -> &str {
        &self.instances[inst].name
    }

    fn instance_owner(&self, inst: InstanceId) -> NetlistId {
        self.instances[inst].owner
    }

    fn instance_view(&self, inst: InstanceId) -> NetlistId {
        self.instances[inst].view
    }

    fn instance_connections(&self, inst: InstanceId) -> &[(PortId, NetId)] {
        &self.instances[inst].connections
    }

    fn attributes(&self, obj: Object) -> Vec<(&str, &str)> {
        self.meta(obj)
            .attributes
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect()
    }

    fn source_loc(&self, obj: Object) -> Option<&SourceLoc> {
        self.meta(obj).loc.as_ref()
    }
}

impl NetlistEdit for NetlistDb {
    fn add_port(&mut self, nl: NetlistId, name: &str, direction: Direction) -> PortId {
        let port = self.ports.alloc(PortData {
            name: name.to_string(),
            direction,
            bus: None,
            net: None,
            role: None,
            meta: Meta::default(),
        });
        self.netlists[nl].ports.push(port);
        port
    }

    fn add_net(&mut self, nl: NetlistId, name: &str) -> NetId {
        let net = self.nets.alloc(NetData {
            name: name.to_string(),
            owner: nl,
            bus: None,
            constant: None,
            init: None,
            ram: None,
            refs: Vec::new(),
            meta: Meta::default(),
        });
        self.netlists[nl].nets.push(net);
        net
    }

    fn attach_net(&mut self, port: PortId, net: NetId) {
        self.ports[port].net = Some(net);
    }

    fn connect_pin(&mut self, inst: InstanceId, port: PortId, net: NetId) {
        self.disconnect_pin(inst, port);
        self.instances[inst].connections.push((port, net));
        self.nets[net].refs.push(PortRef {
            instance: inst,
            port,
        });
    }

    fn disconnect_pin(&mut self, inst: InstanceId, port: PortId) {
        let connections = &mut self.instances[inst].connections;
        if let Some(pos) = connections.iter().position(|(p, _)| *p == port) {
            let (_, net) = connections.remove(pos);
            self.nets[net]
                .refs
                .retain(|r| !(r.instance == inst && r.port == port));
        }
    }
}
