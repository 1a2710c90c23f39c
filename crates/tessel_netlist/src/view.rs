//! Capability traits through which the importer reads, and the hoisting pass
//! edits, the front end's netlist.

use crate::ids::{InstanceId, NetBusId, NetId, NetlistId, PortBusId, PortId};
use crate::types::{Direction, InstanceType, Object, PortRole};
use tessel_common::SourceLoc;

/// One connection of an instance pin to a net, seen from the net.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct PortRef {
    /// The instance whose pin is connected.
    pub instance: InstanceId,
    /// The port of the instantiated netlist.
    pub port: PortId,
}

/// Read-only access to an elaborated hierarchical netlist.
///
/// Bus indices are the declared indices; a bus's least significant element
/// is the one at `min(left, right)`. Operator buses returned by
/// [`pins`](Self::pins) are least significant bit first.
pub trait NetlistView {
    /// All netlists, in creation order.
    fn netlists(&self) -> Vec<NetlistId>;
    /// Finds a netlist by name.
    fn netlist_by_name(&self, name: &str) -> Option<NetlistId>;
    /// Name of a netlist.
    fn netlist_name(&self, nl: NetlistId) -> &str;
    /// Type tag of a netlist.
    fn netlist_type(&self, nl: NetlistId) -> InstanceType;
    /// The netlist has an interface but no contents.
    fn is_blackbox(&self, nl: NetlistId) -> bool;
    /// Arithmetic on this operator netlist is two's complement.
    fn is_signed(&self, nl: NetlistId) -> bool;
    /// Instances of this netlist; the reference count is the length.
    fn references(&self, nl: NetlistId) -> &[InstanceId];
    /// Single-bit ports, including bus elements, in port-list order.
    fn ports(&self, nl: NetlistId) -> &[PortId];
    /// Port-buses.
    fn port_buses(&self, nl: NetlistId) -> &[PortBusId];
    /// Single-bit nets, including bus elements.
    fn nets(&self, nl: NetlistId) -> &[NetId];
    /// Net-buses.
    fn net_buses(&self, nl: NetlistId) -> &[NetBusId];
    /// Instances placed inside the netlist.
    fn instances(&self, nl: NetlistId) -> &[InstanceId];
    /// Position of `port` in the port list of `nl`.
    fn port_index(&self, nl: NetlistId, port: PortId) -> Option<usize>;
    /// Finds a single-bit port that is not a bus element.
    fn port_by_name(&self, nl: NetlistId, name: &str) -> Option<PortId>;
    /// Finds a port-bus.
    fn port_bus_by_name(&self, nl: NetlistId, name: &str) -> Option<PortBusId>;

    /// Name of a port.
    fn port_name(&self, port: PortId) -> &str;
    /// Direction of a port.
    fn port_direction(&self, port: PortId) -> Direction;
    /// The bus this port is an element of.
    fn port_bus(&self, port: PortId) -> Option<PortBusId>;
    /// The internal net attached to the port.
    fn port_net(&self, port: PortId) -> Option<NetId>;
    /// The function of the port on a primitive or operator.
    fn port_role(&self, port: PortId) -> Option<PortRole>;

    /// Name of a port-bus.
    fn port_bus_name(&self, bus: PortBusId) -> &str;
    /// Direction of a port-bus.
    fn port_bus_direction(&self, bus: PortBusId) -> Direction;
    /// Declared left index.
    fn port_bus_left(&self, bus: PortBusId) -> i32;
    /// Declared right index.
    fn port_bus_right(&self, bus: PortBusId) -> i32;
    /// Element at a declared index.
    fn port_bus_element(&self, bus: PortBusId, index: i32) -> Option<PortId>;
    /// Declared index of an element.
    fn port_bus_index_of(&self, bus: PortBusId, port: PortId) -> Option<i32>;
    /// The function of the bus on an operator.
    fn port_bus_role(&self, bus: PortBusId) -> Option<PortRole>;

    /// Name of a net.
    fn net_name(&self, net: NetId) -> &str;
    /// The netlist that declares the net.
    fn net_owner(&self, net: NetId) -> NetlistId;
    /// The bus this net is an element of.
    fn net_bus(&self, net: NetId) -> Option<NetBusId>;
    /// The net is driven by a constant 0.
    fn net_is_gnd(&self, net: NetId) -> bool;
    /// The net is driven by a constant 1.
    fn net_is_pwr(&self, net: NetId) -> bool;
    /// Initial value of a single-bit net as a character (`0`, `1`, `x`, ...).
    fn net_init_value(&self, net: NetId) -> Option<char>;
    /// Initial contents of a RAM net as an ASCII literal such as `8'b0101xxxx`.
    fn net_wide_init_value(&self, net: NetId) -> Option<&str>;
    /// The net stands for a whole memory.
    fn net_is_ram(&self, net: NetId) -> bool;
    /// Total number of bits of a RAM net.
    fn net_size(&self, net: NetId) -> u32;
    /// The declared word range of a RAM net is ascending.
    fn net_is_ascending(&self, net: NetId) -> bool;
    /// Looks up a named attribute of a net.
    fn net_attribute(&self, net: NetId, key: &str) -> Option<&str>;
    /// Instance pins connected to the net.
    fn net_port_refs(&self, net: NetId) -> &[PortRef];

    /// Name of a net-bus.
    fn net_bus_name(&self, bus: NetBusId) -> &str;
    /// Declared left index.
    fn net_bus_left(&self, bus: NetBusId) -> i32;
    /// Declared right index.
    fn net_bus_right(&self, bus: NetBusId) -> i32;
    /// Element at a declared index.
    fn net_bus_element(&self, bus: NetBusId, index: i32) -> Option<NetId>;

    /// Name of an instance.
    fn instance_name(&self, inst: InstanceId) -> &str;
    /// The netlist the instance is placed in.
    fn instance_owner(&self, inst: InstanceId) -> NetlistId;
    /// The netlist being instantiated.
    fn instance_view(&self, inst: InstanceId) -> NetlistId;
    /// Connected pins in connection order.
    fn instance_connections(&self, inst: InstanceId) -> &[(PortId, NetId)];

    /// Attributes of an object as key/value strings.
    fn attributes(&self, obj: Object) -> Vec<(&str, &str)>;
    /// Where the object was declared.
    fn source_loc(&self, obj: Object) -> Option<&SourceLoc>;

    /// Type tag of an instance, i.e. of its view.
    fn instance_type(&self, inst: InstanceId) -> InstanceType {
        self.netlist_type(self.instance_view(inst))
    }

    /// The net connected to `port` of the instance's view.
    fn instance_net(&self, inst: InstanceId, port: PortId) -> Option<NetId> {
        self.instance_connections(inst)
            .iter()
            .find(|(p, _)| *p == port)
            .map(|(_, n)| *n)
    }

    /// The net on the scalar pin playing `role`.
    fn pin(&self, inst: InstanceId, role: PortRole) -> Option<NetId> {
        let view = self.instance_view(inst);
        let port = self
            .ports(view)
            .iter()
            .copied()
            .find(|p| self.port_bus(*p).is_none() && self.port_role(*p) == Some(role))?;
        self.instance_net(inst, port)
    }

    /// The bus playing `role` on the instance's view.
    fn pin_bus(&self, inst: InstanceId, role: PortRole) -> Option<PortBusId> {
        let view = self.instance_view(inst);
        self.port_buses(view)
            .iter()
            .copied()
            .find(|b| self.port_bus_role(*b) == Some(role))
    }

    /// The nets on the bus playing `role`, least significant bit first.
    ///
    /// Unconnected bits are `None`. A scalar pin yields a single element, and
    /// a missing role yields an empty vector.
    fn pins(&self, inst: InstanceId, role: PortRole) -> Vec<Option<NetId>> {
        match self.pin_bus(inst, role) {
            Some(bus) => {
                let (left, right) = (self.port_bus_left(bus), self.port_bus_right(bus));
                (left.min(right)..=left.max(right))
                    .map(|i| {
                        self.port_bus_element(bus, i)
                            .and_then(|p| self.instance_net(inst, p))
                    })
                    .collect()
            }
            None => {
                let view = self.instance_view(inst);
                let has_scalar = self
                    .ports(view)
                    .iter()
                    .any(|p| self.port_bus(*p).is_none() && self.port_role(*p) == Some(role));
                if has_scalar {
                    vec![self.pin(inst, role)]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// The net is not declared in `nl`.
    fn is_external_to(&self, net: NetId, nl: NetlistId) -> bool {
        self.net_owner(net) != nl
    }
}

/// Mutations needed by the external-net hoisting pass.
pub trait NetlistEdit: NetlistView {
    /// Adds a single-bit port to `nl`.
    fn add_port(&mut self, nl: NetlistId, name: &str, direction: Direction) -> PortId;
    /// Adds a single-bit net to `nl`.
    fn add_net(&mut self, nl: NetlistId, name: &str) -> NetId;
    /// Makes `net` the internal net of `port`.
    fn attach_net(&mut self, port: PortId, net: NetId);
    /// Connects the instance pin for `port` to `net`.
    fn connect_pin(&mut self, inst: InstanceId, port: PortId, net: NetId);
    /// Removes the connection of the instance pin for `port`.
    fn disconnect_pin(&mut self, inst: InstanceId, port: PortId);
}

/// Dotted instance path of `nl` when it is instantiated exactly once,
/// otherwise its plain name.
pub fn hierarchical_name<V: NetlistView + ?Sized>(view: &V, nl: NetlistId) -> String {
    match view.references(nl) {
        [only] => format!(
            "{}.{}",
            hierarchical_name(view, view.instance_owner(*only)),
            view.instance_name(*only)
        ),
        _ => view.netlist_name(nl).to_string(),
    }
}
