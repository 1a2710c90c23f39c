//! Hoisting of external net references.
//!
//! A connection to a net declared in another netlist is rewritten by exporting
//! the net through a fresh output port of its owner and following it one
//! level up the hierarchy, repeatedly, until it lives in the netlist that
//! uses it. A netlist with more than one instantiation cannot be climbed out
//! of; such a connection is left in place and fails later during import.

use log::debug;
use std::collections::{HashMap, HashSet};
use tessel_netlist::{hierarchical_name, Direction, NetId, NetlistEdit, NetlistId};

/// Rewrites external net references so every connection is local.
///
/// One hoister carries the port-name counter and the level-up memo across
/// all roots it is run on.
#[derive(Debug, Default)]
pub struct ExtNetHoister {
    counter: u32,
    lifted: HashMap<NetId, NetId>,
    visited: HashSet<NetlistId>,
    rewritten: usize,
}

impl ExtNetHoister {
    /// Creates a hoister with an empty memo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of instance connections rewritten so far.
    pub fn rewritten(&self) -> usize {
        self.rewritten
    }

    /// The same net one level up in the hierarchy.
    ///
    /// Returns `net` itself when its owner is not instantiated exactly once.
    fn level_up<E: NetlistEdit + ?Sized>(&mut self, edit: &mut E, net: NetId) -> NetId {
        if let Some(up) = self.lifted.get(&net) {
            return *up;
        }
        let nl = edit.net_owner(net);
        let up_inst = match edit.references(nl) {
            [only] => *only,
            _ => return net,
        };
        let up_nl = edit.instance_owner(up_inst);

        let name = format!("___extnets_{}", self.counter);
        self.counter += 1;
        let port = edit.add_port(nl, &name, Direction::Out);
        edit.attach_net(port, net);
        let up_net = edit.add_net(up_nl, &name);
        edit.connect_pin(up_inst, port, up_net);

        self.lifted.insert(net, up_net);
        up_net
    }

    /// Hoists the external references below and inside `nl`.
    pub fn run<E: NetlistEdit + ?Sized>(&mut self, edit: &mut E, nl: NetlistId) {
        if !self.visited.insert(nl) {
            return;
        }
        let instances = edit.instances(nl).to_vec();
        for &inst in &instances {
            let view = edit.instance_view(inst);
            self.run(edit, view);
        }

        let mut rewrites = Vec::new();
        for &inst in &instances {
            let connections = edit.instance_connections(inst).to_vec();
            for (port, net) in connections {
                if !edit.is_external_to(net, nl) {
                    continue;
                }
                debug!(
                    "fixing external net reference on port {}.{}.{}",
                    hierarchical_name(&*edit, nl),
                    edit.instance_name(inst),
                    edit.port_name(port)
                );
                let mut net = net;
                while edit.is_external_to(net, nl) {
                    let up = self.level_up(edit, net);
                    if up == net {
                        break;
                    }
                    debug!(
                        "  external net: {}.{}",
                        hierarchical_name(&*edit, edit.net_owner(net)),
                        edit.net_name(net)
                    );
                    net = up;
                }
                rewrites.push((inst, port, net));
            }
        }

        self.rewritten += rewrites.len();
        for (inst, port, net) in rewrites {
            edit.disconnect_pin(inst, port);
            edit.connect_pin(inst, port, net);
        }
    }
}

/// Hoists the external references reachable from `nl` and returns the
/// number of rewritten connections.
pub fn hoist_external_nets<E: NetlistEdit + ?Sized>(edit: &mut E, nl: NetlistId) -> usize {
    let mut hoister = ExtNetHoister::new();
    hoister.run(edit, nl);
    hoister.rewritten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tessel_netlist::{InstanceType, NetlistDb, NetlistView, PortRole};

    /// `top` instantiates `left` and `right`; `right.u` instantiates `leaf`
    /// whose buffer reads `left.sig` directly.
    fn cross_reference() -> (NetlistDb, NetlistId, NetId) {
        let mut db = NetlistDb::new();
        let top = db.add_netlist("top");
        let left = db.add_netlist("left");
        let right = db.add_netlist("right");
        let leaf = db.add_netlist("leaf");
        db.add_instance(top, "l", left);
        db.add_instance(top, "r", right);
        db.add_instance(right, "u", leaf);

        let sig = db.add_net(left, "sig");
        let out = db.add_net(leaf, "out");
        let buf = db.primitive(InstanceType::Buf);
        let inst = db.add_instance(leaf, "b", buf);
        db.connect_role(inst, PortRole::Input, sig);
        db.connect_role(inst, PortRole::Output, out);
        (db, top, sig)
    }

    #[test]
    fn local_nets_untouched() {
        let mut db = NetlistDb::new();
        let top = db.add_netlist("top");
        let a = db.add_net(top, "a");
        let y = db.add_net(top, "y");
        let buf = db.primitive(InstanceType::Buf);
        let inst = db.add_instance(top, "b", buf);
        db.connect_role(inst, PortRole::Input, a);
        db.connect_role(inst, PortRole::Output, y);

        assert_eq!(hoist_external_nets(&mut db, top), 0);
        assert_eq!(db.pin(inst, PortRole::Input), Some(a));
    }

    #[test]
    fn reference_into_child_becomes_local() {
        let mut db = NetlistDb::new();
        let top = db.add_netlist("top");
        let child = db.add_netlist("child");
        db.add_instance(top, "c", child);
        let sig = db.add_net(child, "sig");
        let y = db.add_net(top, "y");
        let buf = db.primitive(InstanceType::Buf);
        let inst = db.add_instance(top, "b", buf);
        db.connect_role(inst, PortRole::Input, sig);
        db.connect_role(inst, PortRole::Output, y);

        assert_eq!(hoist_external_nets(&mut db, top), 1);
        let net = db.pin(inst, PortRole::Input).unwrap();
        assert_eq!(db.net_owner(net), top);
        assert_eq!(db.net_name(net), "___extnets_0");
        let port = db.port_by_name(child, "___extnets_0").unwrap();
        assert_eq!(db.port_net(port), Some(sig));
        assert_eq!(db.port_direction(port), Direction::Out);
    }

    #[test]
    fn climb_stops_at_root() {
        let (mut db, top, sig) = cross_reference();
        let leaf = db.netlist_by_name("leaf").unwrap();
        let inst = db.instances(leaf)[0];
        let mut hoister = ExtNetHoister::new();
        hoister.run(&mut db, top);

        // `left.sig` is exported into `top`, which nothing instantiates, so
        // the pin is left on the copy in `top`.
        let net = db.pin(inst, PortRole::Input).unwrap();
        assert_ne!(net, sig);
        assert_eq!(db.net_owner(net), top);
        assert!(db.is_external_to(net, leaf));
        assert_eq!(hoister.rewritten(), 1);
    }

    #[test]
    fn shared_netlist_stops_climb() {
        let (mut db, top, sig) = cross_reference();
        let left = db.netlist_by_name("left").unwrap();
        db.add_instance(top, "l2", left);
        let leaf = db.netlist_by_name("leaf").unwrap();
        let inst = db.instances(leaf)[0];

        hoist_external_nets(&mut db, top);
        assert_eq!(db.pin(inst, PortRole::Input), Some(sig));
        assert!(db.port_by_name(left, "___extnets_0").is_none());
    }

    #[test]
    fn memo_reuses_ports() {
        let (mut db, top, sig) = cross_reference();
        let leaf = db.netlist_by_name("leaf").unwrap();
        let buf = db.primitive(InstanceType::Buf);
        let out2 = db.add_net(leaf, "out2");
        let second = db.add_instance(leaf, "b2", buf);
        db.connect_role(second, PortRole::Input, sig);
        db.connect_role(second, PortRole::Output, out2);

        assert_eq!(hoist_external_nets(&mut db, top), 2);
        let first = db.instances(leaf)[0];
        assert_eq!(db.pin(first, PortRole::Input), db.pin(second, PortRole::Input));
        let left = db.netlist_by_name("left").unwrap();
        assert!(db.port_by_name(left, "___extnets_1").is_none());
    }
}
