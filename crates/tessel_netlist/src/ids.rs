//! Opaque handles into a netlist database.

tessel_common::define_id! {
    /// A sub-circuit (module definition, primitive or operator).
    NetlistId;
    /// A single-bit port of a netlist.
    PortId;
    /// A multi-bit port grouping single-bit ports.
    PortBusId;
    /// A single-bit net.
    NetId;
    /// A multi-bit net grouping single-bit nets.
    NetBusId;
    /// A placement of a netlist inside another netlist.
    InstanceId;
}
