//! Wires: named, bit-addressable connection points inside a module.

use crate::const_value::ConstValue;
use crate::ids::WireId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessel_common::Ident;

/// A named wire of `width` bits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wire {
    /// The ID of this wire within its module.
    pub id: WireId,
    /// The wire name, unique in the module namespace.
    pub name: Ident,
    /// Number of bits.
    pub width: u32,
    /// Declared index of bit 0, for buses not indexed from 0.
    pub start_offset: i32,
    /// 1-based position in the port list, or 0 if this is not a port.
    pub port_id: u32,
    /// Data flows into the module through this wire.
    pub port_input: bool,
    /// Data flows out of the module through this wire.
    pub port_output: bool,
    /// Attributes such as `src` and `init`.
    pub attributes: BTreeMap<String, ConstValue>,
}

impl Wire {
    /// Creates a plain, non-port wire.
    pub fn new(id: WireId, name: Ident, width: u32) -> Self {
        Self {
            id,
            name,
            width,
            start_offset: 0,
            port_id: 0,
            port_input: false,
            port_output: false,
            attributes: BTreeMap::new(),
        }
    }

    /// Returns `true` if the wire is an input, output or inout port.
    pub fn is_port(&self) -> bool {
        self.port_input || self.port_output
    }
}
