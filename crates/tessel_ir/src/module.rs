//! Modules: the unit of hierarchy in the target IR.
//!
//! Wires, cells and memories of one module share a single namespace; the
//! `add_*` methods reject a name that is already taken, so callers pick a
//! fresh name first.

use crate::cell::{Cell, CellKind};
use crate::const_value::ConstValue;
use crate::error::IrError;
use crate::ids::{CellId, MemoryId, WireId};
use crate::memory::Memory;
use crate::sig::SigSpec;
use crate::wire::Wire;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessel_common::{Arena, Ident, Interner};

/// A continuous `target <- value` connection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    /// The driven bits.
    pub target: SigSpec,
    /// The driving bits, same width as `target`.
    pub value: SigSpec,
}

/// What a name in the module namespace refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum NamedItem {
    /// A wire.
    Wire(WireId),
    /// A cell.
    Cell(CellId),
    /// A memory.
    Memory(MemoryId),
}

/// A module of the target design.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Module {
    /// The module name.
    pub name: Ident,
    /// All wires.
    pub wires: Arena<WireId, Wire>,
    /// All cells.
    pub cells: Arena<CellId, Cell>,
    /// All memories.
    pub memories: Arena<MemoryId, Memory>,
    /// Continuous connections.
    pub assignments: Vec<Assignment>,
    /// Module attributes such as `blackbox` and `src`.
    pub attributes: BTreeMap<String, ConstValue>,
    names: BTreeMap<Ident, NamedItem>,
}

impl Module {
    /// Creates an empty module.
    pub fn new(name: Ident) -> Self {
        Self {
            name,
            wires: Arena::new(),
            cells: Arena::new(),
            memories: Arena::new(),
            assignments: Vec::new(),
            attributes: BTreeMap::new(),
            names: BTreeMap::new(),
        }
    }

    /// Looks up a name in the module namespace.
    pub fn lookup(&self, name: Ident) -> Option<NamedItem> {
        self.names.get(&name).copied()
    }

    /// Returns `true` if no wire, cell or memory uses `name`.
    pub fn is_name_free(&self, name: Ident) -> bool {
        !self.names.contains_key(&name)
    }

    fn claim(&mut self, name: Ident, item: NamedItem) -> Result<(), IrError> {
        if self.names.contains_key(&name) {
            return Err(IrError::DuplicateName(name));
        }
        self.names.insert(name, item);
        Ok(())
    }

    /// Adds a non-port wire.
    pub fn add_wire(&mut self, name: Ident, width: u32) -> Result<WireId, IrError> {
        let id = WireId::from_raw(self.wires.len() as u32);
        self.claim(name, NamedItem::Wire(id))?;
        Ok(self.wires.alloc(Wire::new(id, name, width)))
    }

    /// Adds a cell without connections.
    pub fn add_cell(&mut self, name: Ident, kind: CellKind) -> Result<CellId, IrError> {
        let id = CellId::from_raw(self.cells.len() as u32);
        self.claim(name, NamedItem::Cell(id))?;
        Ok(self.cells.alloc(Cell::new(id, name, kind)))
    }

    /// Adds a memory of `size` words of `width` bits.
    pub fn add_memory(&mut self, name: Ident, width: u32, size: u32) -> Result<MemoryId, IrError> {
        let id = MemoryId::from_raw(self.memories.len() as u32);
        self.claim(name, NamedItem::Memory(id))?;
        Ok(self.memories.alloc(Memory {
            id,
            name,
            width,
            size,
            attributes: BTreeMap::new(),
        }))
    }

    /// Returns the wire named `name`.
    pub fn wire_by_name(&self, name: Ident) -> Option<&Wire> {
        match self.lookup(name)? {
            NamedItem::Wire(id) => self.wires.get(id),
            _ => None,
        }
    }

    /// Returns the cell named `name`.
    pub fn cell_by_name(&self, name: Ident) -> Option<&Cell> {
        match self.lookup(name)? {
            NamedItem::Cell(id) => self.cells.get(id),
            _ => None,
        }
    }

    /// Returns the memory named `name`.
    pub fn memory_by_name(&self, name: Ident) -> Option<&Memory> {
        match self.lookup(name)? {
            NamedItem::Memory(id) => self.memories.get(id),
            _ => None,
        }
    }

    /// Records that `value` drives `target`.
    pub fn connect(&mut self, target: SigSpec, value: SigSpec) -> Result<(), IrError> {
        if target.width() != value.width() {
            return Err(IrError::WidthMismatch {
                target: target.width(),
                value: value.width(),
            });
        }
        self.assignments.push(Assignment { target, value });
        Ok(())
    }

    /// Port wires ordered by `port_id`.
    pub fn ports(&self) -> Vec<&Wire> {
        let mut ports: Vec<&Wire> = self.wires.values().filter(|w| w.is_port()).collect();
        ports.sort_by_key(|w| w.port_id);
        ports
    }

    /// Renumbers port ids to `1..=n`.
    ///
    /// Ports that already carry an id keep their relative order and come
    /// first; ports without one follow, sorted by name. Non-port wires end up
    /// with id 0.
    pub fn fixup_ports(&mut self, interner: &Interner) {
        let mut ports: Vec<(u32, String, WireId)> = Vec::new();
        for (id, wire) in self.wires.iter() {
            if wire.is_port() {
                let rank = if wire.port_id == 0 { u32::MAX } else { wire.port_id };
                ports.push((rank, interner.resolve(wire.name).to_string(), id));
            }
        }
        ports.sort();
        for wire in self.wires.ids().collect::<Vec<_>>() {
            self.wires[wire].port_id = 0;
        }
        for (index, (_, _, id)) in ports.into_iter().enumerate() {
            self.wires[id].port_id = index as u32 + 1;
        }
    }

    /// Returns `true` if the boolean attribute `key` is set.
    pub fn has_bool_attribute(&self, key: &str) -> bool {
        matches!(self.attributes.get(key), Some(ConstValue::Bool(true)))
    }
}
