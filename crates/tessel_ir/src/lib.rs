//! The target circuit representation produced by the netlist importer.
//!
//! A [`Design`] owns [`Module`]s; each module owns bit-addressable [`Wire`]s,
//! typed [`Cell`]s and [`Memory`] entities, plus plain `target <- value`
//! assignments. Connectivity is expressed with [`SigBit`]/[`SigSpec`].

#![warn(missing_docs)]

pub mod cell;
pub mod const_value;
pub mod design;
pub mod error;
pub mod ids;
pub mod memory;
pub mod module;
pub mod sig;
pub mod wire;

pub use cell::{BinaryOp, Cell, CellKind, Connection, GateOp, PortDirection, UnaryOp};
pub use const_value::ConstValue;
pub use design::Design;
pub use error::IrError;
pub use ids::{CellId, MemoryId, ModuleId, WireId};
pub use memory::Memory;
pub use module::{Assignment, Module, NamedItem};
pub use sig::{SigBit, SigSpec};
pub use wire::Wire;
