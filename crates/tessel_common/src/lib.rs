//! Shared foundational types used across the Tessel netlist importer.
//!
//! This crate provides interned identifiers, 4-state logic values, packed logic
//! vectors, the dense [`Arena`] used by both the external netlist model and the
//! target IR, and source locations.

#![warn(missing_docs)]

pub mod arena;
pub mod ident;
pub mod loc;
pub mod logic;
pub mod logic_vec;

pub use arena::{Arena, ArenaId};
pub use ident::{Ident, Interner};
pub use loc::SourceLoc;
pub use logic::Logic;
pub use logic_vec::LogicVec;
