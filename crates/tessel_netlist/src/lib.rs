//! The front end's elaborated, hierarchical bit-level netlist as seen by the importer.
//!
//! The importer never walks the front end's object graph directly. It goes
//! through [`NetlistView`], a read-only capability interface over opaque
//! handles, and the hoisting pass additionally uses [`NetlistEdit`].
//! [`NetlistDb`] is an arena-backed implementation with builder helpers for
//! embedding front ends and tests.

#![warn(missing_docs)]

pub mod db;
pub mod ids;
pub mod types;
pub mod view;

pub use db::NetlistDb;
pub use ids::{InstanceId, NetBusId, NetId, NetlistId, PortBusId, PortId};
pub use types::{Direction, InstanceType, Object, PortRole};
pub use view::{hierarchical_name, NetlistEdit, NetlistView, PortRef};
