//! Lowering of an elaborated bit-level netlist into a [`Design`](tessel_ir::Design).
//!
//! Each sub-circuit reachable from the selected tops becomes one module.
//! Nets are mapped to wire bits by the [`NetMap`], RAM nets become memories,
//! primitives and operators are lowered through a gate-level or a cell-level
//! table chosen by [`LoweringMode`](tessel_config::LoweringMode), verification
//! primitives become assert/assume/cover cells, and every other instance
//! becomes an opaque cell whose sub-circuit is queued for import.
//!
//! # Usage
//!
//! ```ignore
//! let design = import_design(&mut netlist, &config.import, &interner, &sink)?;
//! ```

#![warn(missing_docs)]

mod builder;
mod cells;
pub mod dispatch;
pub mod error;
pub mod extnets;
mod gates;
mod importer;
pub mod memory;
pub mod resolver;
pub mod session;
mod sva;
pub mod worklist;

pub use dispatch::{dispatch, Route};
pub use error::{
    ImportError, E300, E301, E302, E303, E304, E305, E306, E307, E308, E309, E310, E311, E312, W300,
    W301,
};
pub use extnets::{hoist_external_nets, ExtNetHoister};
pub use memory::parse_wide_init;
pub use resolver::NetMap;
pub use session::{module_name, ImportOptions, ImportSession};
pub use worklist::{drain_worklist, import_design, resolve_tops};
