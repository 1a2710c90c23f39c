//! Parsing and validation of `tessel.toml` import settings.
//!
//! The `[import]` table selects the top sub-circuits, the lowering mode and
//! the optional passes of an import run, producing a typed [`ImportConfig`].

#![warn(missing_docs)]

pub mod error;
pub mod loader;
pub mod types;

pub use error::ConfigError;
pub use loader::{load_config, load_config_from_str};
pub use types::*;
