//! Memories inferred from RAM-shaped nets.

use crate::const_value::ConstValue;
use crate::ids::MemoryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tessel_common::Ident;

/// A word-addressed memory. Its ports are separate
/// [`MemRead`](crate::CellKind::MemRead) / [`MemWrite`](crate::CellKind::MemWrite)
/// cells that refer to it by name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Memory {
    /// The ID of this memory within its module.
    pub id: MemoryId,
    /// The memory name, unique in the module namespace.
    pub name: Ident,
    /// Bits per word.
    pub width: u32,
    /// Number of words.
    pub size: u32,
    /// Attributes such as `src`.
    pub attributes: BTreeMap<String, ConstValue>,
}
