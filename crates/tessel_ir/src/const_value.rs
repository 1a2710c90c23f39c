//! Constant values for cell parameters and attributes.

use serde::{Deserialize, Serialize};
use tessel_common::LogicVec;

/// A constant attached to a wire, cell, memory or module as an attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    /// An integer constant.
    Int(i64),
    /// A bit pattern, e.g. the `init` value of a wire.
    Logic(LogicVec),
    /// A string, e.g. the `src` location.
    String(String),
    /// A flag, e.g. `blackbox`.
    Bool(bool),
}

impl ConstValue {
    /// Returns the bit pattern if this is a [`ConstValue::Logic`].
    pub fn as_logic(&self) -> Option<&LogicVec> {
        match self {
            ConstValue::Logic(v) => Some(v),
            _ => None,
        }
    }

    /// Returns the string if this is a [`ConstValue::String`].
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ConstValue::String(s) => Some(s),
            _ => None,
        }
    }
}
