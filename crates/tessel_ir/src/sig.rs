//! Bit-level signal references.
//!
//! A [`SigBit`] is either a constant [`Logic`] value or one bit of a wire; a
//! [`SigSpec`] is an ordered sequence of bits, least significant first.

use crate::ids::WireId;
use serde::{Deserialize, Serialize};
use std::ops::Index;
use tessel_common::{Logic, LogicVec};

/// A single signal bit.
///
/// Two wire bits are equal exactly when they name the same bit of the same
/// wire, which is how identity of a resolved net is observed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub enum SigBit {
    /// A constant driver.
    Const(Logic),
    /// Bit `offset` of a wire (0 is the least significant bit).
    Wire {
        /// The wire.
        wire: WireId,
        /// Bit index within the wire.
        offset: u32,
    },
}

impl SigBit {
    /// Bit `offset` of `wire`.
    pub fn wire(wire: WireId, offset: u32) -> Self {
        SigBit::Wire { wire, offset }
    }

    /// Returns `true` for constant bits.
    pub fn is_const(self) -> bool {
        matches!(self, SigBit::Const(_))
    }

    /// Returns the wire this bit belongs to, if any.
    pub fn as_wire(self) -> Option<(WireId, u32)> {
        match self {
            SigBit::Wire { wire, offset } => Some((wire, offset)),
            SigBit::Const(_) => None,
        }
    }
}

impl From<Logic> for SigBit {
    fn from(value: Logic) -> Self {
        SigBit::Const(value)
    }
}

/// An ordered sequence of [`SigBit`]s, least significant bit first.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
pub struct SigSpec {
    bits: Vec<SigBit>,
}

impl SigSpec {
    /// An empty signal.
    pub fn new() -> Self {
        Self::default()
    }

    /// All bits of a wire of the given width, bit 0 first.
    pub fn from_wire(wire: WireId, width: u32) -> Self {
        (0..width).map(|offset| SigBit::wire(wire, offset)).collect()
    }

    /// `width` copies of a constant value.
    pub fn constant(value: Logic, width: u32) -> Self {
        Self {
            bits: vec![SigBit::Const(value); width as usize],
        }
    }

    /// The bits of a constant vector.
    pub fn from_const(value: &LogicVec) -> Self {
        value.iter().map(SigBit::Const).collect()
    }

    /// Number of bits.
    pub fn width(&self) -> u32 {
        self.bits.len() as u32
    }

    /// Returns `true` if there are no bits.
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Appends one bit at the most significant end.
    pub fn push(&mut self, bit: impl Into<SigBit>) {
        self.bits.push(bit.into());
    }

    /// Appends all bits of `other` above the current most significant bit.
    pub fn append(&mut self, other: &SigSpec) {
        self.bits.extend_from_slice(&other.bits);
    }

    /// This signal concatenated with itself `count` times.
    pub fn repeat(&self, count: u32) -> SigSpec {
        let mut out = SigSpec::new();
        for _ in 0..count {
            out.append(self);
        }
        out
    }

    /// Returns `true` if every bit is a constant.
    pub fn is_fully_const(&self) -> bool {
        self.bits.iter().all(|b| b.is_const())
    }

    /// Returns the constant value if every bit is a constant.
    pub fn as_const(&self) -> Option<LogicVec> {
        self.bits
            .iter()
            .map(|b| match b {
                SigBit::Const(v) => Some(*v),
                SigBit::Wire { .. } => None,
            })
            .collect()
    }

    /// Returns `true` if this is a constant with at least one `1` bit.
    ///
    /// Any wire bit makes the result `false`.
    pub fn as_bool(&self) -> bool {
        self.as_const().is_some_and(|v| v.as_bool())
    }

    /// The bits, least significant first.
    pub fn bits(&self) -> &[SigBit] {
        &self.bits
    }

    /// Iterates over the bits, least significant first.
    pub fn iter(&self) -> impl Iterator<Item = SigBit> + '_ {
        self.bits.iter().copied()
    }
}

impl From<SigBit> for SigSpec {
    fn from(bit: SigBit) -> Self {
        Self { bits: vec![bit] }
    }
}

impl From<Logic> for SigSpec {
    fn from(value: Logic) -> Self {
        SigSpec::from(SigBit::Const(value))
    }
}

impl FromIterator<SigBit> for SigSpec {
    fn from_iter<T: IntoIterator<Item = SigBit>>(iter: T) -> Self {
        Self {
            bits: iter.into_iter().collect(),
        }
    }
}

impl Index<usize> for SigSpec {
    type Output = SigBit;

    fn index(&self, index: usize) -> &SigBit {
        &self.bits[index]
    }
}
