//! Packed vectors of 4-state logic values.
//!
//! Used for constant parameters and for the `init` attribute of wires.

use crate::logic::Logic;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A vector of [`Logic`] values, index 0 being the least significant bit.
///
/// Each value occupies 2 bits, 32 values per `u64` word.
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogicVec {
    width: u32,
    data: Vec<u64>,
}

const VALUES_PER_WORD: u32 = 32;

impl LogicVec {
    /// Creates a vector of the given width with every bit set to `fill`.
    pub fn filled(width: u32, fill: Logic) -> Self {
        let mut v = Self {
            width,
            data: vec![0; word_count(width)],
        };
        if fill != Logic::Zero {
            for i in 0..width {
                v.set(i, fill);
            }
        }
        v
    }

    /// Creates an all-`Zero` vector.
    pub fn new(width: u32) -> Self {
        Self::filled(width, Logic::Zero)
    }

    /// Creates an all-`X` vector.
    pub fn all_x(width: u32) -> Self {
        Self::filled(width, Logic::X)
    }

    /// Returns the number of logic values in this vector.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Gets the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn get(&self, index: u32) -> Logic {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word = self.data[(index / VALUES_PER_WORD) as usize];
        match (word >> ((index % VALUES_PER_WORD) * 2)) & 0b11 {
            0 => Logic::Zero,
            1 => Logic::One,
            2 => Logic::X,
            _ => Logic::Z,
        }
    }

    /// Sets the value at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.width()`.
    pub fn set(&mut self, index: u32, value: Logic) {
        assert!(
            index < self.width,
            "index {index} out of bounds for width {}",
            self.width
        );
        let word_idx = (index / VALUES_PER_WORD) as usize;
        let shift = (index % VALUES_PER_WORD) * 2;
        let mask = !(0b11u64 << shift);
        self.data[word_idx] = (self.data[word_idx] & mask) | ((value as u64) << shift);
    }

    /// Appends a value at the most significant end.
    pub fn push(&mut self, value: Logic) {
        self.width += 1;
        if self.data.len() < word_count(self.width) {
            self.data.push(0);
        }
        self.set(self.width - 1, value);
    }

    /// Creates a vector holding the low `width` bits of `value`.
    pub fn from_u64(value: u64, width: u32) -> Self {
        let mut v = Self::new(width);
        for i in 0..width.min(64) {
            if (value >> i) & 1 != 0 {
                v.set(i, Logic::One);
            }
        }
        v
    }

    /// Converts to a `u64` if every bit is `0` or `1` and the width fits.
    pub fn to_u64(&self) -> Option<u64> {
        if self.width > 64 {
            return None;
        }
        let mut result = 0u64;
        for i in 0..self.width {
            match self.get(i) {
                Logic::Zero => {}
                Logic::One => result |= 1 << i,
                Logic::X | Logic::Z => return None,
            }
        }
        Some(result)
    }

    /// Parses a string like `"10xz"`, leftmost character most significant.
    pub fn from_binary_str(s: &str) -> Option<Self> {
        let mut v = Self::new(s.chars().count() as u32);
        for (i, c) in s.chars().rev().enumerate() {
            v.set(i as u32, Logic::from_char(c)?);
        }
        Some(v)
    }

    /// Returns `true` if every bit is `0` or `1`.
    pub fn is_fully_defined(&self) -> bool {
        self.iter().all(Logic::is_defined)
    }

    /// Returns `true` if no bit is `0` or `1`.
    pub fn is_fully_undefined(&self) -> bool {
        !self.iter().any(Logic::is_defined)
    }

    /// Returns `true` if any bit is `One`.
    pub fn as_bool(&self) -> bool {
        self.iter().any(|b| b == Logic::One)
    }

    /// Iterates over the values, least significant first.
    pub fn iter(&self) -> impl Iterator<Item = Logic> + '_ {
        (0..self.width).map(move |i| self.get(i))
    }
}

impl FromIterator<Logic> for LogicVec {
    fn from_iter<T: IntoIterator<Item = Logic>>(iter: T) -> Self {
        let mut v = LogicVec::new(0);
        for bit in iter {
            v.push(bit);
        }
        v
    }
}

impl fmt::Display for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in (0..self.width).rev() {
            write!(f, "{}", self.get(i))?;
        }
        Ok(())
    }
}

impl fmt::Debug for LogicVec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "LogicVec({}'b{self})", self.width)
    }
}

fn word_count(width: u32) -> usize {
    width.div_ceil(VALUES_PER_WORD) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filled_and_set() {
        let mut v = LogicVec::all_x(40);
        assert_eq!(v.get(39), Logic::X);
        v.set(33, Logic::One);
        assert_eq!(v.get(33), Logic::One);
        assert_eq!(v.get(32), Logic::X);
        assert!(!v.is_fully_undefined());
    }

    #[test]
    fn binary_string_is_msb_first() {
        let v = LogicVec::from_binary_str("10xz").unwrap();
        assert_eq!(v.width(), 4);
        assert_eq!(v.get(3), Logic::One);
        assert_eq!(v.get(0), Logic::Z);
        assert_eq!(v.to_string(), "10xz");
        assert!(LogicVec::from_binary_str("102").is_none());
    }

    #[test]
    fn u64_conversions() {
        let v = LogicVec::from_u64(0b1010, 4);
        assert_eq!(v.to_string(), "1010");
        assert_eq!(v.to_u64(), Some(10));
        assert_eq!(LogicVec::all_x(2).to_u64(), None);
    }

    #[test]
    fn push_crosses_word_boundary() {
        let mut v: LogicVec = std::iter::repeat(Logic::Zero).take(32).collect();
        v.push(Logic::One);
        assert_eq!(v.width(), 33);
        assert_eq!(v.get(32), Logic::One);
        assert!(v.as_bool());
        assert!(v.is_fully_defined());
    }

    #[test]
    fn as_bool_ignores_undefined_bits() {
        assert!(!LogicVec::from_binary_str("0x0").unwrap().as_bool());
        assert!(!LogicVec::new(8).as_bool());
    }
}
