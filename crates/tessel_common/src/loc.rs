//! Source locations reported by the front end.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A `file:line` location attached to front-end objects and diagnostics.
#[derive(Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
pub struct SourceLoc {
    /// The source file name as reported by the front end.
    pub file: String,
    /// The 1-based line number.
    pub line: u32,
}

impl SourceLoc {
    /// Creates a new location.
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl fmt::Display for SourceLoc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.file, self.line)
    }
}
