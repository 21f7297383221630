//! Common types used throughout the compiler
//! 
//! Plain identifiers shared by the IR (which records back-end facts on
//! its values) and the back end (which computes them).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Physical register number as understood by the target profile
pub type RegId = u8;

/// A memory location: base register plus byte offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MemoryAddr {
    pub base: RegId,
    pub offset: i32,
}

impl MemoryAddr {
    pub fn new(base: RegId, offset: i32) -> Self {
        Self { base, offset }
    }
}

impl fmt::Display for MemoryAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[r{}, #{}]", self.base, self.offset)
    }
}
