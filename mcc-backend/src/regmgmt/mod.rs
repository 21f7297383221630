//! Register Management Module
//!
//! The selector's only register state: a table of scratch registers that
//! is filled and drained within the translation of a single instruction.

pub use self::allocator::SimpleRegisterAllocator;

mod allocator;

#[cfg(test)]
mod tests;
