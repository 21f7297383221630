//! Instruction Selection Module
//!
//! Translation of the data-moving IR opcodes. Every handler follows the
//! same shape: bring operands into registers (a committed register is
//! used as is, anything else is loaded into a scratch register), emit the
//! operation, write the result home, release the scratch registers.
//!
//! - `helpers` - loading and storing values by where they live
//! - `moves` - copies, stores through and loads from addresses
//! - `binary` - arithmetic, remainder and comparisons
//! - `call` - calls and ARG markers

mod helpers;
mod moves;
mod call;
mod binary;

pub(crate) use self::binary::condition_for;

#[cfg(test)]
mod tests;
