//! Linear Intermediate Representation
//!
//! A three-address IR with no basic-block structure: every function is a
//! flat instruction sequence where control flow is explicit through
//! labels, gotos and conditional branches.
//!
//! ## Architecture
//!
//! - `types` - Type system (IrType)
//! - `values` - Value arena entries and global variables
//! - `instructions` - IR instructions
//! - `function` - Function container, renaming and text dump
//! - `module` - Module, builtins and scopes
//! - `scope` - Lexical scope stack

// Public exports - clean API surface
pub use self::types::{IrType, WORD_SIZE};
pub use self::values::{GlobalId, GlobalVariable, Value, ValueId, ValueKind};
pub use self::instructions::{InstId, InstKind, Instruction, IrBinaryOp, LabelId, MoveKind};
pub use self::function::Function;
pub use self::module::{Module, BUILTIN_NAMES};
pub use self::scope::{ScopeStack, Symbol};

// Internal modules
mod types;
mod values;
mod instructions;
mod function;
mod module;
mod scope;

#[cfg(test)]
pub(crate) mod interp;
