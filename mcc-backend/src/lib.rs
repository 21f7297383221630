//! MiniC Compiler - Backend
//!
//! This crate lowers the linear IR produced by the frontend to ARM32
//! assembly: a frame layout per function, a one-pass instruction
//! selector and a simple per-instruction register allocator.

mod error;
mod instr;
pub mod lower;
pub mod regmgmt;

#[cfg(test)]
mod tests;

pub use error::SelectError;
pub use lower::{lower_module_to_assembly, select_function, select_module};
pub use regmgmt::SimpleRegisterAllocator;

// Re-export IR types from frontend for convenience
pub use mcc_frontend::ir::{Function, InstKind, Instruction, IrType, Module, MoveKind, Value};

use mcc_codegen::CallingConvention;
use serde::{Deserialize, Serialize};

/// Options for instruction selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectOptions {
    /// ARG markers that disagree with the call layout are errors rather
    /// than warnings
    pub strict_arg_markers: bool,
    /// Alignment of `sp` after the prologue, in bytes
    pub frame_align: i32,
    /// Emit each IR instruction as an assembly comment before its code
    pub show_ir_comments: bool,
}

impl Default for SelectOptions {
    fn default() -> Self {
        Self {
            strict_arg_markers: true,
            frame_align: CallingConvention::STACK_ALIGN,
            show_ir_comments: false,
        }
    }
}
