//! Lowering Module - Integrates All Selection Components
//!
//! - `module` - whole-module entry points and global data
//! - `function` - per-function driver and the selector state
//! - `frame` - homes for values and the stack frame size
//! - `instr` - per-opcode dispatch and control flow

pub mod module;
mod function;
mod frame;
mod instr;

pub use self::function::select_function;
pub use self::module::{global_data, lower_module_to_assembly, select_module};

pub(crate) use self::function::InstSelector;
