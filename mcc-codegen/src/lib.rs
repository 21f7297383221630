//! MiniC Compiler - ARM32 Code Generation Support
//!
//! This crate holds what the instruction selector targets:
//!
//! - The ARM32 register and instruction model
//! - ABI implementation (calling convention, stack frames, immediates)
//! - Assembly text emission

pub mod asm;
pub mod abi;
pub mod emit;

pub use asm::{AsmError, AsmInst, Cond, Reg};
pub use abi::{CallingConvention, Frame};
pub use emit::{emit_module, local_label, FunctionAsm, GlobalData};

/// Main entry point for assembly text generation
pub fn generate_assembly(globals: &[GlobalData], functions: &[FunctionAsm]) -> String {
    emit_module(globals, functions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_code_generation() {
        let functions = vec![FunctionAsm {
            name: "main".to_string(),
            code: vec![AsmInst::MovImm(Reg::R0, 42), AsmInst::Bx(Reg::Lr)],
        }];
        let globals = vec![GlobalData { name: "x".to_string(), size: 4, init: None, in_bss: true }];

        let asm = generate_assembly(&globals, &functions);
        assert!(asm.starts_with("\t.arch armv7ve"));
        assert!(asm.contains("main:\n\tmov r0,#42\n\tbx lr\n"));
        assert!(asm.contains(".comm x, 4, 4"));
    }
}
