//! Assembly text emission
//!
//! Turns selected functions and global data into a GNU `as` source file
//! for ARMv7.

use std::fmt::Write;
use crate::asm::AsmInst;

/// One module-level variable as the assembler sees it
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalData {
    pub name: String,
    /// Size in bytes
    pub size: u32,
    pub init: Option<i32>,
    /// Zero-initialised; emitted as a common symbol
    pub in_bss: bool,
}

/// Selected instructions of one function, prologue and epilogue included
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionAsm {
    pub name: String,
    pub code: Vec<AsmInst>,
}

/// Label of IR label number `n` inside `function`
pub fn local_label(function: &str, n: u32) -> String {
    format!(".L{}_{}", function, n)
}

/// File header, functions in `.text`, then initialised data and commons
pub fn emit_module(globals: &[GlobalData], functions: &[FunctionAsm]) -> String {
    let mut out = String::new();
    out.push_str("\t.arch armv7ve\n\t.arm\n\t.text\n");
    for function in functions {
        out.push_str(&emit_function(function));
    }
    out.push_str(&emit_globals(globals));
    out
}

pub fn emit_function(function: &FunctionAsm) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(out, "\t.align 1");
    let _ = writeln!(out, "\t.global {}", function.name);
    let _ = writeln!(out, "\t.type {}, %function", function.name);
    let _ = writeln!(out, "{}:", function.name);
    for inst in &function.code {
        let _ = writeln!(out, "{}", inst);
    }
    out
}

pub fn emit_globals(globals: &[GlobalData]) -> String {
    let mut out = String::new();
    let data: Vec<&GlobalData> = globals.iter().filter(|g| !g.in_bss).collect();
    if !data.is_empty() {
        out.push_str("\t.data\n");
        for g in data {
            let _ = writeln!(out, "\t.align 4");
            let _ = writeln!(out, "\t.global {}", g.name);
            let _ = writeln!(out, "\t.type {}, %object", g.name);
            let _ = writeln!(out, "\t.size {}, {}", g.name, g.size);
            let _ = writeln!(out, "{}:", g.name);
            let _ = writeln!(out, "\t.word {}", g.init.unwrap_or(0));
        }
    }
    for g in globals.iter().filter(|g| g.in_bss) {
        let _ = writeln!(out, "\t.comm {}, {}, 4", g.name, g.size);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asm::Reg;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_emit_function() {
        let function = FunctionAsm {
            name: "main".to_string(),
            code: vec![
                AsmInst::Push(vec![Reg::Fp]),
                AsmInst::Mov(Reg::Fp, Reg::Sp),
                AsmInst::MovImm(Reg::R0, 0),
                AsmInst::Label(local_label("main", 1)),
                AsmInst::Mov(Reg::Sp, Reg::Fp),
                AsmInst::Pop(vec![Reg::Fp]),
                AsmInst::Bx(Reg::Lr),
            ],
        };
        let expected = "\
\t.align 1
\t.global main
\t.type main, %function
main:
\tpush {fp}
\tmov fp,sp
\tmov r0,#0
.Lmain_1:
\tmov sp,fp
\tpop {fp}
\tbx lr
";
        assert_eq!(emit_function(&function), expected);
    }

    #[test]
    fn test_emit_globals() {
        let globals = vec![
            GlobalData { name: "g".to_string(), size: 4, init: Some(3), in_bss: false },
            GlobalData { name: "a".to_string(), size: 40, init: None, in_bss: true },
        ];
        let expected = "\
\t.data
\t.align 4
\t.global g
\t.type g, %object
\t.size g, 4
g:
\t.word 3
\t.comm a, 40, 4
";
        assert_eq!(emit_globals(&globals), expected);
    }

    #[test]
    fn test_emit_module_header() {
        let text = emit_module(&[], &[]);
        assert_eq!(text, "\t.arch armv7ve\n\t.arm\n\t.text\n");
    }
}
