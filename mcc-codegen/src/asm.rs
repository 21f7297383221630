//! ARM32 Assembly Instruction Definitions
//!
//! This module defines the register model and the subset of the ARM
//! (A32) instruction set the instruction selector produces. Every
//! instruction can be viewed as an opcode plus its operand strings, and
//! prints as one line of GNU assembler syntax.

use mcc_common::RegId;
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AsmError {
    #[error("r{0} is not a register of the target")]
    UnknownRegister(RegId),
}

/// ARM32 core registers
///
/// - R0-R3: arguments, R0 also the return value
/// - R4-R10: callee-saved general purpose
/// - FP (r11), IP (r12), SP (r13), LR (r14), PC (r15)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Reg {
    R0, R1, R2, R3, R4, R5, R6, R7,
    R8, R9, R10,
    Fp,
    Ip,
    Sp,
    Lr,
    Pc,
}

impl Reg {
    /// All registers in encoding order
    pub const ALL: [Reg; 16] = [
        Reg::R0, Reg::R1, Reg::R2, Reg::R3, Reg::R4, Reg::R5, Reg::R6, Reg::R7,
        Reg::R8, Reg::R9, Reg::R10, Reg::Fp, Reg::Ip, Reg::Sp, Reg::Lr, Reg::Pc,
    ];

    /// Register number (r0 = 0 ... pc = 15)
    pub fn id(self) -> RegId {
        self as RegId
    }

    pub fn from_id(id: RegId) -> Option<Reg> {
        Self::ALL.get(id as usize).copied()
    }
}

impl TryFrom<RegId> for Reg {
    type Error = AsmError;

    fn try_from(id: RegId) -> Result<Self, Self::Error> {
        Reg::from_id(id).ok_or(AsmError::UnknownRegister(id))
    }
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reg::Fp => write!(f, "fp"),
            Reg::Ip => write!(f, "ip"),
            Reg::Sp => write!(f, "sp"),
            Reg::Lr => write!(f, "lr"),
            Reg::Pc => write!(f, "pc"),
            r => write!(f, "r{}", r.id()),
        }
    }
}

/// Condition codes the selector uses after a `cmp`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cond {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cond {
    pub fn suffix(self) -> &'static str {
        match self {
            Cond::Eq => "eq",
            Cond::Ne => "ne",
            Cond::Lt => "lt",
            Cond::Le => "le",
            Cond::Gt => "gt",
            Cond::Ge => "ge",
        }
    }

    /// Whether the condition holds for `a cmp b` (signed)
    pub fn holds(self, a: i32, b: i32) -> bool {
        match self {
            Cond::Eq => a == b,
            Cond::Ne => a != b,
            Cond::Lt => a < b,
            Cond::Le => a <= b,
            Cond::Gt => a > b,
            Cond::Ge => a >= b,
        }
    }
}

impl fmt::Display for Cond {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

/// ARM32 Assembly Instructions
#[derive(Debug, Clone, PartialEq)]
pub enum AsmInst {
    // Moves
    Mov(Reg, Reg),                // rd = rs
    MovImm(Reg, i32),             // rd = #imm (modified immediate)
    Movw(Reg, u16),               // rd = #lo16
    Movt(Reg, u16),               // rd[31:16] = #hi16
    MovwSym(Reg, String),         // rd = #:lower16:sym
    MovtSym(Reg, String),         // rd[31:16] = #:upper16:sym
    MovCond(Cond, Reg, i32),      // if cond: rd = #imm

    // Arithmetic
    Add(Reg, Reg, Reg),           // rd = rn + rm
    AddImm(Reg, Reg, i32),        // rd = rn + #imm
    Sub(Reg, Reg, Reg),           // rd = rn - rm
    SubImm(Reg, Reg, i32),        // rd = rn - #imm
    Mul(Reg, Reg, Reg),           // rd = rn * rm
    Sdiv(Reg, Reg, Reg),          // rd = rn / rm (signed, truncating)
    Cmp(Reg, Reg),                // flags = rn - rm

    // Memory
    Ldr(Reg, Reg, i32),           // rd = [rn, #off]
    LdrReg(Reg, Reg, Reg),        // rd = [rn, rm]
    Str(Reg, Reg, i32),           // [rn, #off] = rs
    StrReg(Reg, Reg, Reg),        // [rn, rm] = rs
    Push(Vec<Reg>),
    Pop(Vec<Reg>),

    // Control flow
    B(String),
    BCond(Cond, String),
    Bl(String),
    Bx(Reg),

    // Pseudo
    Label(String),
    Comment(String),
}

fn reg_list(regs: &[Reg]) -> String {
    let names: Vec<String> = regs.iter().map(Reg::to_string).collect();
    format!("{{{}}}", names.join(","))
}

fn mem(base: Reg, offset: i32) -> String {
    format!("[{},#{}]", base, offset)
}

impl AsmInst {
    /// Mnemonic including any condition suffix; empty for pseudo-ops
    pub fn opcode(&self) -> String {
        let op = match self {
            AsmInst::Mov(..) | AsmInst::MovImm(..) => "mov",
            AsmInst::Movw(..) | AsmInst::MovwSym(..) => "movw",
            AsmInst::Movt(..) | AsmInst::MovtSym(..) => "movt",
            AsmInst::MovCond(cond, ..) => return format!("mov{}", cond),
            AsmInst::Add(..) | AsmInst::AddImm(..) => "add",
            AsmInst::Sub(..) | AsmInst::SubImm(..) => "sub",
            AsmInst::Mul(..) => "mul",
            AsmInst::Sdiv(..) => "sdiv",
            AsmInst::Cmp(..) => "cmp",
            AsmInst::Ldr(..) | AsmInst::LdrReg(..) => "ldr",
            AsmInst::Str(..) | AsmInst::StrReg(..) => "str",
            AsmInst::Push(_) => "push",
            AsmInst::Pop(_) => "pop",
            AsmInst::B(_) => "b",
            AsmInst::BCond(cond, _) => return format!("b{}", cond),
            AsmInst::Bl(_) => "bl",
            AsmInst::Bx(_) => "bx",
            AsmInst::Label(_) | AsmInst::Comment(_) => "",
        };
        op.to_string()
    }

    /// Destination first, then sources, as they appear in the text
    pub fn operands(&self) -> Vec<String> {
        match self {
            AsmInst::Mov(rd, rs) => vec![rd.to_string(), rs.to_string()],
            AsmInst::MovImm(rd, imm) | AsmInst::MovCond(_, rd, imm) => {
                vec![rd.to_string(), format!("#{}", imm)]
            }
            AsmInst::Movw(rd, imm) | AsmInst::Movt(rd, imm) => vec![rd.to_string(), format!("#{}", imm)],
            AsmInst::MovwSym(rd, sym) => vec![rd.to_string(), format!("#:lower16:{}", sym)],
            AsmInst::MovtSym(rd, sym) => vec![rd.to_string(), format!("#:upper16:{}", sym)],
            AsmInst::Add(rd, rn, rm)
            | AsmInst::Sub(rd, rn, rm)
            | AsmInst::Mul(rd, rn, rm)
            | AsmInst::Sdiv(rd, rn, rm) => vec![rd.to_string(), rn.to_string(), rm.to_string()],
            AsmInst::AddImm(rd, rn, imm) | AsmInst::SubImm(rd, rn, imm) => {
                vec![rd.to_string(), rn.to_string(), format!("#{}", imm)]
            }
            AsmInst::Cmp(rn, rm) => vec![rn.to_string(), rm.to_string()],
            AsmInst::Ldr(rd, base, off) | AsmInst::Str(rd, base, off) => vec![rd.to_string(), mem(*base, *off)],
            AsmInst::LdrReg(rd, base, index) | AsmInst::StrReg(rd, base, index) => {
                vec![rd.to_string(), format!("[{},{}]", base, index)]
            }
            AsmInst::Push(regs) | AsmInst::Pop(regs) => vec![reg_list(regs)],
            AsmInst::B(label) | AsmInst::BCond(_, label) | AsmInst::Bl(label) => vec![label.clone()],
            AsmInst::Bx(reg) => vec![reg.to_string()],
            AsmInst::Label(text) | AsmInst::Comment(text) => vec![text.clone()],
        }
    }

    /// Registers written by the instruction
    pub fn defs(&self) -> Vec<Reg> {
        match self {
            AsmInst::Mov(rd, _)
            | AsmInst::MovImm(rd, _)
            | AsmInst::Movw(rd, _)
            | AsmInst::Movt(rd, _)
            | AsmInst::MovwSym(rd, _)
            | AsmInst::MovtSym(rd, _)
            | AsmInst::MovCond(_, rd, _)
            | AsmInst::Add(rd, ..)
            | AsmInst::AddImm(rd, ..)
            | AsmInst::Sub(rd, ..)
            | AsmInst::SubImm(rd, ..)
            | AsmInst::Mul(rd, ..)
            | AsmInst::Sdiv(rd, ..)
            | AsmInst::Ldr(rd, ..)
            | AsmInst::LdrReg(rd, ..) => vec![*rd],
            AsmInst::Pop(regs) => regs.clone(),
            _ => vec![],
        }
    }
}

impl fmt::Display for AsmInst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmInst::Label(label) => write!(f, "{}:", label),
            AsmInst::Comment(text) => write!(f, "\t@ {}", text),
            inst => write!(f, "\t{} {}", inst.opcode(), inst.operands().join(",")),
        }
    }
}
