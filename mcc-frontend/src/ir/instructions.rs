//! IR Instructions
//!
//! Defines all instruction kinds of the linear IR. A function body is a
//! flat sequence of instructions; control flow is expressed only through
//! labels, gotos and conditional branches.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{IrType, ValueId};

/// Index of an instruction in its function's arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstId(pub u32);

/// Opaque label handle, allocated before the label is placed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LabelId(pub u32);

/// Binary operations: arithmetic and comparisons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IrBinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl IrBinaryOp {
    pub fn is_comparison(self) -> bool {
        matches!(
            self,
            IrBinaryOp::Lt | IrBinaryOp::Le | IrBinaryOp::Gt | IrBinaryOp::Ge | IrBinaryOp::Eq | IrBinaryOp::Ne
        )
    }

    /// Result type of the operation
    pub fn result_type(self) -> IrType {
        if self.is_comparison() {
            IrType::I1
        } else {
            IrType::I32
        }
    }
}

impl fmt::Display for IrBinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IrBinaryOp::Add => "add",
            IrBinaryOp::Sub => "sub",
            IrBinaryOp::Mul => "mul",
            IrBinaryOp::Div => "div",
            IrBinaryOp::Mod => "mod",
            IrBinaryOp::Lt => "lt",
            IrBinaryOp::Le => "le",
            IrBinaryOp::Gt => "gt",
            IrBinaryOp::Ge => "ge",
            IrBinaryOp::Eq => "eq",
            IrBinaryOp::Ne => "ne",
        };
        write!(f, "{}", s)
    }
}

/// How a move touches memory
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveKind {
    /// `dest = src`
    Copy,
    /// `*dest = src`, `dest` holds an address
    Store,
    /// `dest = *src`, `src` holds an address
    Load,
}

/// Instruction payloads
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum InstKind {
    /// Function entry marker (prologue)
    Entry,

    /// Function exit marker (epilogue) with the optional return value
    Exit(Option<ValueId>),

    /// Placement of a label
    Label(LabelId),

    /// Unconditional jump
    Goto(LabelId),

    /// Branch on a comparison result
    CondBranch {
        cond: ValueId,
        on_true: LabelId,
        on_false: LabelId,
    },

    /// Assignment between values or through an address
    Move {
        dest: ValueId,
        src: ValueId,
        kind: MoveKind,
    },

    /// result = lhs op rhs
    Binary {
        op: IrBinaryOp,
        lhs: ValueId,
        rhs: ValueId,
    },

    /// Call by name; the return type is the instruction's type
    Call { callee: String, args: Vec<ValueId> },

    /// Marks the value of outgoing argument number N (counted from the last call)
    Arg(ValueId),
}

/// One instruction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Instruction {
    pub kind: InstKind,
    /// Result type (`void` when nothing is produced)
    pub ty: IrType,
    /// Value standing for the result
    pub result: Option<ValueId>,
    /// Set externally; dead instructions are not selected
    pub dead: bool,
}

impl Instruction {
    pub fn new(kind: InstKind, ty: IrType) -> Self {
        Self { kind, ty, result: None, dead: false }
    }

    /// Whether this kind of instruction defines a value
    pub fn produces_value(&self) -> bool {
        match &self.kind {
            InstKind::Binary { .. } => true,
            InstKind::Call { .. } => !self.ty.is_void(),
            _ => false,
        }
    }

    /// Operand values in order
    pub fn operands(&self) -> Vec<ValueId> {
        match &self.kind {
            InstKind::Entry | InstKind::Label(_) | InstKind::Goto(_) => vec![],
            InstKind::Exit(v) => v.iter().copied().collect(),
            InstKind::CondBranch { cond, .. } => vec![*cond],
            InstKind::Move { dest, src, .. } => vec![*dest, *src],
            InstKind::Binary { lhs, rhs, .. } => vec![*lhs, *rhs],
            InstKind::Call { args, .. } => args.clone(),
            InstKind::Arg(v) => vec![*v],
        }
    }

    /// Labels this instruction jumps to
    pub fn jump_targets(&self) -> Vec<LabelId> {
        match &self.kind {
            InstKind::Goto(l) => vec![*l],
            InstKind::CondBranch { on_true, on_false, .. } => vec![*on_true, *on_false],
            _ => vec![],
        }
    }

    /// The comparison operator, if this is a comparison
    pub fn comparison_op(&self) -> Option<IrBinaryOp> {
        match &self.kind {
            InstKind::Binary { op, .. } if op.is_comparison() => Some(*op),
            _ => None,
        }
    }
}
