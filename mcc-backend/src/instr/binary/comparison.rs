//! Comparison operation generation

use mcc_codegen::{AsmInst, Cond, Reg};
use mcc_frontend::ir::IrBinaryOp;
use crate::lower::InstSelector;
use crate::SelectError;

/// Condition code testing a comparison after `cmp lhs,rhs`
pub(crate) fn condition_for(op: IrBinaryOp) -> Option<Cond> {
    match op {
        IrBinaryOp::Eq => Some(Cond::Eq),
        IrBinaryOp::Ne => Some(Cond::Ne),
        IrBinaryOp::Lt => Some(Cond::Lt),
        IrBinaryOp::Le => Some(Cond::Le),
        IrBinaryOp::Gt => Some(Cond::Gt),
        IrBinaryOp::Ge => Some(Cond::Ge),
        _ => None,
    }
}

impl InstSelector<'_> {
    /// `cmp a,b; movw rd,#0; mov<cond> rd,#1`
    pub(super) fn emit_comparison(&mut self, op: IrBinaryOp, rd: Reg, a: Reg, b: Reg) -> Result<(), SelectError> {
        let cond = condition_for(op)
            .ok_or_else(|| self.consistency(format!("'{}' is not a comparison", op)))?;
        self.emit(AsmInst::Cmp(a, b));
        self.emit(AsmInst::Movw(rd, 0));
        self.emit(AsmInst::MovCond(cond, rd, 1));
        Ok(())
    }
}
