//! Arithmetic operation generation

use mcc_codegen::{AsmInst, Reg};
use mcc_frontend::ir::IrBinaryOp;
use crate::lower::InstSelector;
use crate::SelectError;

impl InstSelector<'_> {
    /// `rd = a op b`; remainder has no instruction and becomes
    /// `tmp = a / b; tmp = tmp * b; rd = a - tmp`
    pub(super) fn emit_arithmetic(&mut self, op: IrBinaryOp, rd: Reg, a: Reg, b: Reg) -> Result<(), SelectError> {
        match op {
            IrBinaryOp::Add => self.emit(AsmInst::Add(rd, a, b)),
            IrBinaryOp::Sub => self.emit(AsmInst::Sub(rd, a, b)),
            IrBinaryOp::Mul => self.emit(AsmInst::Mul(rd, a, b)),
            IrBinaryOp::Div => self.emit(AsmInst::Sdiv(rd, a, b)),
            IrBinaryOp::Mod => {
                let tmp = self.alloc_reg(None)?;
                self.emit(AsmInst::Sdiv(tmp, a, b));
                self.emit(AsmInst::Mul(tmp, tmp, b));
                self.emit(AsmInst::Sub(rd, a, tmp));
                self.alloc.free_reg(tmp);
            }
            _ => return Err(self.consistency(format!("'{}' is not an arithmetic operation", op))),
        }
        Ok(())
    }
}
