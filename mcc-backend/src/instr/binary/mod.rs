//! Binary operation lowering

mod arithmetic;
mod comparison;

pub(crate) use self::comparison::condition_for;

use mcc_frontend::ir::{IrBinaryOp, ValueId};
use crate::lower::InstSelector;
use crate::SelectError;

impl InstSelector<'_> {
    pub(crate) fn select_binary(
        &mut self,
        op: IrBinaryOp,
        lhs: ValueId,
        rhs: ValueId,
        result: Option<ValueId>,
    ) -> Result<(), SelectError> {
        let result = result
            .ok_or_else(|| self.consistency(format!("'{}' instruction without a result", op)))?;

        let lhs_reg = self.operand_reg(lhs)?;
        let rhs_reg = self.operand_reg(rhs)?;
        let result_reg = self.result_reg(result)?;

        if op.is_comparison() {
            self.emit_comparison(op, result_reg, lhs_reg, rhs_reg)?;
        } else {
            self.emit_arithmetic(op, result_reg, lhs_reg, rhs_reg)?;
        }
        self.write_result(result_reg, result)?;

        self.release(lhs);
        self.release(rhs);
        self.release(result);
        Ok(())
    }
}
