use mcc_codegen::{AsmInst, CallingConvention, Cond};
use mcc_frontend::ir::{LabelId, ValueId};
use log::debug;
use crate::instr::condition_for;
use crate::lower::InstSelector;
use crate::SelectError;

impl InstSelector<'_> {
    pub(crate) fn select_entry(&mut self) -> Result<(), SelectError> {
        let prologue = self.frame.gen_prologue();
        self.emit_all(prologue);
        Ok(())
    }

    pub(crate) fn select_exit(&mut self, value: Option<ValueId>) -> Result<(), SelectError> {
        if let Some(value) = value {
            self.load_var(CallingConvention::RETURN_REG, value)?;
        }
        let epilogue = self.frame.gen_epilogue();
        self.emit_all(epilogue);
        Ok(())
    }

    pub(crate) fn select_label(&mut self, label: LabelId) -> Result<(), SelectError> {
        let name = self.label_name(label);
        self.emit(AsmInst::Label(name));
        Ok(())
    }

    pub(crate) fn select_goto(&mut self, target: LabelId) -> Result<(), SelectError> {
        let name = self.label_name(target);
        self.emit(AsmInst::B(name));
        Ok(())
    }

    /// `b<cond> T; b F` on the flags of the comparison producing `cond`
    pub(crate) fn select_cond_branch(
        &mut self,
        cond: ValueId,
        on_true: LabelId,
        on_false: LabelId,
    ) -> Result<(), SelectError> {
        let producer = self.func.value(cond).producer();
        let op = producer
            .and_then(|inst| self.func.inst(inst).comparison_op())
            .ok_or_else(|| {
                self.consistency(format!(
                    "branch condition {} is not the result of a comparison",
                    self.func.value(cond).ir_name
                ))
            })?;
        let cc = condition_for(op)
            .ok_or_else(|| self.consistency(format!("no condition code for '{}'", op)))?;

        let true_label = self.label_name(on_true);
        let false_label = self.label_name(on_false);

        if self.last_inst == producer {
            self.emit(AsmInst::BCond(cc, true_label));
        } else {
            // Something ran since the compare; test the stored 0/1 instead
            debug!("flags for {} are stale, re-testing the stored result", self.func.value(cond).ir_name);
            let value_reg = self.operand_reg(cond)?;
            let zero = self.alloc_reg(None)?;
            self.emit(AsmInst::MovImm(zero, 0));
            self.emit(AsmInst::Cmp(value_reg, zero));
            self.emit(AsmInst::BCond(Cond::Ne, true_label));
            self.alloc.free_reg(zero);
            self.release(cond);
        }
        self.emit(AsmInst::B(false_label));
        Ok(())
    }
}
