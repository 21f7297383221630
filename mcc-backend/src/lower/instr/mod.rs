//! Instruction Dispatch
//!
//! One match arm per IR opcode. Handlers report unsupported constructs as
//! `SelectError::Unsupported`, which is logged here and skipped; every
//! other error aborts the function.

mod control_flow;

use mcc_codegen::AsmInst;
use mcc_frontend::ir::{InstId, InstKind};
use log::{trace, warn};
use crate::lower::InstSelector;
use crate::SelectError;

impl InstSelector<'_> {
    pub(crate) fn select_body(&mut self) -> Result<(), SelectError> {
        for id in self.func.code.clone() {
            self.select_instruction(id)?;
        }
        Ok(())
    }

    fn select_instruction(&mut self, id: InstId) -> Result<(), SelectError> {
        let inst = self.func.inst(id).clone();
        let text = self.func.inst_text(id);
        if inst.dead {
            trace!("  skip dead: {}", text);
            return Ok(());
        }
        trace!("  {}", text);

        if self.options.show_ir_comments && !matches!(inst.kind, InstKind::Label(_)) {
            self.emit(AsmInst::Comment(text.clone()));
        }

        let start = self.code.len();
        let is_arg = matches!(inst.kind, InstKind::Arg(_));
        let result = match inst.kind {
            InstKind::Entry => self.select_entry(),
            InstKind::Exit(value) => self.select_exit(value),
            InstKind::Label(label) => self.select_label(label),
            InstKind::Goto(label) => self.select_goto(label),
            InstKind::CondBranch { cond, on_true, on_false } => {
                self.select_cond_branch(cond, on_true, on_false)
            }
            InstKind::Move { dest, src, kind } => self.select_move(dest, src, kind),
            InstKind::Binary { op, lhs, rhs } => self.select_binary(op, lhs, rhs, inst.result),
            InstKind::Call { callee, args } => self.select_call(&callee, &args, inst.result),
            InstKind::Arg(value) => self.select_arg(value),
        };

        let skipped = match result {
            Ok(()) => false,
            Err(SelectError::Unsupported { what, .. }) => {
                warn!("Unsupported in '{}': {}; skipping '{}'", self.func.name, what, text);
                self.code.truncate(start);
                for reg in self.alloc.allocated_registers() {
                    self.alloc.free_reg(reg);
                }
                true
            }
            Err(err) => return Err(err),
        };

        if !is_arg {
            self.arg_count = 0;
        }
        if !self.alloc.is_drained() {
            return Err(self.consistency(format!(
                "registers {:?} still allocated after '{}'",
                self.alloc.allocated_registers(),
                text
            )));
        }
        // a skipped comparison leaves no flags behind
        self.last_inst = if skipped { None } else { Some(id) };
        Ok(())
    }
}
