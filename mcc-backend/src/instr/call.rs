//! Call lowering
//!
//! Arguments 0-3 go to r0-r3, which stay reserved while the arguments are
//! set up; arguments 4 and up are copied to `[sp,#0]`, `[sp,#4]`, ...
//! The result is copied out of r0.
//!
//! ARG markers are written by whatever pass commits argument homes. When
//! present they are checked against this layout.

use mcc_codegen::{AsmInst, CallingConvention};
use mcc_common::MemoryAddr;
use mcc_frontend::ir::ValueId;
use log::warn;
use crate::lower::InstSelector;
use crate::SelectError;

impl InstSelector<'_> {
    pub(crate) fn select_call(
        &mut self,
        callee: &str,
        args: &[ValueId],
        result: Option<ValueId>,
    ) -> Result<(), SelectError> {
        if self.arg_count > 0 && self.arg_count != args.len() {
            self.arg_marker_violation(format!(
                "{} ARG markers precede a call to '{}' with {} arguments",
                self.arg_count,
                callee,
                args.len()
            ))?;
        }

        if !args.is_empty() {
            for reg in CallingConvention::PARAM_REGS {
                if !self.alloc.allocate_specific(reg) {
                    return Err(self.consistency(format!("argument register {} is busy", reg)));
                }
            }
        }

        for (k, &arg) in args.iter().enumerate().skip(CallingConvention::MAX_REG_PARAMS) {
            let slot = self
                .arg_slots
                .get(k - CallingConvention::MAX_REG_PARAMS)
                .copied()
                .ok_or_else(|| self.consistency(format!("no stack slot for argument {}", k)))?;
            self.select_copy(slot, arg)?;
        }

        for (&arg, reg) in args.iter().zip(CallingConvention::PARAM_REGS) {
            let reg_value = self.func.register_value(reg.id());
            self.select_copy(reg_value, arg)?;
        }

        self.emit(AsmInst::Bl(callee.to_string()));

        if !args.is_empty() {
            for reg in CallingConvention::PARAM_REGS {
                self.alloc.free_reg(reg);
            }
        }

        if let Some(result) = result {
            let ret = self.func.register_value(CallingConvention::RETURN_REG.id());
            self.select_copy(result, ret)?;
        }
        Ok(())
    }

    /// Check that ARG marker N names argument N's home: r_N for the first
    /// four, `[sp,#4*(N-4)]` after that
    pub(crate) fn select_arg(&mut self, value: ValueId) -> Result<(), SelectError> {
        let n = self.arg_count;
        self.arg_count += 1;

        let v = self.func.value(value);
        let problem = match CallingConvention::param_reg(n) {
            Some(expected) => match v.reg {
                Some(id) if id == expected.id() => None,
                Some(id) => Some(format!("ARG {} ({}) is in r{}, expected {}", n, v.ir_name, id, expected)),
                None => Some(format!("ARG {} ({}) is not in a register", n, v.ir_name)),
            },
            None => {
                let offset = CallingConvention::outgoing_arg_offset(n);
                let expected = MemoryAddr::new(CallingConvention::STACK_PTR.id(), offset);
                if v.mem == Some(expected) {
                    None
                } else {
                    Some(format!("ARG {} ({}) is not at [sp,#{}]", n, v.ir_name, offset))
                }
            }
        };

        match problem {
            Some(message) => self.arg_marker_violation(message),
            None => Ok(()),
        }
    }

    fn arg_marker_violation(&self, message: String) -> Result<(), SelectError> {
        if self.options.strict_arg_markers {
            Err(self.consistency(message))
        } else {
            warn!("'{}': {}", self.func.name, message);
            Ok(())
        }
    }
}
