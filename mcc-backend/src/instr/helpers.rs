//! Common helper functions for instruction lowering
//!
//! Where a value lives decides how it is read and written:
//!
//! - constants: materialized with `mov` or `movw`/`movt`
//! - committed register: used directly
//! - globals: address built with `movw`/`movt` on the symbol
//! - memory: `ldr`/`str` off the base register, through `r10` when the
//!   offset does not fit
//!
//! Arrays are never loaded; reading one yields its address.

use mcc_codegen::abi::{is_valid_imm, is_valid_mem_offset, load_imm};
use mcc_codegen::{AsmInst, CallingConvention, Reg};
use mcc_common::MemoryAddr;
use mcc_frontend::ir::{ValueId, ValueKind};
use crate::lower::InstSelector;
use crate::SelectError;

impl InstSelector<'_> {
    /// Register `value` permanently lives in, if any
    pub(crate) fn committed_reg(&self, value: ValueId) -> Result<Option<Reg>, SelectError> {
        match self.func.value(value).reg {
            Some(id) => Ok(Some(Reg::try_from(id)?)),
            None => Ok(None),
        }
    }

    /// Committed register of `value`, held against scratch allocation for
    /// the rest of the instruction
    fn pinned_reg(&mut self, value: ValueId) -> Result<Option<Reg>, SelectError> {
        let reg = self.committed_reg(value)?;
        if let Some(reg) = reg {
            if !self.alloc.is_allocated(reg) {
                self.alloc.pin(reg, value);
            }
        }
        Ok(reg)
    }

    /// Register holding `value` for the current instruction
    pub(crate) fn operand_reg(&mut self, value: ValueId) -> Result<Reg, SelectError> {
        if let Some(reg) = self.pinned_reg(value)? {
            return Ok(reg);
        }
        let reg = self.alloc_reg(Some(value))?;
        self.load_var(reg, value)?;
        Ok(reg)
    }

    /// Register to compute `value` into
    pub(crate) fn result_reg(&mut self, value: ValueId) -> Result<Reg, SelectError> {
        match self.pinned_reg(value)? {
            Some(reg) => Ok(reg),
            None => self.alloc_reg(Some(value)),
        }
    }

    /// Store a computed result to its home unless it lives in `reg` already
    pub(crate) fn write_result(&mut self, reg: Reg, value: ValueId) -> Result<(), SelectError> {
        if self.committed_reg(value)?.is_none() {
            self.store_var(reg, value)?;
        }
        Ok(())
    }

    /// Release the scratch registers bound to `value`
    pub(crate) fn release(&mut self, value: ValueId) {
        self.alloc.free_value(value);
    }

    fn global_name(&self, value: ValueId) -> Result<String, SelectError> {
        match self.func.value(value).kind {
            ValueKind::Global(id) => self
                .globals
                .get(id.0 as usize)
                .map(|g| g.name.clone())
                .ok_or_else(|| self.consistency(format!("unknown global #{}", id.0))),
            _ => Err(self.consistency(format!("{} is not a global", self.func.value(value).ir_name))),
        }
    }

    /// Base register and offset for a memory home, routing offsets that
    /// do not fit through `r10`
    fn memory_operand(&mut self, addr: MemoryAddr) -> Result<(Reg, Option<Reg>, i32), SelectError> {
        let base = Reg::try_from(addr.base)?;
        if is_valid_mem_offset(addr.offset) {
            Ok((base, None, addr.offset))
        } else {
            self.emit_all(load_imm(CallingConvention::TMP_REG, addr.offset));
            Ok((base, Some(CallingConvention::TMP_REG), 0))
        }
    }

    /// `rd = base + offset`
    fn emit_address(&mut self, rd: Reg, addr: MemoryAddr) -> Result<(), SelectError> {
        let base = Reg::try_from(addr.base)?;
        let magnitude = addr.offset.unsigned_abs() as i32;
        if addr.offset >= 0 && is_valid_imm(addr.offset) {
            self.emit(AsmInst::AddImm(rd, base, addr.offset));
        } else if addr.offset < 0 && is_valid_imm(magnitude) {
            self.emit(AsmInst::SubImm(rd, base, magnitude));
        } else {
            self.emit_all(load_imm(CallingConvention::TMP_REG, addr.offset));
            self.emit(AsmInst::Add(rd, base, CallingConvention::TMP_REG));
        }
        Ok(())
    }

    /// Put the value (or, for arrays, the address) of `value` in `rd`
    pub(crate) fn load_var(&mut self, rd: Reg, value: ValueId) -> Result<(), SelectError> {
        let v = self.func.value(value).clone();

        if let Some(c) = v.const_value() {
            self.emit_all(load_imm(rd, c));
            return Ok(());
        }
        if let Some(reg) = self.committed_reg(value)? {
            if reg != rd {
                self.emit(AsmInst::Mov(rd, reg));
            }
            return Ok(());
        }
        if let ValueKind::Global(_) = v.kind {
            let name = self.global_name(value)?;
            self.emit(AsmInst::MovwSym(rd, name.clone()));
            self.emit(AsmInst::MovtSym(rd, name));
            if !v.ty.is_array() {
                self.emit(AsmInst::Ldr(rd, rd, 0));
            }
            return Ok(());
        }
        let addr = v
            .mem
            .ok_or_else(|| self.consistency(format!("{} has no register or memory home", v.ir_name)))?;
        if v.ty.is_array() {
            return self.emit_address(rd, addr);
        }
        match self.memory_operand(addr)? {
            (base, Some(index), _) => self.emit(AsmInst::LdrReg(rd, base, index)),
            (base, None, offset) => self.emit(AsmInst::Ldr(rd, base, offset)),
        }
        Ok(())
    }

    /// Write `rs` to wherever `value` lives
    pub(crate) fn store_var(&mut self, rs: Reg, value: ValueId) -> Result<(), SelectError> {
        let v = self.func.value(value).clone();

        if v.is_const() {
            return Err(self.consistency(format!("store to constant {}", v.ir_name)));
        }
        if v.ty.is_array() {
            return Err(self.unsupported(format!("store of a whole array {}", v.ir_name)));
        }
        if let Some(reg) = self.committed_reg(value)? {
            if reg != rs {
                self.emit(AsmInst::Mov(reg, rs));
            }
            return Ok(());
        }
        if let ValueKind::Global(_) = v.kind {
            let name = self.global_name(value)?;
            let tmp = CallingConvention::TMP_REG;
            self.emit(AsmInst::MovwSym(tmp, name.clone()));
            self.emit(AsmInst::MovtSym(tmp, name));
            self.emit(AsmInst::Str(rs, tmp, 0));
            return Ok(());
        }
        let addr = v
            .mem
            .ok_or_else(|| self.consistency(format!("{} has no register or memory home", v.ir_name)))?;
        match self.memory_operand(addr)? {
            (base, Some(index), _) => self.emit(AsmInst::StrReg(rs, base, index)),
            (base, None, offset) => self.emit(AsmInst::Str(rs, base, offset)),
        }
        Ok(())
    }
}
