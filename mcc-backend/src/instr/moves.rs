//! Move lowering
//!
//! The IR tags every move with its memory behaviour, so nothing is
//! inferred from operand types:
//!
//! - `Store`: `*dest = src`, `str src,[dest]`
//! - `Load`: `dest = *src`, `ldr` then write `dest` home
//! - `Copy`: register or memory on either side, bouncing through a
//!   scratch register when both are in memory

use mcc_codegen::AsmInst;
use mcc_frontend::ir::{MoveKind, ValueId};
use crate::lower::InstSelector;
use crate::SelectError;

impl InstSelector<'_> {
    pub(crate) fn select_move(&mut self, dest: ValueId, src: ValueId, kind: MoveKind) -> Result<(), SelectError> {
        match kind {
            MoveKind::Store => self.select_store(dest, src),
            MoveKind::Load => self.select_load(dest, src),
            MoveKind::Copy => self.select_copy(dest, src),
        }
    }

    fn select_store(&mut self, addr: ValueId, src: ValueId) -> Result<(), SelectError> {
        if self.func.value(addr).is_const() {
            return Err(self.unsupported("store through a constant address"));
        }
        let addr_reg = self.operand_reg(addr)?;
        let value_reg = self.operand_reg(src)?;
        self.emit(AsmInst::Str(value_reg, addr_reg, 0));
        self.release(addr);
        self.release(src);
        Ok(())
    }

    fn select_load(&mut self, dest: ValueId, addr: ValueId) -> Result<(), SelectError> {
        if self.func.value(addr).is_const() {
            return Err(self.unsupported("load from a constant address"));
        }
        let addr_reg = self.operand_reg(addr)?;
        let dest_reg = self.result_reg(dest)?;
        self.emit(AsmInst::Ldr(dest_reg, addr_reg, 0));
        self.write_result(dest_reg, dest)?;
        self.release(dest);
        self.release(addr);
        Ok(())
    }

    /// `dest = src` between registers and memory homes
    pub(crate) fn select_copy(&mut self, dest: ValueId, src: ValueId) -> Result<(), SelectError> {
        if self.func.value(dest).ty.is_array() {
            return Err(self.unsupported(format!(
                "copy into array {}",
                self.func.value(dest).ir_name
            )));
        }

        if let Some(src_reg) = self.committed_reg(src)? {
            self.store_var(src_reg, dest)
        } else if let Some(dest_reg) = self.committed_reg(dest)? {
            self.load_var(dest_reg, src)
        } else {
            let tmp = self.alloc_reg(None)?;
            self.load_var(tmp, src)?;
            self.store_var(tmp, dest)?;
            self.alloc.free_reg(tmp);
            Ok(())
        }
    }
}
