//! Simple Register Allocator
//!
//! Hands out scratch registers one instruction at a time. There is no
//! notion of live ranges: an operand is loaded right before it is used
//! and its register is released right after, so the allocation table
//! must be empty again once an instruction has been translated.
//!
//! - Scratch pool r0-r9, lowest free register first
//! - `allocate_specific` force-reserves a register (argument registers
//!   around a call)
//! - Every register ever handed out is remembered so the frame can
//!   protect the callee-saved ones

use mcc_codegen::{CallingConvention, Reg};
use mcc_frontend::ir::ValueId;
use std::collections::{BTreeMap, BTreeSet};
use log::trace;

/// Who holds an allocated register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Holder {
    /// Anonymous scratch use
    Scratch,
    /// Bound to a value so it can be released with `free_value`
    Value(ValueId),
    /// Reserved by number
    Reserved,
}

#[derive(Debug, Clone)]
pub struct SimpleRegisterAllocator {
    pool: Vec<Reg>,
    allocated: BTreeMap<Reg, Holder>,
    used: BTreeSet<Reg>,
}

impl Default for SimpleRegisterAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SimpleRegisterAllocator {
    pub fn new() -> Self {
        Self::with_pool(CallingConvention::SCRATCH_POOL.to_vec())
    }

    /// Allocator over an explicit pool, searched in the given order
    pub fn with_pool(pool: Vec<Reg>) -> Self {
        Self {
            pool,
            allocated: BTreeMap::new(),
            used: BTreeSet::new(),
        }
    }

    /// Lowest free register of the pool, optionally bound to `value`.
    /// `None` when every register is taken.
    pub fn allocate(&mut self, value: Option<ValueId>) -> Option<Reg> {
        let reg = self.pool.iter().copied().find(|r| !self.allocated.contains_key(r))?;
        let holder = value.map_or(Holder::Scratch, Holder::Value);
        trace!("    alloc {} for {:?}", reg, holder);
        self.allocated.insert(reg, holder);
        self.used.insert(reg);
        Some(reg)
    }

    /// Reserve `reg` whether or not it is in the pool. Returns false if it
    /// was already taken.
    pub fn allocate_specific(&mut self, reg: Reg) -> bool {
        if self.allocated.contains_key(&reg) {
            return false;
        }
        trace!("    reserve {}", reg);
        self.allocated.insert(reg, Holder::Reserved);
        self.used.insert(reg);
        true
    }

    /// Hold `reg` for `value` while an instruction reads it from its
    /// committed register. Returns false if it was already taken.
    pub fn pin(&mut self, reg: Reg, value: ValueId) -> bool {
        if self.allocated.contains_key(&reg) {
            return false;
        }
        trace!("    pin {} for {}", reg, value);
        self.allocated.insert(reg, Holder::Value(value));
        self.used.insert(reg);
        true
    }

    pub fn free_reg(&mut self, reg: Reg) {
        if self.allocated.remove(&reg).is_some() {
            trace!("    free {}", reg);
        }
    }

    /// Release every register bound to `value`
    pub fn free_value(&mut self, value: ValueId) {
        self.allocated.retain(|reg, holder| {
            let keep = *holder != Holder::Value(value);
            if !keep {
                trace!("    free {} ({})", reg, value);
            }
            keep
        });
    }

    pub fn is_allocated(&self, reg: Reg) -> bool {
        self.allocated.contains_key(&reg)
    }

    /// Registers currently held, in register order
    pub fn allocated_registers(&self) -> Vec<Reg> {
        self.allocated.keys().copied().collect()
    }

    /// Nothing is held
    pub fn is_drained(&self) -> bool {
        self.allocated.is_empty()
    }

    /// Every register handed out since creation
    pub fn used_registers(&self) -> &BTreeSet<Reg> {
        &self.used
    }
}
