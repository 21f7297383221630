//! Frame Layout - Gives every value a home
//!
//! Register parameters live in their argument register for the whole
//! function. Everything else that needs storage gets a word-aligned slot
//! below `fp`:
//!
//! ```text
//!   [fp + 4*|protected| + 4*(k-4)]  incoming argument k >= 4
//!   [fp, fp + 4*|protected|)        saved registers
//!   [fp - depth, fp)                locals, memory temporaries, results
//!   [sp, sp + outgoing)             outgoing arguments 4, 5, ...
//! ```

use mcc_codegen::abi::align_to;
use mcc_codegen::{AsmInst, CallingConvention, Frame, Reg};
use mcc_common::MemoryAddr;
use mcc_frontend::ir::{Function, InstKind, IrType, ValueId, WORD_SIZE};
use std::collections::BTreeSet;
use log::trace;
use crate::{SelectError, SelectOptions};

/// Selection passes allowed before the protected register set must be stable
pub(crate) const MAX_FRAME_PASSES: usize = 4;

/// Record whether the function calls and its widest call
pub(crate) fn scan_calls(func: &mut Function) {
    let mut has_call = false;
    let mut max_args = 0;
    for &id in &func.code {
        let inst = func.inst(id);
        if let InstKind::Call { args, .. } = &inst.kind {
            if inst.dead {
                continue;
            }
            has_call = true;
            max_args = max_args.max(args.len());
        }
    }
    func.has_call = has_call;
    func.max_call_args = max_args;
}

/// One stack-backed value per outgoing argument slot beyond the fourth,
/// at `[sp,#0]`, `[sp,#4]`, ...
pub(crate) fn outgoing_arg_slots(func: &mut Function) -> Vec<ValueId> {
    (CallingConvention::MAX_REG_PARAMS..func.max_call_args)
        .map(|k| {
            let slot = func.new_stack_slot(IrType::I32);
            let offset = CallingConvention::outgoing_arg_offset(k);
            func.value_mut(slot).mem = Some(MemoryAddr::new(CallingConvention::STACK_PTR.id(), offset));
            slot
        })
        .collect()
}

/// Registers every function saves before knowing what it clobbers
pub(crate) fn initial_protected(func: &Function) -> Vec<Reg> {
    let mut protected = vec![CallingConvention::FRAME_PTR];
    if func.has_call {
        protected.push(CallingConvention::LINK_REG);
    }
    protected
}

/// `current` plus every callee-saved register `code` writes
pub(crate) fn protected_registers(current: &[Reg], code: &[AsmInst]) -> Vec<Reg> {
    let mut set: BTreeSet<Reg> = current.iter().copied().collect();
    set.extend(
        code.iter()
            .flat_map(AsmInst::defs)
            .filter(|r| CallingConvention::is_callee_saved(*r)),
    );
    set.into_iter().collect()
}

/// Assign homes for a frame saving `protected` and size the frame.
///
/// Fails when the frame would not be addressable with 32-bit offsets.
pub(crate) fn layout_frame(
    func: &mut Function,
    protected: &[Reg],
    options: &SelectOptions,
) -> Result<Frame, SelectError> {
    let saved = Frame::new(protected.to_vec(), 0);
    let fp = CallingConvention::FRAME_PTR.id();

    for (k, id) in func.params.clone().into_iter().enumerate() {
        let value = func.value_mut(id);
        match CallingConvention::param_reg(k) {
            Some(reg) => {
                value.reg = Some(reg.id());
                value.mem = None;
            }
            None => {
                value.reg = None;
                value.mem = Some(MemoryAddr::new(fp, saved.incoming_arg_offset(k)));
            }
        }
    }

    let mut homes: Vec<ValueId> = func.locals.iter().chain(func.mems.iter()).copied().collect();
    homes.extend(func.code.iter().filter_map(|&id| func.result_of(id)));

    let too_large = |name: &str| SelectError::unsupported(name, "stack frame larger than 2 GiB");
    let name = func.name.clone();
    let mut depth = 0i32;
    for id in homes {
        let value = func.value_mut(id);
        if value.reg.is_some() {
            continue;
        }
        depth = i32::try_from(value.ty.size_in_bytes().max(WORD_SIZE))
            .ok()
            .and_then(|bytes| depth.checked_add(bytes))
            .ok_or_else(|| too_large(&name))?;
        value.mem = Some(MemoryAddr::new(fp, -depth));
        trace!("  {} -> [fp,#{}]", value.ir_name, -depth);
    }

    let outgoing = CallingConvention::outgoing_arg_offset(func.max_call_args);
    let saved_bytes = CallingConvention::WORD_SIZE * saved.protected.len() as i32;
    let align = options.frame_align.max(CallingConvention::WORD_SIZE);
    let total = depth
        .checked_add(outgoing + saved_bytes)
        .filter(|total| total.checked_add(align).is_some())
        .ok_or_else(|| too_large(&name))?;
    let size = align_to(total, align) - saved_bytes;

    func.protected_regs = saved.protected.iter().map(|r| r.id()).collect();
    func.max_depth = size;
    Ok(Frame::new(saved.protected, size))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn function_with_params(count: usize) -> Function {
        let mut func = Function::new("f".to_string(), IrType::I32);
        for i in 0..count {
            func.new_param(Some(&format!("p{}", i)), IrType::I32, None);
        }
        func
    }

    #[test]
    fn test_register_and_stack_params() {
        let mut func = function_with_params(6);
        let protected = vec![Reg::R4, Reg::Fp, Reg::Lr];
        layout_frame(&mut func, &protected, &SelectOptions::default()).unwrap();

        let p = func.params.clone();
        assert_eq!(func.value(p[0]).reg, Some(0));
        assert_eq!(func.value(p[3]).reg, Some(3));
        assert_eq!(func.value(p[4]).mem, Some(MemoryAddr::new(11, 12)));
        assert_eq!(func.value(p[5]).mem, Some(MemoryAddr::new(11, 16)));
    }

    #[test]
    fn test_locals_below_fp_and_alignment() {
        let mut func = function_with_params(0);
        let a = func.new_local(Some("a"), IrType::I32, 1, None);
        let arr = func.new_local(Some("arr"), IrType::array(IrType::I32, vec![2, 3]), 1, None);
        let t = func.new_mem(IrType::I32);

        let frame = layout_frame(&mut func, &[Reg::Fp], &SelectOptions::default()).unwrap();

        assert_eq!(func.value(a).mem, Some(MemoryAddr::new(11, -4)));
        assert_eq!(func.value(arr).mem, Some(MemoryAddr::new(11, -28)));
        assert_eq!(func.value(t).mem, Some(MemoryAddr::new(11, -32)));
        // 32 bytes of slots plus one saved register, padded to 8
        assert_eq!(frame.size, 36);
        assert_eq!(func.max_depth, 36);
        assert_eq!(func.protected_regs, vec![11]);
    }

    #[test]
    fn test_frame_beyond_offset_range_is_rejected() {
        let mut func = function_with_params(0);
        // each array alone is addressable, together they are not
        let half = IrType::array(IrType::I32, vec![0x2000_0000 - 1]);
        func.new_local(Some("a"), half.clone(), 1, None);
        func.new_local(Some("b"), half, 1, None);

        let err = layout_frame(&mut func, &[Reg::Fp], &SelectOptions::default()).unwrap_err();
        assert!(matches!(err, SelectError::Unsupported { .. }), "{:?}", err);
    }

    #[test]
    fn test_outgoing_area_and_slots() {
        let mut func = function_with_params(0);
        let c = func.const_int(1);
        let args = vec![c; 6];
        let call = func.new_inst(InstKind::Call { callee: "g".to_string(), args }, IrType::Void);
        func.append(vec![call]);

        scan_calls(&mut func);
        assert!(func.has_call);
        assert_eq!(func.max_call_args, 6);

        let slots = outgoing_arg_slots(&mut func);
        assert_eq!(slots.len(), 2);
        assert_eq!(func.value(slots[0]).mem, Some(MemoryAddr::new(13, 0)));
        assert_eq!(func.value(slots[1]).mem, Some(MemoryAddr::new(13, 4)));

        let protected = initial_protected(&func);
        assert_eq!(protected, vec![Reg::Fp, Reg::Lr]);
        let frame = layout_frame(&mut func, &protected, &SelectOptions::default()).unwrap();
        assert_eq!(frame.size, 8);
    }

    #[test]
    fn test_protected_registers_grow_with_clobbers() {
        let code = vec![
            AsmInst::MovImm(Reg::R0, 1),
            AsmInst::MovImm(Reg::R5, 2),
            AsmInst::Sub(Reg::Sp, Reg::Sp, Reg::R10),
            AsmInst::MovImm(Reg::R10, 3),
        ];
        let protected = protected_registers(&[Reg::Fp], &code);
        assert_eq!(protected, vec![Reg::R5, Reg::R10, Reg::Fp]);
    }
}
