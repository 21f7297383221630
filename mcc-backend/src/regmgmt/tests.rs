// Tests for the simple register allocator
use super::*;
use mcc_codegen::Reg;
use mcc_frontend::ir::ValueId;
use pretty_assertions::assert_eq;

#[test]
fn test_lowest_free_register_first() {
    let mut alloc = SimpleRegisterAllocator::new();

    assert_eq!(alloc.allocate(None), Some(Reg::R0));
    assert_eq!(alloc.allocate(Some(ValueId(3))), Some(Reg::R1));
    alloc.free_reg(Reg::R0);
    assert_eq!(alloc.allocate(None), Some(Reg::R0));
    assert_eq!(alloc.allocate(None), Some(Reg::R2));
}

#[test]
fn test_free_by_value() {
    let mut alloc = SimpleRegisterAllocator::new();
    let v = ValueId(7);

    let a = alloc.allocate(Some(v)).unwrap();
    let b = alloc.allocate(Some(v)).unwrap();
    let other = alloc.allocate(Some(ValueId(8))).unwrap();
    assert_ne!(a, b);

    alloc.free_value(v);
    assert!(!alloc.is_allocated(a));
    assert!(!alloc.is_allocated(b));
    assert!(alloc.is_allocated(other));
    assert!(!alloc.is_drained());

    alloc.free_reg(other);
    assert!(alloc.is_drained());
}

#[test]
fn test_reserved_registers_are_skipped() {
    let mut alloc = SimpleRegisterAllocator::new();
    for reg in [Reg::R0, Reg::R1, Reg::R2, Reg::R3] {
        assert!(alloc.allocate_specific(reg));
    }
    assert!(!alloc.allocate_specific(Reg::R2));

    assert_eq!(alloc.allocate(None), Some(Reg::R4));

    for reg in [Reg::R0, Reg::R1, Reg::R2, Reg::R3, Reg::R4] {
        alloc.free_reg(reg);
    }
    assert!(alloc.is_drained());
}

#[test]
fn test_exhaustion() {
    let mut alloc = SimpleRegisterAllocator::new();
    for _ in 0..10 {
        assert!(alloc.allocate(None).is_some());
    }
    assert_eq!(alloc.allocate(None), None);
    assert_eq!(alloc.allocated_registers().len(), 10);
}

#[test]
fn test_used_registers_survive_free() {
    let mut alloc = SimpleRegisterAllocator::new();
    let regs: Vec<Reg> = (0..6).map(|_| alloc.allocate(None).unwrap()).collect();
    for reg in &regs {
        alloc.free_reg(*reg);
    }

    assert!(alloc.is_drained());
    let used: Vec<Reg> = alloc.used_registers().iter().copied().collect();
    assert_eq!(used, vec![Reg::R0, Reg::R1, Reg::R2, Reg::R3, Reg::R4, Reg::R5]);
}

#[test]
fn test_custom_pool_order() {
    let mut alloc = SimpleRegisterAllocator::with_pool(vec![Reg::R5, Reg::R4]);
    assert_eq!(alloc.allocate(None), Some(Reg::R5));
    assert_eq!(alloc.allocate(None), Some(Reg::R4));
    assert_eq!(alloc.allocate(None), None);
}

#[test]
fn test_pinned_register_is_skipped_and_freed_with_value() {
    let mut alloc = SimpleRegisterAllocator::new();
    let param = ValueId(0);

    assert!(alloc.pin(Reg::R0, param));
    assert!(!alloc.pin(Reg::R0, ValueId(1)));
    assert_eq!(alloc.allocate(None), Some(Reg::R1));

    alloc.free_value(param);
    assert!(!alloc.is_allocated(Reg::R0));
    alloc.free_reg(Reg::R1);
    assert!(alloc.is_drained());
}
