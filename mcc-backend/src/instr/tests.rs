use mcc_codegen::{AsmInst, Cond, Reg};
use mcc_common::MemoryAddr;
use mcc_frontend::ir::{Function, InstId, InstKind, IrBinaryOp, IrType, LabelId, MoveKind, ValueId};
use pretty_assertions::assert_eq;
use crate::{select_function, SelectError, SelectOptions};

/// `f(a, b, ...)` with the given number of int parameters and an entry marker
fn function(params: usize) -> (Function, Vec<ValueId>) {
    let mut func = Function::new("f".to_string(), IrType::I32);
    let params = (0..params)
        .map(|i| func.new_param(Some(&format!("p{}", i)), IrType::I32, None))
        .collect();
    let entry = func.new_inst(InstKind::Entry, IrType::Void);
    func.append(vec![entry]);
    (func, params)
}

fn binary(func: &mut Function, op: IrBinaryOp, lhs: ValueId, rhs: ValueId) -> (InstId, ValueId) {
    let inst = func.new_inst(InstKind::Binary { op, lhs, rhs }, op.result_type());
    func.append(vec![inst]);
    let result = func.result_of(inst).unwrap();
    (inst, result)
}

fn exit(func: &mut Function, value: Option<ValueId>) {
    let inst = func.new_inst(InstKind::Exit(value), IrType::Void);
    func.append(vec![inst]);
}

fn place(func: &mut Function, label: LabelId) {
    let inst = func.label_inst(label);
    func.append(vec![inst]);
}

fn cond_branch(func: &mut Function, cond: ValueId) -> (LabelId, LabelId) {
    let on_true = func.new_label();
    let on_false = func.new_label();
    let inst = func.new_inst(InstKind::CondBranch { cond, on_true, on_false }, IrType::Void);
    func.append(vec![inst]);
    (on_true, on_false)
}

fn arg(func: &mut Function, value: ValueId) {
    let inst = func.new_inst(InstKind::Arg(value), IrType::Void);
    func.append(vec![inst]);
}

fn call(func: &mut Function, callee: &str, args: Vec<ValueId>) {
    let inst = func.new_inst(InstKind::Call { callee: callee.to_string(), args }, IrType::Void);
    func.append(vec![inst]);
}

fn select(func: &mut Function) -> Result<Vec<AsmInst>, SelectError> {
    select_with(func, &SelectOptions::default())
}

fn select_with(func: &mut Function, options: &SelectOptions) -> Result<Vec<AsmInst>, SelectError> {
    select_function(func, &[], options).map(|asm| asm.code)
}

fn listing(code: &[AsmInst]) -> Vec<String> {
    code.iter().map(|i| i.to_string()).collect()
}

fn consistency_message(err: SelectError) -> String {
    assert!(err.is_consistency(), "expected a consistency error, got {:?}", err);
    err.to_string()
}

#[test]
fn test_remainder_listing() {
    let (mut func, p) = function(2);
    let (_, t) = binary(&mut func, IrBinaryOp::Mod, p[0], p[1]);
    exit(&mut func, Some(t));

    let code = select(&mut func).unwrap();
    assert_eq!(
        listing(&code),
        vec![
            "\tpush {fp}",
            "\tmov fp,sp",
            "\tsub sp,sp,#4",
            "\tsdiv r3,r0,r1",
            "\tmul r3,r3,r1",
            "\tsub r2,r0,r3",
            "\tstr r2,[fp,#-4]",
            "\tldr r0,[fp,#-4]",
            "\tmov sp,fp",
            "\tpop {fp}",
            "\tbx lr",
        ]
    );
    assert_eq!(func.protected_regs, vec![11]);
    assert_eq!(func.max_depth, 4);
}

#[test]
fn test_comparison_materializes_zero_or_one() {
    let (mut func, p) = function(2);
    let (_, t) = binary(&mut func, IrBinaryOp::Lt, p[0], p[1]);
    exit(&mut func, Some(t));

    let code = select(&mut func).unwrap();
    assert_eq!(
        listing(&code[3..7]),
        vec!["\tcmp r0,r1", "\tmovw r2,#0", "\tmovlt r2,#1", "\tstr r2,[fp,#-4]"]
    );
}

#[test]
fn test_branch_uses_live_flags() {
    let (mut func, p) = function(2);
    let (_, c) = binary(&mut func, IrBinaryOp::Lt, p[0], p[1]);
    let (on_true, on_false) = cond_branch(&mut func, c);
    place(&mut func, on_true);
    place(&mut func, on_false);
    exit(&mut func, None);

    let code = select(&mut func).unwrap();
    let at = code.iter().position(|i| matches!(i, AsmInst::MovCond(..))).unwrap();
    assert_eq!(
        code[at + 2..at + 4].to_vec(),
        vec![
            AsmInst::BCond(Cond::Lt, ".Lf_0".to_string()),
            AsmInst::B(".Lf_1".to_string()),
        ]
    );
}

#[test]
fn test_branch_retests_stale_comparison() {
    let (mut func, p) = function(2);
    let x = func.new_local(Some("x"), IrType::I32, 1, None);
    let (_, c) = binary(&mut func, IrBinaryOp::Ge, p[0], p[1]);
    let copy = func.new_move(x, c, MoveKind::Copy);
    func.append(vec![copy]);
    let (on_true, on_false) = cond_branch(&mut func, c);
    place(&mut func, on_true);
    place(&mut func, on_false);
    exit(&mut func, None);

    let code = select(&mut func).unwrap();
    // x at [fp,#-4], c at [fp,#-8]
    let expected = vec![
        AsmInst::Ldr(Reg::R0, Reg::Fp, -8),
        AsmInst::MovImm(Reg::R1, 0),
        AsmInst::Cmp(Reg::R0, Reg::R1),
        AsmInst::BCond(Cond::Ne, ".Lf_0".to_string()),
        AsmInst::B(".Lf_1".to_string()),
    ];
    assert!(
        code.windows(expected.len()).any(|w| w == expected.as_slice()),
        "re-test sequence not found in {:?}",
        listing(&code)
    );
    assert!(!code.iter().any(|i| matches!(i, AsmInst::BCond(Cond::Ge, _))));
}

#[test]
fn test_branch_on_non_comparison_is_rejected() {
    let (mut func, p) = function(2);
    let (_, sum) = binary(&mut func, IrBinaryOp::Add, p[0], p[1]);
    let (on_true, on_false) = cond_branch(&mut func, sum);
    place(&mut func, on_true);
    place(&mut func, on_false);
    exit(&mut func, None);

    let message = consistency_message(select(&mut func).unwrap_err());
    assert!(message.contains("not the result of a comparison"), "{}", message);
}

#[test]
fn test_unplaced_label_is_rejected() {
    let (mut func, p) = function(2);
    let (_, c) = binary(&mut func, IrBinaryOp::Eq, p[0], p[1]);
    let (on_true, _) = cond_branch(&mut func, c);
    place(&mut func, on_true);
    exit(&mut func, None);

    let message = consistency_message(select(&mut func).unwrap_err());
    assert!(message.contains("never placed"), "{}", message);
}

#[test]
fn test_arg_marker_in_expected_register() {
    let (mut func, p) = function(2);
    arg(&mut func, p[0]);
    arg(&mut func, p[1]);
    call(&mut func, "h", vec![p[0], p[1]]);
    exit(&mut func, None);

    let code = select(&mut func).unwrap();
    assert!(code.contains(&AsmInst::Bl("h".to_string())));
    assert_eq!(code[0], AsmInst::Push(vec![Reg::Fp, Reg::Lr]));
}

#[test]
fn test_arg_marker_in_wrong_register() {
    let (mut func, p) = function(2);
    arg(&mut func, p[1]);
    call(&mut func, "h", vec![p[1]]);
    exit(&mut func, None);

    let message = consistency_message(select(&mut func.clone()).unwrap_err());
    assert!(message.contains("ARG 0"), "{}", message);

    let lenient = SelectOptions {
        strict_arg_markers: false,
        ..SelectOptions::default()
    };
    let code = select_with(&mut func, &lenient).unwrap();
    assert!(code.contains(&AsmInst::Mov(Reg::R0, Reg::R1)));
}

#[test]
fn test_arg_marker_count_mismatch() {
    let (mut func, p) = function(2);
    arg(&mut func, p[0]);
    arg(&mut func, p[1]);
    call(&mut func, "h", vec![p[0]]);
    exit(&mut func, None);

    let message = consistency_message(select(&mut func).unwrap_err());
    assert!(message.contains("2 ARG markers"), "{}", message);
}

#[test]
fn test_arg_marker_on_stack_slot() {
    let sp = Reg::Sp.id();
    for (offset, ok) in [(0, true), (4, false)] {
        let (mut func, p) = function(5);
        let slot = func.new_stack_slot(IrType::I32);
        func.value_mut(slot).mem = Some(MemoryAddr::new(sp, offset));
        for &v in &p[..4] {
            arg(&mut func, v);
        }
        arg(&mut func, slot);
        call(&mut func, "h", p.clone());
        exit(&mut func, None);

        let result = select(&mut func);
        if ok {
            let code = result.unwrap();
            assert!(code.iter().any(|i| matches!(i, AsmInst::Str(_, Reg::Sp, 0))));
        } else {
            let message = consistency_message(result.unwrap_err());
            assert!(message.contains("ARG 4"), "{}", message);
        }
    }
}

#[test]
fn test_dead_instructions_are_skipped() {
    let (mut func, p) = function(2);
    let (div, t) = binary(&mut func, IrBinaryOp::Div, p[0], p[1]);
    func.inst_mut(div).dead = true;
    call(&mut func, "h", vec![]);
    let dead_call = *func.code.last().unwrap();
    func.inst_mut(dead_call).dead = true;
    exit(&mut func, Some(t));

    let code = select(&mut func).unwrap();
    assert!(!code.iter().any(|i| matches!(i, AsmInst::Sdiv(..) | AsmInst::Bl(_))));
    assert_eq!(code[0], AsmInst::Push(vec![Reg::Fp]));
}

#[test]
fn test_unsupported_store_is_skipped() {
    let (mut func, p) = function(1);
    let addr = func.const_int(64);
    let store = func.new_move(addr, p[0], MoveKind::Store);
    func.append(vec![store]);
    exit(&mut func, Some(p[0]));

    let code = select(&mut func).unwrap();
    assert!(!code.iter().any(|i| matches!(i, AsmInst::Str(..))));
    assert_eq!(code.last(), Some(&AsmInst::Bx(Reg::Lr)));
}

#[test]
fn test_skipped_instruction_leaves_no_partial_code() {
    let (mut func, p) = function(2);
    let whole = IrType::array(IrType::I32, vec![2]);
    let add = func.new_inst(InstKind::Binary { op: IrBinaryOp::Add, lhs: p[0], rhs: p[1] }, whole);
    func.append(vec![add]);
    exit(&mut func, None);

    let code = select(&mut func).unwrap();
    assert!(!code.iter().any(|i| matches!(i, AsmInst::Add(..) | AsmInst::AddImm(..))));
    // prologue then straight into the epilogue
    assert_eq!(code.len(), 6);
    assert_eq!(listing(&code[3..]), vec!["\tmov sp,fp", "\tpop {fp}", "\tbx lr"]);
}

#[test]
fn test_ir_comments() {
    let (mut func, p) = function(2);
    let (_, t) = binary(&mut func, IrBinaryOp::Add, p[0], p[1]);
    exit(&mut func, Some(t));

    let options = SelectOptions {
        show_ir_comments: true,
        ..SelectOptions::default()
    };
    let code = select_with(&mut func, &options).unwrap();
    let comments: Vec<&AsmInst> = code.iter().filter(|i| matches!(i, AsmInst::Comment(_))).collect();
    assert_eq!(comments.len(), 3);
    assert_eq!(code[0], AsmInst::Comment("entry".to_string()));
    assert_eq!(code[0].to_string(), "\t@ entry");
}
