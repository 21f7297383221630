//! `!`, `&&` and `||` used as values
//!
//! These have no IR operation. The branch generator decides the outcome
//! and a micro-branch writes 1 or 0 into a fresh i32 local.

use crate::ast::NodeId;
use crate::ir::{InstId, IrType, LabelId, MoveKind, ValueId};
use crate::codegen::{generate_branch_for_condition, CodegenError, Fragment, IrGenerator};

pub fn generate_logical_value(gen: &mut IrGenerator, node: NodeId) -> Result<Fragment, CodegenError> {
    let mut code = Vec::new();
    let on_true = gen.new_label()?;
    let on_false = gen.new_label()?;
    generate_branch_for_condition(gen, node, on_true, on_false, &mut code)?;
    let value = write_one_or_zero(gen, on_true, on_false, &mut code)?;
    Ok(Fragment::new(code, Some(value)))
}

/// 0/1 i32 copy of a boolean comparison result
pub fn widen_bool(gen: &mut IrGenerator, cond: ValueId, code: &mut Vec<InstId>) -> Result<ValueId, CodegenError> {
    let on_true = gen.new_label()?;
    let on_false = gen.new_label()?;
    code.push(gen.emit_cond_branch(cond, on_true, on_false)?);
    write_one_or_zero(gen, on_true, on_false, code)
}

/// `on_true: t = 1; br merge; on_false: t = 0; merge:`
fn write_one_or_zero(
    gen: &mut IrGenerator,
    on_true: LabelId,
    on_false: LabelId,
    code: &mut Vec<InstId>,
) -> Result<ValueId, CodegenError> {
    let level = gen.module.scope_level();
    let merge = gen.new_label()?;
    let f = gen.func()?;
    let temp = f.new_local(None, IrType::I32, level, None);
    let one = f.const_int(1);
    let zero = f.const_int(0);

    code.push(f.label_inst(on_true));
    code.push(f.new_move(temp, one, MoveKind::Copy));
    code.push(f.new_goto(merge));
    code.push(f.label_inst(on_false));
    code.push(f.new_move(temp, zero, MoveKind::Copy));
    code.push(f.label_inst(merge));
    Ok(temp)
}
