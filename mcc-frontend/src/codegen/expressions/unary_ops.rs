//! Unary minus

use crate::ast::NodeId;
use crate::ir::IrBinaryOp;
use crate::codegen::{CodegenError, Fragment, IrGenerator};
use super::{generate_operand, logical_ops};

/// `-x` lowers to `0 - x`; a boolean operand is widened to 0/1 first
pub fn generate_negation(gen: &mut IrGenerator, node: NodeId) -> Result<Fragment, CodegenError> {
    let [operand] = gen.operands(node, "-")?;
    let mut code = Vec::new();
    let mut value = generate_operand(gen, operand, "-", &mut code)?;

    if gen.func()?.value(value).ty.is_bool() {
        value = logical_ops::widen_bool(gen, value, &mut code)?;
    }

    let zero = gen.const_int(0)?;
    let (inst, result) = gen.emit_binary(IrBinaryOp::Sub, zero, value)?;
    code.push(inst);
    Ok(Fragment::new(code, Some(result)))
}
