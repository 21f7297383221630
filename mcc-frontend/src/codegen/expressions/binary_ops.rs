//! Arithmetic and relational operators

use crate::ast::{NodeId, NodeKind};
use crate::ir::IrBinaryOp;
use crate::codegen::{CodegenError, Fragment, IrGenerator};
use super::generate_operand;

/// IR operation for an arithmetic or relational node kind
pub fn binary_op_for(kind: NodeKind) -> Option<IrBinaryOp> {
    let op = match kind {
        NodeKind::Add => IrBinaryOp::Add,
        NodeKind::Sub => IrBinaryOp::Sub,
        NodeKind::Mul => IrBinaryOp::Mul,
        NodeKind::Div => IrBinaryOp::Div,
        NodeKind::Mod => IrBinaryOp::Mod,
        NodeKind::Lt => IrBinaryOp::Lt,
        NodeKind::Le => IrBinaryOp::Le,
        NodeKind::Gt => IrBinaryOp::Gt,
        NodeKind::Ge => IrBinaryOp::Ge,
        NodeKind::Eq => IrBinaryOp::Eq,
        NodeKind::Ne => IrBinaryOp::Ne,
        _ => return None,
    };
    Some(op)
}

/// Both operands left to right, then one Binary instruction
pub fn generate_binary(gen: &mut IrGenerator, node: NodeId) -> Result<Fragment, CodegenError> {
    let kind = gen.ast.kind(node);
    let construct = kind.to_string();
    let op = binary_op_for(kind).ok_or_else(|| CodegenError::UnsupportedConstruct {
        construct: construct.clone(),
        location: gen.location(node),
    })?;
    let [lhs, rhs] = gen.operands(node, &construct)?;

    let mut code = Vec::new();
    let lhs = generate_operand(gen, lhs, &construct, &mut code)?;
    let rhs = generate_operand(gen, rhs, &construct, &mut code)?;
    let (inst, result) = gen.emit_binary(op, lhs, rhs)?;
    code.push(inst);
    Ok(Fragment::new(code, Some(result)))
}
