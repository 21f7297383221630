//! Array element references
//!
//! `a[i0][i1]..` becomes one row-major byte offset added to the base
//! address. A fully indexed reference read as a value is loaded into a
//! memory temporary; as an assignment target it stays an address.
//! Partial indexing always yields the address of the sub-array.

use log::trace;
use crate::ast::NodeId;
use crate::ir::{IrBinaryOp, IrType, MoveKind, WORD_SIZE};
use crate::codegen::{CodegenError, EvalMode, Fragment, IrGenerator};
use super::{generate_operand, identifiers};

pub fn generate_array_ref(gen: &mut IrGenerator, node: NodeId, mode: EvalMode) -> Result<Fragment, CodegenError> {
    let ast = gen.ast;
    let location = gen.location(node);
    let (base_node, index_nodes) = match ast.children(node) {
        [base, indices @ ..] if !indices.is_empty() => (*base, indices),
        _ => {
            return Err(CodegenError::MissingOperand {
                construct: "array reference".to_string(),
                location,
            })
        }
    };

    let name = gen.node_name(base_node)?;
    let base = identifiers::lookup_variable(gen, &name, &location)?;
    let dims = match gen.func()?.value(base).index_dims() {
        Some(dims) if index_nodes.len() <= dims.len() => dims.to_vec(),
        _ => return Err(CodegenError::InvalidArrayRef { name, location }),
    };

    let mut code = Vec::new();
    let mut indices = Vec::with_capacity(index_nodes.len());
    for &index in index_nodes {
        indices.push(generate_operand(gen, index, "array index", &mut code)?);
    }

    // offset = (...(i0*d1 + i1)*d2 + i2...) * remaining * elem_size
    let mut offset = indices[0];
    for (k, &index) in indices.iter().enumerate().skip(1) {
        let dim = gen.const_int(dims[k] as i32)?;
        let (inst, scaled) = gen.emit_binary(IrBinaryOp::Mul, offset, dim)?;
        code.push(inst);
        let (inst, sum) = gen.emit_binary(IrBinaryOp::Add, scaled, index)?;
        code.push(inst);
        offset = sum;
    }
    let remaining = &dims[indices.len()..];
    let stride = remaining.iter().product::<u32>() * WORD_SIZE;
    let stride = gen.const_int(stride as i32)?;
    let (inst, bytes) = gen.emit_binary(IrBinaryOp::Mul, offset, stride)?;
    code.push(inst);

    let pointee = if remaining.is_empty() {
        IrType::I32
    } else {
        IrType::array(IrType::I32, remaining.to_vec())
    };
    let (inst, address) = gen.emit_binary_typed(IrBinaryOp::Add, base, bytes, IrType::ptr(pointee))?;
    code.push(inst);
    trace!("Array ref '{}' with {} of {} indices", name, indices.len(), dims.len());

    if !remaining.is_empty() || mode == EvalMode::AsAddress {
        return Ok(Fragment::new(code, Some(address)));
    }

    let f = gen.func()?;
    let element = f.new_mem(IrType::I32);
    code.push(f.new_move(element, address, MoveKind::Load));
    Ok(Fragment::new(code, Some(element)))
}
