//! Literals and variable references

use crate::ast::NodeId;
use crate::ir::{Symbol, ValueId};
use mcc_common::SourceLocation;
use crate::codegen::{CodegenError, Fragment, IrGenerator};

pub fn generate_literal(gen: &mut IrGenerator, node: NodeId) -> Result<Fragment, CodegenError> {
    // 2147483648 only appears under a negation and wraps to INT_MIN
    let value = gen.node_literal(node)? as i32;
    Ok(Fragment::value_only(gen.const_int(value)?))
}

pub fn generate_identifier(gen: &mut IrGenerator, node: NodeId) -> Result<Fragment, CodegenError> {
    let name = gen.node_name(node)?;
    let location = gen.location(node);
    Ok(Fragment::value_only(lookup_variable(gen, &name, &location)?))
}

/// Resolve `name` to a value of the current function, innermost scope first
pub fn lookup_variable(gen: &mut IrGenerator, name: &str, location: &SourceLocation) -> Result<ValueId, CodegenError> {
    match gen.module.lookup(name) {
        Some(Symbol::Local(value)) => Ok(value),
        Some(Symbol::Global(id)) => {
            let ty = gen.module.global(id).ty.clone();
            Ok(gen.func()?.global_ref(id, name, ty))
        }
        None => Err(CodegenError::UndefinedVariable {
            name: name.to_string(),
            location: location.clone(),
        }),
    }
}
