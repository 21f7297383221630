//! Local and global declarations

use log::debug;
use mcc_common::SourceLocation;
use crate::ast::{NodeId, NodeKind};
use crate::ir::{GlobalVariable, InstId, IrType, MoveKind, Symbol, WORD_SIZE};
use crate::codegen::expressions::generate_operand;
use crate::codegen::{CodegenError, IrGenerator};

/// Type, name and trailing children shared by `VarDecl` and `ArrayDecl`
fn split_decl<'n>(gen: &IrGenerator<'n>, decl: NodeId) -> Result<(IrType, String, &'n [NodeId]), CodegenError> {
    let ast = gen.ast;
    match ast.children(decl) {
        [ty, name, rest @ ..] => Ok((gen.node_type(*ty)?, gen.node_name(*name)?, rest)),
        _ => Err(CodegenError::MissingOperand {
            construct: ast.kind(decl).to_string(),
            location: gen.location(decl),
        }),
    }
}

fn array_dims(gen: &IrGenerator, dim_nodes: &[NodeId]) -> Result<Vec<u32>, CodegenError> {
    dim_nodes.iter().map(|&d| gen.node_literal(d)).collect()
}

/// `int` array of `dims`; its byte size must fit a signed frame offset.
/// An omitted leading dimension (`0`) counts as one row.
pub(crate) fn int_array(name: &str, dims: Vec<u32>, location: &SourceLocation) -> Result<IrType, CodegenError> {
    let bytes = dims.iter().try_fold(WORD_SIZE, |bytes, &d| bytes.checked_mul(d.max(1)));
    match bytes.map(i32::try_from) {
        Some(Ok(_)) => Ok(IrType::array(IrType::I32, dims)),
        _ => Err(CodegenError::ArrayTooLarge {
            name: name.to_string(),
            location: location.clone(),
        }),
    }
}

/// Declarations inside a function: each becomes a local of the current
/// scope; an initializer is evaluated and copied in after the declaration.
pub fn generate_local_declarations(gen: &mut IrGenerator, node: NodeId) -> Result<Vec<InstId>, CodegenError> {
    let ast = gen.ast;
    let mut code = Vec::new();

    for &decl in ast.children(node) {
        let location = gen.location(decl);
        let kind = ast.kind(decl);
        let (basic, name, rest) = split_decl(gen, decl)?;
        if basic.is_void() {
            return Err(CodegenError::VoidVariable { name, location });
        }

        let (ty, init) = match kind {
            NodeKind::VarDecl => (IrType::I32, rest.first().copied()),
            NodeKind::ArrayDecl if !rest.is_empty() => (int_array(&name, array_dims(gen, rest)?, &location)?, None),
            _ => {
                return Err(CodegenError::UnsupportedConstruct {
                    construct: kind.to_string(),
                    location,
                })
            }
        };

        let init = match init {
            Some(expr) => Some(generate_operand(gen, expr, "initializer", &mut code)?),
            None => None,
        };

        let level = gen.module.scope_level();
        let local = gen.func()?.new_local(Some(&name), ty, level, None);
        if !gen.module.declare(&name, Symbol::Local(local)) {
            return Err(CodegenError::Redefinition { name, location });
        }
        if let Some(value) = init {
            code.push(gen.emit_move(local, value, MoveKind::Copy)?);
        }
    }
    Ok(code)
}

/// Declarations at module level: globals with an optional constant initializer
pub fn generate_global_declarations(gen: &mut IrGenerator, node: NodeId) -> Result<(), CodegenError> {
    let ast = gen.ast;

    for &decl in ast.children(node) {
        let location = gen.location(decl);
        let kind = ast.kind(decl);
        let (basic, name, rest) = split_decl(gen, decl)?;
        if basic.is_void() {
            return Err(CodegenError::VoidVariable { name, location });
        }

        let (ty, init) = match kind {
            NodeKind::VarDecl => {
                let init = match rest.first() {
                    Some(&expr) => Some(constant_initializer(gen, expr).ok_or_else(|| {
                        CodegenError::NonConstantInitializer {
                            name: name.clone(),
                            location: location.clone(),
                        }
                    })?),
                    None => None,
                };
                (IrType::I32, init)
            }
            NodeKind::ArrayDecl if !rest.is_empty() => (int_array(&name, array_dims(gen, rest)?, &location)?, None),
            _ => {
                return Err(CodegenError::UnsupportedConstruct {
                    construct: kind.to_string(),
                    location,
                })
            }
        };

        if gen.module.lookup(&name).is_some() {
            return Err(CodegenError::Redefinition { name, location });
        }
        debug!("Global '{}': {}", name, ty);
        let id = gen.module.add_global(GlobalVariable::new(name.clone(), ty, init));
        gen.module.declare(&name, Symbol::Global(id));
    }
    Ok(())
}

/// A literal or a negated literal
fn constant_initializer(gen: &IrGenerator, expr: NodeId) -> Option<i32> {
    let ast = gen.ast;
    match ast.kind(expr) {
        NodeKind::LiteralInt => gen.node_literal(expr).ok().map(|v| v as i32),
        NodeKind::Neg => match ast.children(expr) {
            [operand] => constant_initializer(gen, *operand).map(i32::wrapping_neg),
            _ => None,
        },
        _ => None,
    }
}
