//! Function definitions and formal parameters

use log::{debug, info};
use crate::ast::{NodeId, NodeKind};
use crate::ir::{Function, InstId, InstKind, IrType, MoveKind, Symbol};
use super::{statements, CodegenError, IrGenerator};

/// Lower a `FuncDef` node into a new module function.
///
/// The function is registered before its body is lowered so recursive
/// calls resolve. On failure it stays in the module undefined.
pub fn generate_function(gen: &mut IrGenerator, node: NodeId) -> Result<(), CodegenError> {
    let ast = gen.ast;
    let location = gen.location(node);
    let (ty_node, name_node, params_node, body_node) = match ast.children(node) {
        [t, n, p, b] => (*t, *n, *p, *b),
        _ => {
            return Err(CodegenError::MissingOperand {
                construct: "function definition".to_string(),
                location,
            })
        }
    };

    let name = gen.node_name(name_node)?;
    if gen.in_function() {
        return Err(CodegenError::NestedFunction { name, location });
    }
    if gen.module.find_function(&name).is_some() {
        return Err(CodegenError::Redefinition { name, location });
    }
    let return_type = gen.node_type(ty_node)?;

    info!("Generating function '{}'", name);
    let index = gen.module.add_function(Function::new(name.clone(), return_type.clone()));

    gen.with_function(index, |gen| {
        let mut code = Vec::new();
        let f = gen.func()?;
        code.push(f.new_inst(InstKind::Entry, IrType::Void));
        let exit = f.new_label();
        f.exit_label = Some(exit);

        code.extend(generate_formal_params(gen, params_node)?);

        if !return_type.is_void() {
            let level = gen.module.scope_level();
            let f = gen.func()?;
            let ret = f.new_local(None, IrType::I32, level, None);
            f.return_value = Some(ret);
            let zero = f.const_int(0);
            code.push(f.new_move(ret, zero, MoveKind::Copy));
        }

        // The body shares the parameters' scope
        code.extend(statements::generate_block(gen, body_node, false)?);

        let f = gen.func()?;
        code.push(f.label_inst(exit));
        let ret = f.return_value;
        code.push(f.new_inst(InstKind::Exit(ret), IrType::Void));
        f.append(code);
        f.verify_labels()?;
        f.rename_ir();
        f.is_defined = true;
        debug!(
            "Function '{}': {} instructions, {} locals, {} temporaries",
            f.name,
            f.code.len(),
            f.locals.len(),
            f.mems.len()
        );
        Ok(())
    })
}

/// Create a param and a local per formal parameter and copy one into the other
fn generate_formal_params(gen: &mut IrGenerator, node: NodeId) -> Result<Vec<InstId>, CodegenError> {
    let ast = gen.ast;
    let mut code = Vec::new();

    for &param in ast.children(node) {
        let location = gen.location(param);
        if ast.kind(param) != NodeKind::FuncFormalParam {
            return Err(CodegenError::UnsupportedConstruct {
                construct: ast.kind(param).to_string(),
                location,
            });
        }
        let (ty_node, name_node, dim_nodes) = match ast.children(param) {
            [t, n, dims @ ..] => (*t, *n, dims),
            _ => {
                return Err(CodegenError::MissingOperand {
                    construct: "formal parameter".to_string(),
                    location,
                })
            }
        };
        let name = gen.node_name(name_node)?;
        if gen.node_type(ty_node)?.is_void() {
            return Err(CodegenError::VoidVariable { name, location });
        }

        let dims = dim_nodes
            .iter()
            .map(|&d| gen.node_literal(d))
            .collect::<Result<Vec<_>, _>>()?;
        let (ty, array_type) = if dims.is_empty() {
            (IrType::I32, None)
        } else {
            let array_type = statements::declarations::int_array(&name, dims, &location)?;
            (IrType::ptr(IrType::I32), Some(array_type))
        };

        let level = gen.module.scope_level();
        let f = gen.func()?;
        let incoming = f.new_param(Some(&name), ty.clone(), array_type.clone());
        let local = f.new_local(Some(&name), ty, level, array_type);
        code.push(f.new_move(local, incoming, MoveKind::Copy));

        if !gen.module.declare(&name, Symbol::Local(local)) {
            return Err(CodegenError::Redefinition { name, location });
        }
    }
    Ok(code)
}
