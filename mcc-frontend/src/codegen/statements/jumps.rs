//! Jump statement code generation (break, continue, return)

use crate::ast::NodeId;
use crate::ir::{InstId, MoveKind};
use crate::codegen::expressions::generate_operand;
use crate::codegen::{CodegenError, IrGenerator};

pub fn generate_break(gen: &mut IrGenerator, node: NodeId) -> Result<Vec<InstId>, CodegenError> {
    match gen.innermost_loop() {
        Some(frame) => Ok(vec![gen.emit_goto(frame.break_target)?]),
        None => Err(CodegenError::BreakOutsideLoop {
            location: gen.location(node),
        }),
    }
}

pub fn generate_continue(gen: &mut IrGenerator, node: NodeId) -> Result<Vec<InstId>, CodegenError> {
    match gen.innermost_loop() {
        Some(frame) => Ok(vec![gen.emit_goto(frame.continue_target)?]),
        None => Err(CodegenError::ContinueOutsideLoop {
            location: gen.location(node),
        }),
    }
}

/// Copy into the return local (non-void only), then jump to the exit label
pub fn generate_return(gen: &mut IrGenerator, node: NodeId) -> Result<Vec<InstId>, CodegenError> {
    let ast = gen.ast;
    let location = gen.location(node);
    let f = gen.func()?;
    let (return_value, exit) = (f.return_value, f.exit_label);
    let exit = exit.ok_or_else(|| CodegenError::InternalError {
        message: format!("function '{}' has no exit label", f.name),
        location: location.clone(),
    })?;

    let mut code = Vec::new();
    match (ast.children(node).first(), return_value) {
        (Some(&expr), Some(ret)) => {
            let value = generate_operand(gen, expr, "return", &mut code)?;
            code.push(gen.emit_move(ret, value, MoveKind::Copy)?);
        }
        (Some(_), None) => {
            let name = gen.func()?.name.clone();
            return Err(CodegenError::ReturnValueInVoid { name, location });
        }
        (None, _) => {}
    }
    code.push(gen.emit_goto(exit)?);
    Ok(code)
}
