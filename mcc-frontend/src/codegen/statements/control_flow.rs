//! `if` and `while`

use crate::ast::NodeId;
use crate::ir::InstId;
use crate::codegen::{generate_branch_for_condition, CodegenError, IrGenerator, LoopFrame};
use super::generate_statement;

/// `cond -> (then, else|merge)`, then-block, `br merge`, optional
/// else-block, merge label
pub fn generate_if(gen: &mut IrGenerator, node: NodeId) -> Result<Vec<InstId>, CodegenError> {
    let ast = gen.ast;
    let (cond, then_branch, else_branch) = match ast.children(node) {
        [c, t] => (*c, *t, None),
        [c, t, e] => (*c, *t, Some(*e)),
        _ => {
            return Err(CodegenError::MissingOperand {
                construct: "if".to_string(),
                location: gen.location(node),
            })
        }
    };

    let on_true = gen.new_label()?;
    let merge = gen.new_label()?;
    let on_false = match else_branch {
        Some(_) => gen.new_label()?,
        None => merge,
    };

    let mut code = Vec::new();
    generate_branch_for_condition(gen, cond, on_true, on_false, &mut code)?;
    code.push(gen.place_label(on_true)?);
    code.extend(generate_statement(gen, then_branch)?);
    code.push(gen.emit_goto(merge)?);
    if let Some(else_branch) = else_branch {
        code.push(gen.place_label(on_false)?);
        code.extend(generate_statement(gen, else_branch)?);
    }
    code.push(gen.place_label(merge)?);
    Ok(code)
}

/// Check label, `cond -> (body, exit)`, body, `br check`, exit label
pub fn generate_while(gen: &mut IrGenerator, node: NodeId) -> Result<Vec<InstId>, CodegenError> {
    let [cond, body] = gen.operands(node, "while")?;

    let check = gen.new_label()?;
    let body_label = gen.new_label()?;
    let exit = gen.new_label()?;

    let mut code = vec![gen.place_label(check)?];
    generate_branch_for_condition(gen, cond, body_label, exit, &mut code)?;
    code.push(gen.place_label(body_label)?);

    let frame = LoopFrame {
        continue_target: check,
        break_target: exit,
    };
    code.extend(gen.with_loop(frame, |gen| generate_statement(gen, body))?);

    code.push(gen.emit_goto(check)?);
    code.push(gen.place_label(exit)?);
    Ok(code)
}
