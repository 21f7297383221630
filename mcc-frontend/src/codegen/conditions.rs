//! Short-circuit lowering of conditions into branches

use log::trace;
use crate::ast::{NodeId, NodeKind};
use crate::ir::{InstId, IrBinaryOp, LabelId};
use super::{expressions, CodegenError, EvalMode, IrGenerator};

/// Emit code that jumps to `on_true` when `node` holds and to `on_false`
/// otherwise.
///
/// `&&`, `||` and `!` never produce a value here; only the operands that
/// must be evaluated are reachable. Any other expression is branched on
/// directly if it is a comparison, or compared `ne 0` first.
pub fn generate_branch_for_condition(
    gen: &mut IrGenerator,
    node: NodeId,
    on_true: LabelId,
    on_false: LabelId,
    out: &mut Vec<InstId>,
) -> Result<(), CodegenError> {
    trace!("Condition {} at line {}", gen.ast.kind(node), gen.ast.line(node));

    match gen.ast.kind(node) {
        NodeKind::LogicalNot => {
            let [operand] = gen.operands(node, "!")?;
            generate_branch_for_condition(gen, operand, on_false, on_true, out)
        }
        NodeKind::LogicalAnd => {
            let [lhs, rhs] = gen.operands(node, "&&")?;
            let rhs_label = gen.new_label()?;
            generate_branch_for_condition(gen, lhs, rhs_label, on_false, out)?;
            out.push(gen.place_label(rhs_label)?);
            generate_branch_for_condition(gen, rhs, on_true, on_false, out)
        }
        NodeKind::LogicalOr => {
            let [lhs, rhs] = gen.operands(node, "||")?;
            let rhs_label = gen.new_label()?;
            generate_branch_for_condition(gen, lhs, on_true, rhs_label, out)?;
            out.push(gen.place_label(rhs_label)?);
            generate_branch_for_condition(gen, rhs, on_true, on_false, out)
        }
        _ => {
            let location = gen.location(node);
            let fragment = expressions::generate_expression(gen, node, EvalMode::AsValue)?;
            out.extend(fragment.code.iter().copied());
            let value = fragment.require_value("condition", &location)?;

            let is_comparison = gen
                .func()?
                .producer(value)
                .and_then(|inst| inst.comparison_op())
                .is_some();
            let cond = if is_comparison {
                value
            } else {
                let zero = gen.const_int(0)?;
                let (inst, result) = gen.emit_binary(IrBinaryOp::Ne, value, zero)?;
                out.push(inst);
                result
            };
            out.push(gen.emit_cond_branch(cond, on_true, on_false)?);
            Ok(())
        }
    }
}
