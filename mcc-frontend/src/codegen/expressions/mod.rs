//! Expression code generation
//!
//! Every routine returns a [`Fragment`]: the operand code in evaluation
//! order followed by the node's own instructions.

pub mod arrays;
pub mod assignments;
pub mod binary_ops;
pub mod function_calls;
pub mod identifiers;
pub mod logical_ops;
pub mod unary_ops;

use log::{trace, warn};
use crate::ast::{NodeId, NodeKind};
use crate::ir::{InstId, ValueId};
use super::{CodegenError, EvalMode, Fragment, IrGenerator};

/// Lower an expression node
pub fn generate_expression(gen: &mut IrGenerator, node: NodeId, mode: EvalMode) -> Result<Fragment, CodegenError> {
    let kind = gen.ast.kind(node);
    trace!("Expression {} at line {}", kind, gen.ast.line(node));

    match kind {
        NodeKind::LiteralInt => identifiers::generate_literal(gen, node),
        NodeKind::VarId => identifiers::generate_identifier(gen, node),
        k if k.is_arithmetic() || k.is_relational() => binary_ops::generate_binary(gen, node),
        NodeKind::Neg => unary_ops::generate_negation(gen, node),
        NodeKind::LogicalNot | NodeKind::LogicalAnd | NodeKind::LogicalOr => {
            logical_ops::generate_logical_value(gen, node)
        }
        NodeKind::FuncCall => function_calls::generate_function_call(gen, node),
        NodeKind::ArrayRef => arrays::generate_array_ref(gen, node, mode),
        NodeKind::Assign => assignments::generate_assignment(gen, node),
        other => {
            warn!("Unknown expression node '{}' at line {}", other, gen.ast.line(node));
            Ok(Fragment::default())
        }
    }
}

/// Lower an operand that must yield a value
pub(crate) fn generate_operand(
    gen: &mut IrGenerator,
    node: NodeId,
    construct: &str,
    code: &mut Vec<InstId>,
) -> Result<ValueId, CodegenError> {
    let location = gen.location(node);
    let fragment = generate_expression(gen, node, EvalMode::AsValue)?;
    code.extend(fragment.code.iter().copied());
    fragment.require_value(construct, &location)
}
