//! Statement code generation

pub mod control_flow;
pub mod declarations;
pub mod jumps;

pub use declarations::{generate_global_declarations, generate_local_declarations};

use log::{trace, warn};
use crate::ast::{NodeId, NodeKind};
use crate::ir::InstId;
use crate::codegen::expressions::{self, assignments};
use crate::codegen::{functions, CodegenError, EvalMode, IrGenerator};

/// Lower one statement into its instruction sequence
pub fn generate_statement(gen: &mut IrGenerator, node: NodeId) -> Result<Vec<InstId>, CodegenError> {
    let kind = gen.ast.kind(node);
    trace!("Statement {} at line {}", kind, gen.ast.line(node));

    match kind {
        NodeKind::Block => generate_block(gen, node, true),
        NodeKind::DeclStmt => generate_local_declarations(gen, node),
        NodeKind::Assign => Ok(assignments::generate_assignment(gen, node)?.code),
        NodeKind::If => control_flow::generate_if(gen, node),
        NodeKind::While => control_flow::generate_while(gen, node),
        NodeKind::Break => jumps::generate_break(gen, node),
        NodeKind::Continue => jumps::generate_continue(gen, node),
        NodeKind::Return => jumps::generate_return(gen, node),
        NodeKind::FuncDef => functions::generate_function(gen, node).map(|()| Vec::new()),
        k if is_expression(k) => {
            // Evaluated for its effects; the value is dropped
            Ok(expressions::generate_expression(gen, node, EvalMode::AsValue)?.code)
        }
        other => {
            warn!("Unknown statement node '{}' at line {}", other, gen.ast.line(node));
            Ok(Vec::new())
        }
    }
}

/// Lower the statements of a block, optionally inside a new scope
pub fn generate_block(gen: &mut IrGenerator, node: NodeId, new_scope: bool) -> Result<Vec<InstId>, CodegenError> {
    let ast = gen.ast;
    let body = |gen: &mut IrGenerator| -> Result<Vec<InstId>, CodegenError> {
        let mut code = Vec::new();
        for &stmt in ast.children(node) {
            code.extend(generate_statement(gen, stmt)?);
        }
        Ok(code)
    };
    if new_scope {
        gen.with_scope(body)
    } else {
        body(gen)
    }
}

fn is_expression(kind: NodeKind) -> bool {
    kind.is_arithmetic()
        || kind.is_relational()
        || kind.is_logical()
        || matches!(
            kind,
            NodeKind::LiteralInt | NodeKind::VarId | NodeKind::Neg | NodeKind::FuncCall | NodeKind::ArrayRef
        )
}
