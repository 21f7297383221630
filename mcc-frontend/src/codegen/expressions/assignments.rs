//! Assignment code generation

use crate::ast::{NodeId, NodeKind};
use crate::ir::{IrType, MoveKind};
use crate::codegen::{CodegenError, EvalMode, Fragment, IrGenerator};
use super::{arrays, generate_operand, identifiers};

/// The right side is evaluated first, then the target is bound.
///
/// A scalar target gets a Copy move, an array element a Store through
/// its computed address.
pub fn generate_assignment(gen: &mut IrGenerator, node: NodeId) -> Result<Fragment, CodegenError> {
    let [lhs, rhs] = gen.operands(node, "=")?;
    let location = gen.location(node);

    let mut code = Vec::new();
    let src = generate_operand(gen, rhs, "=", &mut code)?;

    let (dest, kind) = match gen.ast.kind(lhs) {
        NodeKind::VarId => {
            let dest = identifiers::generate_identifier(gen, lhs)?.require_value("=", &location)?;
            if gen.func()?.value(dest).ty.is_array() {
                return Err(CodegenError::InvalidLvalue { location });
            }
            (dest, MoveKind::Copy)
        }
        NodeKind::ArrayRef => {
            let target = arrays::generate_array_ref(gen, lhs, EvalMode::AsAddress)?;
            code.extend(target.code.iter().copied());
            let address = target.require_value("=", &location)?;
            if gen.func()?.value(address).ty != IrType::ptr(IrType::I32) {
                return Err(CodegenError::InvalidLvalue { location });
            }
            (address, MoveKind::Store)
        }
        _ => return Err(CodegenError::InvalidLvalue { location }),
    };

    code.push(gen.emit_move(dest, src, kind)?);
    Ok(Fragment::new(code, Some(src)))
}
