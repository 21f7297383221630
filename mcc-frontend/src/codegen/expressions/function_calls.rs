//! Function call code generation

use log::debug;
use crate::ast::NodeId;
use crate::ir::InstKind;
use crate::codegen::{CodegenError, Fragment, IrGenerator};
use super::generate_operand;

/// Arguments left to right, then one Call carrying them.
///
/// The callee must already be declared (builtins always are) and the
/// argument count must match its parameters.
pub fn generate_function_call(gen: &mut IrGenerator, node: NodeId) -> Result<Fragment, CodegenError> {
    let ast = gen.ast;
    let location = gen.location(node);
    let [callee, real_params] = gen.operands(node, "function call")?;
    let name = gen.node_name(callee)?;

    let mut code = Vec::new();
    let mut args = Vec::new();
    for &arg in ast.children(real_params) {
        args.push(generate_operand(gen, arg, "call argument", &mut code)?);
    }

    let index = gen
        .module
        .find_function(&name)
        .ok_or_else(|| CodegenError::UndefinedFunction {
            name: name.clone(),
            location: location.clone(),
        })?;
    let target = &gen.module.functions[index];
    let (expected, return_type) = (target.params.len(), target.return_type.clone());
    if expected != args.len() {
        return Err(CodegenError::ArgumentCountMismatch {
            name,
            expected,
            found: args.len(),
            location,
        });
    }

    debug!("Call to '{}' with {} argument(s)", name, args.len());
    let f = gen.func()?;
    f.has_call = true;
    f.max_call_args = f.max_call_args.max(args.len());
    let inst = f.new_inst(InstKind::Call { callee: name, args }, return_type);
    code.push(inst);
    let value = f.inst(inst).result;
    Ok(Fragment::new(code, value))
}

