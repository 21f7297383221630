//! MiniC Compiler - Frontend
//!
//! This crate provides the middle of the MiniC compiler:
//! - AST: the arena-based tree handed over by a parser (or read from JSON)
//! - IR: the linear three-address intermediate representation
//! - Codegen: the AST to IR generator

pub mod ast;
pub mod codegen;
pub mod ir;

pub use ast::{Ast, AstBuilder, AstError, AstNode, BasicType, NodeId, NodeKind};
pub use codegen::{generate_branch_for_condition, CodegenError, EvalMode, Fragment, IrGenerator};

use log::debug;
use mcc_common::CompilerError;
use crate::ir::Module;

/// High-level frontend interface
pub struct Frontend;

impl Frontend {
    /// Read an AST serialized as JSON and check its links
    pub fn load_ast(json: &str) -> Result<Ast, CompilerError> {
        let mut ast: Ast = serde_json::from_str(json).map_err(|e| CompilerError::IoError {
            message: format!("invalid AST: {}", e),
        })?;
        ast.validate().map_err(|e| CompilerError::IoError {
            message: format!("invalid AST: {}", e),
        })?;
        debug!("Loaded AST with {} nodes", ast.len());
        Ok(ast)
    }

    /// Generate the IR module for a whole compile unit
    pub fn generate_ir(ast: &Ast, module_name: &str) -> Result<Module, CompilerError> {
        let mut generator = IrGenerator::new(ast, module_name);
        generator.generate()?;
        Ok(generator.into_module())
    }

    /// Like [`Frontend::generate_ir`], but keeps the module and the
    /// diagnostics even when some functions failed
    pub fn generate_ir_with_diagnostics(
        ast: &Ast,
        module_name: &str,
    ) -> (Module, Result<(), CompilerError>, Vec<mcc_common::Diagnostic>) {
        let mut generator = IrGenerator::new(ast, module_name);
        let result = generator.generate();
        let diagnostics = generator.diagnostics().diagnostics().to_vec();
        (generator.into_module(), result, diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_frontend_generate_simple_function() {
        let mut b = AstBuilder::new();
        let forty_two = b.int(42);
        let ret = b.return_stmt(Some(forty_two));
        let body = b.block(vec![ret]);
        let main = b.func_def(BasicType::Int, "main", vec![], body);
        b.compile_unit(vec![main]);
        let ast = b.finish();

        let module = Frontend::generate_ir(&ast, "test").unwrap();
        assert!(module.get_function("main").unwrap().is_defined);
        assert_eq!(module.defined_functions().count(), 1);
    }

    #[test]
    fn test_frontend_load_ast_from_json() {
        let mut b = AstBuilder::new();
        let body = b.block(vec![]);
        let main = b.func_def(BasicType::Void, "main", vec![], body);
        b.compile_unit(vec![main]);
        let json = serde_json::to_string(&b.finish()).unwrap();

        let ast = Frontend::load_ast(&json).unwrap();
        let module = Frontend::generate_ir(&ast, "json").unwrap();
        assert_eq!(module.get_function("main").unwrap().return_type, ir::IrType::Void);
    }

    #[test]
    fn test_frontend_rejects_malformed_json() {
        let err = Frontend::load_ast("{ not json").unwrap_err();
        assert!(matches!(err, CompilerError::IoError { .. }));
    }

    #[test]
    fn test_frontend_rejects_self_containing_block() {
        // int main() { { ... } } where the inner block lists itself as a child
        let mut b = AstBuilder::new();
        let inner = b.block(vec![]);
        let body = b.block(vec![inner]);
        let main = b.func_def(BasicType::Int, "main", vec![], body);
        b.compile_unit(vec![main]);
        let json = serde_json::to_string(&b.finish()).unwrap();

        let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
        value["nodes"][inner as usize]["children"] = serde_json::json!([inner]);
        let err = Frontend::load_ast(&value.to_string()).unwrap_err();

        assert!(matches!(err, CompilerError::IoError { .. }));
        assert!(err.to_string().contains("listed under both"), "{}", err);
    }

    #[test]
    fn test_frontend_keeps_partial_module_on_failure() {
        let mut b = AstBuilder::new();
        let brk = b.break_stmt();
        let bad_body = b.block(vec![brk]);
        let bad = b.func_def(BasicType::Void, "bad", vec![], bad_body);
        let good_body = b.block(vec![]);
        let good = b.func_def(BasicType::Void, "good", vec![], good_body);
        b.compile_unit(vec![bad, good]);
        let ast = b.finish();

        let (module, result, diagnostics) = Frontend::generate_ir_with_diagnostics(&ast, "partial");
        assert_eq!(result, Err(CompilerError::GenerationFailed { errors: 1 }));
        assert_eq!(diagnostics.len(), 1);
        assert!(!module.get_function("bad").unwrap().is_defined);
        assert!(module.get_function("good").unwrap().is_defined);
    }
}
