//! Generation context
//!
//! Holds the module being built, the function cursor, the loop stack and
//! the diagnostics. Cursor, scopes and loop frames are only changed
//! through the `with_*` helpers, which restore them on every exit path.

use log::{debug, error, info, warn};
use mcc_common::{CompilerError, ErrorReporter, SourceLocation};
use crate::ast::{Ast, BasicType, NodeId, NodeKind};
use crate::ir::{Function, InstId, InstKind, IrBinaryOp, IrType, LabelId, Module, MoveKind, ValueId};
use super::{functions, statements, CodegenError};

/// Jump targets of the innermost enclosing loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoopFrame {
    pub continue_target: LabelId,
    pub break_target: LabelId,
}

/// AST to IR generator
pub struct IrGenerator<'a> {
    pub(crate) ast: &'a Ast,
    pub(crate) module: Module,
    current: Option<usize>,
    loops: Vec<LoopFrame>,
    reporter: ErrorReporter,
}

impl<'a> IrGenerator<'a> {
    pub fn new(ast: &'a Ast, module_name: &str) -> Self {
        Self {
            ast,
            module: Module::new(module_name.to_string()),
            current: None,
            loops: Vec::new(),
            reporter: ErrorReporter::new(),
        }
    }

    /// Generate IR for the whole compile unit.
    ///
    /// A failing function is reported and left undefined; generation
    /// carries on with the next top-level item. Fails if anything was
    /// reported.
    pub fn generate(&mut self) -> Result<(), CompilerError> {
        let root = self
            .ast
            .root()
            .ok_or_else(|| CompilerError::internal("the AST has no root node"))?;
        if self.ast.kind(root) != NodeKind::CompileUnit {
            return Err(CompilerError::internal(format!(
                "root node is '{}', expected a compile unit",
                self.ast.kind(root)
            )));
        }

        self.current = None;
        let ast = self.ast;
        for &item in ast.children(root) {
            let result = match ast.kind(item) {
                NodeKind::FuncDef => functions::generate_function(self, item),
                NodeKind::DeclStmt => statements::generate_global_declarations(self, item),
                other => {
                    warn!("Ignoring unknown top-level node '{}' at line {}", other, ast.line(item));
                    Ok(())
                }
            };
            if let Err(err) = result {
                error!("{}", err);
                self.reporter.report(&err.into());
            }
        }

        if self.reporter.has_errors() {
            return Err(CompilerError::GenerationFailed {
                errors: self.reporter.error_count(),
            });
        }
        info!(
            "Generated module '{}': {} function(s), {} global(s)",
            self.module.name,
            self.module.defined_functions().count(),
            self.module.globals.len()
        );
        Ok(())
    }

    pub fn module(&self) -> &Module {
        &self.module
    }

    pub fn into_module(self) -> Module {
        self.module
    }

    pub fn diagnostics(&self) -> &ErrorReporter {
        &self.reporter
    }

    // ----- context -----

    pub(crate) fn in_function(&self) -> bool {
        self.current.is_some()
    }

    /// Function currently being generated
    pub(crate) fn func(&mut self) -> Result<&mut Function, CodegenError> {
        match self.current {
            Some(index) => Ok(&mut self.module.functions[index]),
            None => Err(CodegenError::InternalError {
                message: "no function is being generated".to_string(),
                location: SourceLocation::dummy(),
            }),
        }
    }

    /// Run `f` with `index` as the current function inside a fresh scope
    pub(crate) fn with_function<T>(
        &mut self,
        index: usize,
        f: impl FnOnce(&mut Self) -> Result<T, CodegenError>,
    ) -> Result<T, CodegenError> {
        let saved_cursor = self.current.replace(index);
        let saved_loops = std::mem::take(&mut self.loops);
        self.module.enter_scope();

        let result = f(self);

        self.module.leave_scope();
        self.loops = saved_loops;
        self.current = saved_cursor;
        result
    }

    /// Run `f` inside a nested lexical scope
    pub(crate) fn with_scope<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CodegenError>,
    ) -> Result<T, CodegenError> {
        self.module.enter_scope();
        let result = f(self);
        self.module.leave_scope();
        result
    }

    /// Run `f` with `frame` as the innermost loop
    pub(crate) fn with_loop<T>(
        &mut self,
        frame: LoopFrame,
        f: impl FnOnce(&mut Self) -> Result<T, CodegenError>,
    ) -> Result<T, CodegenError> {
        self.loops.push(frame);
        let result = f(self);
        self.loops.pop();
        result
    }

    pub(crate) fn innermost_loop(&self) -> Option<LoopFrame> {
        self.loops.last().copied()
    }

    pub(crate) fn location(&self, node: NodeId) -> SourceLocation {
        SourceLocation::at_line(self.ast.line(node))
    }

    // ----- node payloads -----

    /// Name carried by an identifier node
    pub(crate) fn node_name(&self, node: NodeId) -> Result<String, CodegenError> {
        self.ast.node(node).name.clone().ok_or_else(|| CodegenError::MissingOperand {
            construct: self.ast.kind(node).to_string(),
            location: self.location(node),
        })
    }

    /// Value of a literal node
    pub(crate) fn node_literal(&self, node: NodeId) -> Result<u32, CodegenError> {
        let n = self.ast.node(node);
        match (n.kind, n.int_value) {
            (NodeKind::LiteralInt, Some(v)) => Ok(v),
            _ => Err(CodegenError::MissingOperand {
                construct: "literal".to_string(),
                location: self.location(node),
            }),
        }
    }

    /// Exactly `N` children of `node`, or a missing-operand error
    pub(crate) fn operands<const N: usize>(&self, node: NodeId, construct: &str) -> Result<[NodeId; N], CodegenError> {
        <[NodeId; N]>::try_from(self.ast.children(node)).map_err(|_| CodegenError::MissingOperand {
            construct: construct.to_string(),
            location: self.location(node),
        })
    }

    /// IR type named by a type leaf
    pub(crate) fn node_type(&self, node: NodeId) -> Result<IrType, CodegenError> {
        match self.ast.node(node).basic_type {
            Some(BasicType::Int) => Ok(IrType::I32),
            Some(BasicType::Void) => Ok(IrType::Void),
            None => Err(CodegenError::MissingOperand {
                construct: "type".to_string(),
                location: self.location(node),
            }),
        }
    }

    // ----- instruction helpers -----

    pub(crate) fn const_int(&mut self, v: i32) -> Result<ValueId, CodegenError> {
        Ok(self.func()?.const_int(v))
    }

    /// Create `result = lhs op rhs`
    pub(crate) fn emit_binary(
        &mut self,
        op: IrBinaryOp,
        lhs: ValueId,
        rhs: ValueId,
    ) -> Result<(InstId, ValueId), CodegenError> {
        self.emit_binary_typed(op, lhs, rhs, op.result_type())
    }

    /// Create `result = lhs op rhs` with an explicit result type (address arithmetic)
    pub(crate) fn emit_binary_typed(
        &mut self,
        op: IrBinaryOp,
        lhs: ValueId,
        rhs: ValueId,
        ty: IrType,
    ) -> Result<(InstId, ValueId), CodegenError> {
        let f = self.func()?;
        let inst = f.new_inst(InstKind::Binary { op, lhs, rhs }, ty);
        let result = f.result_of(inst).ok_or_else(|| CodegenError::InternalError {
            message: "binary instruction without a result".to_string(),
            location: SourceLocation::dummy(),
        })?;
        debug!("Binary: {} = {:?} {}, {}", result, op, lhs, rhs);
        Ok((inst, result))
    }

    pub(crate) fn emit_move(&mut self, dest: ValueId, src: ValueId, kind: MoveKind) -> Result<InstId, CodegenError> {
        Ok(self.func()?.new_move(dest, src, kind))
    }

    pub(crate) fn new_label(&mut self) -> Result<LabelId, CodegenError> {
        Ok(self.func()?.new_label())
    }

    /// Instruction placing `label`
    pub(crate) fn place_label(&mut self, label: LabelId) -> Result<InstId, CodegenError> {
        Ok(self.func()?.label_inst(label))
    }

    pub(crate) fn emit_goto(&mut self, target: LabelId) -> Result<InstId, CodegenError> {
        Ok(self.func()?.new_goto(target))
    }

    pub(crate) fn emit_cond_branch(
        &mut self,
        cond: ValueId,
        on_true: LabelId,
        on_false: LabelId,
    ) -> Result<InstId, CodegenError> {
        Ok(self
            .func()?
            .new_inst(InstKind::CondBranch { cond, on_true, on_false }, IrType::Void))
    }
}
