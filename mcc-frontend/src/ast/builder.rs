//! Convenience constructors producing the node shapes the IR generator expects

use super::{Ast, AstNode, BasicType, NodeId, NodeKind};

/// Builds an [`Ast`] bottom-up; every constructor returns the new node's id.
///
/// Nodes are stamped with the current line, changed with [`AstBuilder::at_line`].
pub struct AstBuilder {
    ast: Ast,
    line: u32,
}

impl Default for AstBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AstBuilder {
    pub fn new() -> Self {
        Self { ast: Ast::new(), line: 1 }
    }

    /// Line number used for the following nodes
    pub fn at_line(&mut self, line: u32) -> &mut Self {
        self.line = line;
        self
    }

    pub fn finish(self) -> Ast {
        self.ast
    }

    fn node(&mut self, kind: NodeKind, children: Vec<NodeId>) -> NodeId {
        self.ast.add(AstNode::new(kind, self.line), children)
    }

    pub fn int(&mut self, value: u32) -> NodeId {
        let mut node = AstNode::new(NodeKind::LiteralInt, self.line);
        node.int_value = Some(value);
        self.ast.add(node, vec![])
    }

    pub fn var(&mut self, name: &str) -> NodeId {
        let mut node = AstNode::new(NodeKind::VarId, self.line);
        node.name = Some(name.to_string());
        self.ast.add(node, vec![])
    }

    pub fn ty(&mut self, basic: BasicType) -> NodeId {
        let mut node = AstNode::new(NodeKind::LeafType, self.line);
        node.basic_type = Some(basic);
        self.ast.add(node, vec![])
    }

    /// Any two-operand operator (`Add`..`Mod`, relational, `LogicalAnd`/`LogicalOr`)
    pub fn binary(&mut self, kind: NodeKind, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.node(kind, vec![lhs, rhs])
    }

    pub fn neg(&mut self, operand: NodeId) -> NodeId {
        self.node(NodeKind::Neg, vec![operand])
    }

    pub fn not(&mut self, operand: NodeId) -> NodeId {
        self.node(NodeKind::LogicalNot, vec![operand])
    }

    pub fn and(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.binary(NodeKind::LogicalAnd, lhs, rhs)
    }

    pub fn or(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.binary(NodeKind::LogicalOr, lhs, rhs)
    }

    pub fn call(&mut self, name: &str, args: Vec<NodeId>) -> NodeId {
        let callee = self.var(name);
        let params = self.node(NodeKind::FuncRealParams, args);
        self.node(NodeKind::FuncCall, vec![callee, params])
    }

    pub fn array_ref(&mut self, name: &str, indices: Vec<NodeId>) -> NodeId {
        let base = self.var(name);
        let mut children = vec![base];
        children.extend(indices);
        self.node(NodeKind::ArrayRef, children)
    }

    pub fn assign(&mut self, lhs: NodeId, rhs: NodeId) -> NodeId {
        self.node(NodeKind::Assign, vec![lhs, rhs])
    }

    pub fn return_stmt(&mut self, value: Option<NodeId>) -> NodeId {
        self.node(NodeKind::Return, value.into_iter().collect())
    }

    pub fn if_stmt(&mut self, cond: NodeId, then: NodeId, otherwise: Option<NodeId>) -> NodeId {
        let mut children = vec![cond, then];
        children.extend(otherwise);
        self.node(NodeKind::If, children)
    }

    pub fn while_stmt(&mut self, cond: NodeId, body: NodeId) -> NodeId {
        self.node(NodeKind::While, vec![cond, body])
    }

    pub fn break_stmt(&mut self) -> NodeId {
        self.node(NodeKind::Break, vec![])
    }

    pub fn continue_stmt(&mut self) -> NodeId {
        self.node(NodeKind::Continue, vec![])
    }

    pub fn block(&mut self, stmts: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::Block, stmts)
    }

    /// `int name [= init]` wrapped in its own declaration statement
    pub fn var_decl(&mut self, name: &str, init: Option<NodeId>) -> NodeId {
        let decl = self.var_decl_item(BasicType::Int, name, init);
        self.decl_stmt(vec![decl])
    }

    /// A bare `VarDecl` for use inside [`AstBuilder::decl_stmt`]
    pub fn var_decl_item(&mut self, basic: BasicType, name: &str, init: Option<NodeId>) -> NodeId {
        let ty = self.ty(basic);
        let id = self.var(name);
        let mut children = vec![ty, id];
        children.extend(init);
        self.node(NodeKind::VarDecl, children)
    }

    /// `int name[d0][d1]...` wrapped in its own declaration statement
    pub fn array_decl(&mut self, name: &str, dims: &[u32]) -> NodeId {
        let decl = self.array_decl_item(name, dims);
        self.decl_stmt(vec![decl])
    }

    pub fn array_decl_item(&mut self, name: &str, dims: &[u32]) -> NodeId {
        let ty = self.ty(BasicType::Int);
        let id = self.var(name);
        let mut children = vec![ty, id];
        for &d in dims {
            children.push(self.int(d));
        }
        self.node(NodeKind::ArrayDecl, children)
    }

    pub fn decl_stmt(&mut self, decls: Vec<NodeId>) -> NodeId {
        self.node(NodeKind::DeclStmt, decls)
    }

    /// Scalar `int name` parameter
    pub fn param(&mut self, name: &str) -> NodeId {
        self.array_param(name, &[])
    }

    /// Array parameter `int name[0][d1]...`; an empty `dims` gives a scalar
    pub fn array_param(&mut self, name: &str, dims: &[u32]) -> NodeId {
        let ty = self.ty(BasicType::Int);
        let id = self.var(name);
        let mut children = vec![ty, id];
        for &d in dims {
            children.push(self.int(d));
        }
        self.node(NodeKind::FuncFormalParam, children)
    }

    pub fn func_def(
        &mut self,
        ret: BasicType,
        name: &str,
        params: Vec<NodeId>,
        body: NodeId,
    ) -> NodeId {
        let ty = self.ty(ret);
        let id = self.var(name);
        let params = self.node(NodeKind::FuncFormalParams, params);
        self.node(NodeKind::FuncDef, vec![ty, id, params, body])
    }

    /// Top-level node; also becomes the tree's root
    pub fn compile_unit(&mut self, items: Vec<NodeId>) -> NodeId {
        let root = self.node(NodeKind::CompileUnit, items);
        self.ast.set_root(root);
        root
    }
}
