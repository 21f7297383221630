//! Abstract Syntax Tree interface
//!
//! The parser is not part of this crate; it hands over an index-addressed
//! arena of nodes. Each node has a closed kind tag, an ordered child list,
//! optional name/literal/type payloads and the source line it came from.
//! The same shape can be deserialized from JSON (see `mcc-driver`).

mod builder;

pub use builder::AstBuilder;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Index of a node inside its [`Ast`]
pub type NodeId = u32;

/// Every syntactic construct the IR generator understands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    // Leaves
    LiteralInt,
    VarId,
    LeafType,

    // Top level and definitions
    CompileUnit,
    FuncDef,
    FuncFormalParams,
    FuncFormalParam,
    FuncCall,
    FuncRealParams,

    // Statements
    Block,
    DeclStmt,
    VarDecl,
    ArrayDecl,
    Assign,
    Return,
    If,
    While,
    Break,
    Continue,

    // Expressions
    ArrayRef,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Neg,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
    LogicalNot,
    LogicalAnd,
    LogicalOr,
}

impl NodeKind {
    /// `<`, `<=`, `>`, `>=`, `==`, `!=`
    pub fn is_relational(self) -> bool {
        matches!(
            self,
            NodeKind::Lt | NodeKind::Le | NodeKind::Gt | NodeKind::Ge | NodeKind::Eq | NodeKind::Ne
        )
    }

    /// `+`, `-`, `*`, `/`, `%`
    pub fn is_arithmetic(self) -> bool {
        matches!(
            self,
            NodeKind::Add | NodeKind::Sub | NodeKind::Mul | NodeKind::Div | NodeKind::Mod
        )
    }

    /// `!`, `&&`, `||`
    pub fn is_logical(self) -> bool {
        matches!(self, NodeKind::LogicalNot | NodeKind::LogicalAnd | NodeKind::LogicalOr)
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            NodeKind::LiteralInt => "literal",
            NodeKind::VarId => "identifier",
            NodeKind::LeafType => "type",
            NodeKind::CompileUnit => "compile-unit",
            NodeKind::FuncDef => "function-def",
            NodeKind::FuncFormalParams => "formal-params",
            NodeKind::FuncFormalParam => "formal-param",
            NodeKind::FuncCall => "call",
            NodeKind::FuncRealParams => "real-params",
            NodeKind::Block => "block",
            NodeKind::DeclStmt => "decl-stmt",
            NodeKind::VarDecl => "var-decl",
            NodeKind::ArrayDecl => "array-decl",
            NodeKind::Assign => "=",
            NodeKind::Return => "return",
            NodeKind::If => "if",
            NodeKind::While => "while",
            NodeKind::Break => "break",
            NodeKind::Continue => "continue",
            NodeKind::ArrayRef => "array-ref",
            NodeKind::Add => "+",
            NodeKind::Sub => "-",
            NodeKind::Mul => "*",
            NodeKind::Div => "/",
            NodeKind::Mod => "%",
            NodeKind::Neg => "unary -",
            NodeKind::Lt => "<",
            NodeKind::Le => "<=",
            NodeKind::Gt => ">",
            NodeKind::Ge => ">=",
            NodeKind::Eq => "==",
            NodeKind::Ne => "!=",
            NodeKind::LogicalNot => "!",
            NodeKind::LogicalAnd => "&&",
            NodeKind::LogicalOr => "||",
        };
        write!(f, "{}", name)
    }
}

/// Source-level base types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BasicType {
    Int,
    Void,
}

impl fmt::Display for BasicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BasicType::Int => write!(f, "int"),
            BasicType::Void => write!(f, "void"),
        }
    }
}

/// One AST node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AstNode {
    pub kind: NodeKind,
    #[serde(default)]
    pub children: Vec<NodeId>,
    #[serde(default)]
    pub parent: Option<NodeId>,
    #[serde(default)]
    pub line: u32,
    /// Identifier payload (`VarId`)
    #[serde(default)]
    pub name: Option<String>,
    /// Literal payload (`LiteralInt`); unsigned so `-2147483648` parses as `-(2147483648)`
    #[serde(default)]
    pub int_value: Option<u32>,
    /// Type payload (`LeafType`)
    #[serde(default)]
    pub basic_type: Option<BasicType>,
}

impl AstNode {
    pub fn new(kind: NodeKind, line: u32) -> Self {
        Self {
            kind,
            children: Vec::new(),
            parent: None,
            line,
            name: None,
            int_value: None,
            basic_type: None,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum AstError {
    #[error("node {node} refers to missing child {child}")]
    DanglingChild { node: NodeId, child: NodeId },

    #[error("root node {0} does not exist")]
    MissingRoot(NodeId),

    #[error("the tree has no root")]
    NoRoot,

    #[error("node {child} is listed under both {first} and {second}")]
    SharedChild { child: NodeId, first: NodeId, second: NodeId },

    #[error("node {0} is its own ancestor")]
    Cycle(NodeId),
}

/// Arena holding every node of one translation unit
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ast {
    nodes: Vec<AstNode>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node and adopt its children
    pub fn add(&mut self, mut node: AstNode, children: Vec<NodeId>) -> NodeId {
        let id = self.nodes.len() as NodeId;
        for &child in &children {
            if let Some(c) = self.nodes.get_mut(child as usize) {
                c.parent = Some(id);
            }
        }
        node.children = children;
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> &AstNode {
        &self.nodes[id as usize]
    }

    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.node(id).children.get(index).copied()
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.node(id).parent
    }

    pub fn line(&self, id: NodeId) -> u32 {
        self.node(id).line
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) {
        self.root = Some(root);
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Check child/root references and rebuild parent links.
    ///
    /// Trees coming from JSON may omit `parent`; this recomputes it. Every
    /// node may have at most one parent and the walk from the root must
    /// not come back to a node it already visited.
    pub fn validate(&mut self) -> Result<(), AstError> {
        let root = self.root.ok_or(AstError::NoRoot)?;
        if root as usize >= self.nodes.len() {
            return Err(AstError::MissingRoot(root));
        }

        let count = self.nodes.len();
        let mut parents: Vec<Option<NodeId>> = vec![None; count];
        for (index, node) in self.nodes.iter().enumerate() {
            let index = index as NodeId;
            for &child in &node.children {
                if child as usize >= count {
                    return Err(AstError::DanglingChild { node: index, child });
                }
                if let Some(first) = parents[child as usize] {
                    return Err(AstError::SharedChild { child, first, second: index });
                }
                parents[child as usize] = Some(index);
            }
        }

        let mut visited = vec![false; count];
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if visited[id as usize] {
                return Err(AstError::Cycle(id));
            }
            visited[id as usize] = true;
            stack.extend(self.nodes[id as usize].children.iter().copied());
        }

        for (node, parent) in self.nodes.iter_mut().zip(parents) {
            node.parent = parent;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_sets_parent() {
        let mut ast = Ast::new();
        let lhs = ast.add(AstNode::new(NodeKind::LiteralInt, 1), vec![]);
        let rhs = ast.add(AstNode::new(NodeKind::LiteralInt, 1), vec![]);
        let add = ast.add(AstNode::new(NodeKind::Add, 1), vec![lhs, rhs]);

        assert_eq!(ast.parent(lhs), Some(add));
        assert_eq!(ast.parent(rhs), Some(add));
        assert_eq!(ast.children(add), &[lhs, rhs]);
    }

    #[test]
    fn test_validate_rejects_dangling_child() {
        let mut ast = Ast::new();
        let bad = ast.add(AstNode::new(NodeKind::Block, 1), vec![]);
        ast.nodes[bad as usize].children.push(42);
        ast.set_root(bad);

        assert_eq!(
            ast.validate(),
            Err(AstError::DanglingChild { node: bad, child: 42 })
        );
    }

    #[test]
    fn test_validate_rejects_node_under_two_parents() {
        let mut ast = Ast::new();
        let leaf = ast.add(AstNode::new(NodeKind::Break, 1), vec![]);
        let first = ast.add(AstNode::new(NodeKind::Block, 1), vec![leaf]);
        let second = ast.add(AstNode::new(NodeKind::Block, 2), vec![leaf]);
        let root = ast.add(AstNode::new(NodeKind::Block, 1), vec![first, second]);
        ast.set_root(root);

        assert_eq!(
            ast.validate(),
            Err(AstError::SharedChild { child: leaf, first, second })
        );
    }

    #[test]
    fn test_validate_rejects_cycle_through_root() {
        let mut ast = Ast::new();
        let inner = ast.add(AstNode::new(NodeKind::Block, 1), vec![]);
        let root = ast.add(AstNode::new(NodeKind::Block, 1), vec![inner]);
        ast.nodes[inner as usize].children.push(root);
        ast.set_root(root);

        assert_eq!(ast.validate(), Err(AstError::Cycle(root)));
    }

    #[test]
    fn test_json_round_trip_restores_parents() {
        let mut b = AstBuilder::new();
        let body = b.block(vec![]);
        let func = b.func_def(BasicType::Void, "f", vec![], body);
        b.compile_unit(vec![func]);
        let ast = b.finish();

        let json = serde_json::to_string(&ast).unwrap();
        let stripped = json.replace(&format!("\"parent\":{}", func), "\"parent\":null");
        let mut back: Ast = serde_json::from_str(&stripped).unwrap();
        back.validate().unwrap();

        assert_eq!(back, ast);
    }
}
