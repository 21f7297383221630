//! Lexical scopes for name resolution
//!
//! Level 0 is the global scope and is never popped.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use crate::ir::{GlobalId, ValueId};

/// What a name resolves to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Symbol {
    /// A variable of the function being generated
    Local(ValueId),
    Global(GlobalId),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopeStack {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self { scopes: vec![HashMap::new()] }
    }

    pub fn enter(&mut self) {
        self.scopes.push(HashMap::new());
    }

    pub fn leave(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Current depth, 0 = global
    pub fn level(&self) -> usize {
        self.scopes.len() - 1
    }

    /// Bind `name` in the innermost scope; `false` if it is already bound there
    pub fn declare(&mut self, name: &str, symbol: Symbol) -> bool {
        let Some(scope) = self.scopes.last_mut() else {
            return false;
        };
        if scope.contains_key(name) {
            return false;
        }
        scope.insert(name.to_string(), symbol);
        true
    }

    /// Innermost binding of `name`
    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.scopes.iter().rev().find_map(|s| s.get(name).copied())
    }
}
