//! Module and Global Variables
//!
//! Defines the top-level module: functions, globals and the scope stack
//! used while generating.

use serde::{Deserialize, Serialize};
use std::fmt;
use crate::ir::{Function, GlobalId, GlobalVariable, IrType, ScopeStack, Symbol};

/// Names of the functions every module can call without declaring them
pub const BUILTIN_NAMES: [&str; 4] = ["getint", "getch", "putint", "putch"];

fn builtin_functions() -> Vec<Function> {
    vec![
        Function::builtin("getint", IrType::I32, &[]),
        Function::builtin("getch", IrType::I32, &[]),
        Function::builtin("putint", IrType::Void, &[IrType::I32]),
        Function::builtin("putch", IrType::Void, &[IrType::I32]),
    ]
}

/// IR Module - represents a complete compilation unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Module {
    pub name: String,
    pub functions: Vec<Function>,
    pub globals: Vec<GlobalVariable>,
    scopes: ScopeStack,
}

impl Module {
    /// Empty module with the builtins already declared
    pub fn new(name: String) -> Self {
        Self {
            name,
            functions: builtin_functions(),
            globals: Vec::new(),
            scopes: ScopeStack::new(),
        }
    }

    pub fn add_function(&mut self, function: Function) -> usize {
        self.functions.push(function);
        self.functions.len() - 1
    }

    pub fn find_function(&self, name: &str) -> Option<usize> {
        self.functions.iter().position(|f| f.name == name)
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }

    pub fn get_function_mut(&mut self, name: &str) -> Option<&mut Function> {
        self.functions.iter_mut().find(|f| f.name == name)
    }

    pub fn add_global(&mut self, global: GlobalVariable) -> GlobalId {
        self.globals.push(global);
        GlobalId((self.globals.len() - 1) as u32)
    }

    pub fn global(&self, id: GlobalId) -> &GlobalVariable {
        &self.globals[id.0 as usize]
    }

    // ----- scopes -----

    pub fn enter_scope(&mut self) {
        self.scopes.enter();
    }

    pub fn leave_scope(&mut self) {
        self.scopes.leave();
    }

    pub fn scope_level(&self) -> usize {
        self.scopes.level()
    }

    pub fn declare(&mut self, name: &str, symbol: Symbol) -> bool {
        self.scopes.declare(name, symbol)
    }

    pub fn lookup(&self, name: &str) -> Option<Symbol> {
        self.scopes.lookup(name)
    }

    /// Functions that have code: neither builtin nor failed
    pub fn defined_functions(&self) -> impl Iterator<Item = &Function> {
        self.functions.iter().filter(|f| !f.is_builtin && f.is_defined)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for global in &self.globals {
            writeln!(f, "{}", global)?;
        }
        for func in self.defined_functions() {
            write!(f, "{}", func)?;
        }
        Ok(())
    }
}
