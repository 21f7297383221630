//! IR generation from the AST
//!
//! This module walks the AST once and produces the linear IR. Every
//! lowering routine returns the instructions it produced for its node
//! (spliced bottom-up by the caller, left to right) together with the
//! value later consumers should read.

mod errors;
mod generator;
mod functions;
mod conditions;
pub mod expressions;
pub mod statements;

pub use errors::CodegenError;
pub use generator::{IrGenerator, LoopFrame};
pub use conditions::generate_branch_for_condition;

use mcc_common::SourceLocation;
use crate::ir::{InstId, ValueId};

/// How the result of an expression is wanted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvalMode {
    /// The value itself (array elements are loaded)
    AsValue,
    /// Something that can be written to (array elements stay addresses)
    AsAddress,
}

/// Instructions produced for one node and the value it yields
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Fragment {
    pub code: Vec<InstId>,
    pub value: Option<ValueId>,
}

impl Fragment {
    pub fn new(code: Vec<InstId>, value: Option<ValueId>) -> Self {
        Self { code, value }
    }

    /// A value that needs no instructions (constants, variables)
    pub fn value_only(value: ValueId) -> Self {
        Self { code: Vec::new(), value: Some(value) }
    }

    /// The value, or a missing-operand error naming `construct`
    pub fn require_value(&self, construct: &str, location: &SourceLocation) -> Result<ValueId, CodegenError> {
        self.value.ok_or_else(|| CodegenError::MissingOperand {
            construct: construct.to_string(),
            location: location.clone(),
        })
    }
}
