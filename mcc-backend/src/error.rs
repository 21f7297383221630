//! Instruction selection errors
//!
//! Two categories are kept apart: consistency violations mean the IR
//! handed to the selector breaks a contract of the generator and abort
//! selection of the function, while unsupported constructs are logged by
//! the dispatcher and the offending instruction is skipped.

use mcc_codegen::AsmError;
use mcc_common::CompilerError;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SelectError {
    #[error("internal consistency violation in function '{function}': {message}")]
    Consistency { function: String, message: String },

    #[error("unsupported in function '{function}': {what}")]
    Unsupported { function: String, what: String },

    #[error("no free scratch register in function '{function}'")]
    RegistersExhausted { function: String },

    #[error(transparent)]
    Asm(#[from] AsmError),
}

impl SelectError {
    pub fn consistency(function: &str, message: impl Into<String>) -> Self {
        SelectError::Consistency {
            function: function.to_string(),
            message: message.into(),
        }
    }

    pub fn unsupported(function: &str, what: impl Into<String>) -> Self {
        SelectError::Unsupported {
            function: function.to_string(),
            what: what.into(),
        }
    }

    pub fn is_consistency(&self) -> bool {
        matches!(self, SelectError::Consistency { .. })
    }
}

impl From<SelectError> for CompilerError {
    fn from(err: SelectError) -> Self {
        CompilerError::InternalError { message: err.to_string() }
    }
}
