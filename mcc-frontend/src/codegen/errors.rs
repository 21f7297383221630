//! Code generation error types

use mcc_common::{CompilerError, SourceLocation};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CodegenError {
    #[error("Unsupported construct '{construct}' at {location}")]
    UnsupportedConstruct {
        construct: String,
        location: SourceLocation,
    },

    #[error("Undefined function '{name}' at {location}")]
    UndefinedFunction {
        name: String,
        location: SourceLocation,
    },

    #[error("Undefined variable '{name}' at {location}")]
    UndefinedVariable {
        name: String,
        location: SourceLocation,
    },

    #[error("Function '{name}' expects {expected} argument(s) but {found} given at {location}")]
    ArgumentCountMismatch {
        name: String,
        expected: usize,
        found: usize,
        location: SourceLocation,
    },

    #[error("'{construct}' is missing an operand at {location}")]
    MissingOperand {
        construct: String,
        location: SourceLocation,
    },

    #[error("break statement not within a loop at {location}")]
    BreakOutsideLoop { location: SourceLocation },

    #[error("continue statement not within a loop at {location}")]
    ContinueOutsideLoop { location: SourceLocation },

    #[error("Invalid lvalue at {location}")]
    InvalidLvalue { location: SourceLocation },

    #[error("'{name}' is not an array or has too many indices at {location}")]
    InvalidArrayRef {
        name: String,
        location: SourceLocation,
    },

    #[error("Redefinition of '{name}' at {location}")]
    Redefinition {
        name: String,
        location: SourceLocation,
    },

    #[error("Function '{name}' defined inside another function at {location}")]
    NestedFunction {
        name: String,
        location: SourceLocation,
    },

    #[error("Initializer of global '{name}' is not a constant at {location}")]
    NonConstantInitializer {
        name: String,
        location: SourceLocation,
    },

    #[error("void function '{name}' returns a value at {location}")]
    ReturnValueInVoid {
        name: String,
        location: SourceLocation,
    },

    #[error("Array '{name}' is too large for a 32-bit frame at {location}")]
    ArrayTooLarge {
        name: String,
        location: SourceLocation,
    },

    #[error("Variable '{name}' declared void at {location}")]
    VoidVariable {
        name: String,
        location: SourceLocation,
    },

    #[error("Internal error at {location}: {message}")]
    InternalError {
        message: String,
        location: SourceLocation,
    },
}

impl CodegenError {
    pub fn location(&self) -> &SourceLocation {
        match self {
            CodegenError::UnsupportedConstruct { location, .. }
            | CodegenError::UndefinedFunction { location, .. }
            | CodegenError::UndefinedVariable { location, .. }
            | CodegenError::ArgumentCountMismatch { location, .. }
            | CodegenError::MissingOperand { location, .. }
            | CodegenError::BreakOutsideLoop { location }
            | CodegenError::ContinueOutsideLoop { location }
            | CodegenError::InvalidLvalue { location }
            | CodegenError::InvalidArrayRef { location, .. }
            | CodegenError::Redefinition { location, .. }
            | CodegenError::NestedFunction { location, .. }
            | CodegenError::NonConstantInitializer { location, .. }
            | CodegenError::ReturnValueInVoid { location, .. }
            | CodegenError::ArrayTooLarge { location, .. }
            | CodegenError::VoidVariable { location, .. }
            | CodegenError::InternalError { location, .. } => location,
        }
    }
}

impl From<CodegenError> for CompilerError {
    fn from(err: CodegenError) -> Self {
        match err {
            CodegenError::InternalError { message, .. } => CompilerError::InternalError { message },
            other => CompilerError::Semantic {
                location: other.location().clone(),
                message: other.to_string(),
            },
        }
    }
}

impl From<CompilerError> for CodegenError {
    fn from(err: CompilerError) -> Self {
        CodegenError::InternalError {
            message: err.to_string(),
            location: SourceLocation::dummy(),
        }
    }
}
