//! Compiler errors and the diagnostics tally
//!
//! Semantic errors abort only the function being generated; they are
//! recorded in an [`ErrorReporter`] and the driver decides from the tally
//! whether the compile unit failed.

use crate::source_loc::SourceLocation;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompilerError {
    #[error("Semantic error at {location}: {message}")]
    Semantic {
        location: SourceLocation,
        message: String,
    },

    #[error("Code generation error at {location}: {message}")]
    CodegenError {
        location: SourceLocation,
        message: String,
    },

    #[error("IR generation failed with {errors} error(s)")]
    GenerationFailed { errors: usize },

    #[error("IO error: {message}")]
    IoError { message: String },

    /// The passes disagree about an invariant; always fatal
    #[error("Internal compiler error: {message}")]
    InternalError { message: String },
}

impl CompilerError {
    pub fn semantic_error(message: String, location: SourceLocation) -> Self {
        CompilerError::Semantic { location, message }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        CompilerError::InternalError { message: message.into() }
    }

    /// Where the error points, if anywhere
    pub fn location(&self) -> Option<&SourceLocation> {
        match self {
            CompilerError::Semantic { location, .. } | CompilerError::CodegenError { location, .. } => {
                Some(location)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One reported message, printed as `file:line: severity: message`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
    pub location: SourceLocation,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message)
    }
}

/// Collects diagnostics and counts errors and warnings
#[derive(Debug, Default)]
pub struct ErrorReporter {
    diagnostics: Vec<Diagnostic>,
    error_count: usize,
    warning_count: usize,
}

impl ErrorReporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn error(&mut self, message: String, location: SourceLocation) {
        self.push(Severity::Error, message, location);
        self.error_count += 1;
    }

    pub fn warning(&mut self, message: String, location: SourceLocation) {
        self.push(Severity::Warning, message, location);
        self.warning_count += 1;
    }

    fn push(&mut self, severity: Severity, message: String, location: SourceLocation) {
        self.diagnostics.push(Diagnostic { severity, message, location });
    }

    /// Record a compiler error as an error diagnostic
    pub fn report(&mut self, err: &CompilerError) {
        let location = err.location().cloned().unwrap_or_else(SourceLocation::dummy);
        let message = match err {
            CompilerError::Semantic { message, .. }
            | CompilerError::CodegenError { message, .. }
            | CompilerError::IoError { message }
            | CompilerError::InternalError { message } => message.clone(),
            other => other.to_string(),
        };
        self.error(message, location);
    }

    pub fn has_errors(&self) -> bool {
        self.error_count > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count
    }

    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_diagnostic_display() {
        let mut reporter = ErrorReporter::new();
        reporter.error("Test error".to_string(), SourceLocation::new("test.c", 1));
        assert_eq!(reporter.diagnostics()[0].to_string(), "test.c:1: error: Test error");
    }

    #[test]
    fn test_error_and_warning_tally() {
        let mut reporter = ErrorReporter::new();
        assert!(!reporter.has_errors());

        reporter.warning("unused".to_string(), SourceLocation::at_line(2));
        assert!(!reporter.has_errors());
        assert_eq!(reporter.warning_count(), 1);

        reporter.error("Test error".to_string(), SourceLocation::at_line(3));
        assert!(reporter.has_errors());
        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.diagnostics().len(), 2);
        assert_eq!(reporter.diagnostics()[0].severity, Severity::Warning);
    }

    #[test]
    fn test_report_compiler_error_keeps_line() {
        let mut reporter = ErrorReporter::new();
        let err = CompilerError::semantic_error(
            "undefined function 'foo'".to_string(),
            SourceLocation::at_line(12),
        );
        reporter.report(&err);

        assert_eq!(reporter.error_count(), 1);
        assert_eq!(reporter.diagnostics()[0].location.line, 12);
        assert_eq!(reporter.diagnostics()[0].message, "undefined function 'foo'");
    }

    #[test]
    fn test_report_internal_error_has_no_line() {
        let mut reporter = ErrorReporter::new();
        reporter.report(&CompilerError::internal("label 3 placed twice"));
        assert_eq!(reporter.diagnostics()[0].location, SourceLocation::dummy());
        assert_eq!(reporter.diagnostics()[0].to_string(), "<unknown>:0: error: label 3 placed twice");
    }

    #[test]
    fn test_generation_failed_message() {
        assert_eq!(
            CompilerError::GenerationFailed { errors: 2 }.to_string(),
            "IR generation failed with 2 error(s)"
        );
    }
}
