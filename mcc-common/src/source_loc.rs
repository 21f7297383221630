//! Source positions for diagnostics
//!
//! The AST handed to the compiler records only the line each node starts
//! on, so that is all a location carries besides the input name.

use serde::{Deserialize, Serialize};
use std::fmt;

/// `file:line`, with line 0 meaning unknown
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceLocation {
    pub filename: String,
    pub line: u32,
}

impl SourceLocation {
    pub fn new(filename: &str, line: u32) -> Self {
        Self {
            filename: filename.to_string(),
            line,
        }
    }

    /// Location of an AST node
    pub fn at_line(line: u32) -> Self {
        Self::new("<input>", line)
    }

    /// No position available (internal errors)
    pub fn dummy() -> Self {
        Self::new("<unknown>", 0)
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.filename, self.line)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_location() {
        let loc = SourceLocation::at_line(7);
        assert_eq!(loc.line, 7);
        assert_eq!(loc.to_string(), "<input>:7");
    }
}
