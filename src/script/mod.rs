pub mod extract;
pub mod validate;

pub use extract::{ExtractionError, ScriptCandidate, extract};
pub use validate::{PythonValidator, ScriptValidator};

use std::fmt;

/// Location and message for the first parse problem in a script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    /// 1-based.
    pub line: usize,
    /// 1-based.
    pub column: usize,
    pub message: String,
}

impl fmt::Display for SyntaxIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}, column {}: {}",
            self.line, self.column, self.message
        )
    }
}

/// Verdict on a candidate script before it is allowed to run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationResult {
    Valid,
    SyntaxError(SyntaxIssue),
    Refused(String),
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }
}
