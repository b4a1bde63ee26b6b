//! Error type for the Jack compiler.

use std::fmt;
use std::io;

/// Errors produced while lexing, parsing, or generating code.
#[derive(Debug)]
pub enum CompileError {
    Io(io::Error),
    /// Malformed token: unterminated string or comment, oversized
    /// integer, stray character.
    Lexical { message: String, line: usize },
    /// Recursive-descent mismatch: what was required vs what was found.
    Syntax {
        expected: String,
        actual: String,
        line: usize,
    },
    /// Unresolvable identifier or ill-formed construct found during code
    /// generation.
    Semantic { message: String },
}

impl std::error::Error for CompileError {}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::Lexical { message, line } => write!(f, "line {line}: {message}"),
            Self::Syntax {
                expected,
                actual,
                line,
            } => {
                write!(f, "line {line}: expected {expected}, found {actual}")
            }
            Self::Semantic { message } => write!(f, "{message}"),
        }
    }
}

impl From<io::Error> for CompileError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

impl CompileError {
    /// Shorthand for semantic failures.
    pub fn semantic(message: impl Into<String>) -> Self {
        Self::Semantic {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_display() {
        let err = CompileError::Syntax {
            expected: "';'".to_string(),
            actual: "'}'".to_string(),
            line: 14,
        };
        assert_eq!(err.to_string(), "line 14: expected ';', found '}'");
    }
}
