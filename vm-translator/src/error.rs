//! Error type for the VM translator.

use std::fmt;
use std::io;

/// Errors produced while parsing VM commands or emitting assembly.
#[derive(Debug)]
pub enum TranslateError {
    Io(io::Error),
    /// First word of a command is not a known VM operation.
    UnknownCommand { command: String, line: usize },
    /// push/pop segment name outside the eight defined segments.
    UnknownSegment { segment: String, line: usize },
    /// Command is missing a required argument.
    MissingArgument { command: String, line: usize },
    /// Index argument is not a nonnegative number, or is out of range
    /// for its segment (pointer 0..=1, temp 0..=7).
    InvalidIndex { value: String, line: usize },
    /// `pop constant` has no storage target.
    PopFromConstant { line: usize },
    /// Parser queried before `advance` or after the last command.
    InvalidState(&'static str),
}

impl std::error::Error for TranslateError {}

impl fmt::Display for TranslateError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::UnknownCommand { command, line } => {
                write!(f, "line {line}: unknown command '{command}'")
            }
            Self::UnknownSegment { segment, line } => {
                write!(f, "line {line}: unknown segment '{segment}'")
            }
            Self::MissingArgument { command, line } => {
                write!(f, "line {line}: missing argument for '{command}'")
            }
            Self::InvalidIndex { value, line } => {
                write!(f, "line {line}: invalid index '{value}'")
            }
            Self::PopFromConstant { line } => {
                write!(f, "line {line}: cannot pop to the constant segment")
            }
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
        }
    }
}

impl From<io::Error> for TranslateError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_line() {
        let err = TranslateError::UnknownSegment {
            segment: "heap".to_string(),
            line: 3,
        };
        assert_eq!(err.to_string(), "line 3: unknown segment 'heap'");
    }
}
