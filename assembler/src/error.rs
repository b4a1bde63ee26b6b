//! Error type for the Hack assembler.
//!
//! Every failure mode carries enough context for a one-line diagnostic:
//! the offending mnemonic or symbol and the 1-based source line it came
//! from.

use std::fmt;
use std::io;

/// Errors produced while parsing or encoding Hack assembly.
#[derive(Debug)]
pub enum AsmError {
    Io(io::Error),
    /// Parser queried for a field its current command does not have.
    InvalidState(&'static str),
    /// A dest/comp/jump mnemonic missing from the encoding tables.
    UnknownMnemonic {
        field: &'static str,
        mnemonic: String,
        line: usize,
    },
    /// Numeric A-operand outside the 15-bit address space.
    AddressOutOfRange { value: String, line: usize },
    /// Two L-commands binding the same name.
    DuplicateLabel { label: String, line: usize },
    /// A-command with an operand that is neither a number nor a symbol,
    /// or a symbolic operand fed to the symbol-less fast path.
    InvalidSymbol { symbol: String, line: usize },
}

impl std::error::Error for AsmError {}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "IO error: {e}"),
            Self::InvalidState(msg) => write!(f, "invalid state: {msg}"),
            Self::UnknownMnemonic {
                field,
                mnemonic,
                line,
            } => {
                write!(f, "line {line}: unknown {field} mnemonic '{mnemonic}'")
            }
            Self::AddressOutOfRange { value, line } => {
                write!(f, "line {line}: address '{value}' outside 0..32768")
            }
            Self::DuplicateLabel { label, line } => {
                write!(f, "line {line}: duplicate label '{label}'")
            }
            Self::InvalidSymbol { symbol, line } => {
                write!(f, "line {line}: invalid symbol '{symbol}'")
            }
        }
    }
}

impl From<io::Error> for AsmError {
    fn from(error: io::Error) -> Self {
        Self::Io(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_carries_line() {
        let err = AsmError::UnknownMnemonic {
            field: "comp",
            mnemonic: "D*A".to_string(),
            line: 7,
        };
        assert_eq!(err.to_string(), "line 7: unknown comp mnemonic 'D*A'");

        let err = AsmError::DuplicateLabel {
            label: "LOOP".to_string(),
            line: 12,
        };
        assert_eq!(err.to_string(), "line 12: duplicate label 'LOOP'");
    }

    #[test]
    fn test_from_io_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "missing");
        let err: AsmError = io_err.into();
        assert!(matches!(err, AsmError::Io(_)));
    }
}
