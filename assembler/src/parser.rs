//! Parser module for Hack assembly language.
//!
//! Each `advance` consumes source lines until it finds a command, strips
//! any `//` comment, and splits the command into its fields right there.
//! The accessors hand out the stored slices; nothing is re-scanned after
//! the split. Field slices borrow from the source lines, and 1-based
//! line numbers ride along for diagnostics.
//!
//! Malformed labels (`(LOOP` without its closing parenthesis, `()`) are
//! rejected during the scan, so a command that survives `advance` always
//! has well-formed fields.

use crate::error::AsmError;

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CommandType {
    /// @Xxx where Xxx is either a symbol or a decimal number
    ACommand,
    /// dest=comp;jump
    CCommand,
    /// (Xxx) where Xxx is a symbol
    LCommand,
}

/// One command with its fields already split out.
#[derive(Debug, Clone, Copy)]
enum Command<'a> {
    A(&'a str),
    C {
        dest: &'a str,
        comp: &'a str,
        jump: &'a str,
    },
    L(&'a str),
}

/// Cursor over pre-read source lines; one command is live at a time.
pub struct ParserLines<'a> {
    remaining: &'a [String],
    consumed: usize,
    current: Option<Command<'a>>,
    current_line_number: usize,
}

impl<'a> ParserLines<'a> {
    /// Creates a new parser from a slice of source lines.
    #[inline]
    #[must_use]
    pub fn from_lines(lines: &'a [String]) -> Self {
        Self {
            remaining: lines,
            consumed: 0,
            current: None,
            current_line_number: 0,
        }
    }

    /// Moves to the next command, skipping comments and blank lines.
    ///
    /// Returns `Ok(false)` once the input is exhausted. A structurally
    /// broken command is an error here, not in a later accessor.
    pub fn advance(&mut self) -> Result<bool, AsmError> {
        while let Some((line, rest)) = self.remaining.split_first() {
            self.remaining = rest;
            self.consumed += 1;

            let text = match line.split_once("//") {
                Some((code, _comment)) => code.trim(),
                None => line.trim(),
            };
            if text.is_empty() {
                continue;
            }

            self.current_line_number = self.consumed;
            self.current = Some(split_command(text, self.consumed)?);
            return Ok(true);
        }

        self.current = None;
        Ok(false)
    }

    /// Returns the current command type.
    #[inline]
    pub fn command_type(&self) -> Result<CommandType, AsmError> {
        match self.current {
            Some(Command::A(_)) => Ok(CommandType::ACommand),
            Some(Command::C { .. }) => Ok(CommandType::CCommand),
            Some(Command::L(_)) => Ok(CommandType::LCommand),
            None => Err(AsmError::InvalidState("no current command available")),
        }
    }

    /// 1-based source line of the current command.
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.current_line_number
    }

    /// The symbol of an A-command or L-command.
    ///
    /// # Errors
    /// Returns an error on a C-command or before the first `advance`.
    #[inline]
    pub fn symbol(&self) -> Result<&str, AsmError> {
        match self.current {
            Some(Command::A(symbol) | Command::L(symbol)) => Ok(symbol),
            Some(Command::C { .. }) => {
                Err(AsmError::InvalidState("called symbol() on C-command"))
            }
            None => Err(AsmError::InvalidState("no current command available")),
        }
    }

    /// The dest field of a C-command; empty when the command has none.
    #[inline]
    pub fn dest(&self) -> Result<&str, AsmError> {
        self.c_fields().map(|(dest, _, _)| dest)
    }

    /// The comp field of a C-command.
    #[inline]
    pub fn comp(&self) -> Result<&str, AsmError> {
        self.c_fields().map(|(_, comp, _)| comp)
    }

    /// The jump field of a C-command; empty when the command has none.
    #[inline]
    pub fn jump(&self) -> Result<&str, AsmError> {
        self.c_fields().map(|(_, _, jump)| jump)
    }

    #[inline]
    fn c_fields(&self) -> Result<(&str, &str, &str), AsmError> {
        match self.current {
            Some(Command::C { dest, comp, jump }) => Ok((dest, comp, jump)),
            Some(_) => Err(AsmError::InvalidState(
                "C-command field requested on A- or L-command",
            )),
            None => Err(AsmError::InvalidState("no current command available")),
        }
    }
}

/// Splits one cleaned command into its fields.
///
/// `@x` and `(x)` are recognized by their delimiters; everything else is
/// a C-command cut at the optional `=` and `;`. Empty dest/jump halves
/// are legitimate; whether the fields name real mnemonics is the
/// encoder's concern.
fn split_command(text: &str, line: usize) -> Result<Command<'_>, AsmError> {
    if let Some(symbol) = text.strip_prefix('@') {
        return Ok(Command::A(symbol));
    }

    if let Some(inner) = text.strip_prefix('(') {
        let label = inner
            .strip_suffix(')')
            .filter(|label| !label.is_empty())
            .ok_or_else(|| AsmError::InvalidSymbol {
                symbol: text.to_string(),
                line,
            })?;
        return Ok(Command::L(label));
    }

    let (dest, tail) = match text.split_once('=') {
        Some((dest, tail)) => (dest, tail),
        None => ("", text),
    };
    let (comp, jump) = match tail.split_once(';') {
        Some((comp, jump)) => (comp, jump),
        None => (tail, ""),
    };

    Ok(Command::C { dest, comp, jump })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(source: &str) -> Vec<String> {
        source.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_commands_split_once_on_advance() {
        let src = lines("@21\nAM=M-1\n(END)\n");
        let mut parser = ParserLines::from_lines(&src);

        assert!(parser.advance().unwrap());
        assert_eq!(parser.command_type().unwrap(), CommandType::ACommand);
        assert_eq!(parser.symbol().unwrap(), "21");

        assert!(parser.advance().unwrap());
        assert_eq!(parser.command_type().unwrap(), CommandType::CCommand);
        assert_eq!(parser.dest().unwrap(), "AM");
        assert_eq!(parser.comp().unwrap(), "M-1");
        assert_eq!(parser.jump().unwrap(), "");

        assert!(parser.advance().unwrap());
        assert_eq!(parser.command_type().unwrap(), CommandType::LCommand);
        assert_eq!(parser.symbol().unwrap(), "END");

        assert!(!parser.advance().unwrap());
    }

    #[test]
    fn test_c_command_field_table() {
        let cases = [
            ("MD=D+1;JMP", "MD", "D+1", "JMP"),
            ("D+1;JMP", "", "D+1", "JMP"),
            ("D=D+1", "D", "D+1", ""),
            ("0;JMP", "", "0", "JMP"),
            ("M=1", "M", "1", ""),
        ];

        for (text, dest, comp, jump) in cases {
            let src = vec![text.to_string()];
            let mut parser = ParserLines::from_lines(&src);
            assert!(parser.advance().unwrap());
            assert_eq!(parser.dest().unwrap(), dest, "dest of {text}");
            assert_eq!(parser.comp().unwrap(), comp, "comp of {text}");
            assert_eq!(parser.jump().unwrap(), jump, "jump of {text}");
        }
    }

    #[test]
    fn test_comments_blanks_and_line_numbers() {
        let src = lines("// header\n\n  @3 // inline\n\tD=M  \n");
        let mut parser = ParserLines::from_lines(&src);

        assert!(parser.advance().unwrap());
        assert_eq!(parser.symbol().unwrap(), "3");
        assert_eq!(parser.line_number(), 3);

        assert!(parser.advance().unwrap());
        assert_eq!(parser.comp().unwrap(), "M");
        assert_eq!(parser.line_number(), 4);

        assert!(!parser.advance().unwrap());
    }

    #[test]
    fn test_comment_only_suffix_is_not_a_command() {
        // A line that is all comment after trimming yields nothing.
        let src = lines("   // just words\nD;JNE\n");
        let mut parser = ParserLines::from_lines(&src);

        assert!(parser.advance().unwrap());
        assert_eq!(parser.jump().unwrap(), "JNE");
        assert_eq!(parser.line_number(), 2);
    }

    #[test]
    fn test_unclosed_label_rejected_at_advance() {
        let src = lines("(LOOP\n");
        let mut parser = ParserLines::from_lines(&src);
        assert!(matches!(
            parser.advance().unwrap_err(),
            AsmError::InvalidSymbol { line: 1, .. }
        ));
    }

    #[test]
    fn test_empty_label_rejected() {
        let src = lines("@0\n()\n");
        let mut parser = ParserLines::from_lines(&src);
        assert!(parser.advance().unwrap());
        assert!(matches!(
            parser.advance().unwrap_err(),
            AsmError::InvalidSymbol { line: 2, .. }
        ));
    }

    #[test]
    fn test_field_accessors_guard_command_kind() {
        let src = lines("D=M\n@5\n");
        let mut parser = ParserLines::from_lines(&src);

        parser.advance().unwrap();
        assert!(parser.symbol().is_err());

        parser.advance().unwrap();
        assert!(parser.dest().is_err());
        assert!(parser.comp().is_err());
        assert!(parser.jump().is_err());
    }

    #[test]
    fn test_queries_before_first_advance_fail() {
        let src = lines("@1\n");
        let parser = ParserLines::from_lines(&src);
        assert!(parser.command_type().is_err());
        assert!(parser.symbol().is_err());
    }
}
