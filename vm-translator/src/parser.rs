//! Line parser for the stack-machine intermediate representation.
//!
//! Commands are whitespace-separated words on one line; `//` starts a
//! comment. The parser pre-cleans the whole file and then serves commands
//! through the `has_more_commands`/`advance` cursor, caching the split
//! words of the current command.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::TranslateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandType {
    Arithmetic,
    Push,
    Pop,
    Label,
    Goto,
    If,
    Function,
    Return,
    Call,
}

/// The nine stack-arithmetic operations.
const ARITHMETIC_OPS: [&str; 9] = ["add", "sub", "neg", "eq", "gt", "lt", "and", "or", "not"];

pub struct Parser {
    /// Cleaned command lines paired with their 1-based source line.
    lines: Vec<(usize, String)>,
    current_line: usize,
    current_command: String,
    current_source_line: usize,
    /// Cached words of the current command.
    cached_parts: Vec<String>,
}

impl Parser {
    pub fn new(path: &Path) -> Result<Self, TranslateError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);

        let mut raw = Vec::new();
        for line in reader.lines() {
            raw.push(line?);
        }
        Ok(Self::from_raw_lines(&raw))
    }

    /// Builds a parser over in-memory source, for tests and library use.
    #[must_use]
    pub fn from_source(source: &str) -> Self {
        let raw: Vec<String> = source.lines().map(str::to_string).collect();
        Self::from_raw_lines(&raw)
    }

    fn from_raw_lines(raw: &[String]) -> Self {
        let mut lines = Vec::new();
        for (index, line) in raw.iter().enumerate() {
            let line = if let Some(pos) = line.find("//") {
                &line[..pos]
            } else {
                line.as_str()
            };

            let trimmed = line.trim();
            if !trimmed.is_empty() {
                lines.push((index + 1, trimmed.to_string()));
            }
        }

        Parser {
            lines,
            current_line: 0,
            current_command: String::new(),
            current_source_line: 0,
            cached_parts: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn has_more_commands(&self) -> bool {
        self.current_line < self.lines.len()
    }

    #[inline]
    pub fn advance(&mut self) {
        if self.has_more_commands() {
            let (source_line, line) = &mut self.lines[self.current_line];
            self.current_source_line = *source_line;
            std::mem::swap(&mut self.current_command, line);

            self.cached_parts.clear();
            self.cached_parts.extend(
                self.current_command
                    .split_whitespace()
                    .map(|s| s.to_string()),
            );

            self.current_line += 1;
        }
    }

    /// 1-based source line of the current command.
    #[inline]
    #[must_use]
    pub fn line_number(&self) -> usize {
        self.current_source_line
    }

    #[inline]
    pub fn command_type(&self) -> Result<CommandType, TranslateError> {
        let head = self
            .cached_parts
            .first()
            .ok_or(TranslateError::InvalidState("no current command"))?;

        match head.as_str() {
            "push" => Ok(CommandType::Push),
            "pop" => Ok(CommandType::Pop),
            "label" => Ok(CommandType::Label),
            "goto" => Ok(CommandType::Goto),
            "if-goto" => Ok(CommandType::If),
            "function" => Ok(CommandType::Function),
            "return" => Ok(CommandType::Return),
            "call" => Ok(CommandType::Call),
            op if ARITHMETIC_OPS.contains(&op) => Ok(CommandType::Arithmetic),
            other => Err(TranslateError::UnknownCommand {
                command: other.to_string(),
                line: self.current_source_line,
            }),
        }
    }

    /// First argument: the operation itself for arithmetic commands, the
    /// segment/label/function name otherwise. Not defined for `return`.
    #[inline]
    pub fn arg1(&self) -> Result<&str, TranslateError> {
        match self.command_type()? {
            CommandType::Arithmetic => Ok(&self.cached_parts[0]),
            CommandType::Return => Err(TranslateError::InvalidState(
                "arg1 is not defined for return",
            )),
            _ => self
                .cached_parts
                .get(1)
                .map(String::as_str)
                .ok_or(TranslateError::MissingArgument {
                    command: self.cached_parts[0].clone(),
                    line: self.current_source_line,
                }),
        }
    }

    /// Second argument: the index for push/pop, the local/argument count
    /// for function/call.
    #[inline]
    pub fn arg2(&self) -> Result<u16, TranslateError> {
        match self.command_type()? {
            CommandType::Push | CommandType::Pop | CommandType::Function | CommandType::Call => {
                let word =
                    self.cached_parts
                        .get(2)
                        .ok_or_else(|| TranslateError::MissingArgument {
                            command: self.cached_parts[0].clone(),
                            line: self.current_source_line,
                        })?;
                word.parse::<u16>()
                    .map_err(|_| TranslateError::InvalidIndex {
                        value: word.clone(),
                        line: self.current_source_line,
                    })
            }
            _ => Err(TranslateError::InvalidState(
                "arg2 is not defined for this command type",
            )),
        }
    }
}
