//! Hack assembler: symbolic `.asm` to binary `.hack`.
//!
//! Translates Hack assembly into 16-bit machine words, one 0/1 text line
//! per instruction.
//!
//! # Architecture
//!
//! - [`parser`]: one-shot splitting of A/C/L commands into borrowed fields
//! - [`code`]: mnemonic tables and instruction encoding (PHF maps)
//! - [`symbol_table`]: predefined symbols plus label/variable allocation
//! - [`error`]: the crate-wide [`AsmError`]
//!
//! Assembly is two passes: pass 1 binds each `(LABEL)` to the address of
//! the following instruction, pass 2 encodes A- and C-commands, allocating
//! unseen variables from RAM[16] upward.
//!
//! # Example
//!
//! ```rust
//! use hack_assembler::assemble;
//!
//! let lines = vec!["@2".to_string(), "D=A".to_string()];
//! let binary = assemble(&lines).unwrap();
//! assert_eq!(binary, vec!["0000000000000010", "1110110000010000"]);
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::inline_always,
    clippy::missing_errors_doc,
    clippy::module_name_repetitions
)]

pub mod code;
pub mod error;
pub mod parser;
pub mod symbol_table;

pub use error::AsmError;
pub use parser::{CommandType, ParserLines};
pub use symbol_table::SymbolTable;

/// Variables are allocated from this RAM address upward.
const FIRST_VARIABLE_ADDRESS: u16 = 16;

/// First pass: bind each label to the ROM address of the next instruction.
///
/// L-commands emit no code, so they do not advance the address counter.
pub fn first_pass(lines: &[String], symbol_table: &mut SymbolTable) -> Result<(), AsmError> {
    let mut rom_address = 0u16;
    let mut parser = ParserLines::from_lines(lines);

    while parser.advance()? {
        match parser.command_type()? {
            CommandType::LCommand => {
                let symbol = parser.symbol()?;
                if !symbol_table.add_entry(symbol, rom_address) {
                    return Err(AsmError::DuplicateLabel {
                        label: symbol.to_string(),
                        line: parser.line_number(),
                    });
                }
            }
            CommandType::ACommand | CommandType::CCommand => {
                rom_address += 1;
            }
        }
    }

    Ok(())
}

/// Second pass: encode every A- and C-command, resolving symbols.
///
/// Unseen symbolic A-operands are allocated as variables starting at
/// RAM[16]. L-commands were consumed by pass 1 and emit nothing.
pub fn second_pass(
    lines: &[String],
    symbol_table: &mut SymbolTable,
) -> Result<Vec<String>, AsmError> {
    let mut ram_address = FIRST_VARIABLE_ADDRESS;
    let mut parser = ParserLines::from_lines(lines);
    let mut output = Vec::new();

    while parser.advance()? {
        match parser.command_type()? {
            CommandType::ACommand => {
                let symbol = parser.symbol()?;
                let address = resolve_a_operand(symbol, symbol_table, &mut ram_address, &parser)?;
                output.push(code::encode_a_instruction(address));
            }
            CommandType::CCommand => {
                output.push(encode_c_command(&parser)?);
            }
            CommandType::LCommand => {}
        }
    }

    Ok(output)
}

/// Assembles a full program: pass 1 then pass 2.
pub fn assemble(lines: &[String]) -> Result<Vec<String>, AsmError> {
    let mut symbol_table = SymbolTable::new();
    first_pass(lines, &mut symbol_table)?;
    second_pass(lines, &mut symbol_table)
}

/// Single-pass shortcut for programs known to contain no labels and no
/// symbolic variables.
///
/// Behaviorally identical to [`assemble`] on such inputs; a label or a
/// symbolic operand is an error here, since the caller promised there are
/// none.
pub fn assemble_symbolless(lines: &[String]) -> Result<Vec<String>, AsmError> {
    let mut parser = ParserLines::from_lines(lines);
    let mut output = Vec::new();

    while parser.advance()? {
        match parser.command_type()? {
            CommandType::ACommand => {
                let symbol = parser.symbol()?;
                let address = parse_numeric_operand(symbol, &parser)?.ok_or_else(|| {
                    AsmError::InvalidSymbol {
                        symbol: symbol.to_string(),
                        line: parser.line_number(),
                    }
                })?;
                output.push(code::encode_a_instruction(address));
            }
            CommandType::CCommand => {
                output.push(encode_c_command(&parser)?);
            }
            CommandType::LCommand => {
                return Err(AsmError::InvalidSymbol {
                    symbol: parser.symbol()?.to_string(),
                    line: parser.line_number(),
                });
            }
        }
    }

    Ok(output)
}

/// Resolves an A-operand: a decimal constant, a known symbol, or a fresh
/// variable allocation.
fn resolve_a_operand(
    symbol: &str,
    symbol_table: &mut SymbolTable,
    ram_address: &mut u16,
    parser: &ParserLines,
) -> Result<u16, AsmError> {
    if let Some(address) = parse_numeric_operand(symbol, parser)? {
        return Ok(address);
    }
    if symbol.is_empty() {
        return Err(AsmError::InvalidSymbol {
            symbol: symbol.to_string(),
            line: parser.line_number(),
        });
    }
    Ok(symbol_table.get_or_insert(symbol, ram_address))
}

/// Parses an all-digit operand, enforcing the 15-bit address space.
///
/// Returns `Ok(None)` for symbolic operands.
fn parse_numeric_operand(symbol: &str, parser: &ParserLines) -> Result<Option<u16>, AsmError> {
    if symbol.is_empty() || !symbol.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }
    match symbol.parse::<u32>() {
        Ok(value) if value < (1 << 15) => Ok(Some(value as u16)),
        _ => Err(AsmError::AddressOutOfRange {
            value: symbol.to_string(),
            line: parser.line_number(),
        }),
    }
}

/// Encodes the current C-command, reporting which field failed on an
/// unknown mnemonic.
fn encode_c_command(parser: &ParserLines) -> Result<String, AsmError> {
    let dest = parser.dest()?;
    let comp = parser.comp()?;
    let jump = parser.jump()?;

    let unknown = |field: &'static str, mnemonic: &str| AsmError::UnknownMnemonic {
        field,
        mnemonic: mnemonic.to_string(),
        line: parser.line_number(),
    };

    let comp_bits = code::comp(comp).ok_or_else(|| unknown("comp", comp))?;
    let dest_bits = code::dest(dest).ok_or_else(|| unknown("dest", dest))?;
    let jump_bits = code::jump(jump).ok_or_else(|| unknown("jump", jump))?;

    Ok(format!("111{comp_bits}{dest_bits}{jump_bits}"))
}
