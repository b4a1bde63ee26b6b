//! Hack VM translator: stack-machine IR (`.vm`) to symbolic assembly
//! (`.asm`).
//!
//! # Architecture
//!
//! - [`parser`]: line-level command classification and argument access
//! - [`code_writer`]: assembly templates for every VM command
//! - [`error`]: the crate-wide [`TranslateError`]
//!
//! A translation always starts with the bootstrap (`SP = 256`, then
//! `call Sys.init 0`) and then concatenates the translated files into a
//! single assembly stream. Each file is a translation unit whose stem
//! scopes its `static` segment addresses.
//!
//! # Example
//!
//! ```rust
//! use hack_vm_translator::translate_units;
//!
//! let source = "push constant 7\npush constant 8\nadd\n";
//! let units = vec![("Main".to_string(), source.to_string())];
//! let mut out = Vec::new();
//! translate_units(&units, "Main", &mut out).unwrap();
//! assert!(String::from_utf8(out).unwrap().contains("@7"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod code_writer;
pub mod error;
pub mod parser;

pub use code_writer::CodeWriter;
pub use error::TranslateError;
pub use parser::{CommandType, Parser};

use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Feeds every command of one parsed unit through the code writer.
pub fn translate_unit<W: Write>(
    parser: &mut Parser,
    writer: &mut CodeWriter<W>,
) -> Result<(), TranslateError> {
    while parser.has_more_commands() {
        parser.advance();
        let line = parser.line_number();

        match parser.command_type()? {
            CommandType::Arithmetic => writer.write_arithmetic(parser.arg1()?, line)?,
            CommandType::Push => writer.write_push(parser.arg1()?, parser.arg2()?, line)?,
            CommandType::Pop => writer.write_pop(parser.arg1()?, parser.arg2()?, line)?,
            CommandType::Label => writer.write_label(parser.arg1()?)?,
            CommandType::Goto => writer.write_goto(parser.arg1()?)?,
            CommandType::If => writer.write_if(parser.arg1()?)?,
            CommandType::Function => writer.write_function(parser.arg1()?, parser.arg2()?)?,
            CommandType::Call => writer.write_call(parser.arg1()?, parser.arg2()?)?,
            CommandType::Return => writer.write_return()?,
        }
    }

    Ok(())
}

/// Translates in-memory `(unit, source)` pairs into one assembly stream.
///
/// `name` is the output name, used for bootstrap-time labels. Units are
/// translated in the order given; the bootstrap is emitted once, first.
pub fn translate_units<W: Write>(
    units: &[(String, String)],
    name: &str,
    out: W,
) -> Result<(), TranslateError> {
    let mut writer = CodeWriter::new(out, name);
    writer.write_init()?;

    for (unit, source) in units {
        writer.set_file_name(unit);
        let mut parser = Parser::from_source(source);
        translate_unit(&mut parser, &mut writer)?;
    }

    writer.close()
}

/// Translates a `.vm` file or a directory of `.vm` files.
///
/// A file `foo.vm` becomes a sibling `foo.asm`; a directory `Dir`
/// becomes `Dir/Dir.asm` covering every `.vm` file inside, in sorted
/// order. Returns the output path.
pub fn translate_path(input: &Path) -> Result<PathBuf, TranslateError> {
    let (vm_files, asm_path) = collect_inputs(input)?;

    let name = asm_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("Out")
        .to_string();

    let output = fs::File::create(&asm_path)?;
    let mut writer = CodeWriter::new(BufWriter::with_capacity(8192, output), &name);
    writer.write_init()?;

    for vm_file in &vm_files {
        writer.set_file_name(&vm_file.to_string_lossy());
        let mut parser = Parser::new(vm_file)?;
        translate_unit(&mut parser, &mut writer)?;
    }

    writer.close()?;
    Ok(asm_path)
}

/// Expands the input path into the `.vm` file list and the output path.
fn collect_inputs(input: &Path) -> Result<(Vec<PathBuf>, PathBuf), TranslateError> {
    if input.is_dir() {
        let mut vm_files: Vec<PathBuf> = fs::read_dir(input)?
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("vm"))
            .collect();
        vm_files.sort();

        let dir_name = input
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("Out")
            .to_string();
        let asm_path = input.join(format!("{dir_name}.asm"));
        Ok((vm_files, asm_path))
    } else {
        let asm_path = input.with_extension("asm");
        Ok((vec![input.to_path_buf()], asm_path))
    }
}
