//! Jack compiler: high-level `.jack` classes to stack-machine `.vm`
//! code.
//!
//! # Architecture
//!
//! - [`tokenizer`]: single-pass character scanner producing the token
//!   stream
//! - [`parser`]: recursive descent building the [`ast`] tree
//! - [`symbol_table`]: class/subroutine scopes for identifier resolution
//! - [`codegen`]: post-order tree traversal emitting through
//!   [`vm_writer`]
//! - [`error`]: the crate-wide [`CompileError`]
//!
//! # Example
//!
//! ```rust
//! use jack_compiler::compile_source;
//!
//! let vm = compile_source("class Main { function void main() { return; } }").unwrap();
//! assert!(vm.starts_with("function Main.main 0\n"));
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation
)]

pub mod ast;
pub mod codegen;
pub mod error;
pub mod parser;
pub mod symbol_table;
pub mod tokenizer;
pub mod vm_writer;

pub use error::CompileError;
pub use parser::Parser;
pub use symbol_table::{JackSymbol, SymbolKind, SymbolTable};
pub use tokenizer::{JackTokenizer, Keyword, Token};
pub use vm_writer::{Segment, VmOp, VmWriter};

use std::fs;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Compiles one class from source text to VM code.
pub fn compile_source(source: &str) -> Result<String, CompileError> {
    let tokens = JackTokenizer::new(source)?.into_tokens();
    let class = Parser::new(tokens).parse_class()?;
    let out = codegen::generate(&class, Vec::new())?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

/// Compiles `Foo.jack` into a sibling `Foo.vm`; returns the output path.
pub fn compile_file(path: &Path) -> Result<PathBuf, CompileError> {
    let source = fs::read_to_string(path)?;
    let tokens = JackTokenizer::new(&source)?.into_tokens();
    let class = Parser::new(tokens).parse_class()?;

    let vm_path = path.with_extension("vm");
    let output = fs::File::create(&vm_path)?;
    codegen::generate(&class, BufWriter::new(output))?;
    Ok(vm_path)
}

/// Compiles every `.jack` file in a directory, in sorted order, halting
/// on the first failure. Returns the written `.vm` paths.
pub fn compile_directory(dir: &Path) -> Result<Vec<PathBuf>, CompileError> {
    let mut jack_files: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|e| e.path())
        .filter(|p| p.extension().and_then(|s| s.to_str()) == Some("jack"))
        .collect();
    jack_files.sort();

    let mut outputs = Vec::with_capacity(jack_files.len());
    for jack_file in &jack_files {
        outputs.push(compile_file(jack_file)?);
    }
    Ok(outputs)
}

/// Compiles a `.jack` file or a directory of them.
pub fn compile_path(input: &Path) -> Result<Vec<PathBuf>, CompileError> {
    if input.is_dir() {
        compile_directory(input)
    } else {
        Ok(vec![compile_file(input)?])
    }
}
