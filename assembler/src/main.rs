//! Hack assembler entry point.
//!
//! Two-pass assembly of `.asm` into `.hack`:
//! - Pass 1 records label positions
//! - Pass 2 encodes instructions, resolving all symbols
//!
//! Files whose stem ends in `L` follow the course convention of carrying
//! no labels or variables and take the single-pass path; the output is
//! identical either way.
//!
//! # Usage
//! ```bash
//! hack-assembler <input.asm> [output.hack]
//! ```

#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

use std::env;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::process;

use hack_assembler::{assemble, assemble_symbolless, AsmError};

/// Reads the assembly file into memory.
fn read_lines(path: &str) -> Result<Vec<String>, AsmError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    reader
        .lines()
        .collect::<std::io::Result<Vec<_>>>()
        .map_err(Into::into)
}

/// Determines the output file path.
fn output_path(input: &str, explicit_output: Option<&str>) -> String {
    explicit_output.map_or_else(
        || input.replace(".asm", ".hack"),
        std::string::ToString::to_string,
    )
}

/// Course convention: a stem ending in `L` marks a symbol-free listing.
fn is_symbolless(input: &str) -> bool {
    Path::new(input)
        .file_stem()
        .and_then(|s| s.to_str())
        .is_some_and(|stem| stem.ends_with('L'))
}

fn run(input_path: &str, output: &str) -> Result<(), AsmError> {
    let lines = read_lines(input_path)?;

    let instructions = if is_symbolless(input_path) {
        assemble_symbolless(&lines)?
    } else {
        assemble(&lines)?
    };

    let output_file = File::create(output)?;
    let mut writer = BufWriter::new(output_file);
    for instruction in &instructions {
        writeln!(writer, "{instruction}")?;
    }
    writer.flush()?;
    Ok(())
}

fn main() {
    let args: Vec<String> = env::args().collect();

    if !(2..=3).contains(&args.len()) {
        eprintln!("Usage: {} <input.asm> [output.hack]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  {} Add.asm", args[0]);
        eprintln!("  {} Add.asm Add.hack", args[0]);
        process::exit(1);
    }

    let input_path = &args[1];
    let output = output_path(input_path, args.get(2).map(String::as_str));

    if let Err(e) = run(input_path, &output) {
        eprintln!("assembler: {input_path}: {e}");
        process::exit(1);
    }

    println!("Assembly completed. Output written to {output}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_generation() {
        assert_eq!(output_path("test.asm", None), "test.hack");
        assert_eq!(output_path("test.asm", Some("custom.hack")), "custom.hack");
        assert_eq!(output_path("dir/file.asm", None), "dir/file.hack");
    }

    #[test]
    fn test_symbolless_convention() {
        assert!(is_symbolless("PongL.asm"));
        assert!(is_symbolless("path/to/MaxL.asm"));
        assert!(!is_symbolless("Pong.asm"));
        assert!(!is_symbolless("Max.asm"));
    }
}
