//! Jack compiler entry point.
//!
//! # Usage
//! ```bash
//! jack-compiler <Foo.jack | directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::path::Path;
use std::process;

use jack_compiler::compile_path;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <Foo.jack | directory>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);

    match compile_path(input) {
        Ok(outputs) => {
            for output in outputs {
                println!("Compiled: {}", output.display());
            }
        }
        Err(e) => {
            eprintln!("jack-compiler: {}: {e}", input.display());
            process::exit(1);
        }
    }
}
