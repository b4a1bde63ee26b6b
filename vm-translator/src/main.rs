//! VM translator entry point.
//!
//! # Usage
//! ```bash
//! hack-vm-translator <input.vm | directory>
//! ```

#![warn(clippy::all, clippy::pedantic)]

use std::env;
use std::path::Path;
use std::process;

use hack_vm_translator::translate_path;

fn main() {
    let args: Vec<String> = env::args().collect();

    if args.len() != 2 {
        eprintln!("Usage: {} <input.vm | directory>", args[0]);
        process::exit(1);
    }

    let input = Path::new(&args[1]);

    match translate_path(input) {
        Ok(output) => {
            println!(
                "Translation complete: {} -> {}",
                input.display(),
                output.display()
            );
        }
        Err(e) => {
            eprintln!("vm-translator: {}: {e}", input.display());
            process::exit(1);
        }
    }
}
