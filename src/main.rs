//! sessionc CLI — compile a training-session script and print the two
//! generated watch programs.

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use sessionc::Compiler;

#[derive(Parser)]
#[command(version, about = "Compile a training-session script into Suunto watch-app code")]
struct Cli {
    /// Path to the session script
    script: PathBuf,
}

fn main() {
    let cli = Cli::parse();

    let source = match fs::read_to_string(&cli.script) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("failed to read {}: {e}", cli.script.display());
            process::exit(1);
        }
    };

    let compiled = match Compiler::compile(&source) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    for diagnostic in &compiled.diagnostics {
        eprintln!("{diagnostic}");
    }

    print!("{}", compiled.render());
}
