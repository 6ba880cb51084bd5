//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

use streetscape_cli::CliError;

fn main() {
    match streetscape_cli::run() {
        Ok(()) => {}
        Err(CliError::ArgumentParsing(err)) => err.exit(),
        Err(err) => {
            eprintln!("streetscape: {err}");
            std::process::exit(1);
        }
    }
}
