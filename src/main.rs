//! taskd - task tracking service
//!
//! Runs the HTTP API or edits the task store directly from the command line.

use clap::Parser;
use taskd::cli::Cli;
use taskd::output::{emit_error, infer_command_name_from_args};

fn main() {
    let command = infer_command_name_from_args();
    let cli = Cli::parse();
    let json = cli.json;
    if let Err(err) = cli.run() {
        let _ = emit_error(&command, &err, json);
        std::process::exit(err.exit_code());
    }
}
