//! Dupelink CLI: hardlink files shared with a reference tree; use --dry-run to only report.

use clap::Parser;
use dupelink::engine::arg_parser::Cli;
use dupelink::engine::handle_run;
use std::process::ExitCode;
use std::time::Instant;

fn main() -> ExitCode {
    let start_time = Instant::now();
    let cli = Cli::parse();
    // handle_run has already logged every error.
    let code = match handle_run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(_) => ExitCode::FAILURE,
    };
    log::debug!("Total time: {:?}", start_time.elapsed());
    code
}
