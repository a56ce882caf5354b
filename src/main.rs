//! doclint - A linter for Markdown documentation trees
//!
//! doclint provides:
//! - Block extraction (headings, code fences, links, tables)
//! - Code fence validation (language tags, emptiness, bracket balance)
//! - Cross-reference resolution against a run-wide anchor index
//! - Aggregated text/JSON reports with CI-friendly exit codes

use clap::Parser;
use std::process::ExitCode;

mod anchors;
mod backends;
mod cli;
mod core;
mod fences;
mod flows;
mod markdown;

fn main() -> ExitCode {
    let cli = cli::Cli::parse();
    cli::init_logging(&cli);

    match cli::run(cli) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::from(2)
        }
    }
}
