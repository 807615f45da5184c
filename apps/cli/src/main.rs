//! Rinku CLI — run declarative function-chaining pipelines.
//!
//! Loads a pipeline definition, resolves every step against the standard
//! operation registry, and prints the final result or the halting failure.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli)
}
