//! Command implementations

mod inspect;
mod join;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;
use anyhow::Result;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);

    match cli.command {
        Commands::Join(args) => join::execute(args, &output),
        Commands::Inspect(args) => inspect::execute(args, &output),
    }
}
