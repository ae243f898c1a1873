//! Parlor CLI binary entry point.
//!
//! Initializes the tracing subscriber, parses command-line arguments with
//! clap, and dispatches to the selected subcommand via [`Cli::run`].

mod cli;
mod logging;

use anyhow::Result;
use clap::Parser;

use crate::cli::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let (work_dir, slug) = cli.log_context();

    // Held until exit so buffered file logs are flushed.
    let _guard = logging::init_tracing(&work_dir, slug.as_deref())?;

    cli.run()
}
