//! Command-line entry point for PIMForge co-design campaigns.

use anyhow::Result;
use clap::Parser;
use pimforge_campaign::cli::{run_cli, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();
    run_cli(cli)
}
