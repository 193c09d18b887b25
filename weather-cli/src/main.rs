//! Binary crate for the `instant-weather` status block.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Terminal prompts for configuration
//! - Writing status lines for the host bar and reading its clicks

use clap::Parser;

mod cli;
mod input;
mod presenter;
mod prompt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    cmd.init_logging();
    cmd.run().await
}
