//! Chronicle CLI: structured biographies of historical figures.
//!
//! Resolves a free-text name against the encyclopedia, then prints the
//! assembled record as a summary or as JSON.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
