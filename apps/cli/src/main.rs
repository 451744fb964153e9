//! SheetWriter CLI — spreadsheet-driven research and article generation.
//!
//! Reads a prompt pair from a spreadsheet, researches and writes an article
//! with a language model, appends the result, and reports to a webhook.

mod commands;

use clap::Parser;
use color_eyre::eyre::Result;

use commands::Cli;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    commands::init_tracing(&cli);
    commands::run(cli).await
}
