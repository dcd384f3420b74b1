//! nbpress CLI: render a Jupyter notebook to PDF without its code.
//!
//! Strips code-cell sources, keeps markdown and outputs, and hands the
//! result to nbconvert and a headless browser.

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
