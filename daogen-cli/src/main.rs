//! daogen CLI tool

use anyhow::Result;
use clap::Parser;
use daogen_cli::{Cli, GenerateCommand};

#[tokio::main]
async fn main() -> Result<()> {
    daogen::observability::init();

    let cli = Cli::parse();
    GenerateCommand::from_cli(&cli).execute().await
}
