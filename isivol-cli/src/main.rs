mod cli;
mod commands;

use clap::Parser;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => commands::serve::execute(args, &cli.global).await,
        Command::Path(args) => commands::path::execute(args, &cli.global),
    }
}
