mod cli;
mod config;
mod display;
mod error;
mod event;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    cli::util::init_tracing(cli.log_level.as_deref(), cli.log_file.as_deref())?;

    match cli.command {
        Command::Replay(args) => cli::replay::run(args),
        Command::Frame(args) => cli::frame::run(args),
    }
}
