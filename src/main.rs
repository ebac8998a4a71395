use anyhow::Result;
use clap::Parser;
use log::info;

use stall_cli::cli::commands::{run_command, stages_command};
use stall_cli::cli::{Cli, Commands, RunArgs};

fn main() -> Result<()> {
    // Log to a file (truncated each run); the TUI owns the terminal.
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .write(true)
        .truncate(true)
        .open("stall-cli.log")?;
    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();

    let cli = Cli::parse();
    info!("Starting stall-cli");

    match cli.command {
        Some(Commands::Run(args)) => run_command(args)?,
        Some(Commands::Stages) => stages_command()?,
        None => run_command(RunArgs::default())?,
    }

    Ok(())
}
