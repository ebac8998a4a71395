pub mod commands;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "stall-cli")]
#[command(about = "Ten stages of waiting before the redirect you asked for")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the stall sequence in the terminal (default)
    Run(RunArgs),
    /// Print the stage table and exit
    Stages,
}

#[derive(Args, Default)]
pub struct RunArgs {
    /// Destination URL to open once the sequence completes
    #[arg(long)]
    pub url: Option<String>,
    /// Milliseconds per engine tick; the stages are calibrated for 1000
    #[arg(long)]
    pub tick_millis: Option<u64>,
}
