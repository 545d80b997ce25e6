//! # qnet
//!
//! Builds a seeded Q-network (or loads a saved one), evaluates the states
//! given with `--state` as a single batch and prints the Q-values as JSON.
//!
//! ```text
//! qnet --state-size 4 --action-size 2 --seed 0 --state 0.1,0.2,0.3,0.4
//! qnet --config net.json --save params.json
//! qnet --load params.json --state 1,0,0,0 --state 0,1,0,0
//! ```

mod app;

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "qnet", version, about = "Evaluate a seeded Q-network on environment states")]
pub struct Cli {
    /// JSON network config (`state_size`, `action_size`, `hidden_size`, `seed`).
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub state_size: Option<usize>,

    #[arg(long)]
    pub action_size: Option<usize>,

    /// Width of the hidden layer [default: 32]
    #[arg(long)]
    pub hidden_size: Option<usize>,

    /// Initialization seed [default: 0]
    #[arg(long)]
    pub seed: Option<u64>,

    /// Parameter snapshot written by `--save`; replaces all sizing flags.
    #[arg(
        long,
        conflicts_with_all = ["config", "state_size", "action_size", "hidden_size", "seed"]
    )]
    pub load: Option<PathBuf>,

    /// Write the network's parameters to this path.
    #[arg(long)]
    pub save: Option<PathBuf>,

    /// Comma-separated state values; repeat for a batch.
    #[arg(long = "state", value_parser = app::parse_state, allow_hyphen_values = true)]
    pub states: Vec<app::StateArg>,

    /// Log at debug level.
    #[arg(short, long)]
    pub verbose: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let evaluation = app::run(&cli)?;
    println!("{}", serde_json::to_string_pretty(&evaluation)?);
    Ok(())
}
