//! # trajgen
//!
//! Entry point for the trajectory dataset generator.
//!
//! `trajgen collect` runs randomized episodes of the slide-joint maze on a
//! pool of worker threads and appends one comma-separated trajectory per line
//! to the output file. `trajgen split` and `trajgen combine` prepare finished
//! logs for training. Set `RUST_LOG` to change the log level.

mod app;
mod cli;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = cli::Cli::parse();
    app::run(cli)
}
