//! Credit Scoring - Main Entry Point
//!
//! Trains the credit score classifiers and scores new customers.

use clap::Parser;
use credit_scoring::cli::{cmd_run, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "credit_scoring=warn".into()),
        )
        .init();

    let cli = Cli::parse();
    cmd_run(&cli)?;

    Ok(())
}
