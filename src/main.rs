//! quotes-loadgen - HTTP load generator
//!
//! Fires GET requests at a fixed rate against a list of URLs and reports
//! every request through logs, spans and Prometheus metrics.

use anyhow::Result;
use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    loadgen_telemetry::init_subscriber()?;

    // Parse CLI arguments
    let cli = cli::Cli::parse();

    cli.run().await
}
