//! Global `tracing` subscriber setup

use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Install the process-wide subscriber
///
/// Events are written to stdout as JSON lines. The level defaults to `info`
/// and is overridden by `RUST_LOG`; at `debug` span closings are logged too,
/// with their timings.
pub fn init_subscriber() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_target(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
