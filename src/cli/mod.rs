//! CLI argument parsing and command handling

use std::net::{Ipv4Addr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use loadgen_core::{LoadConfig, LoadGeneratorBuilder, PrometheusMetrics};
use loadgen_telemetry::{MetricsServer, TracingLogger, TracingTracer};
use loadgen_transport::ReqwestTransport;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// quotes-loadgen - HTTP load generator
#[derive(Parser, Debug)]
#[command(name = "quotes-loadgen")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Fire GET requests at a fixed rate against a list of URLs
    Load(LoadArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LoadArgs {
    /// URL paths to load; full URLs when --hostname is empty (repeatable, comma-separated)
    #[arg(short, long = "url", env = "LOADGEN_URLS", value_delimiter = ',')]
    pub urls: Vec<String>,

    /// Host (and port) prefixed to every path
    #[arg(long, env = "LOADGEN_HOSTNAME", default_value = "localhost:3000")]
    pub hostname: String,

    /// Protocol to use (http or https)
    #[arg(long, env = "LOADGEN_PROTOCOL", default_value = "http")]
    pub protocol: String,

    /// Requests per second, per URL
    #[arg(long, env = "LOADGEN_RPS", default_value_t = 10, allow_negative_numbers = true)]
    pub rps: i64,

    /// Test duration, e.g. "30s", "5m" or bare seconds; 0 runs until interrupted
    #[arg(long, env = "LOADGEN_DURATION", default_value = "10s", value_parser = parse_duration)]
    pub duration: Duration,

    /// Serve Prometheus metrics
    #[arg(long, env = "LOADGEN_METRICS")]
    pub metrics: bool,

    /// Port for the metrics endpoint
    #[arg(long, env = "LOADGEN_METRICS_PORT", default_value_t = 8080)]
    pub metrics_port: u16,
}

/// Parse a duration given as bare seconds or in humantime notation
fn parse_duration(value: &str) -> std::result::Result<Duration, String> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime::parse_duration(value).map_err(|e| format!("invalid duration '{}': {}", value, e))
}

impl Cli {
    /// Dispatch the selected subcommand
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Load(args) => args.run().await,
        }
    }
}

impl LoadArgs {
    /// Build the load configuration; URLs are trimmed and blanks dropped
    ///
    /// Hostname and protocol are passed through as given.
    pub fn to_config(&self) -> LoadConfig {
        let mut config = LoadConfig::new(
            self.urls
                .iter()
                .map(|url| url.trim())
                .filter(|url| !url.is_empty()),
        )
        .with_hostname(self.hostname.as_str())
        .with_protocol(self.protocol.as_str())
        .with_requests_per_second(self.rps)
        .with_duration(self.duration);

        if self.metrics {
            config = config.with_metrics(self.metrics_port);
        }
        config
    }

    /// Run the load test
    pub async fn run(&self) -> Result<()> {
        let config = self.to_config();
        config.validate().context("invalid configuration")?;

        let metrics = PrometheusMetrics::new().context("failed to register metrics")?;
        let server = if config.metrics_enabled {
            let addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, config.metrics_port));
            Some(spawn_metrics_server(addr, metrics.clone()).await?)
        } else {
            None
        };

        let transport = ReqwestTransport::new().context("failed to create HTTP client")?;
        let generator = LoadGeneratorBuilder::new()
            .config(config)
            .transport(Arc::new(transport))
            .logger(Arc::new(TracingLogger::new()))
            .tracer(Arc::new(TracingTracer::from_env()))
            .metrics(Arc::new(metrics))
            .build()?;

        let result = generator.run_with_signal_handling().await;

        if let Some(server) = server {
            server.stop().await?;
        }

        match result {
            Ok(summary) => {
                tracing::debug!(?summary, "Run summary");
                Ok(())
            }
            Err(e) if e.is_cancelled() => {
                tracing::info!("Load test interrupted");
                Ok(())
            }
            Err(e) => Err(e).context("load test failed"),
        }
    }
}

/// A metrics server running in the background
struct RunningServer {
    stop_tx: oneshot::Sender<()>,
    handle: JoinHandle<Result<()>>,
}

impl RunningServer {
    async fn stop(self) -> Result<()> {
        // The server may already have exited on its own.
        let _ = self.stop_tx.send(());
        self.handle.await.context("metrics server task panicked")?
    }
}

async fn spawn_metrics_server(addr: SocketAddr, metrics: PrometheusMetrics) -> Result<RunningServer> {
    let server = MetricsServer::bind(addr, metrics).await?;
    let (stop_tx, stop_rx) = oneshot::channel::<()>();
    let handle = tokio::spawn(server.serve(async move {
        let _ = stop_rx.await;
    }));
    Ok(RunningServer { stop_tx, handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadgen_core::{ConfigError, RunMode};

    fn load_args(args: &[&str]) -> LoadArgs {
        let argv = ["quotes-loadgen", "load"].iter().chain(args.iter());
        match Cli::try_parse_from(argv).expect("valid arguments").command {
            Commands::Load(args) => args,
        }
    }

    #[test]
    fn test_defaults() {
        let args = load_args(&["--url", "/api/quotes"]);
        let config = args.to_config();

        assert_eq!(config.urls, vec!["/api/quotes".to_string()]);
        assert_eq!(config.hostname, "localhost:3000");
        assert_eq!(config.protocol, "http");
        assert_eq!(config.requests_per_second, 10);
        assert_eq!(config.duration, Duration::from_secs(10));
        assert!(!config.metrics_enabled);
        assert_eq!(args.metrics_port, 8080);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_urls_split_trimmed_and_repeated() {
        let args = load_args(&["--url", "/a, /b,,", "-u", " /c "]);

        assert_eq!(
            args.to_config().urls,
            vec!["/a".to_string(), "/b".to_string(), "/c".to_string()]
        );
    }

    #[test]
    fn test_no_urls_is_invalid() {
        let config = load_args(&[]).to_config();
        assert_eq!(config.validate(), Err(ConfigError::NoUrls));
    }

    #[test]
    fn test_negative_rps_reaches_validation() {
        let config = load_args(&["--url", "/a", "--rps", "-5"]).to_config();
        assert_eq!(config.validate(), Err(ConfigError::InvalidRps(-5)));
    }

    #[test]
    fn test_protocol_and_hostname() {
        let config = load_args(&[
            "--url",
            "/quotes",
            "--hostname",
            "quotes.internal:8443",
            "--protocol",
            "https",
        ])
        .to_config();

        assert_eq!(config.hostname, "quotes.internal:8443");
        assert_eq!(config.protocol, "https");
    }

    #[test]
    fn test_protocol_not_trimmed() {
        let config = load_args(&["--url", "/a", "--protocol", "https "]).to_config();

        assert_eq!(config.protocol, "https ");
        assert!(matches!(config.validate(), Err(ConfigError::InvalidProtocol(_))));
    }

    #[test]
    fn test_hostname_not_trimmed() {
        let config = load_args(&["--url", "/a", "--hostname", " h:80"]).to_config();
        assert_eq!(config.hostname, " h:80");
    }

    #[test]
    fn test_duration_formats() {
        assert_eq!(
            load_args(&["--duration", "30"]).duration,
            Duration::from_secs(30)
        );
        assert_eq!(
            load_args(&["--duration", "1m30s"]).duration,
            Duration::from_secs(90)
        );
        assert_eq!(
            load_args(&["--duration", "250ms"]).duration,
            Duration::from_millis(250)
        );

        let indefinite = load_args(&["--url", "/a", "--duration", "0"]).to_config();
        assert_eq!(indefinite.mode(), RunMode::Indefinite);
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let result = Cli::try_parse_from(["quotes-loadgen", "load", "--duration", "soon"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_metrics_flags() {
        let config = load_args(&["--url", "/a", "--metrics", "--metrics-port", "9100"]).to_config();

        assert!(config.metrics_enabled);
        assert_eq!(config.metrics_port, 9100);
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Cli::try_parse_from(["quotes-loadgen"]).is_err());
    }

    #[test]
    fn test_parse_duration() {
        assert_eq!(parse_duration(" 5 "), Ok(Duration::from_secs(5)));
        assert_eq!(parse_duration("2h"), Ok(Duration::from_secs(7200)));
        assert!(parse_duration("-1").is_err());
    }
}
