//! LoadGenerator execution logic

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::{LoadConfig, RunMode};
use crate::error::{LoadError, Result};
use crate::executor::RequestExecutor;
use crate::target::{expand_lanes, resolve_targets, WorkerLane};
use crate::traits::{LogField, Logger};
use crate::worker::{Worker, WorkerBuilder, WorkerStats};

use super::aggregator::{aggregate_worker_stats, RunSummary};

/// Lifecycle of a [`LoadGenerator`]
///
/// `Idle -> Validating -> Running -> Draining -> Done`, with `Failed`
/// reachable from validation or from an early cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Built, not yet run
    Idle,
    /// Checking the configuration
    Validating,
    /// Lanes are issuing requests
    Running,
    /// Lanes have been told to stop and are being joined
    Draining,
    /// The run reached its deadline
    Done,
    /// Validation failed or the run was cancelled
    Failed,
}

impl RunState {
    /// Whether the generator will not change state again
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// How the wait for the end of a run finished
enum StopReason {
    Deadline,
    Cancelled,
}

/// LoadGenerator manages the load test lifecycle
///
/// Responsible for spawning lanes, coordinating shutdown and collecting
/// results. A generator runs at most once.
pub struct LoadGenerator {
    /// Load configuration, immutable for the lifetime of the run
    pub(crate) config: LoadConfig,

    /// Request executor (shared across lanes)
    pub(crate) executor: Arc<RequestExecutor>,

    /// Logger for run lifecycle events
    pub(crate) logger: Arc<dyn Logger>,

    /// Current lifecycle state
    pub(crate) state: watch::Sender<RunState>,
}

impl LoadGenerator {
    /// Create a new load generator
    ///
    /// Use `LoadGeneratorBuilder` for a more ergonomic construction.
    pub fn new(config: LoadConfig, executor: Arc<RequestExecutor>, logger: Arc<dyn Logger>) -> Self {
        let (state, _) = watch::channel(RunState::Idle);
        Self {
            config,
            executor,
            logger,
            state,
        }
    }

    /// Get the load configuration
    pub fn config(&self) -> &LoadConfig {
        &self.config
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        *self.state.borrow()
    }

    /// Watch lifecycle transitions
    pub fn subscribe_state(&self) -> watch::Receiver<RunState> {
        self.state.subscribe()
    }

    /// The lanes a run of this configuration would start
    pub fn lanes(&self) -> Result<Vec<WorkerLane>> {
        let targets = resolve_targets(&self.config);
        expand_lanes(&targets, self.config.lanes_per_target())
    }

    fn set_state(&self, state: RunState) {
        self.state.send_replace(state);
    }

    /// Run the load test
    ///
    /// Returns the run summary when the configured duration elapses. An
    /// indefinite run only ends through `cancel`, and any cancellation by the
    /// caller yields [`LoadError::Cancelled`] once every lane has been joined.
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunSummary> {
        let claimed = self.state.send_if_modified(|state| {
            if *state == RunState::Idle {
                *state = RunState::Validating;
                true
            } else {
                false
            }
        });
        if !claimed {
            return Err(LoadError::AlreadyStarted);
        }

        if let Err(e) = self.config.validate() {
            tracing::debug!(error = %e, "Configuration rejected");
            self.set_state(RunState::Failed);
            return Err(e.into());
        }

        let start = Instant::now();
        let targets = resolve_targets(&self.config);
        let workers = match self.build_workers(&targets) {
            Ok(workers) => workers,
            Err(e) => {
                self.set_state(RunState::Failed);
                return Err(e);
            }
        };

        self.log_start(&targets);

        let lanes_token = cancel.child_token();
        let handles: Vec<(WorkerLane, JoinHandle<WorkerStats>)> = workers
            .into_iter()
            .map(|worker| {
                let lane = worker.lane().clone();
                let token = lanes_token.clone();
                (lane, tokio::spawn(worker.run(token)))
            })
            .collect();
        self.set_state(RunState::Running);

        let reason = match self.config.mode() {
            RunMode::Timed(duration) => {
                let deadline = start + duration;
                tokio::select! {
                    biased;

                    _ = cancel.cancelled() => StopReason::Cancelled,
                    _ = tokio::time::sleep_until(deadline) => StopReason::Deadline,
                }
            }
            RunMode::Indefinite => {
                cancel.cancelled().await;
                StopReason::Cancelled
            }
        };

        self.set_state(RunState::Draining);
        lanes_token.cancel();
        let results = join_lanes(handles).await;
        let summary = aggregate_worker_stats(&results, start.elapsed());

        match reason {
            StopReason::Deadline => {
                self.logger
                    .info("Load test completed", &summary_fields(&summary));
                self.set_state(RunState::Done);
                Ok(summary)
            }
            StopReason::Cancelled => {
                self.logger.info("Load test stopped", &summary_fields(&summary));
                self.set_state(RunState::Failed);
                Err(LoadError::Cancelled)
            }
        }
    }

    /// Run with Ctrl+C signal handling
    ///
    /// Ctrl+C cancels the run, which then ends with [`LoadError::Cancelled`].
    pub async fn run_with_signal_handling(&self) -> Result<RunSummary> {
        let cancel = CancellationToken::new();
        let signal_token = cancel.clone();

        let signal_handle = tokio::spawn(async move {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    tracing::info!("Received Ctrl+C, initiating graceful shutdown...");
                    signal_token.cancel();
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                }
            }
        });

        let result = self.run(cancel).await;
        signal_handle.abort();

        result
    }

    /// Run with a timeout
    ///
    /// The timeout cancels the run like a caller would, so a timeout shorter
    /// than the configured duration ends with [`LoadError::Cancelled`].
    pub async fn run_with_timeout(&self, timeout: Duration) -> Result<RunSummary> {
        let cancel = CancellationToken::new();
        let timeout_token = cancel.clone();

        let timeout_handle = tokio::spawn(async move {
            tokio::time::sleep(timeout).await;
            tracing::info!("Timeout reached, initiating shutdown...");
            timeout_token.cancel();
        });

        let result = self.run(cancel).await;
        timeout_handle.abort();

        result
    }

    fn build_workers(&self, targets: &[String]) -> Result<Vec<Worker>> {
        let interval = self.config.lane_interval();
        expand_lanes(targets, self.config.lanes_per_target())?
            .into_iter()
            .map(|lane| {
                WorkerBuilder::new(lane)
                    .executor(Arc::clone(&self.executor))
                    .interval(interval)
                    .build()
            })
            .collect()
    }

    fn log_start(&self, targets: &[String]) {
        let mut fields = vec![
            LogField::new("rps", self.config.requests_per_second),
            LogField::new("urls", targets.to_vec()),
            LogField::new("hostname", self.config.hostname.clone()),
            LogField::new("protocol", self.config.protocol.clone()),
        ];

        match self.config.mode() {
            RunMode::Indefinite => {
                self.logger.info("Running load test indefinitely", &fields);
            }
            RunMode::Timed(duration) => {
                fields.insert(0, LogField::new("duration_seconds", duration.as_secs_f64()));
                self.logger.info("Starting load test", &fields);
            }
        }
    }
}

async fn join_lanes(handles: Vec<(WorkerLane, JoinHandle<WorkerStats>)>) -> Vec<WorkerStats> {
    let mut results = Vec::with_capacity(handles.len());
    for (lane, handle) in handles {
        match handle.await {
            Ok(stats) => {
                tracing::debug!(
                    lane = %lane,
                    responses = stats.responses,
                    transport_errors = stats.transport_errors,
                    "Worker completed"
                );
                results.push(stats);
            }
            Err(e) => {
                // Continue collecting other lanes
                tracing::error!(lane = %lane, error = %e, "Worker task panicked");
            }
        }
    }
    results
}

fn summary_fields(summary: &RunSummary) -> [LogField; 6] {
    [
        LogField::new("lanes", summary.total_lanes),
        LogField::new("requests", summary.total_requests()),
        LogField::new("transport_errors", summary.transport_errors),
        LogField::new("cancelled", summary.cancelled),
        LogField::new("elapsed_seconds", summary.elapsed.as_secs_f64()),
        LogField::new("requests_per_second", summary.requests_per_second),
    ]
}

impl std::fmt::Debug for LoadGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadGenerator")
            .field("config", &self.config)
            .field("state", &self.state())
            .finish()
    }
}
