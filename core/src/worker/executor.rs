//! Worker execution loop

use crate::executor::RequestExecutor;
use crate::target::WorkerLane;

use super::stats::WorkerStats;
use super::ticker::LaneTicker;

use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Worker runs one lane: tick -> execute -> record -> repeat
///
/// Workers are tokio tasks managed by the
/// [`LoadGenerator`](crate::LoadGenerator). At most one request is in flight
/// per worker.
pub struct Worker {
    /// Target and lane index
    lane: WorkerLane,

    /// Request executor (shared across workers via Arc)
    executor: Arc<RequestExecutor>,

    /// Tick period
    interval: Duration,
}

impl Worker {
    /// Create a new worker
    pub fn new(lane: WorkerLane, executor: Arc<RequestExecutor>, interval: Duration) -> Self {
        Self {
            lane,
            executor,
            interval,
        }
    }

    /// Run the lane until `cancel` fires
    ///
    /// Cancellation is observed between ticks and while a request is in
    /// flight, so the worker stops within one tick interval and never starts
    /// another request once cancelled.
    pub async fn run(self, cancel: CancellationToken) -> WorkerStats {
        let mut stats = WorkerStats::new();
        stats.start();

        let mut ticker = LaneTicker::new(self.interval);

        tracing::debug!(
            target_url = %self.lane.target,
            lane = self.lane.lane_index,
            interval_ms = self.interval.as_secs_f64() * 1000.0,
            "Worker started"
        );

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    tracing::debug!(
                        target_url = %self.lane.target,
                        lane = self.lane.lane_index,
                        "Worker received shutdown signal"
                    );
                    break;
                }

                _ = ticker.tick() => {
                    let outcome = self.executor.execute(&self.lane.target, &cancel).await;
                    stats.record(&outcome);
                }
            }
        }

        stats.stop();
        tracing::debug!(
            target_url = %self.lane.target,
            lane = self.lane.lane_index,
            responses = stats.responses,
            transport_errors = stats.transport_errors,
            elapsed_ms = ?stats.elapsed().map(|d| d.as_millis()),
            "Worker finished"
        );

        stats
    }

    /// The lane this worker drives
    pub fn lane(&self) -> &WorkerLane {
        &self.lane
    }

    /// The tick period
    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl std::fmt::Debug for Worker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Worker")
            .field("lane", &self.lane)
            .field("interval", &self.interval)
            .finish()
    }
}
