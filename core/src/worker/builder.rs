//! Builder pattern for Worker construction

use crate::error::{LoadError, Result};
use crate::executor::RequestExecutor;
use crate::target::WorkerLane;

use super::executor::Worker;

use std::sync::Arc;
use std::time::Duration;

/// Builder for creating Worker instances
///
/// # Example
/// ```ignore
/// let worker = WorkerBuilder::new(lane)
///     .executor(executor)
///     .interval(config.lane_interval())
///     .build()?;
/// ```
pub struct WorkerBuilder {
    lane: WorkerLane,
    executor: Option<Arc<RequestExecutor>>,
    interval: Option<Duration>,
}

impl WorkerBuilder {
    /// Create a new builder for the given lane
    pub fn new(lane: WorkerLane) -> Self {
        Self {
            lane,
            executor: None,
            interval: None,
        }
    }

    /// Set the shared request executor
    pub fn executor(mut self, executor: Arc<RequestExecutor>) -> Self {
        self.executor = Some(executor);
        self
    }

    /// Set the tick interval
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }

    /// Build the Worker
    ///
    /// # Errors
    /// Returns an error if the executor or interval is missing, or if the
    /// interval is zero.
    pub fn build(self) -> Result<Worker> {
        let executor = self
            .executor
            .ok_or(LoadError::missing_config("executor"))?;
        let interval = self
            .interval
            .ok_or(LoadError::missing_config("interval"))?;
        if interval.is_zero() {
            return Err(LoadError::Worker("interval must be non-zero".to_string()));
        }

        Ok(Worker::new(self.lane, executor, interval))
    }
}
