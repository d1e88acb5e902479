//! Result aggregation from multiple lanes

use std::time::Duration;

use serde::Serialize;

use crate::worker::WorkerStats;

/// Totals across every lane of a finished run
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RunSummary {
    /// Number of lanes that were joined
    pub total_lanes: usize,

    /// Attempts that produced an HTTP response
    pub responses: usize,

    /// Responses with a 4xx or 5xx status
    pub error_responses: usize,

    /// Attempts that failed in the transport
    pub transport_errors: usize,

    /// Attempts whose request could not be built
    pub invalid_requests: usize,

    /// Requests abandoned in flight at shutdown
    pub cancelled: usize,

    /// Wall-clock time from orchestration start to the last lane joined
    pub elapsed: Duration,

    /// Finished requests per second over `elapsed`
    pub requests_per_second: f64,
}

impl RunSummary {
    /// Attempts that reached the transport and finished
    pub fn total_requests(&self) -> usize {
        self.responses + self.transport_errors
    }

    /// Share of finished requests that got a 2xx/3xx response (0.0 - 1.0)
    pub fn success_rate(&self) -> f64 {
        let total = self.total_requests();
        if total > 0 {
            (self.responses - self.error_responses) as f64 / total as f64
        } else {
            0.0
        }
    }
}

/// Aggregate lane statistics over a run that lasted `elapsed`
pub fn aggregate_worker_stats(stats: &[WorkerStats], elapsed: Duration) -> RunSummary {
    let mut totals = WorkerStats::new();
    for lane in stats {
        totals.merge(lane);
    }

    let secs = elapsed.as_secs_f64();
    let requests_per_second = if secs > 0.0 {
        totals.total_requests() as f64 / secs
    } else {
        0.0
    };

    RunSummary {
        total_lanes: stats.len(),
        responses: totals.responses,
        error_responses: totals.error_responses,
        transport_errors: totals.transport_errors,
        invalid_requests: totals.invalid_requests,
        cancelled: totals.cancelled,
        elapsed,
        requests_per_second,
    }
}
