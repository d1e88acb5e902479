//! Worker statistics tracking

use std::time::Instant;

use crate::request::{OutcomeKind, RequestOutcome};

/// Statistics tracked by each lane
#[derive(Debug, Default, Clone)]
pub struct WorkerStats {
    /// Attempts that produced an HTTP response (any status)
    pub responses: usize,

    /// Responses with a 4xx or 5xx status
    pub error_responses: usize,

    /// Attempts that failed in the transport
    pub transport_errors: usize,

    /// Attempts whose request could not be built
    pub invalid_requests: usize,

    /// Attempts abandoned because the run was cancelled
    pub cancelled: usize,

    /// Worker start time
    pub started_at: Option<Instant>,

    /// Worker end time
    pub ended_at: Option<Instant>,
}

impl WorkerStats {
    /// Create new empty stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking (records start time)
    pub fn start(&mut self) {
        self.started_at = Some(Instant::now());
    }

    /// Stop tracking (records end time)
    pub fn stop(&mut self) {
        self.ended_at = Some(Instant::now());
    }

    /// Record the outcome of one attempt
    pub fn record(&mut self, outcome: &RequestOutcome) {
        match outcome.kind {
            OutcomeKind::Response { status } => {
                self.responses += 1;
                if status >= 400 {
                    self.error_responses += 1;
                }
            }
            OutcomeKind::TransportError(_) => self.transport_errors += 1,
            OutcomeKind::InvalidRequest(_) => self.invalid_requests += 1,
            OutcomeKind::Cancelled => self.cancelled += 1,
        }
    }

    /// Attempts that reached the transport and finished
    pub fn total_requests(&self) -> usize {
        self.responses + self.transport_errors
    }

    /// Get elapsed time since start
    pub fn elapsed(&self) -> Option<std::time::Duration> {
        self.started_at.map(|start| {
            self.ended_at
                .map(|end| end.duration_since(start))
                .unwrap_or_else(|| start.elapsed())
        })
    }

    /// Merge stats from another lane
    pub fn merge(&mut self, other: &WorkerStats) {
        self.responses += other.responses;
        self.error_responses += other.error_responses;
        self.transport_errors += other.transport_errors;
        self.invalid_requests += other.invalid_requests;
        self.cancelled += other.cancelled;
    }
}
