//! Periodic tick source for a lane

use std::time::Duration;

use tokio::time::{interval, Interval, MissedTickBehavior};

/// Fixed-period ticker that drops missed ticks instead of queueing them
///
/// The first tick completes immediately. If a tick is missed because the
/// previous request was still outstanding, the next call to [`tick`] fires
/// once right away and the schedule then resumes on the original cadence.
///
/// [`tick`]: LaneTicker::tick
pub struct LaneTicker {
    interval: Interval,
    period: Duration,
}

impl LaneTicker {
    /// Create a ticker with the given period
    ///
    /// Must be called from within a tokio runtime. A zero period is bumped
    /// to one nanosecond.
    pub fn new(period: Duration) -> Self {
        let period = period.max(Duration::from_nanos(1));
        let mut interval = interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { interval, period }
    }

    /// Wait for the next tick
    pub async fn tick(&mut self) {
        self.interval.tick().await;
    }

    /// The configured period
    pub fn period(&self) -> Duration {
        self.period
    }
}

impl std::fmt::Debug for LaneTicker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LaneTicker")
            .field("period", &self.period)
            .finish()
    }
}
