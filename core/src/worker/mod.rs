//! Worker module: one rate-limited request loop per lane
//!
//! A Worker owns exactly one [`WorkerLane`](crate::WorkerLane) and runs the
//! loop **tick -> execute -> record -> repeat** until its cancellation token
//! fires. Workers share the [`RequestExecutor`](crate::RequestExecutor) (and
//! through it the transport, logger, tracer and metrics) via `Arc`; nothing
//! else is shared between lanes.
//!
//! Within a lane requests are strictly sequential. Ticks that fall due while
//! a request is outstanding are dropped rather than queued, so slow targets
//! naturally throttle the effective rate.
//!
//! # Example
//!
//! ```ignore
//! use loadgen_core::worker::WorkerBuilder;
//!
//! let worker = WorkerBuilder::new(lane)
//!     .executor(executor)
//!     .interval(Duration::from_millis(100))
//!     .build()?;
//!
//! let stats = worker.run(cancel.child_token()).await;
//! println!("Responses: {}", stats.responses);
//! ```

mod builder;
mod executor;
mod stats;
mod ticker;

pub use builder::WorkerBuilder;
pub use executor::Worker;
pub use stats::WorkerStats;
pub use ticker::LaneTicker;
