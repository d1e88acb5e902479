//! Orchestrator for load test lifecycle management
//!
//! The [`LoadGenerator`] coordinates a complete run:
//! - Validating the configuration and resolving targets
//! - Spawning one worker lane per target and per unit of request rate
//! - Waiting for the deadline or the caller's cancellation
//! - Draining every lane and summarising the results
//!
//! # Example
//!
//! ```ignore
//! use loadgen_core::{LoadConfig, LoadGeneratorBuilder};
//!
//! let generator = LoadGeneratorBuilder::new()
//!     .config(LoadConfig::new(["/api/quotes"]))
//!     .transport(transport)
//!     .logger(logger)
//!     .tracer(tracer)
//!     .metrics(metrics)
//!     .build()?;
//!
//! let summary = generator.run_with_signal_handling().await?;
//! ```

mod aggregator;
mod builder;
mod executor;

pub use aggregator::{aggregate_worker_stats, RunSummary};
pub use builder::LoadGeneratorBuilder;
pub use executor::{LoadGenerator, RunState};
