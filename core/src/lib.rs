//! loadgen-core: Request scheduling engine for the quotes load generator
//!
//! This crate provides the pieces the `quotes-loadgen` binary wires together,
//! including:
//!
//! - Load configuration and its validation
//! - Target resolution and lane expansion
//! - Collaborator traits (HttpTransport, Logger, Tracer, MetricsRecorder)
//! - The per-request executor, rate-limited worker lanes and the orchestrator
//! - Prometheus-backed request metrics

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod executor;
pub mod metrics;
pub mod orchestrator;
pub mod request;
pub mod target;
pub mod trace;
pub mod traits;
pub mod worker;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, LoadConfig, Protocol, RunMode};
pub use error::{LoadError, Result};
pub use executor::{RequestExecutor, HTTP_SPAN, REQUEST_SPAN};
pub use metrics::{encode_registry, PrometheusMetrics, REQUESTS_TOTAL, REQUEST_DURATION_SECONDS};
pub use orchestrator::{
    aggregate_worker_stats, LoadGenerator, LoadGeneratorBuilder, RunState, RunSummary,
};
pub use request::*;
pub use target::{expand_lanes, resolve_targets, WorkerLane};
pub use trace::{SpanContext, SpanId, TraceContext, TraceId};
pub use traits::*;
pub use worker::{LaneTicker, Worker, WorkerBuilder, WorkerStats};
