//! loadgen-telemetry: Observability plumbing for quotes-loadgen
//!
//! This crate provides the production collaborators for the core engine:
//!
//! - [`TracingLogger`]: the `Logger` trait on top of `tracing` events
//! - [`TracingTracer`]: the `Tracer` trait on top of `tracing` spans
//! - [`MetricsServer`]: `/metrics` and `/health` over HTTP (axum)
//! - [`init_subscriber`]: JSON log output with `RUST_LOG` filtering

#![warn(missing_docs)]
#![warn(clippy::all)]

mod logger;
mod server;
mod subscriber;
mod tracer;

pub use logger::{render_fields, TracingLogger};
pub use server::{metrics_router, MetricsServer};
pub use subscriber::init_subscriber;
pub use tracer::{TracingTracer, DEFAULT_SERVICE_NAME, SERVICE_NAME_ENV};
