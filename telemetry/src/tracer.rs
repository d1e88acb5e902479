//! `Tracer` implementation backed by `tracing` spans

use std::time::Instant;

use loadgen_core::{SpanHandle, TraceContext, Tracer};
use tracing::field;

/// Environment variable naming the service in span metadata
pub const SERVICE_NAME_ENV: &str = "OTEL_SERVICE_NAME";

/// Service name used when the environment does not set one
pub const DEFAULT_SERVICE_NAME: &str = "quotes-loadgen";

/// Creates one `tracing` span per logical span
///
/// Spans carry OpenTelemetry-style identity (`otel.name`, `trace_id`,
/// `span_id`, `parent_span_id`, `service.name`) so they can be correlated
/// with the `traceparent` header sent upstream. They close when the handle
/// is ended.
#[derive(Debug, Clone)]
pub struct TracingTracer {
    service_name: String,
}

impl TracingTracer {
    /// Create a tracer for `service_name`
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
        }
    }

    /// Create a tracer named by `OTEL_SERVICE_NAME`, or `quotes-loadgen`
    pub fn from_env() -> Self {
        Self::new(service_name_from(std::env::var(SERVICE_NAME_ENV).ok()))
    }

    /// The service name attached to spans
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

fn service_name_from(value: Option<String>) -> String {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| DEFAULT_SERVICE_NAME.to_string())
}

struct TracingSpan {
    span: tracing::Span,
    name: &'static str,
    started: Instant,
}

impl SpanHandle for TracingSpan {
    fn end(self: Box<Self>) {
        tracing::trace!(
            parent: &self.span,
            otel.name = self.name,
            elapsed_ms = self.started.elapsed().as_secs_f64() * 1000.0,
            "Span ended"
        );
    }
}

impl Tracer for TracingTracer {
    fn start_span(
        &self,
        parent: &TraceContext,
        name: &'static str,
    ) -> (TraceContext, Box<dyn SpanHandle>) {
        let context = parent.child();
        let span = tracing::debug_span!(
            "span",
            otel.name = name,
            trace_id = %context.trace_id,
            span_id = %context.span_id,
            parent_span_id = field::Empty,
            service.name = %self.service_name
        );
        if let Some(parent_span) = parent.span() {
            span.record("parent_span_id", field::display(parent_span.span_id));
        }

        let handle = TracingSpan {
            span,
            name,
            started: Instant::now(),
        };
        (TraceContext::with_span(context), Box::new(handle))
    }
}
