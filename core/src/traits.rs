//! Collaborator traits for transport, logging, tracing and metrics
//!
//! The scheduling engine only talks to the outside world through these
//! traits. Production implementations live in the transport and telemetry
//! crates; tests plug in in-memory fakes.

use crate::request::{HttpRequest, HttpResponse, RequestError};
use crate::trace::TraceContext;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// HTTP Transport
// ============================================================================

/// Issues HTTP requests on behalf of the workers
///
/// A single instance is shared by every lane, so implementations must be
/// safe for concurrent use.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Send the request and return the response status
    ///
    /// Application-level failures (4xx/5xx) are responses, not errors.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport-level failures
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// HTTP client error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Connection could not be established
    #[error("connection failed: {0}")]
    Connect(String),

    /// Request timed out
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The target parsed but cannot be sent (relative or non-HTTP URL)
    #[error(transparent)]
    Unsendable(#[from] RequestError),

    /// Any other failure
    #[error("{0}")]
    Other(String),
}

impl TransportError {
    /// Short classification used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            TransportError::Http(_) => "http",
            TransportError::Connect(_) => "connect",
            TransportError::Timeout(_) => "timeout",
            TransportError::Unsendable(_) => "unsendable",
            TransportError::Other(_) => "other",
        }
    }
}

// ============================================================================
// Logger
// ============================================================================

/// A structured key/value attached to a log event
#[derive(Debug, Clone, PartialEq)]
pub struct LogField {
    /// Field name
    pub key: &'static str,
    /// Field value
    pub value: serde_json::Value,
}

impl LogField {
    /// Create a field
    pub fn new(key: &'static str, value: impl Into<serde_json::Value>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

/// Structured logger
pub trait Logger: Send + Sync {
    /// Log at info level
    fn info(&self, message: &str, fields: &[LogField]);

    /// Log at error level
    fn error(&self, message: &str, fields: &[LogField]);

    /// Derive a logger whose events are grouped under `name`
    fn scoped(&self, name: &str) -> Arc<dyn Logger>;
}

// ============================================================================
// Tracer
// ============================================================================

/// An open span; must be ended exactly once
pub trait SpanHandle: Send {
    /// Close the span
    fn end(self: Box<Self>);
}

/// Creates spans
pub trait Tracer: Send + Sync {
    /// Start a span named `name` under `parent`
    ///
    /// Returns the context in which the new span is active.
    fn start_span(
        &self,
        parent: &TraceContext,
        name: &'static str,
    ) -> (TraceContext, Box<dyn SpanHandle>);
}

// ============================================================================
// Metrics
// ============================================================================

/// Concurrency-safe request metrics
pub trait MetricsRecorder: Send + Sync {
    /// Count one request attempt against `url`; `status` is the numeric
    /// status code or `"error"` for transport failures
    fn increment_requests(&self, url: &str, status: &str);

    /// Record the wall-clock duration of a completed round-trip
    fn observe_duration(&self, url: &str, elapsed: Duration);
}
