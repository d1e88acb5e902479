//! Single request round-trip with spans, timing, logging and metrics

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio_util::sync::CancellationToken;

use crate::request::{HttpRequest, OutcomeKind, RequestOutcome};
use crate::trace::{SpanGuard, TraceContext};
use crate::traits::{HttpTransport, LogField, Logger, MetricsRecorder, Tracer, TransportError};

/// Outer span covering the whole attempt
pub const REQUEST_SPAN: &str = "loadgen.request";

/// Inner span covering the HTTP call
pub const HTTP_SPAN: &str = "http.get";

/// Performs one request attempt and reports its outcome
///
/// Shared by every lane via `Arc`. All failure modes end up in the returned
/// [`RequestOutcome`]; nothing is propagated to the caller.
pub struct RequestExecutor {
    transport: Arc<dyn HttpTransport>,
    logger: Arc<dyn Logger>,
    tracer: Arc<dyn Tracer>,
    metrics: Arc<dyn MetricsRecorder>,
}

impl RequestExecutor {
    /// Create an executor from its collaborators
    pub fn new(
        transport: Arc<dyn HttpTransport>,
        logger: Arc<dyn Logger>,
        tracer: Arc<dyn Tracer>,
        metrics: Arc<dyn MetricsRecorder>,
    ) -> Self {
        Self {
            transport,
            logger,
            tracer,
            metrics,
        }
    }

    /// Issue a GET against `target`
    ///
    /// If `cancel` fires while the request is in flight the request future is
    /// dropped and the outcome is [`OutcomeKind::Cancelled`].
    pub async fn execute(&self, target: &str, cancel: &CancellationToken) -> RequestOutcome {
        let (request_ctx, request_span) = self.tracer.start_span(&TraceContext::root(), REQUEST_SPAN);
        let _request_span = SpanGuard::new(request_span);

        let (http_ctx, http_span) = self.tracer.start_span(&request_ctx, HTTP_SPAN);
        let _http_span = SpanGuard::new(http_span);

        let start = Instant::now();
        let outcome = |kind| RequestOutcome {
            target: target.to_string(),
            kind,
            elapsed: start.elapsed(),
        };

        let request = match HttpRequest::get(target, &http_ctx) {
            Ok(request) => request,
            Err(e) if e.is_malformed() => {
                self.logger.error(
                    "Error creating request",
                    &[
                        LogField::new("url", target),
                        LogField::new("error", e.to_string()),
                    ],
                );
                return outcome(OutcomeKind::InvalidRequest(e.to_string()));
            }
            Err(e) => return self.failed(target, TransportError::from(e), start.elapsed()),
        };

        let result = tokio::select! {
            biased;

            _ = cancel.cancelled() => {
                tracing::debug!(url = target, "Request cancelled in flight");
                return outcome(OutcomeKind::Cancelled);
            }

            result = self.transport.send(request) => result,
        };
        let elapsed = start.elapsed();

        let response = match result {
            Ok(response) => response,
            Err(e) => return self.failed(target, e, elapsed),
        };

        let status = response.status;
        let body_len = response.body_len;
        drop(response);

        let loaded = RequestOutcome {
            target: target.to_string(),
            kind: OutcomeKind::Response { status },
            elapsed,
        };
        self.count(&loaded);
        self.metrics.observe_duration(target, elapsed);

        let trace_id = http_ctx
            .trace_id()
            .map(|id| id.to_string())
            .unwrap_or_default();
        self.logger.info(
            "Loaded URL",
            &[
                LogField::new("url", target),
                LogField::new("status", status),
                LogField::new("duration_ms", elapsed.as_secs_f64() * 1000.0),
                LogField::new("bytes", body_len),
                LogField::new("trace_id", trace_id),
            ],
        );

        loaded
    }

    /// Meter and log an attempt that produced no response
    fn failed(&self, target: &str, error: TransportError, elapsed: Duration) -> RequestOutcome {
        let failed = RequestOutcome {
            target: target.to_string(),
            kind: OutcomeKind::TransportError(error.to_string()),
            elapsed,
        };
        self.count(&failed);
        self.logger.error(
            "Error loading URL",
            &[
                LogField::new("url", target),
                LogField::new("error", error.to_string()),
                LogField::new("error_kind", error.kind()),
            ],
        );
        failed
    }

    fn count(&self, outcome: &RequestOutcome) {
        if let Some(status) = outcome.metric_label() {
            self.metrics.increment_requests(&outcome.target, &status);
        }
    }
}

impl std::fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestExecutor").finish_non_exhaustive()
    }
}
