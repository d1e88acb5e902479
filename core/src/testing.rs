//! In-memory collaborators for tests

use crate::request::{HttpRequest, HttpResponse};
use crate::trace::TraceContext;
use crate::traits::{HttpTransport, LogField, Logger, SpanHandle, Tracer, TransportError};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// Mock Transport
// ============================================================================

#[derive(Default)]
pub(crate) struct MockTransport {
    delay: Option<Duration>,
    fail_all: bool,
    statuses: HashMap<String, u16>,
    requests: Mutex<Vec<HttpRequest>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockTransport {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(crate) fn failing(mut self) -> Self {
        self.fail_all = true;
        self
    }

    pub(crate) fn with_status(mut self, url: &str, status: u16) -> Self {
        self.statuses.insert(url.to_string(), status);
        self
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub(crate) fn request_count_for(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.url.as_str() == url)
            .count()
    }

    pub(crate) fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub(crate) fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::SeqCst)
    }
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl HttpTransport for MockTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        let _guard = InFlight(&self.in_flight);
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let url = request.url.to_string();
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if self.fail_all {
            return Err(TransportError::Connect("connection refused".to_string()));
        }

        let status = self.statuses.get(&url).copied().unwrap_or(200);
        Ok(HttpResponse::new(status).with_body_len(2))
    }
}

// ============================================================================
// Mock Logger
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct LogEntry {
    pub(crate) level: &'static str,
    pub(crate) scope: String,
    pub(crate) message: String,
    pub(crate) fields: Vec<LogField>,
}

impl LogEntry {
    pub(crate) fn field(&self, key: &str) -> Option<&serde_json::Value> {
        self.fields.iter().find(|f| f.key == key).map(|f| &f.value)
    }
}

#[derive(Default)]
pub(crate) struct MockLogger {
    scope: String,
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MockLogger {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    fn push(&self, level: &'static str, message: &str, fields: &[LogField]) {
        self.entries.lock().unwrap().push(LogEntry {
            level,
            scope: self.scope.clone(),
            message: message.to_string(),
            fields: fields.to_vec(),
        });
    }

    pub(crate) fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub(crate) fn contains_message(&self, message: &str) -> bool {
        self.entries().iter().any(|e| e.message.contains(message))
    }

    pub(crate) fn count(&self, level: &str, message: &str) -> usize {
        self.entries()
            .iter()
            .filter(|e| e.level == level && e.message == message)
            .count()
    }

    pub(crate) fn has_error(&self) -> bool {
        self.entries().iter().any(|e| e.level == "error")
    }
}

impl Logger for MockLogger {
    fn info(&self, message: &str, fields: &[LogField]) {
        self.push("info", message, fields);
    }

    fn error(&self, message: &str, fields: &[LogField]) {
        self.push("error", message, fields);
    }

    fn scoped(&self, name: &str) -> Arc<dyn Logger> {
        let scope = if self.scope.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.scope, name)
        };
        Arc::new(MockLogger {
            scope,
            entries: Arc::clone(&self.entries),
        })
    }
}

// ============================================================================
// Mock Tracer
// ============================================================================

#[derive(Default)]
pub(crate) struct MockTracer {
    started: Arc<Mutex<Vec<&'static str>>>,
    ended: Arc<AtomicUsize>,
}

impl MockTracer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn started(&self) -> Vec<&'static str> {
        self.started.lock().unwrap().clone()
    }

    pub(crate) fn ended(&self) -> usize {
        self.ended.load(Ordering::SeqCst)
    }
}

struct MockSpan {
    ended: Arc<AtomicUsize>,
}

impl SpanHandle for MockSpan {
    fn end(self: Box<Self>) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }
}

impl Tracer for MockTracer {
    fn start_span(
        &self,
        parent: &TraceContext,
        name: &'static str,
    ) -> (TraceContext, Box<dyn SpanHandle>) {
        self.started.lock().unwrap().push(name);
        let ctx = TraceContext::with_span(parent.child());
        (
            ctx,
            Box::new(MockSpan {
                ended: Arc::clone(&self.ended),
            }),
        )
    }
}
