//! `Logger` implementation that forwards to `tracing`

use std::sync::Arc;

use loadgen_core::{LogField, Logger};
use serde_json::{Map, Value};

/// Structured logger emitting `tracing` events
///
/// Every event carries a `scope` field naming the component that logged it.
/// The well-known keys (`url`, `status`, `error`, `error_kind`, `trace_id`,
/// `duration_ms`) become event fields of their own; anything else is
/// collected into a `fields` JSON object.
#[derive(Debug, Clone, Default)]
pub struct TracingLogger {
    scope: String,
}

impl TracingLogger {
    /// Create a logger with an empty scope
    pub fn new() -> Self {
        Self::default()
    }

    /// The component name attached to events
    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn child(&self, name: &str) -> Self {
        let scope = if self.scope.is_empty() {
            name.to_string()
        } else {
            format!("{}.{}", self.scope, name)
        };
        Self { scope }
    }
}

/// Render log fields as a JSON object; later duplicates win
pub fn render_fields(fields: &[LogField]) -> String {
    let map: Map<String, Value> = fields
        .iter()
        .map(|f| (f.key.to_string(), f.value.clone()))
        .collect();
    Value::Object(map).to_string()
}

/// Log fields split into the keys recorded natively and the remainder
#[derive(Debug, Default, PartialEq)]
struct EventFields<'a> {
    url: Option<&'a str>,
    status: Option<u64>,
    error: Option<&'a str>,
    error_kind: Option<&'a str>,
    trace_id: Option<&'a str>,
    duration_ms: Option<f64>,
    rest: Option<String>,
}

impl<'a> EventFields<'a> {
    fn split(fields: &'a [LogField]) -> Self {
        let mut event = Self::default();
        let mut rest = Vec::new();
        for field in fields {
            let value = &field.value;
            let known = match field.key {
                "url" => value.as_str().map(|v| event.url = Some(v)),
                "status" => value.as_u64().map(|v| event.status = Some(v)),
                "error" => value.as_str().map(|v| event.error = Some(v)),
                "error_kind" => value.as_str().map(|v| event.error_kind = Some(v)),
                "trace_id" => value.as_str().map(|v| event.trace_id = Some(v)),
                "duration_ms" => value.as_f64().map(|v| event.duration_ms = Some(v)),
                _ => None,
            };
            if known.is_none() {
                rest.push(field.clone());
            }
        }
        if !rest.is_empty() {
            event.rest = Some(render_fields(&rest));
        }
        event
    }
}

macro_rules! emit {
    ($level:ident, $scope:expr, $message:expr, $fields:expr) => {{
        let event = EventFields::split($fields);
        tracing::$level!(
            scope = %$scope,
            url = event.url,
            status = event.status,
            error = event.error,
            error_kind = event.error_kind,
            trace_id = event.trace_id,
            duration_ms = event.duration_ms,
            fields = event.rest.as_deref(),
            "{}",
            $message
        );
    }};
}

impl Logger for TracingLogger {
    fn info(&self, message: &str, fields: &[LogField]) {
        emit!(info, self.scope, message, fields);
    }

    fn error(&self, message: &str, fields: &[LogField]) {
        emit!(error, self.scope, message, fields);
    }

    fn scoped(&self, name: &str) -> Arc<dyn Logger> {
        Arc::new(self.child(name))
    }
}
