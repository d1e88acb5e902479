//! Trace identifiers and span bookkeeping

use std::fmt;

use crate::traits::SpanHandle;

/// 128-bit trace identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(pub u128);

impl TraceId {
    /// Random non-zero trace id
    pub fn random() -> Self {
        loop {
            let id = rand::random::<u128>();
            if id != 0 {
                return Self(id);
            }
        }
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

/// 64-bit span identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpanId(pub u64);

impl SpanId {
    /// Random non-zero span id
    pub fn random() -> Self {
        loop {
            let id = rand::random::<u64>();
            if id != 0 {
                return Self(id);
            }
        }
    }
}

impl fmt::Display for SpanId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Identity of a single span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanContext {
    /// Trace this span belongs to
    pub trace_id: TraceId,
    /// This span
    pub span_id: SpanId,
}

/// The span a piece of work currently runs under, if any
///
/// Passed to [`Tracer::start_span`](crate::Tracer::start_span) as the parent
/// and returned from it as the new current context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TraceContext {
    current: Option<SpanContext>,
}

impl TraceContext {
    /// Context with no active span; the next span starts a new trace
    pub fn root() -> Self {
        Self::default()
    }

    /// Context whose active span is `span`
    pub fn with_span(span: SpanContext) -> Self {
        Self {
            current: Some(span),
        }
    }

    /// Active span, if any
    pub fn span(&self) -> Option<SpanContext> {
        self.current
    }

    /// Trace id of the active span, if any
    pub fn trace_id(&self) -> Option<TraceId> {
        self.current.map(|span| span.trace_id)
    }

    /// Identity for a new child span: same trace, fresh span id
    pub fn child(&self) -> SpanContext {
        SpanContext {
            trace_id: self.trace_id().unwrap_or_else(TraceId::random),
            span_id: SpanId::random(),
        }
    }

    /// W3C `traceparent` header value for the active span
    pub fn traceparent(&self) -> Option<String> {
        self.current
            .map(|span| format!("00-{}-{}-01", span.trace_id, span.span_id))
    }
}

/// Ends the wrapped span when dropped, so every exit path closes it
pub(crate) struct SpanGuard(Option<Box<dyn SpanHandle>>);

impl SpanGuard {
    pub(crate) fn new(handle: Box<dyn SpanHandle>) -> Self {
        Self(Some(handle))
    }
}

impl Drop for SpanGuard {
    fn drop(&mut self) {
        if let Some(handle) = self.0.take() {
            handle.end();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_has_no_trace() {
        let ctx = TraceContext::root();
        assert!(ctx.span().is_none());
        assert!(ctx.trace_id().is_none());
        assert!(ctx.traceparent().is_none());
    }

    #[test]
    fn test_child_inherits_trace_id() {
        let parent = TraceContext::root().child();
        let ctx = TraceContext::with_span(parent);
        let child = ctx.child();

        assert_eq!(child.trace_id, parent.trace_id);
        assert_ne!(child.span_id, parent.span_id);
    }

    #[test]
    fn test_traceparent_format() {
        let ctx = TraceContext::with_span(SpanContext {
            trace_id: TraceId(0xabc),
            span_id: SpanId(0x12),
        });
        assert_eq!(
            ctx.traceparent().unwrap(),
            "00-00000000000000000000000000000abc-0000000000000012-01"
        );
    }
}
