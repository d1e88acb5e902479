//! Request, response and outcome types

use crate::trace::TraceContext;
use reqwest::Url;
use std::fmt;
use std::time::Duration;

/// HTTP methods issued by the generator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// GET
    Get,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
        }
    }
}

/// A request ready to hand to an [`HttpTransport`](crate::HttpTransport)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Method
    pub method: Method,

    /// Parsed target URL
    pub url: Url,

    /// W3C trace context header for the span the request runs under
    pub traceparent: Option<String>,
}

impl HttpRequest {
    /// Build a GET request for `target`, bound to the given trace context
    ///
    /// Fails for targets that are not absolute `http`/`https` URLs. Only
    /// [`RequestError::InvalidUrl`] means the target could not be parsed.
    pub fn get(target: &str, trace: &TraceContext) -> Result<Self, RequestError> {
        let url = match Url::parse(target) {
            Ok(url) => url,
            Err(_) if is_relative_reference(target) => {
                return Err(RequestError::RelativeUrl(target.to_string()));
            }
            Err(e) => {
                return Err(RequestError::InvalidUrl {
                    url: target.to_string(),
                    reason: e.to_string(),
                });
            }
        };

        match url.scheme() {
            "http" | "https" => {}
            scheme => {
                return Err(RequestError::UnsupportedScheme(scheme.to_string()));
            }
        }

        Ok(Self {
            method: Method::Get,
            url,
            traceparent: trace.traceparent(),
        })
    }
}

/// Whether `target` parses once resolved against some base URL
fn is_relative_reference(target: &str) -> bool {
    Url::parse("http://relative.invalid/")
        .and_then(|base| base.join(target))
        .is_ok()
}

/// Request construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// Target could not be parsed as a URL
    #[error("invalid URL {url:?}: {reason}")]
    InvalidUrl {
        /// The offending target
        url: String,
        /// Parser message
        reason: String,
    },

    /// Relative reference with no host to send it to
    #[error("relative URL {0:?} has no host")]
    RelativeUrl(String),

    /// URL scheme other than http/https
    #[error("unsupported URL scheme: {0}")]
    UnsupportedScheme(String),
}

impl RequestError {
    /// The target is not a URL at all, as opposed to one that cannot be sent
    pub fn is_malformed(&self) -> bool {
        matches!(self, RequestError::InvalidUrl { .. })
    }
}

/// Response returned by a transport
///
/// The body has already been read to completion by the transport; dropping
/// the response releases it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Number of body bytes received
    pub body_len: usize,
}

impl HttpResponse {
    /// Response with an empty body
    pub fn new(status: u16) -> Self {
        Self {
            status,
            body_len: 0,
        }
    }

    /// Set the body length
    pub fn with_body_len(mut self, body_len: usize) -> Self {
        self.body_len = body_len;
        self
    }

    /// 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// What happened to a single request attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutcomeKind {
    /// A response was received (any status)
    Response {
        /// HTTP status code
        status: u16,
    },

    /// The transport failed before a response arrived
    TransportError(String),

    /// The request could not be constructed; nothing was sent
    InvalidRequest(String),

    /// The run was cancelled while the request was in flight
    Cancelled,
}

/// Result of one request attempt, consumed by logging and metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOutcome {
    /// Fully-qualified URL
    pub target: String,

    /// What happened
    pub kind: OutcomeKind,

    /// Wall-clock time from request construction to completion
    pub elapsed: Duration,
}

impl RequestOutcome {
    /// Status code if a response was received
    pub fn status(&self) -> Option<u16> {
        match self.kind {
            OutcomeKind::Response { status } => Some(status),
            _ => None,
        }
    }

    /// Label recorded in `loadgen_requests_total`, if the attempt is metered
    pub fn metric_label(&self) -> Option<String> {
        match &self.kind {
            OutcomeKind::Response { status } => Some(status.to_string()),
            OutcomeKind::TransportError(_) => Some("error".to_string()),
            OutcomeKind::InvalidRequest(_) | OutcomeKind::Cancelled => None,
        }
    }
}
