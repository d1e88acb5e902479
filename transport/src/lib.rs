//! loadgen-transport: reqwest-backed HTTP transport
//!
//! [`ReqwestTransport`] implements [`HttpTransport`] on top of a single shared
//! `reqwest::Client`, so every lane reuses the same connection pool.

#![warn(missing_docs)]
#![warn(clippy::all)]

use std::time::Duration;

use async_trait::async_trait;
use loadgen_core::{HttpRequest, HttpResponse, HttpTransport, Method, TransportError};
use reqwest::Client;

/// Header carrying the W3C trace context
pub const TRACEPARENT: &str = "traceparent";

/// Per-request timeout used by [`ReqwestTransport::new`]
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport backed by `reqwest`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    timeout: Duration,
}

impl ReqwestTransport {
    /// Create a transport with the default timeout
    pub fn new() -> Result<Self, TransportError> {
        Self::with_timeout(DEFAULT_TIMEOUT)
    }

    /// Create a transport whose requests time out after `timeout`
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::from_client(client, timeout))
    }

    /// Wrap an existing client
    ///
    /// `timeout` is only used to report [`TransportError::Timeout`]; the
    /// client's own configuration decides when requests actually time out.
    pub fn from_client(client: Client, timeout: Duration) -> Self {
        Self { client, timeout }
    }

    /// The configured request timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn map_error(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout(self.timeout)
        } else if err.is_connect() {
            TransportError::Connect(err.to_string())
        } else {
            TransportError::Http(err)
        }
    }
}

fn to_reqwest(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
    }
}

#[async_trait]
impl HttpTransport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self.client.request(to_reqwest(request.method), request.url);
        if let Some(traceparent) = request.traceparent {
            builder = builder.header(TRACEPARENT, traceparent);
        }

        let response = builder.send().await.map_err(|e| self.map_error(e))?;
        let status = response.status().as_u16();

        // Read to completion so the connection goes back to the pool.
        let body = response.bytes().await.map_err(|e| self.map_error(e))?;

        tracing::trace!(status, bytes = body.len(), "Response received");
        Ok(HttpResponse::new(status).with_body_len(body.len()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use loadgen_core::TraceContext;
    use wiremock::matchers::{header_exists, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn get(url: &str) -> HttpRequest {
        HttpRequest::get(url, &TraceContext::root()).expect("valid url")
    }

    #[tokio::test]
    async fn test_send_returns_status_and_body_len() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/quotes"))
            .respond_with(ResponseTemplate::new(200).set_body_string("[\"quote\"]"))
            .expect(1)
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .send(get(&format!("{}/api/quotes", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body_len, 9);
        assert!(response.is_success());
    }

    #[tokio::test]
    async fn test_server_error_is_a_response() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::new().unwrap();
        let response = transport
            .send(get(&format!("{}/flaky", server.uri())))
            .await
            .unwrap();

        assert_eq!(response.status, 503);
        assert!(!response.is_success());
    }

    #[tokio::test]
    async fn test_send_propagates_traceparent() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(header_exists(TRACEPARENT))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let trace = TraceContext::with_span(TraceContext::root().child());
        let request = HttpRequest::get(&format!("{}/", server.uri()), &trace).unwrap();
        let expected = request.traceparent.clone().expect("traceparent");

        let transport = ReqwestTransport::new().unwrap();
        transport.send(request).await.unwrap();

        let received = server.received_requests().await.unwrap();
        let header = received[0]
            .headers
            .get(TRACEPARENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        assert_eq!(header, Some(expected));
    }

    #[tokio::test]
    async fn test_connection_refused() {
        // Grab a free port and release it so nothing is listening.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let transport = ReqwestTransport::new().unwrap();
        let err = transport
            .send(get(&format!("http://127.0.0.1:{}/", port)))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Connect(_)), "got {:?}", err);
        assert_eq!(err.kind(), "connect");
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let transport = ReqwestTransport::with_timeout(Duration::from_millis(50)).unwrap();
        let err = transport
            .send(get(&format!("{}/slow", server.uri())))
            .await
            .unwrap_err();

        assert!(matches!(err, TransportError::Timeout(d) if d == Duration::from_millis(50)));
    }
}
