//! Loopback status endpoint probe.
//!
//! # Responsibilities
//! - Send one GET to `http://127.0.0.1:<port><path>`
//! - Bound the whole exchange (connect, headers, body) with a timeout
//! - Validate status 200 and an exact body match
//!
//! # Design Decisions
//! - Host is fixed to IPv4 loopback; only the port is configurable
//! - No connection pooling: each probe opens and releases its own socket
//! - Body is capped so a misbehaving responder cannot stall us on a large read
//! - Dropping the returned future aborts the request and closes the socket

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use std::error::Error as StdError;
use std::net::Ipv4Addr;
use std::time::Duration;
use tokio::time;

use crate::error::HealthError;

/// HTTP client used for status probes.
pub type StatusClient = Client<HttpConnector, Body>;

/// Largest status body we are willing to read.
pub const MAX_BODY_BYTES: usize = 4096;

const USER_AGENT: &str = concat!("proxy-healthz/", env!("CARGO_PKG_VERSION"));

/// Build a non-pooling client whose connect phase honours `timeout`.
pub fn build_client(timeout: Duration) -> StatusClient {
    let mut connector = HttpConnector::new();
    connector.set_connect_timeout(Some(timeout));
    connector.set_nodelay(true);

    Client::builder(TokioExecutor::new())
        .pool_max_idle_per_host(0)
        .build(connector)
}

/// What the status endpoint answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusProbeResult {
    pub status: StatusCode,
    pub body: String,
}

/// Probes a worker's loopback status endpoint.
#[derive(Clone)]
pub struct StatusProbe {
    client: StatusClient,
    path: String,
    expected_body: String,
    timeout: Duration,
}

impl StatusProbe {
    pub fn new(
        client: StatusClient,
        path: impl Into<String>,
        expected_body: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        Self {
            client,
            path: path.into(),
            expected_body: expected_body.into(),
            timeout,
        }
    }

    /// URL probed for `port`.
    pub fn url(&self, port: u16) -> String {
        format!("http://{}:{}{}", Ipv4Addr::LOCALHOST, port, self.path)
    }

    /// Probe `port` and require status 200 with exactly the expected body.
    pub async fn probe(&self, port: u16) -> Result<StatusProbeResult, HealthError> {
        let url = self.url(port);
        let result = self.fetch(&url).await?;

        if result.status != StatusCode::OK || result.body != self.expected_body {
            return Err(HealthError::UnexpectedResponse {
                url,
                status: result.status.as_u16(),
                body: result.body,
            });
        }
        Ok(result)
    }

    /// One GET against `url`, without judging the answer.
    async fn fetch(&self, url: &str) -> Result<StatusProbeResult, HealthError> {
        let unreachable = |reason: String| HealthError::EndpointUnreachable {
            url: url.to_string(),
            reason,
        };

        let request = Request::builder()
            .method(Method::GET)
            .uri(url)
            .header(header::USER_AGENT, USER_AGENT)
            .body(Body::empty())
            .map_err(|e| unreachable(format!("invalid request: {e}")))?;

        let exchange = async {
            let response = self
                .client
                .request(request)
                .await
                .map_err(|e| unreachable(error_chain(&e)))?;

            let status = response.status();
            let body = match axum::body::to_bytes(Body::new(response.into_body()), MAX_BODY_BYTES).await {
                Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
                Err(e) => {
                    return Err(HealthError::UnexpectedResponse {
                        url: url.to_string(),
                        status: status.as_u16(),
                        body: format!("<unreadable body: {e}>"),
                    })
                }
            };
            Ok::<_, HealthError>(StatusProbeResult { status, body })
        };

        match time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(unreachable(format!(
                "timed out after {}ms",
                self.timeout.as_millis()
            ))),
        }
    }
}

/// Render an error and its sources as one line; hyper's top-level client
/// errors alone say little ("client error (Connect)").
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
