use std::time::Duration;

use incognia_domain::constants::{DEFAULT_TIMEOUT_MS, LIBRARY_NAME};
use incognia_domain::IncogniaError;
use reqwest::{Client as ReqwestClient, Method, RequestBuilder, Response};
use tracing::debug;

/// `incognia-rust/<version> (<os> <arch>) Rust`
pub fn build_user_agent() -> String {
    format!(
        "{LIBRARY_NAME}/{} ({} {}) Rust",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Thin wrapper over a pooled reqwest client.
///
/// [`HttpClient::send`] makes exactly one attempt and translates the outcome
/// into the client's error taxonomy: a non-2xx status becomes
/// [`IncogniaError::Api`] and a request that produced no response becomes
/// [`IncogniaError::Transport`].
#[derive(Clone, Debug)]
pub struct HttpClient {
    client: ReqwestClient,
}

impl HttpClient {
    /// Start building a new HTTP client.
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::default()
    }

    /// Convenience constructor with default configuration.
    pub fn new() -> Result<Self, IncogniaError> {
        Self::builder().build()
    }

    /// Create a request builder using the underlying reqwest client.
    pub fn request<U>(&self, method: Method, url: U) -> RequestBuilder
    where
        U: reqwest::IntoUrl,
    {
        self.client.request(method, url)
    }

    /// Execute one request; only 2xx responses are returned as `Ok`.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response, IncogniaError> {
        let request = builder.build().map_err(map_request_error)?;
        let method = request.method().clone();
        let url = request.url().clone();
        debug!(%method, url = %url.path(), "sending HTTP request");

        let response = self.client.execute(request).await.map_err(|err| {
            debug!(%method, url = %url.path(), error = %err, "HTTP request failed");
            map_request_error(err)
        })?;

        let status = response.status();
        debug!(%method, url = %url.path(), %status, "received HTTP response");

        if status.is_success() {
            return Ok(response);
        }

        let payload = response.text().await.map_err(|err| {
            IncogniaError::transport(format!("failed to read {status} response body: {err}"))
        })?;
        Err(IncogniaError::api(status.as_u16(), payload))
    }
}

/// Builder for [`HttpClient`].
#[derive(Debug)]
pub struct HttpClientBuilder {
    timeout: Duration,
    keep_alive: bool,
}

impl Default for HttpClientBuilder {
    fn default() -> Self {
        Self {
            timeout: Duration::from_millis(DEFAULT_TIMEOUT_MS),
            keep_alive: false,
        }
    }
}

impl HttpClientBuilder {
    /// Deadline for a single attempt, covering connect through body read.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Reuse pooled connections between calls.
    pub fn keep_alive(mut self, enabled: bool) -> Self {
        self.keep_alive = enabled;
        self
    }

    pub fn build(self) -> Result<HttpClient, IncogniaError> {
        let mut builder = ReqwestClient::builder()
            .timeout(self.timeout)
            .user_agent(build_user_agent())
            .no_proxy();

        builder = if self.keep_alive {
            builder.tcp_keepalive(Duration::from_secs(60)).pool_idle_timeout(Duration::from_secs(90))
        } else {
            builder.pool_max_idle_per_host(0)
        };

        let client = builder
            .build()
            .map_err(|err| IncogniaError::usage(format!("Failed to build HTTP client: {err}")))?;

        Ok(HttpClient { client })
    }
}

/// Builder failures are caller mistakes; everything else means the request
/// left without a usable response.
fn map_request_error(err: reqwest::Error) -> IncogniaError {
    if err.is_builder() {
        return IncogniaError::usage(format!("Invalid request: {err}"));
    }
    IncogniaError::transport(describe_transport_error(&err))
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        format!("timeout: {err}")
    } else if err.is_connect() {
        format!("connection failed: {err}")
    } else {
        err.to_string()
    }
}
