//! Authenticated, retrying request pipeline
//!
//! Every resource call flows through [`RequestPipeline::request_resource`]:
//! a valid credential is obtained from the [`TokenCache`], authentication
//! headers are attached, the request is sent on the shared HTTP client and
//! the snake_case response is returned with camelCase keys.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use incognia_common::formatting::convert_keys_to_camel_case;
use incognia_common::resilience::{RetryDecision, RetryPolicy};
use incognia_common::time::{Clock, SystemClock};
use incognia_domain::{ClientConfig, IncogniaError, Method, RequestDescriptor, Result, TokenGrant};
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, info, instrument};

use super::auth::{TokenFetcher, TokenRequester};
use super::retry::{retry_executor, ApiRetryExecutor, RetryEligibility, RetryPredicate};
use super::token::TokenCache;
use crate::http::HttpClient;

/// Request pipeline owning the credential cache and the retry policy
#[derive(Debug)]
pub struct RequestPipeline {
    http: HttpClient,
    base_url: String,
    token_cache: TokenCache,
    requester: Arc<TokenRequester>,
    retry: ApiRetryExecutor,
}

impl RequestPipeline {
    /// Create a pipeline with the default retry eligibility and system clock.
    ///
    /// # Errors
    /// Returns [`IncogniaError::Usage`] if `config` is invalid.
    pub fn new(config: ClientConfig) -> Result<Self> {
        Self::builder().config(config).build()
    }

    pub fn builder() -> RequestPipelineBuilder {
        RequestPipelineBuilder::default()
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn token_cache(&self) -> &TokenCache {
        &self.token_cache
    }

    /// Send one API call and return its camelCased body.
    ///
    /// The credential is checked at the start of every attempt, so a retry
    /// that crosses the expiry second re-authenticates. A failed token fetch
    /// has already been retried by the token request and ends the call.
    #[instrument(skip(self, descriptor), fields(method = descriptor.method.as_str(), url = %descriptor.url))]
    pub async fn request_resource(&self, descriptor: &RequestDescriptor) -> Result<Value> {
        let (_, body) = self.retried_attempts(descriptor).await?;
        info!("resource request succeeded");
        Ok(body)
    }

    /// [`Self::request_resource`] decoded into `T`.
    ///
    /// # Errors
    /// A body that does not match `T` is reported as an
    /// [`IncogniaError::Api`] carrying the response status and body.
    pub async fn request_resource_as<T: DeserializeOwned>(
        &self,
        descriptor: &RequestDescriptor,
    ) -> Result<T> {
        let (status, body) = self.retried_attempts(descriptor).await?;
        info!(method = descriptor.method.as_str(), url = %descriptor.url, "resource request succeeded");

        serde_json::from_value(body.clone()).map_err(|err| IncogniaError::Api {
            message: format!("Unexpected response body: {err}"),
            status_code: status,
            payload: body.to_string(),
        })
    }

    /// Fetch a new grant from the token endpoint, bypassing the cache.
    pub async fn request_token(&self) -> Result<TokenGrant> {
        self.requester.request_token().await
    }

    /// Run `operation` under the pipeline's retry policy.
    ///
    /// Makes at most `max_retries + 1` attempts and returns the last error
    /// unchanged.
    pub async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        self.retry.execute(operation).await
    }

    async fn retried_attempts(&self, descriptor: &RequestDescriptor) -> Result<(u16, Value)> {
        self.retry.execute(|| self.attempt(descriptor)).await.map_err(AttemptError::into_inner)
    }

    async fn attempt(
        &self,
        descriptor: &RequestDescriptor,
    ) -> std::result::Result<(u16, Value), AttemptError> {
        let credential = self.token_cache.get_token().await.map_err(AttemptError::Credential)?;
        self.send_with(&credential.authorization_header(), descriptor)
            .await
            .map_err(AttemptError::Request)
    }

    async fn send_with(
        &self,
        authorization: &str,
        descriptor: &RequestDescriptor,
    ) -> Result<(u16, Value)> {
        let method = match descriptor.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut request = self
            .http
            .request(method, &descriptor.url)
            .header(CONTENT_TYPE, "application/json")
            .header(AUTHORIZATION, authorization);

        let query = descriptor.query_pairs();
        if !query.is_empty() {
            request = request.query(&query);
        }
        if let Some(body) = &descriptor.body {
            request = request.json(body);
        }

        let response = self.http.send(request).await?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|err| IncogniaError::transport(format!("failed to read response body: {err}")))?;

        debug!(status, bytes = text.len(), "response body received");
        Ok((status, decode_body(&text)))
    }
}

/// Failure of a single resource attempt
enum AttemptError {
    /// No credential could be obtained.
    Credential(IncogniaError),
    Request(IncogniaError),
}

impl AttemptError {
    fn into_inner(self) -> IncogniaError {
        match self {
            Self::Credential(err) | Self::Request(err) => err,
        }
    }
}

impl fmt::Display for AttemptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Credential(err) => write!(f, "credential unavailable: {err}"),
            Self::Request(err) => err.fmt(f),
        }
    }
}

impl RetryPolicy<AttemptError> for RetryEligibility {
    fn should_retry(&self, error: &AttemptError, attempt: u32) -> RetryDecision {
        match error {
            AttemptError::Credential(_) => RetryDecision::Stop,
            AttemptError::Request(err) => {
                RetryPolicy::<IncogniaError>::should_retry(self, err, attempt)
            }
        }
    }
}

/// Empty bodies decode to `null`; non-JSON bodies are kept as strings.
fn decode_body(text: &str) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    match serde_json::from_str::<Value>(text) {
        Ok(value) => convert_keys_to_camel_case(value),
        Err(_) => Value::String(text.to_string()),
    }
}

/// Builder for [`RequestPipeline`]
#[derive(Default)]
pub struct RequestPipelineBuilder {
    config: Option<ClientConfig>,
    retry_predicate: Option<RetryPredicate>,
    clock: Option<Arc<dyn Clock>>,
    token_fetcher: Option<Arc<dyn TokenFetcher>>,
}

impl RequestPipelineBuilder {
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Override which API and transport failures are retried.
    pub fn retry_predicate<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&IncogniaError) -> bool + Send + Sync + 'static,
    {
        self.retry_predicate = Some(Arc::new(predicate));
        self
    }

    /// Clock used to stamp and expire credentials.
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Replace the token endpoint as the cache's credential source.
    pub fn token_fetcher(mut self, fetcher: Arc<dyn TokenFetcher>) -> Self {
        self.token_fetcher = Some(fetcher);
        self
    }

    /// Build the pipeline
    ///
    /// # Errors
    ///
    /// Returns [`IncogniaError::Usage`] if no config was set, the config is
    /// invalid, or the HTTP client cannot be created.
    pub fn build(self) -> Result<RequestPipeline> {
        let config =
            self.config.ok_or_else(|| IncogniaError::usage("No client configuration provided"))?;
        config.validate()?;

        let http = HttpClient::builder()
            .timeout(config.timeout())
            .keep_alive(config.keep_alive)
            .build()?;

        let requester = Arc::new(TokenRequester::new(
            http.clone(),
            &config,
            retry_executor(&config, self.retry_predicate.clone()),
        ));
        let fetcher: Arc<dyn TokenFetcher> = match self.token_fetcher {
            Some(fetcher) => fetcher,
            None => requester.clone() as Arc<dyn TokenFetcher>,
        };
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));

        Ok(RequestPipeline {
            base_url: config.normalized_base_url().to_string(),
            token_cache: TokenCache::with_clock(fetcher, clock),
            retry: retry_executor(&config, self.retry_predicate),
            requester,
            http,
        })
    }
}
