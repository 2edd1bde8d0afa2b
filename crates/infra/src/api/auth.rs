//! OAuth2 client-credentials token requests
//!
//! [`TokenFetcher`] is the seam between the token cache and the network so
//! the cache can be exercised with scripted fetchers.

use async_trait::async_trait;
use incognia_domain::constants::{CLIENT_CREDENTIALS_GRANT, TOKEN_PATH};
use incognia_domain::{ClientConfig, ClientIdentity, IncogniaError, Result, TokenGrant};
use reqwest::Method;
use tracing::{debug, instrument};

use super::retry::ApiRetryExecutor;
use crate::http::HttpClient;

/// Source of fresh token grants
#[async_trait]
pub trait TokenFetcher: Send + Sync {
    /// Request a new grant from the authorization server.
    async fn fetch_token(&self) -> Result<TokenGrant>;
}

/// Fetches grants from the token endpoint with HTTP Basic auth
#[derive(Debug)]
pub struct TokenRequester {
    http: HttpClient,
    token_url: String,
    identity: ClientIdentity,
    retry: ApiRetryExecutor,
}

impl TokenRequester {
    pub fn new(http: HttpClient, config: &ClientConfig, retry: ApiRetryExecutor) -> Self {
        Self {
            http,
            token_url: format!("{}{}", config.normalized_base_url(), TOKEN_PATH),
            identity: config.identity(),
            retry,
        }
    }

    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// POST `grant_type=client_credentials` under the retry driver.
    #[instrument(skip(self), fields(url = %self.token_url))]
    pub async fn request_token(&self) -> Result<TokenGrant> {
        self.retry.execute(|| self.attempt()).await
    }

    async fn attempt(&self) -> Result<TokenGrant> {
        let request = self
            .http
            .request(Method::POST, &self.token_url)
            .basic_auth(self.identity.client_id(), Some(self.identity.client_secret()))
            .form(&[("grant_type", CLIENT_CREDENTIALS_GRANT)]);

        let response = self.http.send(request).await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|err| IncogniaError::transport(format!("failed to read token response: {err}")))?;

        let grant: TokenGrant = serde_json::from_str(&body).map_err(|err| IncogniaError::Api {
            message: format!("Invalid token response: {err}"),
            status_code: status,
            payload: body.clone(),
        })?;

        debug!(token_type = %grant.token_type, expires_in = grant.expires_in, "token granted");
        Ok(grant)
    }
}

#[async_trait]
impl TokenFetcher for TokenRequester {
    async fn fetch_token(&self) -> Result<TokenGrant> {
        self.request_token().await
    }
}
