//! In-memory credential cache with coalesced refresh
//!
//! Manages the client-credentials token lifecycle:
//! - `Absent` until the first successful fetch
//! - `Valid` while `created_at + expires_in > now`
//! - `Expired` afterwards, until the next successful fetch
//!
//! A failed refresh leaves whatever was cached in place. Concurrent callers
//! that find the cache invalid wait on one refresh instead of each fetching.

use std::fmt;
use std::sync::Arc;

use incognia_common::time::{Clock, SystemClock};
use incognia_domain::{Credential, Result};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use super::auth::TokenFetcher;

/// Credential cache
pub struct TokenCache {
    fetcher: Arc<dyn TokenFetcher>,
    clock: Arc<dyn Clock>,
    credential: RwLock<Option<Arc<Credential>>>,
    /// Held for the duration of a fetch
    refresh_gate: Mutex<()>,
}

impl TokenCache {
    pub fn new(fetcher: Arc<dyn TokenFetcher>) -> Self {
        Self::with_clock(fetcher, Arc::new(SystemClock))
    }

    pub fn with_clock(fetcher: Arc<dyn TokenFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self { fetcher, clock, credential: RwLock::new(None), refresh_gate: Mutex::new(()) }
    }

    /// Return the cached credential if valid, otherwise fetch a new one.
    #[instrument(skip(self))]
    pub async fn get_token(&self) -> Result<Credential> {
        if let Some(credential) = self.valid_snapshot() {
            return Ok(credential);
        }

        let _gate = self.refresh_gate.lock().await;
        // Another caller may have refreshed while we waited on the gate.
        if let Some(credential) = self.valid_snapshot() {
            debug!("credential refreshed by concurrent caller");
            return Ok(credential);
        }

        self.refresh_locked().await
    }

    /// `false` when nothing is cached or the cached credential has expired.
    pub fn is_valid(&self) -> bool {
        self.valid_snapshot().is_some()
    }

    /// Unconditionally fetch and publish a new credential.
    ///
    /// # Errors
    /// Propagates the fetch error unchanged; the previous credential stays
    /// cached.
    pub async fn refresh(&self) -> Result<Credential> {
        let _gate = self.refresh_gate.lock().await;
        self.refresh_locked().await
    }

    /// Snapshot of the cached credential, valid or not.
    pub fn current(&self) -> Option<Credential> {
        self.credential.read().as_deref().cloned()
    }

    async fn refresh_locked(&self) -> Result<Credential> {
        let grant = match self.fetcher.fetch_token().await {
            Ok(grant) => grant,
            Err(err) => {
                warn!(error = %err, kind = err.kind().as_str(), "token refresh failed");
                return Err(err);
            }
        };

        let credential = Credential::from_grant(grant, self.clock.unix_seconds());
        info!(
            token_type = %credential.token_type,
            expires_in = credential.expires_in,
            expires_at = ?credential.expires_at(),
            "access token refreshed"
        );

        *self.credential.write() = Some(Arc::new(credential.clone()));
        Ok(credential)
    }

    fn valid_snapshot(&self) -> Option<Credential> {
        let now = self.clock.unix_seconds();
        self.credential
            .read()
            .as_deref()
            .filter(|credential| credential.is_valid_at(now))
            .cloned()
    }
}

impl fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenCache")
            .field("credential", &*self.credential.read())
            .finish_non_exhaustive()
    }
}
