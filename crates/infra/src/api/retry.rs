//! Retry eligibility for API calls

use std::fmt;
use std::sync::Arc;

use incognia_common::resilience::{RetryConfig, RetryDecision, RetryExecutor, RetryPolicy};
use incognia_domain::{ClientConfig, IncogniaError};

/// Caller-supplied override for which failures are retried.
///
/// Never consulted for [`IncogniaError::Usage`].
pub type RetryPredicate = Arc<dyn Fn(&IncogniaError) -> bool + Send + Sync>;

/// Retry driver shared by the token request and resource requests
pub type ApiRetryExecutor = RetryExecutor<RetryEligibility>;

/// Default eligibility is [`IncogniaError::is_retryable`]: transport
/// failures and 5xx responses.
#[derive(Clone, Default)]
pub struct RetryEligibility {
    predicate: Option<RetryPredicate>,
}

impl RetryEligibility {
    pub fn new(predicate: Option<RetryPredicate>) -> Self {
        Self { predicate }
    }

    pub fn is_eligible(&self, error: &IncogniaError) -> bool {
        if error.is_usage() {
            return false;
        }
        match &self.predicate {
            Some(predicate) => predicate(error),
            None => error.is_retryable(),
        }
    }
}

impl fmt::Debug for RetryEligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryEligibility")
            .field("custom_predicate", &self.predicate.is_some())
            .finish()
    }
}

impl RetryPolicy<IncogniaError> for RetryEligibility {
    fn should_retry(&self, error: &IncogniaError, _attempt: u32) -> RetryDecision {
        if self.is_eligible(error) {
            RetryDecision::Retry
        } else {
            RetryDecision::Stop
        }
    }
}

/// Fixed-delay driver with `config.max_retries` retries.
pub fn retry_executor(config: &ClientConfig, predicate: Option<RetryPredicate>) -> ApiRetryExecutor {
    RetryExecutor::new(
        RetryConfig::fixed(config.max_retries, config.retry_delay()),
        RetryEligibility::new(predicate),
    )
}
