//! Resilience patterns for transient failures
//!
//! The [`retry`] module provides a generic retry driver: an attempt budget,
//! a backoff strategy, and a [`RetryPolicy`] that decides per error whether
//! another attempt is worth making. It is generic over the operation's error
//! type and never wraps the error it finally returns.

pub mod retry;

pub use retry::{
    policies, BackoffStrategy, RetryConfig, RetryDecision, RetryExecutor, RetryOutcome,
    RetryPolicy,
};
