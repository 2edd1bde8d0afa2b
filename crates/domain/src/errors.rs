//! Error types used throughout the client
//!
//! Every failure a caller can observe is one of three kinds:
//! - [`IncogniaError::Api`]: the remote endpoint answered with a non-2xx
//!   status
//! - [`IncogniaError::Transport`]: the request was sent but no response
//!   arrived (connection failure, timeout, truncated body)
//! - [`IncogniaError::Usage`]: the caller supplied invalid input or
//!   configuration, detected before any network activity

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Main error type for the Incognia client
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "details")]
pub enum IncogniaError {
    #[error("{message}")]
    Api { message: String, status_code: u16, payload: String },

    #[error("The request was made but no response was received ({message})")]
    Transport { message: String },

    #[error("{0}")]
    Usage(String),
}

/// Stable labels for logging and metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Api,
    Transport,
    Usage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Api => "api",
            Self::Transport => "transport",
            Self::Usage => "usage",
        }
    }
}

impl IncogniaError {
    /// Build an [`IncogniaError::Api`] from a response status and raw body.
    pub fn api(status_code: u16, payload: impl Into<String>) -> Self {
        Self::Api {
            message: format!("Request failed with status code {status_code}"),
            status_code,
            payload: payload.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport { message: message.into() }
    }

    pub fn usage(message: impl Into<String>) -> Self {
        Self::Usage(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Api { .. } => ErrorKind::Api,
            Self::Transport { .. } => ErrorKind::Transport,
            Self::Usage(_) => ErrorKind::Usage,
        }
    }

    /// HTTP status of an API failure, `None` for the other kinds.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Api { status_code, .. } => Some(*status_code),
            _ => None,
        }
    }

    /// Raw response body of an API failure.
    pub fn payload(&self) -> Option<&str> {
        match self {
            Self::Api { payload, .. } => Some(payload.as_str()),
            _ => None,
        }
    }

    pub fn is_usage(&self) -> bool {
        matches!(self, Self::Usage(_))
    }

    /// Default retry eligibility.
    ///
    /// Transport failures and 5xx responses are retryable. Client errors are
    /// not: a repeated 4xx wastes an attempt and may duplicate a
    /// non-idempotent registration. Usage errors are never retryable.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport { .. } => true,
            Self::Api { status_code, .. } => *status_code >= 500,
            Self::Usage(_) => false,
        }
    }
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, IncogniaError>;
