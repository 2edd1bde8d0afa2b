//! # Incognia Infrastructure
//!
//! Network-facing implementation of the Incognia API client.
//!
//! This crate contains:
//! - The reqwest-backed [`http::HttpClient`]
//! - Token requests, the credential cache and the retrying request pipeline
//! - Resource builders and the [`IncogniaApi`] facade
//! - Configuration loading from the environment or a file
//!
//! ## Architecture
//! - Types and errors come from `incognia-domain`
//! - Retry, clock and key formatting come from `incognia-common`
//! - Contains all "impure" code (network, filesystem, environment)

pub mod api;
pub mod config;
pub mod http;

// Re-export commonly used items
pub use api::{IncogniaApi, RequestPipeline, TokenCache};
pub use http::HttpClient;
pub use incognia_domain::{ClientConfig, IncogniaError, Result};
