//! Incognia API client
//!
//! - [`auth`]: OAuth2 client-credentials token requests
//! - [`token`]: credential cache with coalesced refresh
//! - [`client`]: authenticated, retrying request pipeline
//! - [`resources`]: request builders with input validation
//! - [`service`]: the [`IncogniaApi`] facade

pub mod auth;
pub mod client;
pub mod resources;
pub mod retry;
pub mod service;
pub mod token;

pub use auth::{TokenFetcher, TokenRequester};
pub use client::{RequestPipeline, RequestPipelineBuilder};
pub use retry::{RetryEligibility, RetryPredicate};
pub use service::IncogniaApi;
pub use token::TokenCache;
