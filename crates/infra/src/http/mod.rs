//! HTTP transport
//!
//! One shared reqwest client per pipeline. This layer performs single
//! attempts only; retries are decided above it by the request pipeline.

pub mod client;

pub use client::{build_user_agent, HttpClient, HttpClientBuilder};
