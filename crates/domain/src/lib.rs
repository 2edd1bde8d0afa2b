//! # Incognia Domain
//!
//! Data types shared by the Incognia client crates.
//!
//! This crate contains:
//! - The cached [`Credential`] and the token endpoint's [`TokenGrant`]
//! - [`RequestDescriptor`], the transport-agnostic shape of one API call
//! - Resource props and response bodies, plus the enum catalogs
//! - [`ClientConfig`] and the [`IncogniaError`] taxonomy
//!
//! ## Architecture
//! - No dependencies on other Incognia crates
//! - No I/O

pub mod config;
pub mod constants;
pub mod errors;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
