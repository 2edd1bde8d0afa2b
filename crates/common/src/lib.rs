//! Common utilities shared across the Incognia client crates.
//!
//! - [`formatting`]: snake_case / camelCase key conversion for JSON trees
//! - [`resilience`]: the generic retry driver
//! - [`time`]: clock abstraction with a controllable mock

#![forbid(unsafe_code)]
#![warn(rust_2018_idioms)]
#![warn(clippy::all, clippy::perf, clippy::complexity, clippy::suspicious)]

pub mod formatting;
pub mod resilience;
pub mod time;

pub use formatting::{convert_keys_to_camel_case, convert_keys_to_snake_case};
pub use resilience::{RetryConfig, RetryExecutor, RetryPolicy};
pub use time::{Clock, MockClock, SystemClock};
