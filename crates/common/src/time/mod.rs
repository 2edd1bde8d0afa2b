//! Time abstractions
//!
//! ```rust
//! use std::time::Duration;
//!
//! use incognia_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at_unix_seconds(1_000);
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(clock.unix_seconds(), 1_005);
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
