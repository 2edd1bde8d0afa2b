//! Client constants
//!
//! Endpoint paths and configuration defaults shared by every crate.

pub const DEFAULT_BASE_URL: &str = "https://api.incognia.com/api";

// Endpoint paths, relative to the base URL
pub const TOKEN_PATH: &str = "/v2/token";
pub const SIGNUPS_PATH: &str = "/v2/onboarding/signups";
pub const TRANSACTIONS_PATH: &str = "/v2/authentication/transactions";
pub const FEEDBACKS_PATH: &str = "/v2/feedbacks";
pub const ACCOUNT_SEARCH_PATH: &str = "/v2/accounts/search";

// Requester defaults
pub const DEFAULT_MAX_RETRIES: u32 = 0;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 200;
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const LIBRARY_NAME: &str = "incognia-rust";
pub const CLIENT_CREDENTIALS_GRANT: &str = "client_credentials";
