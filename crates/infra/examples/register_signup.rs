//! Example: registering a signup and reading back its assessment
//!
//! # Setup
//!
//! ```bash
//! export INCOGNIA_CLIENT_ID=...
//! export INCOGNIA_CLIENT_SECRET=...
//! cargo run -p incognia-infra --example register_signup -- <installation-id>
//! ```
//!
//! Any other `INCOGNIA_*` variable (see `incognia_infra::config::loader`)
//! is honoured, and an `incognia.toml` in the working directory is used
//! when the environment has no credentials.

use incognia_domain::RegisterSignupProps;
use incognia_infra::{config, IncogniaApi};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let installation_id = std::env::args()
        .nth(1)
        .ok_or_else(|| anyhow::anyhow!("usage: register_signup <installation-id>"))?;

    let config = config::load()?;
    info!(base_url = %config.base_url, max_retries = config.max_retries, "client configured");

    let api = IncogniaApi::new(config)?;
    let props = RegisterSignupProps { installation_id, ..Default::default() };

    let signup = api.register_signup(&props).await?;
    info!(id = %signup.id, risk = ?signup.risk_assessment, reasons = signup.reasons.len(), "signup registered");

    let assessment = api.get_signup_assessment(&signup.id).await?;
    info!(risk = ?assessment.risk_assessment, "assessment fetched");

    Ok(())
}
