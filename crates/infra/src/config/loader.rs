//! Configuration loader
//!
//! ## Loading Strategy
//! 1. Environment variables, when the credentials are present
//! 2. Otherwise the first `incognia.toml` / `incognia.json` found by
//!    [`probe_config_paths`]
//!
//! ## Environment Variables
//! - `INCOGNIA_CLIENT_ID` (required)
//! - `INCOGNIA_CLIENT_SECRET` (required)
//! - `INCOGNIA_BASE_URL`
//! - `INCOGNIA_KEEP_ALIVE`: true/false
//! - `INCOGNIA_MAX_RETRIES`
//! - `INCOGNIA_RETRY_DELAY_MS`
//! - `INCOGNIA_TIMEOUT_MS`
//!
//! Every loaded config is validated; all failures are
//! [`IncogniaError::Usage`].

use std::path::{Path, PathBuf};
use std::str::FromStr;

use incognia_domain::{ClientConfig, IncogniaError, Result};

const CONFIG_FILE_STEM: &str = "incognia";

/// Load configuration from the environment, falling back to a config file.
///
/// The file is only consulted when neither credential variable is set.
///
/// # Errors
/// Returns [`IncogniaError::Usage`] if the environment names credentials but
/// is otherwise invalid, or if no valid config file is found.
pub fn load() -> Result<ClientConfig> {
    if optional_env("INCOGNIA_CLIENT_ID").is_none()
        && optional_env("INCOGNIA_CLIENT_SECRET").is_none()
    {
        tracing::debug!("No credentials in environment, trying file");
        return load_from_file(None);
    }

    let config = load_from_env()?;
    tracing::info!("Configuration loaded from environment variables");
    Ok(config)
}

/// Load configuration from `INCOGNIA_*` environment variables.
///
/// # Errors
/// Returns [`IncogniaError::Usage`] if a credential is missing or a value
/// does not parse.
pub fn load_from_env() -> Result<ClientConfig> {
    let mut config = ClientConfig::new(
        env_var("INCOGNIA_CLIENT_ID")?,
        env_var("INCOGNIA_CLIENT_SECRET")?,
    );

    if let Some(base_url) = optional_env("INCOGNIA_BASE_URL") {
        config.base_url = base_url;
    }
    config.keep_alive = env_bool("INCOGNIA_KEEP_ALIVE", config.keep_alive);
    if let Some(max_retries) = env_parse("INCOGNIA_MAX_RETRIES")? {
        config.max_retries = max_retries;
    }
    if let Some(delay) = env_parse("INCOGNIA_RETRY_DELAY_MS")? {
        config.retry_delay_ms = delay;
    }
    if let Some(timeout) = env_parse("INCOGNIA_TIMEOUT_MS")? {
        config.timeout_ms = timeout;
    }

    config.validate()?;
    Ok(config)
}

/// Load configuration from a file, probing standard locations when `path`
/// is `None`.
///
/// # Errors
/// Returns [`IncogniaError::Usage`] if the file is missing, unreadable,
/// malformed, or describes an invalid config.
pub fn load_from_file(path: Option<PathBuf>) -> Result<ClientConfig> {
    let config_path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(IncogniaError::usage(format!(
                    "Config file not found: {}",
                    p.display()
                )));
            }
            p
        }
        None => probe_config_paths().ok_or_else(|| {
            IncogniaError::usage("No incognia.toml or incognia.json found in the working directory")
        })?,
    };

    tracing::info!(path = %config_path.display(), "Loading configuration from file");

    let contents = std::fs::read_to_string(&config_path)
        .map_err(|e| IncogniaError::usage(format!("Failed to read config file: {e}")))?;

    let config = parse_config(&contents, &config_path)?;
    config.validate()?;
    Ok(config)
}

/// Format is picked by extension: `.toml` or `.json`, with no extension read
/// as JSON. Any other extension is rejected.
fn parse_config(contents: &str, path: &Path) -> Result<ClientConfig> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or("json");

    match extension {
        "toml" => toml::from_str(contents)
            .map_err(|e| IncogniaError::usage(format!("Invalid TOML config: {e}"))),
        "json" => serde_json::from_str(contents)
            .map_err(|e| IncogniaError::usage(format!("Invalid JSON config: {e}"))),
        other => Err(IncogniaError::usage(format!("Unsupported config format: {other}"))),
    }
}

/// First existing `incognia.toml` or `incognia.json` in the working
/// directory.
pub fn probe_config_paths() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    probe_in(&cwd)
}

fn probe_in(dir: &Path) -> Option<PathBuf> {
    ["toml", "json"]
        .iter()
        .map(|ext| dir.join(format!("{CONFIG_FILE_STEM}.{ext}")))
        .find(|path| path.is_file())
}

fn env_var(key: &str) -> Result<String> {
    optional_env(key)
        .ok_or_else(|| IncogniaError::usage(format!("Missing required environment variable: {key}")))
}

/// Unset and empty are treated alike.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn env_parse<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    optional_env(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| IncogniaError::usage(format!("Invalid value for {key}: {e}")))
        })
        .transpose()
}

/// Accepts `1`/`0`, `true`/`false`, `yes`/`no`, `on`/`off` (case-insensitive).
fn env_bool(key: &str, default: bool) -> bool {
    optional_env(key)
        .map(|s| matches!(s.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
        .unwrap_or(default)
}
