//! OAuth client-credentials types
//!
//! A [`TokenGrant`] is what the token endpoint returns; a [`Credential`] is
//! that grant stamped with the local time it was received.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Deserializer};

/// Cached bearer credential
///
/// Valid while `created_at + expires_in > now`. There is no leeway: at the
/// exact expiry second the credential is already expired.
#[derive(Clone, PartialEq, Eq)]
pub struct Credential {
    pub access_token: String,
    pub token_type: String,
    /// Unix seconds at which the grant was received
    pub created_at: i64,
    /// Lifetime declared by the server, in seconds
    pub expires_in: i64,
}

impl Credential {
    pub fn from_grant(grant: TokenGrant, created_at: i64) -> Self {
        Self {
            access_token: grant.access_token,
            token_type: grant.token_type,
            created_at,
            expires_in: grant.expires_in,
        }
    }

    /// Unix second at which the credential stops being valid.
    #[must_use]
    pub fn expiration_limit(&self) -> i64 {
        self.created_at.saturating_add(self.expires_in)
    }

    #[must_use]
    pub fn is_valid_at(&self, now_unix_seconds: i64) -> bool {
        self.expiration_limit() > now_unix_seconds
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_opt(self.expiration_limit(), 0).single()
    }

    /// Value of the `Authorization` header, e.g. `Bearer abc`.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credential")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("created_at", &self.created_at)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// Token endpoint response body
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TokenGrant {
    pub access_token: String,
    pub token_type: String,
    #[serde(deserialize_with = "deserialize_expires_in")]
    pub expires_in: i64,
}

impl fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenGrant")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

/// `expires_in` arrives either as a JSON number or as a numeric string.
fn deserialize_expires_in<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(value) => Ok(value),
        NumberOrString::String(value) => value.trim().parse::<i64>().map_err(|e| {
            serde::de::Error::custom(format!("invalid expires_in value '{value}': {e}"))
        }),
    }
}

/// OAuth client identity used for HTTP Basic auth on the token endpoint
#[derive(Clone, PartialEq, Eq)]
pub struct ClientIdentity {
    client_id: String,
    client_secret: String,
}

impl ClientIdentity {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self { client_id: client_id.into(), client_secret: client_secret.into() }
    }

    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }
}

impl fmt::Debug for ClientIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientIdentity")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}
