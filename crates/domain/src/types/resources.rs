//! Resource request props and response bodies
//!
//! Props are library-facing: fields serialize in camelCase and the request
//! builders convert them to the snake_case wire form. Each props type has
//! explicit optional fields plus one `extra` map for fields this release does
//! not model. Nested business structures (addresses, payment values, device
//! evidence) are carried as opaque JSON.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::enums::{FeedbackEvent, RiskAssessment};

/// Mobile signup registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterSignupProps {
    pub installation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_line: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address_coordinates: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub structured_address: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Web signup registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWebSignupProps {
    pub session_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Mobile login registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterLoginProps {
    pub installation_id: String,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Vec<Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Web login registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterWebLoginProps {
    pub session_token: String,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Payment registration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterPaymentProps {
    pub installation_id: String,
    pub account_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub related_account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub addresses: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_value: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_methods: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coupon: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Feedback body
///
/// `event` is required, plus either `timestamp` (unix milliseconds) or
/// `occurred_at`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFeedbackProps {
    pub event: FeedbackEvent,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub occurred_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub login_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signup_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RegisterFeedbackProps {
    pub fn new(event: FeedbackEvent) -> Self {
        Self {
            event,
            timestamp: None,
            occurred_at: None,
            expires_at: None,
            account_id: None,
            installation_id: None,
            session_token: None,
            request_token: None,
            login_id: None,
            payment_id: None,
            signup_id: None,
            extra: Map::new(),
        }
    }
}

/// Feedback query parameters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackQueryParams {
    pub dry_run: bool,
}

/// Account search filters; at least one identifier must be set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchAccountsProps {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub installation_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_token: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reason {
    pub code: String,
    pub source: String,
}

/// Signup and transaction assessment, decoded from a camelCased body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub id: String,
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub installation_id: Option<String>,
    #[serde(default)]
    pub request_id: Option<String>,
    pub risk_assessment: RiskAssessment,
    #[serde(default)]
    pub reasons: Vec<Reason>,
    #[serde(default)]
    pub evidence: Option<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Account search result, decoded from a camelCased body
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSearchResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub accounts: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
