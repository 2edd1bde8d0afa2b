//! Resource request builders
//!
//! Each builder validates the caller's props, converts the body to the
//! snake_case wire form and returns a [`RequestDescriptor`]. Validation
//! failures are [`IncogniaError::Usage`] and happen before any network call.

use incognia_common::formatting::to_snake_case;
use incognia_domain::constants::{
    ACCOUNT_SEARCH_PATH, FEEDBACKS_PATH, SIGNUPS_PATH, TRANSACTIONS_PATH,
};
use incognia_domain::{
    FeedbackQueryParams, IncogniaError, RegisterFeedbackProps, RegisterLoginProps,
    RegisterPaymentProps, RegisterSignupProps, RegisterWebLoginProps, RegisterWebSignupProps,
    RequestDescriptor, Result, SearchAccountsProps, TransactionType,
};
use serde::Serialize;
use serde_json::Value;

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

fn is_blank_opt(value: Option<&String>) -> bool {
    value.map_or(true, |v| is_blank(v))
}

fn wire_body<T: Serialize>(props: &T) -> Result<Value> {
    to_snake_case(props)
        .map_err(|err| IncogniaError::usage(format!("Failed to serialize request body: {err}")))
}

fn transaction_body<T: Serialize>(props: &T, kind: TransactionType) -> Result<Value> {
    let mut body = wire_body(props)?;
    if let Value::Object(fields) = &mut body {
        fields.insert("type".to_string(), wire_body(&kind)?);
    }
    Ok(body)
}

/// `POST /v2/onboarding/signups`
pub fn register_signup(base_url: &str, props: &RegisterSignupProps) -> Result<RequestDescriptor> {
    if is_blank(&props.installation_id) {
        return Err(IncogniaError::usage("No installationId provided"));
    }
    Ok(RequestDescriptor::post(format!("{base_url}{SIGNUPS_PATH}"), wire_body(props)?))
}

/// `POST /v2/onboarding/signups` for web sessions
pub fn register_web_signup(
    base_url: &str,
    props: &RegisterWebSignupProps,
) -> Result<RequestDescriptor> {
    if is_blank(&props.session_token) {
        return Err(IncogniaError::usage("No sessionToken provided"));
    }
    Ok(RequestDescriptor::post(format!("{base_url}{SIGNUPS_PATH}"), wire_body(props)?))
}

/// `GET /v2/onboarding/signups/{signup_id}`
pub fn get_signup_assessment(base_url: &str, signup_id: &str) -> Result<RequestDescriptor> {
    if is_blank(signup_id) {
        return Err(IncogniaError::usage("No signupId provided"));
    }

    let mut url = url::Url::parse(&format!("{base_url}{SIGNUPS_PATH}"))
        .map_err(|err| IncogniaError::usage(format!("Invalid base URL '{base_url}': {err}")))?;
    url.path_segments_mut()
        .map_err(|()| IncogniaError::usage(format!("Invalid base URL '{base_url}'")))?
        .push(signup_id);

    Ok(RequestDescriptor::get(url.to_string()))
}

/// `POST /v2/authentication/transactions` with `type = login`
pub fn register_login(base_url: &str, props: &RegisterLoginProps) -> Result<RequestDescriptor> {
    if is_blank(&props.installation_id) || is_blank(&props.account_id) {
        return Err(IncogniaError::usage("No installationId or accountId provided"));
    }
    let body = transaction_body(props, TransactionType::Login)?;
    Ok(RequestDescriptor::post(format!("{base_url}{TRANSACTIONS_PATH}"), body))
}

/// `POST /v2/authentication/transactions` with `type = login` for web sessions
pub fn register_web_login(
    base_url: &str,
    props: &RegisterWebLoginProps,
) -> Result<RequestDescriptor> {
    if is_blank(&props.session_token) || is_blank(&props.account_id) {
        return Err(IncogniaError::usage("No sessionToken or accountId provided"));
    }
    let body = transaction_body(props, TransactionType::Login)?;
    Ok(RequestDescriptor::post(format!("{base_url}{TRANSACTIONS_PATH}"), body))
}

/// `POST /v2/authentication/transactions` with `type = payment`
pub fn register_payment(base_url: &str, props: &RegisterPaymentProps) -> Result<RequestDescriptor> {
    if is_blank(&props.installation_id) || is_blank(&props.account_id) {
        return Err(IncogniaError::usage("No installationId or accountId provided"));
    }
    let body = transaction_body(props, TransactionType::Payment)?;
    Ok(RequestDescriptor::post(format!("{base_url}{TRANSACTIONS_PATH}"), body))
}

/// `POST /v2/feedbacks`, optionally with `?dry_run=`
pub fn register_feedback(
    base_url: &str,
    props: &RegisterFeedbackProps,
    query: Option<FeedbackQueryParams>,
) -> Result<RequestDescriptor> {
    if props.timestamp.is_none() && props.occurred_at.is_none() {
        return Err(IncogniaError::usage("No event or timestamp provided"));
    }

    let mut descriptor =
        RequestDescriptor::post(format!("{base_url}{FEEDBACKS_PATH}"), wire_body(props)?);
    if let Some(query) = query {
        if let Value::Object(params) = wire_body(&query)? {
            descriptor = descriptor.with_query(params);
        }
    }
    Ok(descriptor)
}

/// `POST /v2/accounts/search`
pub fn search_accounts(base_url: &str, props: &SearchAccountsProps) -> Result<RequestDescriptor> {
    if is_blank_opt(props.installation_id.as_ref()) && is_blank_opt(props.request_token.as_ref()) {
        return Err(IncogniaError::usage("No installationId or requestToken provided"));
    }
    Ok(RequestDescriptor::post(format!("{base_url}{ACCOUNT_SEARCH_PATH}"), wire_body(props)?))
}
