//! Key case conversion between the library-facing and wire formats
//!
//! The API speaks snake_case; the library exposes camelCase. Conversion walks
//! a JSON tree and renames every object key, leaving scalars untouched:
//!
//! ```
//! use incognia_common::formatting::convert_keys_to_camel_case;
//! use serde_json::json;
//!
//! let wire = json!({"risk_assessment": "low_risk", "reasons": [{"reason_code": 1}]});
//! assert_eq!(
//!     convert_keys_to_camel_case(wire),
//!     json!({"riskAssessment": "low_risk", "reasons": [{"reasonCode": 1}]})
//! );
//! ```

use serde::Serialize;
use serde_json::{Map, Value};

/// Serialize `value` and convert its keys to snake_case.
///
/// Going through [`serde_json::to_value`] first gives every type its
/// canonical JSON form (dates become ISO-8601 strings) before keys are
/// renamed.
///
/// # Errors
/// Returns the serializer error if `value` cannot be represented as JSON.
pub fn to_snake_case<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value).map(convert_keys_to_snake_case)
}

/// Serialize `value` and convert its keys to camelCase.
///
/// # Errors
/// Returns the serializer error if `value` cannot be represented as JSON.
pub fn to_camel_case<T: Serialize + ?Sized>(value: &T) -> Result<Value, serde_json::Error> {
    serde_json::to_value(value).map(convert_keys_to_camel_case)
}

pub fn convert_keys_to_snake_case(value: Value) -> Value {
    map_keys(value, &snake_case)
}

pub fn convert_keys_to_camel_case(value: Value) -> Value {
    map_keys(value, &camel_case)
}

fn map_keys(value: Value, rename: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Array(items) => {
            Value::Array(items.into_iter().map(|item| map_keys(item, rename)).collect())
        }
        Value::Object(entries) => Value::Object(
            entries
                .into_iter()
                .map(|(key, nested)| (rename(&key), map_keys(nested, rename)))
                .collect::<Map<String, Value>>(),
        ),
        scalar => scalar,
    }
}

/// `paymentMethodIdentifier` -> `payment_method_identifier`
pub fn snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for (index, ch) in key.chars().enumerate() {
        if ch.is_ascii_uppercase() {
            if index > 0 {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out
}

/// `payment_method_identifier` -> `paymentMethodIdentifier`
///
/// Only an underscore followed by a lowercase letter or digit is folded; any
/// other underscore is kept as-is.
pub fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut chars = key.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '_' {
            if let Some(&next) = chars.peek() {
                if next.is_ascii_lowercase() || next.is_ascii_digit() {
                    out.push(next.to_ascii_uppercase());
                    chars.next();
                    continue;
                }
            }
        }
        out.push(ch);
    }
    out
}
