//! Attribute validation helpers.
//!
//! Free functions that check one rule on a JSON value and report a human
//! message on rejection. They pair with `Errors::add` inside a form's
//! `validate` hook:
//!
//! ```
//! use formwork::{validate, Errors};
//! use serde_json::Value;
//!
//! let mut errors = Errors::new();
//! if let Err(message) = validate::presence(&Value::Null) {
//!     errors.add("name", message);
//! }
//! assert_eq!(errors.get("name"), ["can't be blank"]);
//! ```
//!
//! Checks other than [`presence`] skip values of the wrong shape, so a
//! missing value fails presence once instead of every rule at once.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap());

/// Reject null, blank strings and empty collections
pub fn presence(value: &Value) -> Result<(), String> {
    let blank = match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    };
    if blank {
        Err("can't be blank".to_string())
    } else {
        Ok(())
    }
}

/// Reject strings shorter than `minimum` characters
pub fn min_length(value: &Value, minimum: usize) -> Result<(), String> {
    match value.as_str() {
        Some(s) if s.chars().count() < minimum => Err(format!(
            "is too short (minimum is {} characters)",
            minimum
        )),
        _ => Ok(()),
    }
}

/// Reject strings longer than `maximum` characters
pub fn max_length(value: &Value, maximum: usize) -> Result<(), String> {
    match value.as_str() {
        Some(s) if s.chars().count() > maximum => Err(format!(
            "is too long (maximum is {} characters)",
            maximum
        )),
        _ => Ok(()),
    }
}

/// Reject strings that do not match the pattern
pub fn format(value: &Value, pattern: &Regex) -> Result<(), String> {
    match value.as_str() {
        Some(s) if !pattern.is_match(s) => Err("is invalid".to_string()),
        _ => Ok(()),
    }
}

/// Reject strings that do not look like an email address
pub fn email(value: &Value) -> Result<(), String> {
    match value.as_str() {
        Some(s) if !EMAIL_REGEX.is_match(s) => Err("is not a valid email address".to_string()),
        _ => Ok(()),
    }
}

/// Reject numbers below `minimum`
pub fn min(value: &Value, minimum: f64) -> Result<(), String> {
    match value.as_f64() {
        Some(n) if n < minimum => Err(format!("must be greater than or equal to {}", minimum)),
        _ => Ok(()),
    }
}

/// Reject numbers above `maximum`
pub fn max(value: &Value, maximum: f64) -> Result<(), String> {
    match value.as_f64() {
        Some(n) if n > maximum => Err(format!("must be less than or equal to {}", maximum)),
        _ => Ok(()),
    }
}
