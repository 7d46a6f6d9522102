// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Contact form payload validator.
//!
//! Turns an untrusted JSON body into a [`ContactMessage`] or the first
//! reason it was rejected. Checks run in a fixed order and stop at the
//! first failure:
//! - body must be a JSON object
//! - name: 2..=100 characters
//! - email: basic `local@domain.tld` shape
//! - company (optional): string, at most 200 characters
//! - message: 10..=5000 characters
//!
//! Length bounds are measured on the trimmed input. Every accepted field
//! then has `<` and `>` stripped and is trimmed again; minimum lengths and
//! the email shape are rechecked on that sanitized form so the output
//! always satisfies them.

use regex::Regex;
use serde_json::Value;
use std::ops::RangeInclusive;
use std::sync::OnceLock;
use thiserror::Error;
use tracing::debug;

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 100;
pub const COMPANY_MAX: usize = 200;
pub const MESSAGE_MIN: usize = 10;
pub const MESSAGE_MAX: usize = 5000;

/// Validation error types. The display strings are shown to the submitter.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid request body.")]
    InvalidBody,

    #[error("Name must be at least 2 characters.")]
    NameTooShort,

    #[error("Name must be under 100 characters.")]
    NameTooLong,

    #[error("Please provide a valid email address.")]
    InvalidEmail,

    #[error("Invalid company field.")]
    InvalidCompany,

    #[error("Company name must be under 200 characters.")]
    CompanyTooLong,

    #[error("Message must be at least 10 characters.")]
    MessageTooShort,

    #[error("Message must be under 5000 characters.")]
    MessageTooLong,
}

/// A validated, sanitized contact submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactMessage {
    pub name: String,
    pub email: String,
    pub company: Option<String>,
    pub message: String,
}

/// Strip angle brackets, then trim.
pub fn sanitize(input: &str) -> String {
    input
        .chars()
        .filter(|c| !matches!(c, '<' | '>'))
        .collect::<String>()
        .trim()
        .to_string()
}

/// Simplified address grammar: no whitespace, one `@`, a dot in the domain.
pub fn is_valid_email(email: &str) -> bool {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL
        .get_or_init(|| {
            // constant pattern
            Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
        })
        .is_match(email)
}

/// Validate a raw submission body.
pub fn validate(body: &Value) -> Result<ContactMessage, ValidationError> {
    let Value::Object(fields) = body else {
        debug!("Submission body is not a JSON object");
        return Err(ValidationError::InvalidBody);
    };

    let name = fields
        .get("name")
        .and_then(Value::as_str)
        .ok_or(ValidationError::NameTooShort)
        .and_then(|raw| {
            bounded(
                raw,
                NAME_MIN..=NAME_MAX,
                ValidationError::NameTooShort,
                ValidationError::NameTooLong,
            )
        })?;

    let email = fields
        .get("email")
        .and_then(Value::as_str)
        .filter(|raw| is_valid_email(raw.trim()))
        .map(sanitize)
        .filter(|email| is_valid_email(email))
        .ok_or(ValidationError::InvalidEmail)?;

    let company = match fields.get("company") {
        None => None,
        Some(Value::String(raw)) => {
            if raw.trim().chars().count() > COMPANY_MAX {
                return Err(ValidationError::CompanyTooLong);
            }
            Some(sanitize(raw)).filter(|c| !c.is_empty())
        }
        Some(_) => return Err(ValidationError::InvalidCompany),
    };

    let message = fields
        .get("message")
        .and_then(Value::as_str)
        .ok_or(ValidationError::MessageTooShort)
        .and_then(|raw| {
            bounded(
                raw,
                MESSAGE_MIN..=MESSAGE_MAX,
                ValidationError::MessageTooShort,
                ValidationError::MessageTooLong,
            )
        })?;

    let name_len = name.chars().count();
    let message_len = message.chars().count();
    debug!(
        name_len,
        message_len,
        has_company = company.is_some(),
        "Submission valid"
    );
    Ok(ContactMessage {
        name,
        email,
        company,
        message,
    })
}

/// Check `raw.trim()` against `bounds`, then sanitize. Stripping markup can
/// only shorten a field, so only the minimum is checked again afterwards.
fn bounded(
    raw: &str,
    bounds: RangeInclusive<usize>,
    too_short: ValidationError,
    too_long: ValidationError,
) -> Result<String, ValidationError> {
    let len = raw.trim().chars().count();
    if len < *bounds.start() {
        return Err(too_short);
    }
    if len > *bounds.end() {
        return Err(too_long);
    }

    let clean = sanitize(raw);
    if clean.chars().count() < *bounds.start() {
        return Err(too_short);
    }
    Ok(clean)
}
