// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Honeypot spam check.
//!
//! The contact form carries a field that is laid out off-screen, so people
//! never fill it in while form-filling bots usually do. A submission with
//! anything in it is treated as spam.

use serde_json::Value;
use tracing::debug;

/// Name of the hidden form field.
pub const HONEYPOT_FIELD: &str = "_hp_website";

/// Whether the body fills the honeypot field with a truthy value.
pub fn is_spam(body: &Value) -> bool {
    let hit = body
        .as_object()
        .and_then(|fields| fields.get(HONEYPOT_FIELD))
        .is_some_and(is_truthy);
    if hit {
        debug!(field = HONEYPOT_FIELD, "Honeypot field filled");
    }
    hit
}

/// JavaScript truthiness, which is what the form script submits against.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}
