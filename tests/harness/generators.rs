// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Test data generators for attack simulation.

use serde_json::{json, Value};
use std::net::{IpAddr, Ipv4Addr};

/// Generate a pool of client addresses for testing.
pub fn generate_ips(count: usize) -> Vec<IpAddr> {
    (0..count)
        .map(|i| {
            // Use 10.x.x.x private range
            let a = ((i >> 16) & 0xFF) as u8;
            let b = ((i >> 8) & 0xFF) as u8;
            let c = (i & 0xFF) as u8;
            IpAddr::V4(Ipv4Addr::new(10, a, b, c))
        })
        .collect()
}

/// A submission that passes validation.
pub fn valid_submission(i: usize) -> Value {
    json!({
        "name": format!("Visitor {i}"),
        "email": format!("visitor{i}@example.com"),
        "company": "Example SRL",
        "message": format!("Hello, I would like a penetration test quote (#{i})."),
    })
}

/// A valid-looking submission with the honeypot filled, as a bot sends it.
pub fn bot_submission(i: usize) -> Value {
    let mut body = valid_submission(i);
    body["_hp_website"] = json!(format!("http://cheap-seo-{i}.example"));
    body
}

/// Bodies that must never reach the mailer.
pub fn generate_invalid_payloads() -> Vec<(&'static str, String)> {
    vec![
        ("empty", String::new()),
        ("truncated json", r#"{"name": "Al""#.to_string()),
        ("not json", "name=Al&email=a@b.com".to_string()),
        ("null", "null".to_string()),
        ("array", r#"[{"name":"Al"}]"#.to_string()),
        ("string", r#""hello""#.to_string()),
        ("empty object", "{}".to_string()),
        (
            "short name",
            json!({"name": "A", "email": "a@b.com", "message": "1234567890"}).to_string(),
        ),
        (
            "bracket-only name",
            json!({"name": "<>", "email": "a@b.com", "message": "1234567890"}).to_string(),
        ),
        (
            "bad email",
            json!({"name": "Al", "email": "a@b", "message": "1234567890"}).to_string(),
        ),
        (
            "numeric company",
            json!({"name": "Al", "email": "a@b.com", "company": 5, "message": "1234567890"})
                .to_string(),
        ),
        (
            "huge message",
            json!({"name": "Al", "email": "a@b.com", "message": "x".repeat(5001)}).to_string(),
        ),
        (
            "message type confusion",
            json!({"name": "Al", "email": "a@b.com", "message": ["1234567890"]}).to_string(),
        ),
    ]
}

/// Markup injection attempts in otherwise valid submissions.
pub fn generate_markup_payloads() -> Vec<Value> {
    vec![
        json!({
            "name": "<script>alert(1)</script>Eve",
            "email": "eve@example.com",
            "message": "<img src=x onerror=alert(1)> please call me",
        }),
        json!({
            "name": "Mallory",
            "email": "<mallory@example.com>",
            "company": "<b>Evil</b> Corp",
            "message": "<<<>>> a perfectly normal message >>><<<",
        }),
        json!({
            "name": "  Trudy  ",
            "email": "  trudy@example.com ",
            "message": "\"quotes\" & 'ampersands' & <tags>",
        }),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_ips() {
        let ips = generate_ips(256);
        assert_eq!(ips.len(), 256);
        // All should be unique
        let unique: std::collections::HashSet<_> = ips.iter().collect();
        assert_eq!(unique.len(), 256);
    }

    #[test]
    fn test_bot_submission_fills_honeypot() {
        let body = bot_submission(3);
        assert!(body["_hp_website"].as_str().is_some_and(|v| !v.is_empty()));
    }
}
