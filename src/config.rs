// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the contact relay.
//!
//! Everything is read from environment variables at startup. Mail delivery
//! settings are kept as options and only resolved when a message is about
//! to be sent, so a half-configured process still answers rate-limit and
//! validation failures instead of refusing to boot.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration for the contact relay service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:3000)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    /// SMTP delivery configuration
    #[serde(default)]
    pub mail: MailConfig,

    /// Metrics configuration
    #[serde(default)]
    pub metrics: MetricsConfig,

    /// Origins allowed to post cross-origin. Empty disables CORS.
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Fixed-window rate limiting per client key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Submissions allowed per window (default: 5)
    #[serde(default = "default_max_submissions")]
    pub max_submissions: u32,

    /// Window length in seconds (default: 900)
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,

    /// Upper bound on tracked client keys (default: 10000)
    #[serde(default = "default_max_tracked_clients")]
    pub max_tracked_clients: usize,

    /// How often expired windows are swept, in seconds (default: 60)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

/// SMTP delivery settings as found in the environment.
#[derive(Clone, Serialize, Deserialize)]
pub struct MailConfig {
    pub host: Option<String>,
    pub port: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,

    /// Display name used in the From header
    #[serde(default = "default_sender_name")]
    pub sender_name: String,

    /// Accept self-signed or mismatched certificates (default: false)
    #[serde(default)]
    pub accept_invalid_certs: bool,

    /// SMTP command timeout in seconds (default: 30)
    #[serde(default = "default_smtp_timeout_secs")]
    pub timeout_secs: u64,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

/// Fully resolved SMTP settings, ready for a transport.
#[derive(Clone, PartialEq, Eq)]
pub struct DeliverySettings {
    pub host: String,
    pub port: u16,
    pub username: String,
    pub password: String,
    pub from_address: String,
    pub to_address: String,
    pub sender_name: String,
    pub accept_invalid_certs: bool,
    pub timeout: Duration,
}

/// Delivery configuration problems. Logged server-side only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing SMTP setting: {0}")]
    Missing(&'static str),

    #[error("Invalid SMTP_PORT value: {0:?}")]
    InvalidPort(String),
}

// Default value functions
fn default_bind_addr() -> String {
    "0.0.0.0:3000".to_string()
}

fn default_max_submissions() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_max_tracked_clients() -> usize {
    10_000
}

fn default_sweep_interval_secs() -> u64 {
    60
}

fn default_sender_name() -> String {
    "SECFORIT Contact".to_string()
}

fn default_smtp_timeout_secs() -> u64 {
    30
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limit: RateLimitConfig::default(),
            mail: MailConfig::default(),
            metrics: MetricsConfig::default(),
            cors_origins: Vec::new(),
        }
    }
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_submissions: default_max_submissions(),
            window_secs: default_window_secs(),
            max_tracked_clients: default_max_tracked_clients(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            host: None,
            port: None,
            username: None,
            password: None,
            from_address: None,
            to_address: None,
            sender_name: default_sender_name(),
            accept_invalid_certs: false,
            timeout_secs: default_smtp_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl std::fmt::Debug for MailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .field("sender_name", &self.sender_name)
            .field("accept_invalid_certs", &self.accept_invalid_certs)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for DeliverySettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeliverySettings")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("from_address", &self.from_address)
            .field("to_address", &self.to_address)
            .finish_non_exhaustive()
    }
}

impl Config {
    /// Load configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| non_blank(&lookup, key);

        let defaults = Self::default();
        Self {
            bind_addr: var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            rate_limit: RateLimitConfig {
                max_submissions: parsed(&lookup, "RATE_LIMIT_MAX")
                    .unwrap_or(defaults.rate_limit.max_submissions),
                window_secs: parsed(&lookup, "RATE_LIMIT_WINDOW_SECS")
                    .unwrap_or(defaults.rate_limit.window_secs),
                max_tracked_clients: parsed(&lookup, "RATE_LIMIT_MAX_CLIENTS")
                    .unwrap_or(defaults.rate_limit.max_tracked_clients),
                ..defaults.rate_limit
            },
            mail: MailConfig {
                host: var("SMTP_HOST"),
                port: var("SMTP_PORT"),
                username: var("SMTP_USER"),
                password: var("SMTP_PASS"),
                from_address: var("SMTP_FROM"),
                to_address: var("CONTACT_TO"),
                accept_invalid_certs: parsed(&lookup, "SMTP_ACCEPT_INVALID_CERTS")
                    .unwrap_or(defaults.mail.accept_invalid_certs),
                timeout_secs: parsed(&lookup, "SMTP_TIMEOUT_SECS")
                    .unwrap_or(defaults.mail.timeout_secs),
                ..defaults.mail
            },
            metrics: MetricsConfig {
                enabled: parsed(&lookup, "METRICS_ENABLED").unwrap_or(defaults.metrics.enabled),
                ..defaults.metrics
            },
            cors_origins: var("CORS_ALLOWED_ORIGINS")
                .map(|v| {
                    v.split(',')
                        .map(str::trim)
                        .filter(|o| !o.is_empty())
                        .map(String::from)
                        .collect()
                })
                .unwrap_or_default(),
        }
    }
}

fn non_blank<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|v| !v.trim().is_empty())
}

fn parsed<F, T>(lookup: &F, key: &str) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    non_blank(lookup, key).and_then(|v| v.trim().parse().ok())
}

impl RateLimitConfig {
    /// Get the rate window duration
    pub fn window_duration(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    /// Get the sweep interval
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}

impl MailConfig {
    /// Resolve every required SMTP setting, reporting the first one missing.
    pub fn delivery_settings(&self) -> Result<DeliverySettings, ConfigError> {
        fn required<'a>(
            value: &'a Option<String>,
            name: &'static str,
        ) -> Result<&'a str, ConfigError> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .ok_or(ConfigError::Missing(name))
        }

        let host = required(&self.host, "SMTP_HOST")?;
        let port = required(&self.port, "SMTP_PORT")?;
        let username = required(&self.username, "SMTP_USER")?;
        let password = required(&self.password, "SMTP_PASS")?;
        let from_address = required(&self.from_address, "SMTP_FROM")?;
        let to_address = required(&self.to_address, "CONTACT_TO")?;

        let port = port
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort(port.to_string()))?;

        Ok(DeliverySettings {
            host: host.to_string(),
            port,
            username: username.to_string(),
            password: password.to_string(),
            from_address: from_address.to_string(),
            to_address: to_address.to_string(),
            sender_name: self.sender_name.clone(),
            accept_invalid_certs: self.accept_invalid_certs,
            timeout: Duration::from_secs(self.timeout_secs),
        })
    }
}
