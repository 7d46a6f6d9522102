// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Prometheus counters for contact submissions.

use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// How a submission ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Sent,
    Spam,
    RateLimited,
    InvalidBody,
    Invalid,
    ConfigError,
    DeliveryFailed,
}

impl Outcome {
    pub const ALL: [Outcome; 7] = [
        Outcome::Sent,
        Outcome::Spam,
        Outcome::RateLimited,
        Outcome::InvalidBody,
        Outcome::Invalid,
        Outcome::ConfigError,
        Outcome::DeliveryFailed,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Sent => "sent",
            Outcome::Spam => "spam",
            Outcome::RateLimited => "rate_limited",
            Outcome::InvalidBody => "invalid_body",
            Outcome::Invalid => "invalid",
            Outcome::ConfigError => "config_error",
            Outcome::DeliveryFailed => "delivery_failed",
        }
    }
}

/// Service metrics on a private registry.
pub struct Metrics {
    registry: Registry,
    submissions: IntCounterVec,
    tracked_clients: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let submissions = IntCounterVec::new(
            Opts::new(
                "contact_submissions_total",
                "Contact form submissions by outcome",
            ),
            &["outcome"],
        )?;
        let tracked_clients = IntGauge::new(
            "contact_rate_limit_clients",
            "Client keys currently tracked by the rate limiter",
        )?;

        registry.register(Box::new(submissions.clone()))?;
        registry.register(Box::new(tracked_clients.clone()))?;

        // Pre-create every series so dashboards see zeros.
        for outcome in Outcome::ALL {
            submissions.with_label_values(&[outcome.as_str()]);
        }

        Ok(Self {
            registry,
            submissions,
            tracked_clients,
        })
    }

    pub fn record(&self, outcome: Outcome) {
        self.submissions
            .with_label_values(&[outcome.as_str()])
            .inc();
    }

    pub fn count(&self, outcome: Outcome) -> u64 {
        self.submissions
            .with_label_values(&[outcome.as_str()])
            .get()
    }

    pub fn set_tracked_clients(&self, clients: usize) {
        self.tracked_clients
            .set(i64::try_from(clients).unwrap_or(i64::MAX));
    }

    /// Text exposition of every registered metric.
    pub fn render(&self) -> Result<String, prometheus::Error> {
        let encoder = TextEncoder::new();
        let mut buffer = Vec::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }

    pub fn content_type(&self) -> &'static str {
        prometheus::TEXT_FORMAT
    }
}
