// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Metrics collection for attack simulation results.

use axum::http::StatusCode;
use std::collections::HashMap;

/// Collects metrics during attack simulation.
#[derive(Debug, Default)]
pub struct AttackMetrics {
    /// Count of requests by outcome
    outcomes: HashMap<Outcome, usize>,
    /// Count of requests by client
    requests_per_ip: HashMap<String, usize>,
}

/// Possible outcomes for a submission, as seen by the sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// 200 and a message reached the mailer
    Delivered,
    /// 200 but nothing was sent
    SilentlyDropped,
    RateLimited,
    Rejected,
    ServerError,
}

impl Outcome {
    /// Classify a response given whether the mailer count moved.
    pub fn classify(status: StatusCode, mail_sent: bool) -> Self {
        match status {
            StatusCode::OK if mail_sent => Outcome::Delivered,
            StatusCode::OK => Outcome::SilentlyDropped,
            StatusCode::TOO_MANY_REQUESTS => Outcome::RateLimited,
            s if s.is_client_error() => Outcome::Rejected,
            _ => Outcome::ServerError,
        }
    }
}

impl AttackMetrics {
    /// Create a new metrics collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a submission outcome.
    pub fn record(&mut self, outcome: Outcome, ip: &str) {
        *self.outcomes.entry(outcome).or_insert(0) += 1;
        *self.requests_per_ip.entry(ip.to_string()).or_insert(0) += 1;
    }

    /// Get total request count.
    pub fn total_requests(&self) -> usize {
        self.outcomes.values().sum()
    }

    /// Get count for a specific outcome.
    pub fn count(&self, outcome: Outcome) -> usize {
        self.outcomes.get(&outcome).copied().unwrap_or(0)
    }

    /// Ratio of submissions that did not produce an email.
    pub fn block_rate(&self) -> f64 {
        let total = self.total_requests();
        if total == 0 {
            return 0.0;
        }
        (total - self.count(Outcome::Delivered)) as f64 / total as f64
    }

    /// Get number of unique clients that made requests.
    pub fn unique_ips(&self) -> usize {
        self.requests_per_ip.len()
    }

    /// Generate a summary report.
    pub fn report(&self) -> MetricsReport {
        MetricsReport {
            total_requests: self.total_requests(),
            delivered: self.count(Outcome::Delivered),
            silently_dropped: self.count(Outcome::SilentlyDropped),
            rate_limited: self.count(Outcome::RateLimited),
            rejected: self.count(Outcome::Rejected),
            server_errors: self.count(Outcome::ServerError),
            block_rate: self.block_rate(),
            unique_ips: self.unique_ips(),
        }
    }
}

/// Summary report of attack metrics.
#[derive(Debug, Clone)]
pub struct MetricsReport {
    pub total_requests: usize,
    pub delivered: usize,
    pub silently_dropped: usize,
    pub rate_limited: usize,
    pub rejected: usize,
    pub server_errors: usize,
    pub block_rate: f64,
    pub unique_ips: usize,
}

impl std::fmt::Display for MetricsReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Attack Metrics Report ===")?;
        writeln!(f, "Total Requests:    {}", self.total_requests)?;
        writeln!(f)?;
        writeln!(f, "--- Outcomes ---")?;
        writeln!(f, "Delivered:         {}", self.delivered)?;
        writeln!(f, "Silently Dropped:  {}", self.silently_dropped)?;
        writeln!(f, "Rate Limited:      {}", self.rate_limited)?;
        writeln!(f, "Rejected:          {}", self.rejected)?;
        writeln!(f, "Server Errors:     {}", self.server_errors)?;
        writeln!(f, "Block Rate:        {:.1}%", self.block_rate * 100.0)?;
        writeln!(f)?;
        writeln!(f, "--- Distribution ---")?;
        writeln!(f, "Unique Clients:    {}", self.unique_ips)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(Outcome::classify(StatusCode::OK, true), Outcome::Delivered);
        assert_eq!(Outcome::classify(StatusCode::OK, false), Outcome::SilentlyDropped);
        assert_eq!(
            Outcome::classify(StatusCode::TOO_MANY_REQUESTS, false),
            Outcome::RateLimited
        );
        assert_eq!(Outcome::classify(StatusCode::BAD_REQUEST, false), Outcome::Rejected);
        assert_eq!(
            Outcome::classify(StatusCode::INTERNAL_SERVER_ERROR, false),
            Outcome::ServerError
        );
    }

    #[test]
    fn test_block_rate() {
        let mut metrics = AttackMetrics::new();
        for _ in 0..3 {
            metrics.record(Outcome::Delivered, "10.0.0.1");
        }
        for _ in 0..7 {
            metrics.record(Outcome::RateLimited, "10.0.0.1");
        }

        assert!((metrics.block_rate() - 0.7).abs() < 0.01);
        assert_eq!(metrics.unique_ips(), 1);
    }
}
