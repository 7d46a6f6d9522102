// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: Apache-2.0

//! Attack simulation patterns for security testing.

/// Attack pattern configuration.
#[derive(Debug, Clone)]
pub struct AttackConfig {
    /// Total number of submissions to send
    pub total_requests: usize,
    /// Number of unique client addresses to rotate through
    pub unique_ips: usize,
    /// Whether to send the forwarded-for header at all
    pub send_forwarded_for: bool,
    /// Fraction of submissions with the honeypot filled (0.0-1.0)
    pub bot_ratio: f64,
}

impl Default for AttackConfig {
    fn default() -> Self {
        Self {
            total_requests: 100,
            unique_ips: 1,
            send_forwarded_for: true,
            bot_ratio: 0.0,
        }
    }
}

/// Predefined attack patterns.
impl AttackConfig {
    /// Single client flood - one address hammering the form.
    pub fn single_ip_flood() -> Self {
        Self {
            total_requests: 200,
            unique_ips: 1,
            ..Default::default()
        }
    }

    /// Distributed attack - many addresses, a few submissions each.
    pub fn distributed_attack() -> Self {
        Self {
            total_requests: 500,
            unique_ips: 100,
            ..Default::default()
        }
    }

    /// Form-filling bot that trips the honeypot every time.
    pub fn honeypot_bots() -> Self {
        Self {
            total_requests: 50,
            unique_ips: 50,
            bot_ratio: 1.0,
            ..Default::default()
        }
    }

    /// Mixed traffic: some bots, some people.
    pub fn mixed_traffic() -> Self {
        Self {
            total_requests: 60,
            unique_ips: 60,
            bot_ratio: 0.5,
            ..Default::default()
        }
    }

    /// Clients behind a proxy that strips forwarding headers share one key.
    pub fn headerless_clients() -> Self {
        Self {
            total_requests: 20,
            unique_ips: 20,
            send_forwarded_for: false,
            ..Default::default()
        }
    }

    /// Upper bound on deliveries given a per-client allowance.
    pub fn max_deliveries(&self, per_client: usize) -> usize {
        let clients = if self.send_forwarded_for {
            self.unique_ips
        } else {
            1
        };
        (clients * per_client).min(self.total_requests)
    }
}

/// Simple deterministic "random" based on index and ratio.
pub fn rand_bool(ratio: f64, index: usize) -> bool {
    if ratio >= 1.0 {
        true
    } else if ratio <= 0.0 {
        false
    } else {
        (index as f64 * 0.618033988749895) % 1.0 < ratio
    }
}
