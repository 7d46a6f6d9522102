// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Fixed-window rate limiter for contact submissions.
//!
//! Each client key gets a window that opens on its first submission. Every
//! call inside the window counts, rejected ones included, so hammering the
//! endpoint never shortens the wait. The table is bounded: expired windows
//! are swept periodically and, when the table is full, the window closest
//! to expiry is evicted to make room. All windows share one length, so that
//! is always the window opened first; opens are queued in order to find it
//! without scanning the table.

use crate::config::RateLimitConfig;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Result of a rate limit check.
#[derive(Debug, Clone)]
pub enum RateLimitResult {
    /// Request is allowed
    Allowed {
        /// Remaining submissions in current window
        remaining: u32,
        /// Time until window resets
        reset_in: Duration,
    },
    /// Request is rate limited
    Limited {
        /// Time until the window resets
        retry_after: Duration,
    },
}

impl RateLimitResult {
    pub fn is_allowed(&self) -> bool {
        matches!(self, RateLimitResult::Allowed { .. })
    }
}

/// Submission count for one client inside its current window.
#[derive(Debug, Clone, Copy)]
struct WindowEntry {
    count: u32,
    reset_at: Instant,
}

impl WindowEntry {
    fn open(now: Instant, window: Duration) -> Self {
        Self {
            count: 1,
            reset_at: now + window,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now > self.reset_at
    }
}

/// Open windows plus the order they were opened in.
///
/// `opened` may hold stale pairs for keys whose window was since reopened
/// or removed; a pair is live only while its `reset_at` matches the entry.
#[derive(Debug, Default)]
struct WindowTable {
    entries: HashMap<String, WindowEntry>,
    opened: VecDeque<(String, Instant)>,
}

impl WindowTable {
    fn open(&mut self, key: &str, now: Instant, window: Duration) {
        let entry = WindowEntry::open(now, window);
        self.entries.insert(key.to_string(), entry);
        self.opened.push_back((key.to_string(), entry.reset_at));
    }

    /// Remove the window that resets soonest.
    fn evict_oldest(&mut self, now: Instant) {
        while let Some((key, reset_at)) = self.opened.pop_front() {
            let Some(entry) = self.entries.get(&key) else {
                continue;
            };
            if entry.reset_at != reset_at {
                continue;
            }
            if !entry.is_expired(now) {
                warn!(
                    evicted = %key,
                    tracked = self.entries.len(),
                    "Rate limit table full, evicting oldest window"
                );
            }
            self.entries.remove(&key);
            return;
        }
    }

    fn sweep(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let entries = &self.entries;
        self.opened.retain(|(key, reset_at)| {
            entries.get(key).is_some_and(|entry| entry.reset_at == *reset_at)
        });
        before - self.entries.len()
    }
}

/// Thread-safe rate limiter keyed by client identifier.
pub struct RateLimiter {
    /// Configuration
    config: RateLimitConfig,
    /// Per-client windows
    windows: Arc<RwLock<WindowTable>>,
}

impl RateLimiter {
    /// Create a new rate limiter with the given configuration.
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            windows: Arc::new(RwLock::new(WindowTable::default())),
        }
    }

    /// Record a submission attempt for `key` and decide whether it may proceed.
    pub async fn check(&self, key: &str) -> RateLimitResult {
        let now = Instant::now();
        let window = self.config.window_duration();
        let max = self.config.max_submissions;

        // The write lock covers lookup, reset and increment as one step.
        let mut windows = self.windows.write().await;

        if let Some(entry) = windows.entries.get_mut(key) {
            if !entry.is_expired(now) {
                entry.count = entry.count.saturating_add(1);
                let retry_after = entry.reset_at.saturating_duration_since(now);
                if entry.count > max {
                    debug!(key, count = entry.count, ?retry_after, "Client rate limit exceeded");
                    return RateLimitResult::Limited { retry_after };
                }
                return RateLimitResult::Allowed {
                    remaining: max - entry.count,
                    reset_in: retry_after,
                };
            }
            windows.open(key, now, window);
        } else {
            if windows.entries.len() >= self.config.max_tracked_clients {
                windows.evict_oldest(now);
            }
            windows.open(key, now, window);
        }

        if max == 0 {
            return RateLimitResult::Limited { retry_after: window };
        }
        RateLimitResult::Allowed {
            remaining: max - 1,
            reset_in: window,
        }
    }

    /// Drop every window that has already elapsed. Returns how many were removed.
    pub async fn cleanup(&self) -> usize {
        let now = Instant::now();
        let mut windows = self.windows.write().await;
        let removed = windows.sweep(now);
        if removed > 0 {
            debug!(removed, remaining = windows.entries.len(), "Swept expired rate limit windows");
        }
        removed
    }

    /// Number of client keys currently tracked.
    pub async fn tracked_clients(&self) -> usize {
        self.windows.read().await.entries.len()
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }
}
