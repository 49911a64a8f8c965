//! Fixed-window rate limiter.
//!
//! # Design Decisions
//! - Saturating counter: `used` never exceeds `capacity`
//! - Denied requests are classified but not counted
//! - The window closes on explicit `reset()`, or automatically when a
//!   window length is configured
//! - A short most-recent-first history is kept for display

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::clock::{self, SharedClock};
use crate::config::RateLimitConfig;
use crate::observability::metrics;

/// Classification of one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Allowed,
    Denied,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allowed
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Decision::Allowed => "allowed",
            Decision::Denied => "denied",
        }
    }
}

/// One entry in the decision history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryEntry {
    /// Sequence number of the request since the limiter was created.
    pub seq: u64,
    pub decision: Decision,
}

/// Point-in-time view of the limiter.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitSnapshot {
    pub capacity: u32,
    pub used: u32,
    pub remaining: u32,
    pub history: Vec<HistoryEntry>,
}

pub struct RateLimiter {
    capacity: u32,
    used: u32,
    history: VecDeque<HistoryEntry>,
    history_len: usize,
    seq: u64,
    window: Option<Duration>,
    window_started: Instant,
    clock: SharedClock,
}

impl RateLimiter {
    /// Limiter with manual reset only.
    pub fn new(capacity: u32, history_len: usize) -> Self {
        let clock = clock::system();
        Self {
            capacity,
            used: 0,
            history: VecDeque::with_capacity(history_len),
            history_len,
            seq: 0,
            window: None,
            window_started: clock.now(),
            clock,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        let limiter = Self::new(config.capacity, config.history_len);
        if config.window_secs > 0 {
            limiter.with_window(Duration::from_secs(config.window_secs))
        } else {
            limiter
        }
    }

    /// Roll the window over automatically after `window`.
    pub fn with_window(mut self, window: Duration) -> Self {
        self.window = Some(window);
        self
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.window_started = clock.now();
        self.clock = clock;
        self
    }

    /// Classify one incoming request.
    pub fn submit(&mut self) -> Decision {
        self.roll_window();

        let decision = if self.used < self.capacity {
            self.used += 1;
            Decision::Allowed
        } else {
            Decision::Denied
        };

        self.seq += 1;
        self.history.push_front(HistoryEntry {
            seq: self.seq,
            decision,
        });
        self.history.truncate(self.history_len);

        if !decision.is_allowed() {
            tracing::debug!(capacity = self.capacity, "Rate limit exceeded");
        }
        metrics::record_rate_limit(decision.as_str());
        decision
    }

    /// Start a new window: zero the counter and clear history.
    pub fn reset(&mut self) {
        self.used = 0;
        self.history.clear();
        self.window_started = self.clock.now();
    }

    /// Requests counted in the current window.
    pub fn used(&self) -> u32 {
        if self.window_expired() {
            0
        } else {
            self.used
        }
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn history(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.history.iter()
    }

    pub fn snapshot(&self) -> RateLimitSnapshot {
        let used = self.used();
        RateLimitSnapshot {
            capacity: self.capacity,
            used,
            remaining: self.capacity - used,
            history: self.history.iter().copied().collect(),
        }
    }

    fn window_expired(&self) -> bool {
        self.window
            .is_some_and(|window| self.clock.now().duration_since(self.window_started) >= window)
    }

    fn roll_window(&mut self) {
        if self.window_expired() {
            tracing::debug!(used = self.used, "Rate limit window rolled over");
            self.used = 0;
            self.window_started = self.clock.now();
        }
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("capacity", &self.capacity)
            .field("used", &self.used)
            .field("window", &self.window)
            .finish()
    }
}
