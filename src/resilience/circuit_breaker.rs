//! Circuit breaker for upstream protection.
//!
//! # States
//! - Closed: normal operation, requests pass through
//! - Open: upstream assumed down, requests fail fast
//! - Half-Open: the next request decides recovery
//!
//! # State Transitions
//! ```text
//! Closed → Open: failure_count reaches threshold
//! Open → Half-Open: on_timeout() after the recovery period
//! Half-Open → Closed: probe request succeeds
//! Half-Open → Open: probe request fails
//! ```
//!
//! # Design Decisions
//! - Pure state machine; scheduling the timeout lives in `recovery.rs`
//! - Fail fast in Open state (upstream flag is not consulted)
//! - Single probe in Half-Open (prevents hammering recovering upstream)
//! - Every open episode gets a new generation so stale timers can be detected

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::clock::{self, SharedClock};
use crate::config::CircuitBreakerConfig;
use crate::observability::metrics;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CircuitState {
    Closed,
    Open,
    HalfOpen,
}

impl CircuitState {
    pub fn as_str(self) -> &'static str {
        match self {
            CircuitState::Closed => "closed",
            CircuitState::Open => "open",
            CircuitState::HalfOpen => "half_open",
        }
    }
}

/// What happened to a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Verdict {
    /// The request reached the upstream, which answered healthy or not.
    Forwarded { healthy: bool },
    /// The circuit was open; the upstream was never consulted.
    Rejected,
}

/// Result of [`CircuitBreaker::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub state: CircuitState,
    pub failure_count: u32,
    /// The breaker just entered Open and a recovery timer must be (re)started.
    #[serde(skip)]
    pub arm_timer: bool,
    #[serde(skip)]
    pub generation: u64,
}

/// Point-in-time view of the breaker.
#[derive(Debug, Clone, Serialize)]
pub struct BreakerSnapshot {
    pub state: CircuitState,
    pub failure_count: u32,
    pub failure_threshold: u32,
    pub recovery_ms: u64,
    /// Time left before a probe is allowed, while Open.
    pub retry_in_ms: Option<u64>,
}

pub struct CircuitBreaker {
    failure_threshold: u32,
    recovery: Duration,
    state: CircuitState,
    failure_count: u32,
    opened_at: Option<Instant>,
    generation: u64,
    clock: SharedClock,
}

impl CircuitBreaker {
    pub fn new(failure_threshold: u32, recovery: Duration) -> Self {
        Self {
            failure_threshold,
            recovery,
            state: CircuitState::Closed,
            failure_count: 0,
            opened_at: None,
            generation: 0,
            clock: clock::system(),
        }
    }

    pub fn from_config(config: &CircuitBreakerConfig) -> Self {
        Self::new(config.failure_threshold, Duration::from_millis(config.recovery_ms))
    }

    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn state(&self) -> CircuitState {
        self.state
    }

    pub fn failure_count(&self) -> u32 {
        self.failure_count
    }

    pub fn opened_at(&self) -> Option<Instant> {
        self.opened_at
    }

    pub fn recovery(&self) -> Duration {
        self.recovery
    }

    /// Identifies the current open episode.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Run one request against an upstream whose health is `upstream_healthy`.
    pub fn evaluate(&mut self, upstream_healthy: bool) -> Evaluation {
        let mut arm_timer = false;

        let verdict = match self.state {
            CircuitState::Open => Verdict::Rejected,
            CircuitState::Closed if upstream_healthy => {
                self.failure_count = 0;
                Verdict::Forwarded { healthy: true }
            }
            CircuitState::Closed => {
                let next = self.failure_count.saturating_add(1);
                if next >= self.failure_threshold {
                    self.failure_count = self.failure_threshold;
                    self.trip();
                    arm_timer = true;
                } else {
                    self.failure_count = next;
                }
                Verdict::Forwarded { healthy: false }
            }
            CircuitState::HalfOpen if upstream_healthy => {
                self.failure_count = 0;
                self.transition(CircuitState::Closed);
                Verdict::Forwarded { healthy: true }
            }
            CircuitState::HalfOpen => {
                self.trip();
                arm_timer = true;
                Verdict::Forwarded { healthy: false }
            }
        };

        Evaluation {
            verdict,
            state: self.state,
            failure_count: self.failure_count,
            arm_timer,
            generation: self.generation,
        }
    }

    /// Recovery timer fired. Moves Open → Half-Open once the period has elapsed.
    ///
    /// Returns true if a transition happened.
    pub fn on_timeout(&mut self) -> bool {
        if self.state != CircuitState::Open {
            return false;
        }
        let Some(opened_at) = self.opened_at else {
            return false;
        };
        if self.clock.now().duration_since(opened_at) < self.recovery {
            return false;
        }

        self.opened_at = None;
        self.transition(CircuitState::HalfOpen);
        true
    }

    /// Restart in Closed with no history. Invalidates any pending timer.
    pub fn reset(&mut self) {
        if self.state != CircuitState::Closed {
            self.transition(CircuitState::Closed);
        }
        self.failure_count = 0;
        self.opened_at = None;
        self.generation += 1;
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let retry_in_ms = self.opened_at.map(|opened_at| {
            let elapsed = self.clock.now().duration_since(opened_at);
            self.recovery.saturating_sub(elapsed).as_millis() as u64
        });

        BreakerSnapshot {
            state: self.state,
            failure_count: self.failure_count,
            failure_threshold: self.failure_threshold,
            recovery_ms: self.recovery.as_millis() as u64,
            retry_in_ms,
        }
    }

    fn trip(&mut self) {
        self.opened_at = Some(self.clock.now());
        self.generation += 1;
        self.transition(CircuitState::Open);
    }

    fn transition(&mut self, to: CircuitState) {
        let from = self.state;
        self.state = to;
        if from != to {
            tracing::info!(
                from = from.as_str(),
                to = to.as_str(),
                failure_count = self.failure_count,
                "Circuit breaker transition"
            );
            metrics::record_breaker_transition(from.as_str(), to.as_str());
        }
    }
}

impl std::fmt::Debug for CircuitBreaker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CircuitBreaker")
            .field("state", &self.state)
            .field("failure_count", &self.failure_count)
            .field("failure_threshold", &self.failure_threshold)
            .field("recovery", &self.recovery)
            .field("generation", &self.generation)
            .finish()
    }
}
