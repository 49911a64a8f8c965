//! Per-learner engine ownership.
//!
//! # Data Flow
//! ```text
//! POST /sessions
//!     → store.rs (allocate id, build LabSession from config)
//!     → handlers look up Arc<LabSession> by id
//!     → each engine is locked individually for one synchronous call
//!
//! DELETE /sessions/{id}   (or idle sweep)
//!     → store.rs removes the entry
//!     → last Arc dropped → BreakerDriver aborts its recovery timer
//! ```
//!
//! # Design Decisions
//! - One engine instance per session, one mutex per engine
//! - No global engine state; everything hangs off a session
//! - Locks are never held across an await point

pub mod store;

use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant, SystemTime};

use uuid::Uuid;

use crate::clock::{self, SharedClock};
use crate::config::LabConfig;
use crate::resilience::{BreakerDriver, CircuitBreaker};
use crate::security::{RateLimiter, TokenValidator};
use crate::teaching::{EdgeCache, QuizSession, RequestJourney};

pub use store::{SessionError, SessionStore};

pub type SessionId = Uuid;

/// Everything one learner interacts with.
#[derive(Debug)]
pub struct LabSession {
    pub id: SessionId,
    pub created_at: SystemTime,
    clock: SharedClock,
    last_seen: Mutex<Instant>,
    rate_limiter: Mutex<RateLimiter>,
    breaker: BreakerDriver,
    auth: TokenValidator,
    cache: Mutex<EdgeCache>,
    journey: Mutex<RequestJourney>,
    quiz: Mutex<QuizSession>,
}

impl LabSession {
    pub fn new(id: SessionId, config: &LabConfig) -> Self {
        let sim = &config.simulation;
        let clock = clock::system();
        Self {
            id,
            created_at: SystemTime::now(),
            last_seen: Mutex::new(clock.now()),
            clock,
            rate_limiter: Mutex::new(RateLimiter::from_config(&config.rate_limit)),
            breaker: BreakerDriver::new(CircuitBreaker::from_config(&config.circuit_breaker)),
            auth: TokenValidator::new(sim.auth_token.clone())
                .with_latency(Duration::from_millis(sim.auth_latency_ms)),
            cache: Mutex::new(EdgeCache::new(
                Duration::from_millis(sim.cache_miss_ms),
                Duration::from_millis(sim.cache_hit_ms),
            )),
            journey: Mutex::new(RequestJourney::new()),
            quiz: Mutex::new(QuizSession::new()),
        }
    }

    /// Mark the session as used now.
    pub fn touch(&self) {
        *self.last_seen.lock().expect("last_seen mutex poisoned") = self.clock.now();
    }

    /// Time since the session was last looked up.
    pub fn idle_for(&self) -> Duration {
        let last_seen = *self.last_seen.lock().expect("last_seen mutex poisoned");
        self.clock.now().duration_since(last_seen)
    }

    pub fn rate_limiter(&self) -> MutexGuard<'_, RateLimiter> {
        self.rate_limiter.lock().expect("rate limiter mutex poisoned")
    }

    pub fn breaker(&self) -> &BreakerDriver {
        &self.breaker
    }

    pub fn auth(&self) -> &TokenValidator {
        &self.auth
    }

    pub fn cache(&self) -> MutexGuard<'_, EdgeCache> {
        self.cache.lock().expect("edge cache mutex poisoned")
    }

    pub fn journey(&self) -> MutexGuard<'_, RequestJourney> {
        self.journey.lock().expect("journey mutex poisoned")
    }

    pub fn quiz(&self) -> MutexGuard<'_, QuizSession> {
        self.quiz.lock().expect("quiz mutex poisoned")
    }
}
