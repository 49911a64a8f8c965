//! Resilience subsystem.
//!
//! # Data Flow
//! ```text
//! Simulated request to upstream:
//!     → circuit_breaker.rs (fail fast when open, track failures)
//!     → On open: recovery.rs (schedule the half-open transition)
//! ```
//!
//! # Design Decisions
//! - Circuit breaker prevents cascading failures
//! - State machine is synchronous; only the recovery timer is async
//! - One breaker per session, never shared

pub mod circuit_breaker;
pub mod recovery;

pub use circuit_breaker::{BreakerSnapshot, CircuitBreaker, CircuitState, Evaluation, Verdict};
pub use recovery::BreakerDriver;
