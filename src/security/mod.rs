//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Simulated request:
//!     → auth.rs (validate presented token)
//!     → rate_limit.rs (classify against the window quota)
//!     → Pass to routing
//! ```
//!
//! # Design Decisions
//! - Each engine is owned by one session; nothing is process-wide
//! - Fail closed: empty tokens and exhausted quotas are rejected

pub mod auth;
pub mod rate_limit;

pub use auth::{AuthOutcome, TokenValidator};
pub use rate_limit::{Decision, HistoryEntry, RateLimitSnapshot, RateLimiter};
