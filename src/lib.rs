//! API Gateway teaching lab.
//!
//! Simulation engines for gateway concepts (prefix routing, fixed-window
//! rate limiting, circuit breaking) owned by per-learner sessions and
//! exposed over a small JSON API.

// Core engines
pub mod clock;
pub mod resilience;
pub mod routing;
pub mod security;

// Sessions and surfaces
pub mod http;
pub mod session;
pub mod teaching;
pub mod tutor;

// Cross-cutting concerns
pub mod config;
pub mod lifecycle;
pub mod observability;

pub use config::LabConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
