//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the lab.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the gateway lab.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LabConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Route table, checked in declaration order.
    pub routes: Vec<RouteConfig>,

    /// Rate limiter engine settings.
    pub rate_limit: RateLimitConfig,

    /// Circuit breaker engine settings.
    pub circuit_breaker: CircuitBreakerConfig,

    /// Cosmetic latencies and demo values.
    pub simulation: SimulationConfig,

    /// Session store limits.
    pub sessions: SessionConfig,

    /// Remote tutor settings.
    pub tutor: TutorConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for LabConfig {
    fn default() -> Self {
        Self {
            listener: ListenerConfig::default(),
            routes: default_routes(),
            rate_limit: RateLimitConfig::default(),
            circuit_breaker: CircuitBreakerConfig::default(),
            simulation: SimulationConfig::default(),
            sessions: SessionConfig::default(),
            tutor: TutorConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "127.0.0.1:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:8080".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// A single prefix route.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct RouteConfig {
    /// Route identifier for logging/metrics.
    pub name: String,

    /// Literal path prefix (case-sensitive).
    pub prefix: String,

    /// Simulated upstream base URL.
    pub target: String,
}

impl RouteConfig {
    pub fn new(name: impl Into<String>, prefix: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prefix: prefix.into(),
            target: target.into(),
        }
    }
}

/// The demo route table.
pub fn default_routes() -> Vec<RouteConfig> {
    vec![
        RouteConfig::new("users", "/users", "http://user-service:8080"),
        RouteConfig::new("products", "/products", "http://product-service:8081"),
        RouteConfig::new("auth", "/auth", "http://auth-service:9000"),
    ]
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Requests allowed per window.
    pub capacity: u32,

    /// Number of recent decisions kept for display.
    pub history_len: usize,

    /// Window length in seconds. Zero means the window only closes on reset.
    pub window_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: 5,
            history_len: 5,
            window_secs: 0,
        }
    }
}

/// Circuit breaker configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures that open the circuit.
    pub failure_threshold: u32,

    /// Time spent open before a half-open probe is allowed, in milliseconds.
    pub recovery_ms: u64,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 3,
            recovery_ms: 5_000,
        }
    }
}

/// Cosmetic delays and demo values for the teaching features.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Delay before a route result is delivered.
    pub route_latency_ms: u64,

    /// Token accepted by the auth demo (compared case-insensitively).
    pub auth_token: String,

    /// Delay before an auth verdict is delivered.
    pub auth_latency_ms: u64,

    /// Latency of a cache miss.
    pub cache_miss_ms: u64,

    /// Latency of a cache hit.
    pub cache_hit_ms: u64,

    /// Delay between order orchestration phases.
    pub order_step_ms: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            route_latency_ms: 300,
            auth_token: "secret-token-123".to_string(),
            auth_latency_ms: 1_000,
            cache_miss_ms: 2_000,
            cache_hit_ms: 50,
            order_step_ms: 1_500,
        }
    }
}

/// Session store configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Maximum number of live sessions.
    pub max_sessions: usize,

    /// Sessions untouched for this long are expired. 0 disables expiry.
    pub idle_timeout_secs: u64,

    /// How often the idle sweep runs.
    pub sweep_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            max_sessions: 1_000,
            idle_timeout_secs: 1_800,
            sweep_interval_secs: 60,
        }
    }
}

/// Remote tutor configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TutorConfig {
    /// Enable the tutor endpoint. When disabled every question gets the fallback reply.
    pub enabled: bool,

    /// Base URL of the generative-language API.
    pub endpoint: String,

    /// Model identifier.
    pub model: String,

    /// Name of the environment variable holding the API key.
    pub api_key_env: String,

    /// Instruction sent with every question.
    pub system_instruction: String,

    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for TutorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            api_key_env: "API_KEY".to_string(),
            system_instruction: "You are an expert System Design Tutor specializing in API Gateways. \
                Be concise, educational, and use analogies. Keep responses under 3 sentences where possible."
                .to_string(),
            timeout_secs: 15,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format: "pretty" or "json".
    pub log_format: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
