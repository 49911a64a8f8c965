//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate the route table (prefix shape, duplicates, targets)
//! - Validate value ranges (thresholds > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: LabConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::LabConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("route '{name}': prefix must start with '/', got '{prefix}'")]
    PrefixNotRooted { name: String, prefix: String },

    #[error("route '{name}': prefix '{prefix}' is already used by an earlier route")]
    DuplicatePrefix { name: String, prefix: String },

    #[error("route '{0}': target must not be empty")]
    EmptyTarget(String),

    #[error("circuit_breaker.failure_threshold must be at least 1")]
    ZeroFailureThreshold,

    #[error("circuit_breaker.recovery_ms must be greater than 0")]
    ZeroRecovery,

    #[error("rate_limit.history_len must be at least 1")]
    ZeroHistory,

    #[error("sessions.max_sessions must be at least 1")]
    ZeroSessions,

    #[error("sessions.sweep_interval_secs must be at least 1 when idle expiry is enabled")]
    ZeroSweepInterval,

    #[error("{field}: '{value}' is not a valid socket address")]
    InvalidAddress { field: &'static str, value: String },

    #[error("tutor.endpoint: '{0}' is not a valid URL")]
    InvalidTutorEndpoint(String),

    #[error("observability.log_format must be 'pretty' or 'json', got '{0}'")]
    UnknownLogFormat(String),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &LabConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut seen = HashSet::new();
    for route in &config.routes {
        if !route.prefix.starts_with('/') {
            errors.push(ValidationError::PrefixNotRooted {
                name: route.name.clone(),
                prefix: route.prefix.clone(),
            });
        }
        if !seen.insert(route.prefix.as_str()) {
            errors.push(ValidationError::DuplicatePrefix {
                name: route.name.clone(),
                prefix: route.prefix.clone(),
            });
        }
        if route.target.trim().is_empty() {
            errors.push(ValidationError::EmptyTarget(route.name.clone()));
        }
    }

    if config.circuit_breaker.failure_threshold == 0 {
        errors.push(ValidationError::ZeroFailureThreshold);
    }
    if config.circuit_breaker.recovery_ms == 0 {
        errors.push(ValidationError::ZeroRecovery);
    }
    if config.rate_limit.history_len == 0 {
        errors.push(ValidationError::ZeroHistory);
    }
    if config.sessions.max_sessions == 0 {
        errors.push(ValidationError::ZeroSessions);
    }
    if config.sessions.idle_timeout_secs > 0 && config.sessions.sweep_interval_secs == 0 {
        errors.push(ValidationError::ZeroSweepInterval);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address",
            value: config.listener.bind_address.clone(),
        });
    }
    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address",
            value: config.observability.metrics_address.clone(),
        });
    }
    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::UnknownLogFormat(config.observability.log_format.clone()));
    }

    if url::Url::parse(&config.tutor.endpoint).is_err() {
        errors.push(ValidationError::InvalidTutorEndpoint(config.tutor.endpoint.clone()));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
