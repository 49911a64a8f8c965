//! Simulated token validation for the auth demo.
//!
//! There is no real identity provider here; the validator compares the
//! presented token against one configured secret.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthOutcome {
    Accepted,
    Rejected,
}

#[derive(Debug, Clone)]
pub struct TokenValidator {
    expected: String,
    latency: Duration,
}

impl TokenValidator {
    pub fn new(expected: impl Into<String>) -> Self {
        Self {
            expected: expected.into(),
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Case-insensitive exact comparison. Empty tokens never validate.
    pub fn check(&self, token: &str) -> AuthOutcome {
        if !token.is_empty() && token.eq_ignore_ascii_case(&self.expected) {
            AuthOutcome::Accepted
        } else {
            AuthOutcome::Rejected
        }
    }

    /// [`TokenValidator::check`] after the simulated verification delay.
    pub async fn validate(&self, token: &str) -> AuthOutcome {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let outcome = self.check(token);
        tracing::debug!(outcome = ?outcome, "Token validated");
        outcome
    }
}
