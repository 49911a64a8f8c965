//! Route matching logic.
//!
//! # Responsibilities
//! - Match path prefix (case-sensitive, byte-wise)
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - No wildcard or regex semantics; a prefix is a literal
//! - Matchers are trait objects so the router can hold mixed conditions

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches a literal path prefix.
#[derive(Debug, Clone)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        path.as_bytes().starts_with(self.prefix.as_bytes())
    }
}
