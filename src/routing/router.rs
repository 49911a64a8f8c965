//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Store compiled routes
//! - Look up matching route for a path
//! - Return matched route or explicit no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(n) path prefix scan in declaration order (acceptable for typical route counts)
//! - Explicit NotFound rather than silent default

use std::time::Duration;

use serde::Serialize;

use crate::config::RouteConfig;
use crate::observability::metrics;
use crate::routing::matcher::{Matcher, PathPrefixMatcher};

/// A compiled route.
#[derive(Debug)]
pub struct Route {
    pub name: String,
    pub target: String,
    matcher: PathPrefixMatcher,
}

impl Route {
    pub fn prefix(&self) -> &str {
        self.matcher.prefix()
    }
}

/// Outcome of a route lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum RouteMatch {
    Matched {
        name: String,
        prefix: String,
        target: String,
    },
    NotFound,
}

impl RouteMatch {
    pub fn is_match(&self) -> bool {
        matches!(self, RouteMatch::Matched { .. })
    }

    /// The upstream URL the request would be forwarded to.
    pub fn upstream_url(&self, path: &str) -> Option<String> {
        match self {
            RouteMatch::Matched { target, .. } => Some(format!("{}{}", target, path)),
            RouteMatch::NotFound => None,
        }
    }

    /// Human-readable outcome shown to learners.
    pub fn describe(&self, path: &str) -> String {
        match self.upstream_url(path) {
            Some(url) => format!("Routing to Internal Service: {}", url),
            None => "404 Not Found - Path does not match any known microservice".to_string(),
        }
    }
}

/// Ordered prefix router. First match wins.
#[derive(Debug)]
pub struct Router {
    routes: Vec<Route>,
    latency: Duration,
}

impl Router {
    /// Compile the route table, preserving declaration order.
    pub fn from_config(configs: Vec<RouteConfig>) -> Self {
        let routes = configs
            .into_iter()
            .map(|c| Route {
                name: c.name,
                target: c.target,
                matcher: PathPrefixMatcher::new(c.prefix),
            })
            .collect();

        Self {
            routes,
            latency: Duration::ZERO,
        }
    }

    /// Delay applied by [`Router::resolve`] before returning.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Find the first route whose prefix is a literal prefix of `path`.
    pub fn match_path(&self, path: &str) -> RouteMatch {
        let result = match self.routes.iter().find(|r| r.matcher.matches(path)) {
            Some(route) => RouteMatch::Matched {
                name: route.name.clone(),
                prefix: route.prefix().to_string(),
                target: route.target.clone(),
            },
            None => RouteMatch::NotFound,
        };

        metrics::record_route_match(result.is_match());
        result
    }

    /// Same as [`Router::match_path`], delivered after the simulated round-trip.
    pub async fn resolve(&self, path: &str) -> RouteMatch {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let result = self.match_path(path);
        tracing::debug!(path = %path, matched = result.is_match(), "Route resolved");
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::default_routes;

    fn demo_router() -> Router {
        Router::from_config(default_routes())
    }

    #[test]
    fn test_matches_demo_table() {
        let router = demo_router();

        let users = router.match_path("/users/123");
        assert_eq!(
            users,
            RouteMatch::Matched {
                name: "users".into(),
                prefix: "/users".into(),
                target: "http://user-service:8080".into(),
            }
        );
        assert_eq!(
            users.describe("/users/123"),
            "Routing to Internal Service: http://user-service:8080/users/123"
        );

        assert_eq!(
            router.match_path("/products/9").upstream_url("/products/9").as_deref(),
            Some("http://product-service:8081/products/9")
        );
        assert_eq!(
            router.match_path("/auth/login").upstream_url("/auth/login").as_deref(),
            Some("http://auth-service:9000/auth/login")
        );
    }

    #[test]
    fn test_not_found() {
        let router = demo_router();
        let result = router.match_path("/xyz");
        assert_eq!(result, RouteMatch::NotFound);
        assert_eq!(result.upstream_url("/xyz"), None);
        assert_eq!(
            result.describe("/xyz"),
            "404 Not Found - Path does not match any known microservice"
        );
    }

    #[test]
    fn test_first_declared_route_wins() {
        let router = Router::from_config(vec![
            RouteConfig::new("broad", "/api", "http://broad"),
            RouteConfig::new("narrow", "/api/v2", "http://narrow"),
        ]);

        match router.match_path("/api/v2/items") {
            RouteMatch::Matched { name, .. } => assert_eq!(name, "broad"),
            RouteMatch::NotFound => panic!("expected a match"),
        }
    }

    #[test]
    fn test_case_sensitive() {
        let router = demo_router();
        assert_eq!(router.match_path("/USERS/1"), RouteMatch::NotFound);
    }

    #[test]
    fn test_deterministic() {
        let router = demo_router();
        for _ in 0..3 {
            assert!(router.match_path("/products").is_match());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_waits_configured_latency() {
        let router = demo_router().with_latency(Duration::from_millis(300));
        let start = tokio::time::Instant::now();

        let result = router.resolve("/users/1").await;

        assert!(result.is_match());
        assert!(start.elapsed() >= Duration::from_millis(300));
    }
}
