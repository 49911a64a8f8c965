//! Edge cache simulation.

use std::time::Duration;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheFetch {
    pub hit: bool,
    #[serde(rename = "latency_ms", serialize_with = "as_millis")]
    pub latency: Duration,
}

fn as_millis<S: serde::Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_u64(d.as_millis() as u64)
}

/// One cached response: the first fetch is slow, every later one is fast.
#[derive(Debug, Clone)]
pub struct EdgeCache {
    warm: bool,
    miss_latency: Duration,
    hit_latency: Duration,
}

impl EdgeCache {
    pub fn new(miss_latency: Duration, hit_latency: Duration) -> Self {
        Self {
            warm: false,
            miss_latency,
            hit_latency,
        }
    }

    /// Classify the next fetch and warm the cache.
    pub fn fetch(&mut self) -> CacheFetch {
        let fetch = if self.warm {
            CacheFetch { hit: true, latency: self.hit_latency }
        } else {
            CacheFetch { hit: false, latency: self.miss_latency }
        };
        self.warm = true;
        fetch
    }

    /// Evict the cached response.
    pub fn purge(&mut self) {
        self.warm = false;
    }

    pub fn is_warm(&self) -> bool {
        self.warm
    }
}

/// Wait out the simulated latency of a fetch.
pub async fn serve(fetch: CacheFetch) -> CacheFetch {
    tokio::time::sleep(fetch.latency).await;
    fetch
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cache() -> EdgeCache {
        EdgeCache::new(Duration::from_millis(2_000), Duration::from_millis(50))
    }

    #[test]
    fn test_miss_then_hits() {
        let mut cache = cache();
        assert_eq!(
            cache.fetch(),
            CacheFetch { hit: false, latency: Duration::from_millis(2_000) }
        );
        assert!(cache.fetch().hit);
        assert_eq!(cache.fetch().latency, Duration::from_millis(50));
    }

    #[test]
    fn test_purge_forces_miss() {
        let mut cache = cache();
        cache.fetch();
        cache.purge();
        assert!(!cache.is_warm());
        assert!(!cache.fetch().hit);
    }

    #[test]
    fn test_serializes_latency_in_millis() {
        let json = serde_json::to_value(cache().fetch()).unwrap();
        assert_eq!(json, serde_json::json!({ "hit": false, "latency_ms": 2000 }));
    }

    #[tokio::test(start_paused = true)]
    async fn test_serve_waits_latency() {
        let start = tokio::time::Instant::now();
        serve(cache().fetch()).await;
        assert!(start.elapsed() >= Duration::from_millis(2_000));
    }
}
