//! Response caching for dispatched actions.

use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;

/// Storage for rendered action responses.
///
/// Hosts plug file, memcache or redis stores in here; the dispatcher only
/// needs get, set and expiry.
pub trait ResponseCache: Send + Sync {
    /// A live entry for `key`, if any.
    fn get(&self, key: &str) -> Option<String>;

    /// Store `value` under `key` for `ttl`.
    fn set(&self, key: &str, value: String, ttl: Duration);

    /// Remaining lifetime of the entry under `key`.
    fn expires_in(&self, key: &str) -> Option<Duration>;
}

#[derive(Debug, Clone)]
struct CachedResponse {
    body: String,
    expires_at: Instant,
}

impl CachedResponse {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at > now
    }
}

/// A thread-safe in-process response cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryResponseCache {
    inner: Arc<DashMap<String, CachedResponse>>,
}

impl MemoryResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, live or expired.
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Drop expired entries.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.inner.retain(|_, entry| entry.is_live(now));
    }
}

impl ResponseCache for MemoryResponseCache {
    fn get(&self, key: &str) -> Option<String> {
        let now = Instant::now();
        self.inner
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.body.clone())
    }

    fn set(&self, key: &str, value: String, ttl: Duration) {
        self.inner.insert(
            key.to_string(),
            CachedResponse {
                body: value,
                expires_at: Instant::now() + ttl,
            },
        );
    }

    fn expires_in(&self, key: &str) -> Option<Duration> {
        let now = Instant::now();
        self.inner
            .get(key)
            .filter(|entry| entry.is_live(now))
            .map(|entry| entry.expires_at - now)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_operations() {
        let cache = MemoryResponseCache::new();
        assert!(cache.get("web/main/index").is_none());

        cache.set("web/main/index", "hello".into(), Duration::from_secs(60));
        assert_eq!(cache.get("web/main/index").as_deref(), Some("hello"));
        let remaining = cache.expires_in("web/main/index").unwrap();
        assert!(remaining <= Duration::from_secs(60));
        assert!(remaining > Duration::from_secs(50));
    }

    #[test]
    fn test_expired_entry_hidden_and_purged() {
        let cache = MemoryResponseCache::new();
        cache.set("k", "stale".into(), Duration::ZERO);
        assert!(cache.get("k").is_none());
        assert!(cache.expires_in("k").is_none());
        assert_eq!(cache.len(), 1);

        cache.purge_expired();
        assert!(cache.is_empty());
    }
}
