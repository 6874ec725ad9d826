//! Response cache collaborator for data sources.
//!
//! Sources never hold process-wide caches; a [`SeriesCache`] is injected
//! instead, so tests can use [`NoopCache`] or a fresh [`InMemoryCache`].

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use crate::types::RawPoint;

/// Keyed store of raw responses with a per-entry time-to-live.
pub trait SeriesCache: Send + Sync {
    /// Cached points for `key`, if present and not expired.
    fn get(&self, key: &str) -> Option<Vec<RawPoint>>;

    /// Store `points` under `key` for `ttl`.
    fn set(&self, key: &str, points: Vec<RawPoint>, ttl: Duration);
}

struct Entry {
    expires_at: Instant,
    points: Vec<RawPoint>,
}

/// In-process cache backed by a `HashMap`.
#[derive(Default)]
pub struct InMemoryCache {
    entries: Mutex<HashMap<String, Entry>>,
}

impl InMemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, Entry>> {
        // A panic while holding the lock cannot leave an entry half-written.
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop expired entries.
    pub fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|_, entry| entry.expires_at > now);
        before - entries.len()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }
}

impl SeriesCache for InMemoryCache {
    fn get(&self, key: &str) -> Option<Vec<RawPoint>> {
        let now = Instant::now();
        let mut entries = self.lock();
        let expired = match entries.get(key) {
            Some(entry) if entry.expires_at > now => return Some(entry.points.clone()),
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.remove(key);
        }
        None
    }

    fn set(&self, key: &str, points: Vec<RawPoint>, ttl: Duration) {
        let expires_at = Instant::now() + ttl;
        self.lock()
            .insert(key.to_string(), Entry { expires_at, points });
    }
}

impl std::fmt::Debug for InMemoryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryCache")
            .field("entries", &self.len())
            .finish()
    }
}

/// Cache that stores nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl SeriesCache for NoopCache {
    fn get(&self, _key: &str) -> Option<Vec<RawPoint>> {
        None
    }

    fn set(&self, _key: &str, _points: Vec<RawPoint>, _ttl: Duration) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points() -> Vec<RawPoint> {
        vec![RawPoint::from_close(1, 10.0), RawPoint::from_close(2, 11.0)]
    }

    #[test]
    fn test_in_memory_roundtrip() {
        let cache = InMemoryCache::new();
        assert!(cache.get("AAPL:1M").is_none());

        cache.set("AAPL:1M", points(), Duration::from_secs(60));
        assert_eq!(cache.get("AAPL:1M"), Some(points()));
        assert!(cache.get("AAPL:1Y").is_none());
    }

    #[test]
    fn test_zero_ttl_expires() {
        let cache = InMemoryCache::new();
        cache.set("AAPL:1M", points(), Duration::ZERO);

        assert!(cache.get("AAPL:1M").is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_purge_expired() {
        let cache = InMemoryCache::new();
        cache.set("old", points(), Duration::ZERO);
        cache.set("fresh", points(), Duration::from_secs(60));

        assert_eq!(cache.purge_expired(), 1);
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_noop_cache() {
        let cache = NoopCache;
        cache.set("AAPL:1M", points(), Duration::from_secs(60));
        assert!(cache.get("AAPL:1M").is_none());
    }
}
