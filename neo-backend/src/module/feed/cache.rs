//! Result cache keyed by query fingerprint
//!
//! Entries are the serialized JSON list exactly as first served, so a hit
//! replays the same bytes.

use async_trait::async_trait;
use neo_common::SortCriterion;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{debug, info};

use super::error::CacheError;
use super::types::DateRange;

/// Fingerprint of a query. Distinct for every `(start, end, sort)` triple.
pub fn cache_key(range: &DateRange, sort: SortCriterion) -> String {
    format!("neo:{}:{}:{}", range.start(), range.end(), sort.as_str())
}

/// Key/value store with per-entry TTL.
///
/// Implementations may fail; callers treat a failed `get` as a miss and a
/// failed `set` as a no-op.
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// `Ok(None)` on a miss or an expired entry.
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// Insert or overwrite `key`, expiring after `ttl`.
    async fn set(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: String,
    expires_at: Instant,
}

impl CacheEntry {
    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

/// Process-local cache. Expired entries are ignored on read and dropped by
/// [`MemoryCache::purge_expired`].
#[derive(Debug, Default)]
pub struct MemoryCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries, expired ones included.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Drop expired entries; returns how many were removed.
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    /// Periodically purge expired entries in the background.
    pub fn start_purge_task(self: Arc<Self>, interval: Duration) -> tokio::task::JoinHandle<()> {
        info!("Starting cache purge task (interval: {:?})", interval);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            // First tick completes immediately
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let removed = self.purge_expired().await;
                if removed > 0 {
                    debug!("Purged {} expired cache entries", removed);
                }
            }
        })
    }
}

#[async_trait]
impl ResultCache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let entries = self.entries.read().await;
        Ok(entries
            .get(key)
            .filter(|entry| !entry.is_expired(Instant::now()))
            .map(|entry| entry.payload.clone()))
    }

    async fn set(&self, key: &str, payload: String, ttl: Duration) -> Result<(), CacheError> {
        let expires_at = Instant::now()
            .checked_add(ttl)
            .ok_or_else(|| CacheError::Unavailable(format!("TTL {:?} out of range", ttl)))?;

        self.entries
            .write()
            .await
            .insert(key.to_string(), CacheEntry { payload, expires_at });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn range() -> DateRange {
        DateRange::parse("2025-08-21", "2025-08-27").unwrap()
    }

    #[test]
    fn test_cache_key_deterministic() {
        assert_eq!(
            cache_key(&range(), SortCriterion::Size),
            cache_key(&range(), SortCriterion::Size)
        );
        assert_eq!(
            cache_key(&range(), SortCriterion::Closeness),
            "neo:2025-08-21:2025-08-27:closeness"
        );
    }

    #[test]
    fn test_cache_key_distinct() {
        let other = DateRange::parse("2025-08-21", "2025-08-28").unwrap();
        let mut keys: Vec<String> = SortCriterion::ALL
            .iter()
            .flat_map(|&sort| [cache_key(&range(), sort), cache_key(&other, sort)])
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), 6);
        assert_ne!(
            cache_key(&range(), SortCriterion::Size),
            cache_key(&range(), SortCriterion::Closeness)
        );
    }

    #[tokio::test]
    async fn test_get_set() {
        let cache = MemoryCache::new();
        assert_eq!(cache.get("k").await.unwrap(), None);

        cache.set("k", "[1]".to_string(), HOUR).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("[1]"));

        // Overwrite
        cache.set("k", "[2]".to_string(), HOUR).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap().as_deref(), Some("[2]"));
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_a_miss() {
        let cache = MemoryCache::new();
        cache.set("k", "[]".to_string(), Duration::ZERO).await.unwrap();
        assert_eq!(cache.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_purge_expired() {
        let cache = MemoryCache::new();
        cache.set("stale", "[]".to_string(), Duration::ZERO).await.unwrap();
        cache.set("fresh", "[]".to_string(), HOUR).await.unwrap();

        assert_eq!(cache.purge_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert!(cache.get("fresh").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_purge_task_runs() {
        let cache = Arc::new(MemoryCache::new());
        cache.set("stale", "[]".to_string(), Duration::ZERO).await.unwrap();

        let handle = cache.clone().start_purge_task(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(100)).await;
        handle.abort();

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_huge_ttl_is_an_error() {
        let cache = MemoryCache::new();
        let result = cache.set("k", "[]".to_string(), Duration::MAX).await;
        assert!(result.is_err());
    }
}
