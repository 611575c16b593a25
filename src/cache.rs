//! Bounded response cache keyed by a fingerprint of the normalized request.

use lru::LruCache;
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::debug;

use crate::config::CacheConfig;
use crate::CampaignContent;

const FIELD_SEPARATOR: &str = "\u{1f}";

fn hex_digest(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|byte| format!("{:02x}", byte))
        .collect()
}

/// SHA-256 over the whitespace-collapsed caption, image digest, platform, date, influencer flag
/// and the persona set. Caption case is kept because the report echoes the cleaned caption.
pub fn fingerprint(content: &CampaignContent) -> String {
    let image = content
        .image
        .as_deref()
        .filter(|bytes| !bytes.is_empty())
        .map(hex_digest)
        .unwrap_or_else(|| "none".to_string());
    let personas: BTreeSet<&str> = content.persona_ids.iter().map(String::as_str).collect();
    let fields = [
        content.caption.split_whitespace().collect::<Vec<_>>().join(" "),
        image,
        content.platform.key().to_string(),
        content
            .posting_date
            .as_deref()
            .map(str::trim)
            .unwrap_or("")
            .to_string(),
        content.influencer.to_string(),
        personas.into_iter().collect::<Vec<_>>().join(","),
    ];
    hex_digest(fields.join(FIELD_SEPARATOR).as_bytes())
}

struct CacheEntry<V> {
    value: Arc<V>,
    created_at: Instant,
}

#[derive(Debug, Clone, Copy, Default, serde::Serialize)]
pub struct CacheStats {
    pub entries: usize,
    pub capacity: usize,
    pub hits: u64,
    pub misses: u64,
}

/// Entries never exceed `capacity` and are never served once older than the TTL.
pub struct ResponseCache<V> {
    entries: Mutex<LruCache<String, CacheEntry<V>>>,
    capacity: usize,
    ttl: Duration,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<V> ResponseCache<V> {
    pub fn new(config: &CacheConfig) -> Self {
        let capacity = NonZeroUsize::new(config.capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: Mutex::new(LruCache::new(capacity)),
            capacity: capacity.get(),
            ttl: Duration::from_secs(config.ttl_seconds),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<V>> {
        let mut entries = self.entries.lock().await;
        let expired = match entries.get(key) {
            Some(entry) if entry.created_at.elapsed() <= self.ttl => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                return Some(Arc::clone(&entry.value));
            }
            Some(_) => true,
            None => false,
        };
        if expired {
            entries.pop(key);
            debug!(key = %key, "cache entry expired");
        }
        self.misses.fetch_add(1, Ordering::Relaxed);
        None
    }

    /// Overwrites any entry for `key`; concurrent writers of the same key store equal values.
    pub async fn insert(&self, key: String, value: Arc<V>) {
        let mut entries = self.entries.lock().await;
        entries.put(
            key,
            CacheEntry {
                value,
                created_at: Instant::now(),
            },
        );
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len().await,
            capacity: self.capacity,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Platform;

    #[test]
    fn fingerprint_normalizes_inputs() {
        let mut first = CampaignContent::new("  Hello   WORLD ", Platform::Instagram);
        first.persona_ids = vec!["b".to_string(), "a".to_string(), "a".to_string()];
        let mut second = CampaignContent::new("Hello WORLD", Platform::Instagram);
        second.persona_ids = vec!["a".to_string(), "b".to_string()];
        assert_eq!(fingerprint(&first), fingerprint(&second));

        let mut with_image = second.clone();
        with_image.image = Some(vec![1, 2, 3]);
        assert_ne!(fingerprint(&second), fingerprint(&with_image));
        let mut other_platform = second.clone();
        other_platform.platform = Platform::TikTok;
        assert_ne!(fingerprint(&second), fingerprint(&other_platform));
    }

    #[test]
    fn fingerprint_keeps_caption_case() {
        let title = CampaignContent::new("Great Diwali Offers", Platform::Instagram);
        let shouted = CampaignContent::new("GREAT DIWALI OFFERS", Platform::Instagram);
        assert_ne!(fingerprint(&title), fingerprint(&shouted));
    }

    #[tokio::test]
    async fn evicts_least_recently_used() {
        let cache = ResponseCache::new(&CacheConfig {
            capacity: 2,
            ttl_seconds: 60,
        });
        cache.insert("a".to_string(), Arc::new(1)).await;
        cache.insert("b".to_string(), Arc::new(2)).await;
        assert!(cache.get("a").await.is_some());
        cache.insert("c".to_string(), Arc::new(3)).await;
        assert_eq!(cache.len().await, 2);
        assert!(cache.get("b").await.is_none());
        assert_eq!(cache.get("c").await.as_deref(), Some(&3));
    }

    #[tokio::test]
    async fn expired_entries_are_not_served() {
        let cache = ResponseCache::new(&CacheConfig {
            capacity: 4,
            ttl_seconds: 0,
        });
        cache.insert("a".to_string(), Arc::new("report")).await;
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(cache.get("a").await.is_none());
        assert_eq!(cache.len().await, 0);
        let stats = cache.stats().await;
        assert_eq!(stats.misses, 1);
    }
}
