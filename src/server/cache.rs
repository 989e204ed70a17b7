//! In-memory cache of extraction results.
//!
//! Keyed by [`RecognitionRequest::cache_key`](crate::pipeline::RecognitionRequest::cache_key),
//! so uploading the same image with the same options, or downloading an
//! artifact after the result page rendered, never re-runs recognition.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use crate::pipeline::Extraction;

/// A cached value with expiration time.
struct CacheEntry<T> {
    value: T,
    inserted_at: Instant,
    expires_at: Instant,
}

impl<T: Clone> CacheEntry<T> {
    fn new(value: T, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            inserted_at: now,
            expires_at: now + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    fn get(&self) -> Option<T> {
        if self.is_expired() {
            None
        } else {
            Some(self.value.clone())
        }
    }
}

/// TTL- and capacity-bounded cache of extraction results.
pub struct ExtractionCache {
    entries: RwLock<HashMap<String, CacheEntry<Extraction>>>,
    ttl: Duration,
    capacity: usize,
}

impl ExtractionCache {
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity: capacity.max(1),
        }
    }

    pub fn get(&self, key: &str) -> Option<Extraction> {
        self.entries.read().ok()?.get(key)?.get()
    }

    /// Store a result, evicting expired entries and then the oldest ones
    /// if the cache is full.
    pub fn insert(&self, key: String, value: Extraction) {
        let Ok(mut entries) = self.entries.write() else {
            return;
        };

        entries.retain(|_, entry| !entry.is_expired());
        while entries.len() >= self.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, entry)| entry.inserted_at)
                .map(|(k, _)| k.clone());
            match oldest {
                Some(k) => {
                    entries.remove(&k);
                }
                None => break,
            }
        }
        entries.insert(key, CacheEntry::new(value, self.ttl));
    }

    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Extraction {
        Extraction::from_raw(s.to_string(), true)
    }

    #[test]
    fn test_get_returns_inserted_value() {
        let cache = ExtractionCache::new(Duration::from_secs(60), 4);
        assert!(cache.get("a").is_none());
        cache.insert("a".to_string(), text("alpha"));
        assert_eq!(cache.get("a"), Some(text("alpha")));
        cache.insert("b".to_string(), Extraction::NoText);
        assert_eq!(cache.get("b"), Some(Extraction::NoText));
    }

    #[test]
    fn test_expired_entries_are_not_returned() {
        let cache = ExtractionCache::new(Duration::ZERO, 4);
        cache.insert("a".to_string(), text("alpha"));
        assert!(cache.get("a").is_none());
    }

    #[test]
    fn test_capacity_evicts_oldest() {
        let cache = ExtractionCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), text("alpha"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("b".to_string(), text("beta"));
        std::thread::sleep(Duration::from_millis(2));
        cache.insert("c".to_string(), text("gamma"));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_none());
        assert!(cache.get("b").is_some());
        assert!(cache.get("c").is_some());
    }

    #[test]
    fn test_reinserting_a_key_does_not_evict_others() {
        let cache = ExtractionCache::new(Duration::from_secs(60), 2);
        cache.insert("a".to_string(), text("alpha"));
        cache.insert("b".to_string(), text("beta"));
        cache.insert("b".to_string(), text("beta again"));
        assert_eq!(cache.len(), 2);
        assert!(cache.get("a").is_some());
    }
}
