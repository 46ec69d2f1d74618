//! In-memory cache of generated answers.
//!
//! Bounded by capacity and expiring by age. Expired entries are dropped
//! lazily on read and evicted first when the cache is full.

use chrono::{DateTime, Duration, Utc};
use paper_lantern_ai::{GenerationResult, PromptKind};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// Cache key: the answer kind plus the exact prompt sent to providers.
pub type CacheKey = (PromptKind, String);

#[derive(Debug, Clone)]
struct CacheEntry {
    result: GenerationResult,
    inserted_at: DateTime<Utc>,
}

/// A shared response cache.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    ttl: Duration,
    capacity: usize,
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
}

impl ResponseCache {
    /// Creates a cache holding at most `capacity` entries for `ttl_seconds`.
    #[must_use]
    pub fn new(ttl_seconds: u64, capacity: usize) -> Self {
        let ttl = i64::try_from(ttl_seconds)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self {
            ttl,
            capacity,
            entries: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Returns a fresh cached result.
    #[must_use]
    pub fn get(&self, kind: PromptKind, prompt: &str) -> Option<GenerationResult> {
        let key = (kind, prompt.to_string());
        let now = Utc::now();
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            match entries.get(&key) {
                Some(entry) if !self.is_expired(entry, now) => return Some(entry.result.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        if entries
            .get(&key)
            .is_some_and(|entry| self.is_expired(entry, now))
        {
            entries.remove(&key);
        }
        None
    }

    /// Stores a result, evicting to stay within capacity.
    pub fn insert(&self, kind: PromptKind, prompt: &str, result: GenerationResult) {
        if self.capacity == 0 {
            return;
        }
        let now = Utc::now();
        let key = (kind, prompt.to_string());
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);

        if !entries.contains_key(&key) && entries.len() >= self.capacity {
            entries.retain(|_, entry| !self.is_expired(entry, now));
            if entries.len() >= self.capacity
                && let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.inserted_at)
                    .map(|(key, _)| key.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: now,
            },
        );
    }

    /// Number of stored entries, including expired ones not yet dropped.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn is_expired(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.inserted_at >= self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use paper_lantern_ai::{LlmProvider, ProviderRole};

    fn result(text: &str) -> GenerationResult {
        GenerationResult {
            text: text.to_string(),
            source: LlmProvider::Gemini,
            role: ProviderRole::Primary,
        }
    }

    #[test]
    fn hit_returns_stored_result() {
        let cache = ResponseCache::new(600, 4);
        cache.insert(PromptKind::ShortAnswer, "What is GDP?", result("answer"));

        assert_eq!(
            cache.get(PromptKind::ShortAnswer, "What is GDP?"),
            Some(result("answer"))
        );
    }

    #[test]
    fn kind_is_part_of_the_key() {
        let cache = ResponseCache::new(600, 4);
        cache.insert(PromptKind::ShortAnswer, "GDP", result("short"));

        assert_eq!(cache.get(PromptKind::LongAnswer, "GDP"), None);
    }

    #[test]
    fn expired_entries_are_dropped_on_read() {
        let cache = ResponseCache::new(0, 4);
        cache.insert(PromptKind::Assignment, "Photosynthesis", result("old"));
        assert_eq!(cache.len(), 1);

        assert_eq!(cache.get(PromptKind::Assignment, "Photosynthesis"), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_evicts_oldest() {
        let cache = ResponseCache::new(600, 2);
        cache.insert(PromptKind::ShortAnswer, "first", result("1"));
        std::thread::sleep(std::time::Duration::from_millis(2));
        cache.insert(PromptKind::ShortAnswer, "second", result("2"));
        std::thread::sleep(std::time::Duration::from_millis(2));
        cache.insert(PromptKind::ShortAnswer, "third", result("3"));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(PromptKind::ShortAnswer, "first"), None);
        assert!(cache.get(PromptKind::ShortAnswer, "second").is_some());
        assert!(cache.get(PromptKind::ShortAnswer, "third").is_some());
    }

    #[test]
    fn overwriting_a_key_does_not_evict() {
        let cache = ResponseCache::new(600, 1);
        cache.insert(PromptKind::ShortAnswer, "q", result("a"));
        cache.insert(PromptKind::ShortAnswer, "q", result("b"));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(PromptKind::ShortAnswer, "q"), Some(result("b")));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let cache = ResponseCache::new(600, 0);
        cache.insert(PromptKind::ShortAnswer, "q", result("a"));
        assert!(cache.is_empty());
    }
}
