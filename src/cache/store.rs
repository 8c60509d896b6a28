//! Cache Store Module
//!
//! Byte-oriented cache with TTL expiry and per-shard capacity eviction.

use std::collections::hash_map::RandomState;
use std::collections::HashMap;
use std::hash::BuildHasher;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::{Duration, Instant};

use super::queue::EvictionQueue;
use crate::cache::{CacheCounters, CacheEntry, CacheStats, MAX_KEY_LENGTH};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Byte Cache ==
/// A keyed byte cache with its own expiry policy.
///
/// Implementations must be safe to call from many tasks at once and must not
/// block on anything but short in-memory critical sections.
pub trait ByteCache: Send + Sync {
    /// Returns the bytes stored under `key`, or None when absent or expired.
    fn get(&self, key: &str) -> Option<Vec<u8>>;

    /// Stores `value` under `key`, replacing any previous entry.
    fn set(&self, key: &str, value: Vec<u8>) -> Result<()>;

    /// Like [`get`](Self::get), for a repeated read of a key already counted
    /// once. Caches that keep hit/miss statistics leave them untouched.
    fn peek(&self, key: &str) -> Option<Vec<u8>> {
        self.get(key)
    }
}

// == Shard ==
/// Stale queue records tolerated beyond twice the live entry count before the
/// queue is compacted.
const QUEUE_SLACK: usize = 64;

#[derive(Debug, Default)]
struct Shard {
    entries: HashMap<String, CacheEntry>,
    // Only maintained when the cache has a capacity bound
    queue: EvictionQueue,
}

impl Shard {
    fn remove_expired(&mut self, now: Instant) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired_at(now));
        before - self.entries.len()
    }

    fn is_live(&self, key: &str, inserted_at: Instant) -> bool {
        self.entries
            .get(key)
            .is_some_and(|entry| entry.created_at == inserted_at)
    }

    /// Removes the oldest live insertion, skipping records left behind by
    /// overwrites and removals. Returns false when nothing was left to evict.
    fn evict_oldest(&mut self) -> bool {
        while let Some((key, inserted_at)) = self.queue.pop_oldest() {
            if self.is_live(&key, inserted_at) {
                self.entries.remove(&key);
                return true;
            }
        }
        false
    }

    fn track(&mut self, key: &str, inserted_at: Instant) {
        self.queue.push(key, inserted_at);

        if self.queue.len() > 2 * self.entries.len() + QUEUE_SLACK {
            let entries = &self.entries;
            self.queue.retain(|key, at| {
                entries
                    .get(key)
                    .is_some_and(|entry| entry.created_at == at)
            });
        }
    }
}

// == Sharded Cache ==
/// In-memory [`ByteCache`] split into independently locked shards.
///
/// Every entry lives for the configured TTL. When a capacity bound is set,
/// each shard holds at most its share of it and evicts its oldest insertion
/// to make room.
#[derive(Debug)]
pub struct ShardedCache {
    shards: Box<[RwLock<Shard>]>,
    hasher: RandomState,
    mask: usize,
    ttl: Duration,
    shard_capacity: Option<usize>,
    max_entry_size: usize,
    counters: CacheCounters,
}

impl ShardedCache {
    // == Constructor ==
    /// Creates a cache from `config`, failing if the configuration is invalid.
    pub fn new(config: &CacheConfig) -> Result<Self> {
        config.validate()?;

        let shards = (0..config.shards)
            .map(|_| RwLock::new(Shard::default()))
            .collect();

        Ok(Self {
            shards,
            hasher: RandomState::new(),
            mask: config.shards - 1,
            ttl: config.ttl,
            shard_capacity: config.shard_capacity(),
            max_entry_size: config.max_entry_size,
            counters: CacheCounters::new(),
        })
    }

    fn shard(&self, key: &str) -> &RwLock<Shard> {
        let hash = self.hasher.hash_one(key) as usize;
        &self.shards[hash & self.mask]
    }

    fn validate(&self, key: &str, value: &[u8]) -> Result<()> {
        if key.is_empty() {
            return Err(CacheError::InvalidKey("key cannot be empty".to_string()));
        }
        if key.len() > MAX_KEY_LENGTH {
            return Err(CacheError::InvalidKey(format!(
                "key exceeds maximum length of {} bytes",
                MAX_KEY_LENGTH
            )));
        }
        if value.len() > self.max_entry_size {
            return Err(CacheError::EntryTooLarge {
                size: value.len(),
                limit: self.max_entry_size,
            });
        }
        Ok(())
    }

    // == Cleanup Expired ==
    /// Removes all expired entries from every shard.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let now = Instant::now();
        let removed = self
            .shards
            .iter()
            .map(|shard| write(shard).remove_expired(now))
            .sum();

        self.counters.record_expired(removed);
        removed
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot(self.len())
    }

    // == Length ==
    /// Returns the number of stored entries, including expired ones not yet
    /// reclaimed.
    pub fn len(&self) -> usize {
        self.shards.iter().map(|shard| read(shard).entries.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl ByteCache for ShardedCache {
    fn get(&self, key: &str) -> Option<Vec<u8>> {
        let shard = read(self.shard(key));
        match shard.entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                self.counters.record_hit();
                Some(entry.value.clone())
            }
            // Expired entries stay until overwritten or swept
            _ => {
                self.counters.record_miss();
                None
            }
        }
    }

    fn peek(&self, key: &str) -> Option<Vec<u8>> {
        read(self.shard(key))
            .entries
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    fn set(&self, key: &str, value: Vec<u8>) -> Result<()> {
        self.validate(key, &value)?;

        let mut shard = write(self.shard(key));

        if let Some(capacity) = self.shard_capacity {
            if !shard.entries.contains_key(key) && shard.entries.len() >= capacity {
                let purged = shard.remove_expired(Instant::now());
                self.counters.record_expired(purged);
                while shard.entries.len() >= capacity && shard.evict_oldest() {
                    self.counters.record_eviction();
                }
            }
        }

        let entry = CacheEntry::new(value, self.ttl);
        let inserted_at = entry.created_at;
        shard.entries.insert(key.to_string(), entry);
        if self.shard_capacity.is_some() {
            shard.track(key, inserted_at);
        }

        Ok(())
    }
}

fn read(lock: &RwLock<Shard>) -> RwLockReadGuard<'_, Shard> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

fn write(lock: &RwLock<Shard>) -> RwLockWriteGuard<'_, Shard> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use std::thread::sleep;

    fn single_shard(ttl: Duration) -> CacheConfig {
        CacheConfig::new(ttl).with_shards(1)
    }

    #[test]
    fn test_store_new() {
        let store = ShardedCache::new(&CacheConfig::default()).unwrap();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
        assert_eq!(store.shards.len(), 64);
    }

    #[test]
    fn test_store_rejects_invalid_config() {
        let result = ShardedCache::new(&CacheConfig::default().with_shards(3));
        assert!(matches!(result, Err(CacheError::Config(_))));
    }

    #[test]
    fn test_store_set_and_get() {
        let store = ShardedCache::new(&CacheConfig::default()).unwrap();

        store.set("u1", b"ann".to_vec()).unwrap();

        assert_eq!(store.get("u1"), Some(b"ann".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_nonexistent() {
        let store = ShardedCache::new(&CacheConfig::default()).unwrap();
        assert_eq!(store.get("nonexistent"), None);
    }

    #[test]
    fn test_store_overwrite() {
        let store = ShardedCache::new(&CacheConfig::default()).unwrap();

        store.set("u1", b"first".to_vec()).unwrap();
        store.set("u1", b"second".to_vec()).unwrap();

        assert_eq!(store.get("u1"), Some(b"second".to_vec()));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = ShardedCache::new(&single_shard(Duration::from_millis(100))).unwrap();

        store.set("u1", b"ann".to_vec()).unwrap();
        assert!(store.get("u1").is_some());

        sleep(Duration::from_millis(150));

        assert_eq!(store.get("u1"), None);
    }

    #[test]
    fn test_store_capacity_evicts_oldest() {
        let config = single_shard(Duration::from_secs(300)).with_max_entries(3);
        let store = ShardedCache::new(&config).unwrap();

        store.set("u1", b"1".to_vec()).unwrap();
        store.set("u2", b"2".to_vec()).unwrap();
        store.set("u3", b"3".to_vec()).unwrap();

        // Reads do not protect an entry from eviction
        store.get("u1").unwrap();

        store.set("u4", b"4".to_vec()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("u1"), None);
        assert!(store.get("u2").is_some());
        assert!(store.get("u4").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_overwrite_counts_as_newest_insertion() {
        let config = single_shard(Duration::from_secs(300)).with_max_entries(3);
        let store = ShardedCache::new(&config).unwrap();

        store.set("u1", b"1".to_vec()).unwrap();
        store.set("u2", b"2".to_vec()).unwrap();
        store.set("u3", b"3".to_vec()).unwrap();
        store.set("u1", b"1b".to_vec()).unwrap();

        store.set("u4", b"4".to_vec()).unwrap();

        assert_eq!(store.len(), 3);
        assert_eq!(store.get("u2"), None);
        assert_eq!(store.get("u1"), Some(b"1b".to_vec()));
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_capacity_is_a_hard_bound() {
        let config = CacheConfig::new(Duration::from_secs(300))
            .with_shards(4)
            .with_max_entries(10);
        let store = ShardedCache::new(&config).unwrap();

        for i in 0..2000 {
            store.set(&format!("k{}", i), b"v".to_vec()).unwrap();
            assert!(store.len() <= 10, "len {} exceeds capacity 10", store.len());
        }
    }

    #[test]
    fn test_store_overwrites_do_not_grow_queue() {
        let config = single_shard(Duration::from_secs(300)).with_max_entries(4);
        let store = ShardedCache::new(&config).unwrap();

        for i in 0..1000 {
            store.set("hot", i.to_string().into_bytes()).unwrap();
        }

        let shard = read(&store.shards[0]);
        assert_eq!(shard.entries.len(), 1);
        assert!(shard.queue.len() <= 2 + QUEUE_SLACK + 1);
    }

    #[test]
    fn test_store_unbounded_keeps_no_queue() {
        let store = ShardedCache::new(&single_shard(Duration::from_secs(300))).unwrap();

        for i in 0..100 {
            store.set(&format!("k{}", i), b"v".to_vec()).unwrap();
        }

        assert_eq!(read(&store.shards[0]).queue.len(), 0);
        assert_eq!(store.len(), 100);
    }

    #[test]
    fn test_store_capacity_prefers_expired_entries() {
        let config = single_shard(Duration::from_millis(100)).with_max_entries(2);
        let store = ShardedCache::new(&config).unwrap();

        store.set("u1", b"1".to_vec()).unwrap();
        store.set("u2", b"2".to_vec()).unwrap();
        sleep(Duration::from_millis(150));

        store.set("u3", b"3".to_vec()).unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.stats().evictions, 0);
        assert_eq!(store.stats().expired, 2);
    }

    #[test]
    fn test_store_stats() {
        let store = ShardedCache::new(&CacheConfig::default()).unwrap();

        store.set("u1", b"ann".to_vec()).unwrap();
        store.get("u1").unwrap(); // hit
        let _ = store.get("nonexistent"); // miss

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
    }

    #[test]
    fn test_store_peek_is_not_counted() {
        let store = ShardedCache::new(&CacheConfig::default()).unwrap();
        store.set("u1", b"ann".to_vec()).unwrap();

        assert_eq!(store.peek("u1"), Some(b"ann".to_vec()));
        assert_eq!(store.peek("u2"), None);

        let stats = store.stats();
        assert_eq!(stats.hits, 0);
        assert_eq!(stats.misses, 0);
    }

    #[test]
    fn test_store_cleanup_expired() {
        let config = CacheConfig::new(Duration::from_millis(100));
        let store = ShardedCache::new(&config).unwrap();

        store.set("u1", b"1".to_vec()).unwrap();
        store.set("u2", b"2".to_vec()).unwrap();

        sleep(Duration::from_millis(150));

        let removed = store.cleanup_expired();
        assert_eq!(removed, 2);
        assert!(store.is_empty());
        assert_eq!(store.stats().expired, 2);
    }

    #[test]
    fn test_store_empty_key() {
        let store = ShardedCache::new(&CacheConfig::default()).unwrap();

        let result = store.set("", b"value".to_vec());
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_store_key_too_long() {
        let store = ShardedCache::new(&CacheConfig::default()).unwrap();
        let long_key = "x".repeat(MAX_KEY_LENGTH + 1);

        let result = store.set(&long_key, b"value".to_vec());
        assert!(matches!(result, Err(CacheError::InvalidKey(_))));
    }

    #[test]
    fn test_store_value_too_large() {
        let config = CacheConfig::default().with_max_entry_size(8);
        let store = ShardedCache::new(&config).unwrap();

        let result = store.set("u1", vec![0u8; 9]);
        assert!(matches!(
            result,
            Err(CacheError::EntryTooLarge { size: 9, limit: 8 })
        ));
        assert!(store.is_empty());
    }
}
