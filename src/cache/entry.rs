//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// One serialized record plus its expiry metadata.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    /// Encoded record bytes
    pub value: Vec<u8>,
    /// Insertion instant, also the entry's position in eviction order
    pub created_at: Instant,
    /// Instant from which the entry is logically absent
    pub expires_at: Instant,
}

impl CacheEntry {
    // == Constructor ==
    /// Creates a new cache entry that expires after `ttl`.
    pub fn new(value: Vec<u8>, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            created_at: now,
            expires_at: now + ttl,
        }
    }

    // == Is Expired ==
    /// Checks if the entry has expired.
    ///
    /// An entry is expired once the current instant is at or past its
    /// deadline, so a fully elapsed TTL never yields a hit.
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Instant::now())
    }

    /// Same as [`is_expired`](Self::is_expired) against a fixed instant.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}
