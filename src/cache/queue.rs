//! Eviction Queue Module
//!
//! Tracks insertion order inside a shard for oldest-first capacity eviction.

use std::collections::VecDeque;
use std::time::Instant;

// == Eviction Queue ==
/// Insertion records of one shard, oldest at the front.
///
/// Each record is a key plus the instant it was written. Overwrites and
/// removals leave the old record behind; the shard recognizes such stale
/// records by comparing the instant with the live entry and skips them when
/// popping, or drops them in bulk with [`retain`](Self::retain).
///
/// Reads never touch the queue.
#[derive(Debug, Default)]
pub struct EvictionQueue {
    order: VecDeque<(String, Instant)>,
}

impl EvictionQueue {
    // == Push ==
    /// Records that `key` was written at `inserted_at`.
    pub fn push(&mut self, key: &str, inserted_at: Instant) {
        self.order.push_back((key.to_string(), inserted_at));
    }

    // == Pop Oldest ==
    /// Returns and removes the oldest record, stale or not.
    ///
    /// Returns None if the queue is empty.
    pub fn pop_oldest(&mut self) -> Option<(String, Instant)> {
        self.order.pop_front()
    }

    /// Keeps only the records for which `live` returns true, in order.
    pub fn retain(&mut self, mut live: impl FnMut(&str, Instant) -> bool) {
        self.order.retain(|(key, inserted_at)| live(key, *inserted_at));
    }

    /// Number of records, including stale ones.
    pub fn len(&self) -> usize {
        self.order.len()
    }
}
