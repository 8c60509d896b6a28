//! Lookup Statistics Module
//!
//! Counts lookup outcomes independently of the cache's own counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use super::log::EventKind;

// == Lookup Counters ==
#[derive(Debug, Default)]
pub struct LookupCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    fetch_failures: AtomicU64,
    corrupt_entries: AtomicU64,
    encode_failures: AtomicU64,
    store_failures: AtomicU64,
}

impl LookupCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the counter matching `kind`, if any.
    pub fn record(&self, kind: EventKind) {
        let counter = match kind {
            EventKind::Hit => &self.hits,
            EventKind::Miss => &self.misses,
            EventKind::FetchFailed => &self.fetch_failures,
            EventKind::DecodeFailed => &self.corrupt_entries,
            EventKind::EncodeFailed => &self.encode_failures,
            EventKind::StoreFailed => &self.store_failures,
            EventKind::Fetched | EventKind::Stored => return,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> LookupStats {
        LookupStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            fetch_failures: self.fetch_failures.load(Ordering::Relaxed),
            corrupt_entries: self.corrupt_entries.load(Ordering::Relaxed),
            encode_failures: self.encode_failures.load(Ordering::Relaxed),
            store_failures: self.store_failures.load(Ordering::Relaxed),
        }
    }
}

// == Lookup Stats ==
/// Point-in-time view of lookup outcomes for one engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LookupStats {
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that went to the backing store
    pub misses: u64,
    /// Accessor errors returned to the caller
    pub fetch_failures: u64,
    /// Cache entries that failed to decode
    pub corrupt_entries: u64,
    /// Fetched records that failed to encode
    pub encode_failures: u64,
    /// Encoded records the cache refused
    pub store_failures: u64,
}
