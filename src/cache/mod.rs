//! Cache Module
//!
//! Provides the sharded in-memory byte cache with TTL expiration and
//! oldest-first capacity eviction.

mod entry;
mod queue;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::{CacheCounters, CacheStats};
pub use store::{ByteCache, ShardedCache};

// == Public Constants ==
/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;
