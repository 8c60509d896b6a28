//! Record Cache - A read-through cache for single-record lookups
//!
//! Answers lookups by primary key from a sharded in-memory cache with TTL
//! expiry, and falls back to a caller-supplied accessor on a miss.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod lookup;
pub mod models;
pub mod repository;
pub mod tasks;

pub use api::AppState;
pub use cache::{ByteCache, ShardedCache};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
pub use lookup::{Lookup, LookupEngine, LookupLog, Source};
pub use tasks::spawn_cleanup_task;
