//! Response DTOs for the user API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;
use crate::lookup::LookupStats;

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Label of the cached record type
    pub record: String,
    /// Lookup outcomes
    pub lookups: LookupStats,
    /// Underlying cache counters
    pub cache: CacheStats,
    /// Share of lookups answered from the cache
    pub hit_rate: f64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from engine and cache statistics
    pub fn new(record: impl Into<String>, lookups: LookupStats, cache: CacheStats) -> Self {
        let total = lookups.hits + lookups.misses;
        let hit_rate = if total > 0 {
            lookups.hits as f64 / total as f64
        } else {
            0.0
        };
        Self {
            record: record.into(),
            lookups,
            cache,
            hit_rate,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
