//! Configuration Module
//!
//! Cache configuration for the lookup engine, and server configuration loaded
//! from environment variables.

use std::env;
use std::time::Duration;

use crate::error::{CacheError, Result};

// == Defaults ==
/// Default entry time-to-live (10 minutes)
pub const DEFAULT_TTL_SECS: u64 = 600;

/// Default number of cache shards
pub const DEFAULT_SHARDS: usize = 64;

/// Default maximum encoded entry size in bytes
pub const DEFAULT_MAX_ENTRY_SIZE: usize = 1024 * 1024; // 1 MB

/// Default interval between expired-entry sweeps
pub const DEFAULT_CLEAN_INTERVAL_SECS: u64 = 1;

// == Cache Config ==
/// Parameters for building a [`ShardedCache`](crate::cache::ShardedCache) and
/// the [`LookupEngine`](crate::lookup::LookupEngine) around it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Time after which an entry is logically absent
    pub ttl: Duration,
    /// Number of independently locked shards (power of two)
    pub shards: usize,
    /// Optional hard bound on the total number of entries
    pub max_entries: Option<usize>,
    /// Maximum size of one encoded record in bytes
    pub max_entry_size: usize,
    /// Interval of the background sweeper, None disables it
    pub clean_interval: Option<Duration>,
    /// Emit lookup logs through tracing, or discard them
    pub verbose: bool,
    /// Serialize concurrent misses for the same key
    pub coalesce_misses: bool,
}

impl CacheConfig {
    // == Constructor ==
    /// Creates a configuration with the given TTL and default everything else.
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            shards: DEFAULT_SHARDS,
            max_entries: None,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
            clean_interval: Some(Duration::from_secs(DEFAULT_CLEAN_INTERVAL_SECS)),
            verbose: true,
            coalesce_misses: false,
        }
    }

    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = shards;
        self
    }

    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = Some(max_entries);
        self
    }

    pub fn with_max_entry_size(mut self, max_entry_size: usize) -> Self {
        self.max_entry_size = max_entry_size;
        self
    }

    pub fn with_clean_interval(mut self, interval: Option<Duration>) -> Self {
        self.clean_interval = interval;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn with_coalesced_misses(mut self, coalesce: bool) -> Self {
        self.coalesce_misses = coalesce;
        self
    }

    // == Validate ==
    /// Checks that a cache can be built from this configuration.
    pub fn validate(&self) -> Result<()> {
        if self.ttl.is_zero() {
            return Err(CacheError::Config("ttl must be greater than zero".to_string()));
        }
        if self.shards == 0 || !self.shards.is_power_of_two() {
            return Err(CacheError::Config(format!(
                "shard count must be a power of two, got {}",
                self.shards
            )));
        }
        if let Some(max_entries) = self.max_entries {
            if max_entries < self.shards {
                return Err(CacheError::Config(format!(
                    "max_entries ({}) must be at least the shard count ({})",
                    max_entries, self.shards
                )));
            }
        }
        if self.max_entry_size == 0 {
            return Err(CacheError::Config(
                "max_entry_size must be greater than zero".to_string(),
            ));
        }
        if self.clean_interval.is_some_and(|interval| interval.is_zero()) {
            return Err(CacheError::Config(
                "clean_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-shard capacity, rounding down so the shards together never hold
    /// more than `max_entries`.
    ///
    /// Validation keeps `max_entries >= shards`, so every shard gets a slot.
    pub fn shard_capacity(&self) -> Option<usize> {
        self.max_entries.map(|max| (max / self.shards.max(1)).max(1))
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_TTL_SECS))
    }
}

// == Server Config ==
/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// User cache parameters
    pub cache: CacheConfig,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 8080)
    /// - `CACHE_TTL` - Entry TTL in seconds (default: 600)
    /// - `CACHE_SHARDS` - Shard count, power of two (default: 64)
    /// - `CACHE_MAX_ENTRIES` - Hard capacity bound (default: unbounded)
    /// - `CACHE_MAX_ENTRY_SIZE` - Max encoded record bytes (default: 1 MB)
    /// - `CACHE_CLEAN_INTERVAL` - Sweep interval in seconds, 0 disables (default: 1)
    /// - `CACHE_VERBOSE` - Emit lookup logs (default: true)
    /// - `CACHE_COALESCE` - Single-flight concurrent misses (default: false)
    pub fn from_env() -> Self {
        let ttl = parse_var("CACHE_TTL").unwrap_or(DEFAULT_TTL_SECS);
        let clean_interval =
            parse_var("CACHE_CLEAN_INTERVAL").unwrap_or(DEFAULT_CLEAN_INTERVAL_SECS);

        let mut cache = CacheConfig::new(Duration::from_secs(ttl))
            .with_shards(parse_var("CACHE_SHARDS").unwrap_or(DEFAULT_SHARDS))
            .with_max_entry_size(
                parse_var("CACHE_MAX_ENTRY_SIZE").unwrap_or(DEFAULT_MAX_ENTRY_SIZE),
            )
            .with_clean_interval((clean_interval > 0).then(|| Duration::from_secs(clean_interval)))
            .with_verbose(parse_var("CACHE_VERBOSE").unwrap_or(true))
            .with_coalesced_misses(parse_var("CACHE_COALESCE").unwrap_or(false));
        cache.max_entries = parse_var("CACHE_MAX_ENTRIES");

        Self {
            server_port: parse_var("SERVER_PORT").unwrap_or(8080),
            cache,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 8080,
            cache: CacheConfig::default(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_config_default() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(600));
        assert_eq!(config.shards, 64);
        assert!(config.max_entries.is_none());
        assert_eq!(config.clean_interval, Some(Duration::from_secs(1)));
        assert!(config.verbose);
        assert!(!config.coalesce_misses);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_zero_ttl() {
        let config = CacheConfig::new(Duration::ZERO);
        assert!(matches!(config.validate(), Err(CacheError::Config(_))));
    }

    #[test]
    fn test_validate_shards_not_power_of_two() {
        let config = CacheConfig::default().with_shards(12);
        assert!(matches!(config.validate(), Err(CacheError::Config(_))));

        let config = CacheConfig::default().with_shards(0);
        assert!(matches!(config.validate(), Err(CacheError::Config(_))));
    }

    #[test]
    fn test_validate_capacity_below_shards() {
        let config = CacheConfig::default().with_shards(8).with_max_entries(4);
        assert!(matches!(config.validate(), Err(CacheError::Config(_))));
    }

    #[test]
    fn test_validate_zero_clean_interval() {
        let config = CacheConfig::default().with_clean_interval(Some(Duration::ZERO));
        assert!(matches!(config.validate(), Err(CacheError::Config(_))));
    }

    #[test]
    fn test_shard_capacity_rounds_down() {
        let config = CacheConfig::default().with_shards(4).with_max_entries(10);
        assert_eq!(config.shard_capacity(), Some(2));

        let config = CacheConfig::default().with_shards(8).with_max_entries(8);
        assert_eq!(config.shard_capacity(), Some(1));
        assert_eq!(CacheConfig::default().shard_capacity(), None);
    }

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cache, CacheConfig::default());
    }

    #[test]
    fn test_config_from_env_defaults() {
        // Clear any existing env vars to test defaults
        for name in [
            "SERVER_PORT",
            "CACHE_TTL",
            "CACHE_SHARDS",
            "CACHE_MAX_ENTRIES",
            "CACHE_MAX_ENTRY_SIZE",
            "CACHE_CLEAN_INTERVAL",
            "CACHE_VERBOSE",
            "CACHE_COALESCE",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.cache, CacheConfig::default());
    }
}
