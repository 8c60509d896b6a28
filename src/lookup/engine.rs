//! Lookup Engine Module
//!
//! Cache-aside lookups of single records by primary key.

use std::fmt::{self, Display};
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

use crate::cache::{ByteCache, ShardedCache};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_cleanup_task;

use super::flight::FlightGate;
use super::log::{EventKind, LookupEvent, LookupLog, SilentLog, TracingLog};
use super::stats::{LookupCounters, LookupStats};

// == Source ==
/// Where a lookup found its record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    /// Decoded from a fresh cache entry
    Cache,
    /// Returned by the accessor after a miss
    Store,
}

impl Source {
    pub fn is_hit(&self) -> bool {
        matches!(self, Source::Cache)
    }
}

// == Lookup ==
/// A record together with the place it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lookup<T> {
    pub record: T,
    pub source: Source,
}

// == Lookup Engine ==
/// Read-through cache for one record type.
///
/// Records are encoded as JSON. The engine never invalidates or deletes an
/// entry: it disappears only through the cache's own TTL or capacity policy.
pub struct LookupEngine<T, C = ShardedCache> {
    cache: Arc<C>,
    label: String,
    log: Arc<dyn LookupLog>,
    counters: LookupCounters,
    flights: Option<FlightGate>,
    sweeper: Option<JoinHandle<()>>,
    _record: PhantomData<fn() -> T>,
}

impl<T> LookupEngine<T, ShardedCache>
where
    T: Serialize + DeserializeOwned,
{
    // == Constructor ==
    /// Builds an engine over a new [`ShardedCache`].
    ///
    /// Lookup events go through `tracing` when `config.verbose` is set and are
    /// discarded otherwise.
    ///
    /// When `config.clean_interval` is set and a tokio runtime is running, the
    /// engine starts a sweeper that reclaims expired entries and stops it when
    /// dropped. Outside a runtime, call [`spawn_cleanup_task`] once one exists.
    pub fn new(config: &CacheConfig, label: impl Into<String>) -> Result<Self> {
        let cache = Arc::new(ShardedCache::new(config)?);
        let log: Arc<dyn LookupLog> = if config.verbose {
            Arc::new(TracingLog)
        } else {
            Arc::new(SilentLog)
        };

        let sweeper = config
            .clean_interval
            .filter(|_| Handle::try_current().is_ok())
            .map(|interval| spawn_cleanup_task(Arc::clone(&cache), interval));

        let mut engine = Self::with_cache(cache, label, log);
        engine.sweeper = sweeper;
        if config.coalesce_misses {
            engine = engine.coalesce_misses();
        }
        Ok(engine)
    }
}

impl<T, C> LookupEngine<T, C>
where
    T: Serialize + DeserializeOwned,
    C: ByteCache,
{
    /// Builds an engine over an existing cache and log sink.
    pub fn with_cache(cache: Arc<C>, label: impl Into<String>, log: Arc<dyn LookupLog>) -> Self {
        Self {
            cache,
            label: label.into(),
            log,
            counters: LookupCounters::new(),
            flights: None,
            sweeper: None,
            _record: PhantomData,
        }
    }

    /// Makes concurrent misses for the same key wait for each other, so only
    /// the first reaches the backing store while the entry can be cached.
    pub fn coalesce_misses(mut self) -> Self {
        self.flights = Some(FlightGate::new());
        self
    }

    // == Lookup ==
    /// Returns the record for `key`, from the cache when a fresh entry exists
    /// and from `accessor` otherwise.
    ///
    /// The accessor is called at most once. Its error is returned unchanged
    /// and nothing is cached for the key. Encoding or storing the fetched
    /// record is best-effort: failures are logged, and the record is still
    /// returned.
    pub async fn lookup<F, Fut, E>(&self, key: &str, accessor: F) -> std::result::Result<Lookup<T>, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        if let Some(record) = self.cached(key) {
            return Ok(Lookup {
                record,
                source: Source::Cache,
            });
        }

        let _permit = match &self.flights {
            Some(flights) => {
                let permit = flights.acquire(key).await;
                // Another task may have resolved this miss while we waited.
                // This read was already counted and reported above.
                let resolved = self
                    .cache
                    .peek(key)
                    .and_then(|bytes| serde_json::from_slice(&bytes).ok());
                if let Some(record) = resolved {
                    self.emit(EventKind::Hit, key, None);
                    return Ok(Lookup {
                        record,
                        source: Source::Cache,
                    });
                }
                Some(permit)
            }
            None => None,
        };

        self.emit(EventKind::Miss, key, None);

        let record = match accessor(key.to_string()).await {
            Ok(record) => record,
            Err(err) => {
                self.emit(EventKind::FetchFailed, key, Some(&err.to_string()));
                return Err(err);
            }
        };
        self.emit(EventKind::Fetched, key, None);

        self.populate(key, &record);

        Ok(Lookup {
            record,
            source: Source::Store,
        })
    }

    // == Find ==
    /// Like [`lookup`](Self::lookup), writing the record into `destination`.
    ///
    /// `destination` is left untouched when the accessor fails.
    pub async fn find<F, Fut, E>(&self, destination: &mut T, key: &str, accessor: F) -> std::result::Result<Source, E>
    where
        F: FnOnce(String) -> Fut,
        Fut: Future<Output = std::result::Result<T, E>>,
        E: Display,
    {
        let Lookup { record, source } = self.lookup(key, accessor).await?;
        *destination = record;
        Ok(source)
    }

    /// Reads and decodes the entry for `key`.
    ///
    /// An entry that fails to decode is reported and treated as absent; the
    /// next successful fetch overwrites it.
    fn cached(&self, key: &str) -> Option<T> {
        let bytes = self.cache.get(key)?;
        match serde_json::from_slice(&bytes).map_err(CacheError::Decode) {
            Ok(record) => {
                self.emit(EventKind::Hit, key, None);
                Some(record)
            }
            Err(err) => {
                self.emit(EventKind::DecodeFailed, key, Some(&err.to_string()));
                None
            }
        }
    }

    fn populate(&self, key: &str, record: &T) {
        let bytes = match serde_json::to_vec(record).map_err(CacheError::Encode) {
            Ok(bytes) => bytes,
            Err(err) => {
                self.emit(EventKind::EncodeFailed, key, Some(&err.to_string()));
                return;
            }
        };

        match self.cache.set(key, bytes) {
            Ok(()) => self.emit(EventKind::Stored, key, None),
            Err(err) => self.emit(EventKind::StoreFailed, key, Some(&err.to_string())),
        }
    }

    fn emit(&self, kind: EventKind, key: &str, error: Option<&str>) {
        self.counters.record(kind);
        self.log.record(&LookupEvent {
            kind,
            label: &self.label,
            key,
            error,
        });
    }

    // == Accessors ==
    /// Label of the cached record type.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// The underlying cache, shared with background tasks.
    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    pub fn stats(&self) -> LookupStats {
        self.counters.snapshot()
    }
}

impl<T, C> fmt::Debug for LookupEngine<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LookupEngine")
            .field("label", &self.label)
            .field("coalesce_misses", &self.flights.is_some())
            .field("sweeping", &self.sweeper.is_some())
            .finish_non_exhaustive()
    }
}

impl<T, C> Drop for LookupEngine<T, C> {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.take() {
            sweeper.abort();
        }
    }
}
