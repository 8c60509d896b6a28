//! Lookup Log Module
//!
//! Injected sink for the hit/miss/store outcomes of each lookup.

use tracing::{error, info, warn};

// == Event Kind ==
/// Outcome reported by the engine at each step of a lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    /// Fresh entry found and decoded
    Hit,
    /// No usable entry, the accessor will be called
    Miss,
    /// Accessor returned the record
    Fetched,
    /// Accessor returned an error
    FetchFailed,
    /// Record written to the cache
    Stored,
    /// Cache refused the record
    StoreFailed,
    /// Record could not be serialized
    EncodeFailed,
    /// Cached bytes could not be deserialized
    DecodeFailed,
}

impl EventKind {
    /// Machine-readable name, logged as the `event` field.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Hit => "hit",
            EventKind::Miss => "miss",
            EventKind::Fetched => "fetched",
            EventKind::FetchFailed => "fetch_failed",
            EventKind::Stored => "stored",
            EventKind::StoreFailed => "store_failed",
            EventKind::EncodeFailed => "encode_failed",
            EventKind::DecodeFailed => "decode_failed",
        }
    }
}

// == Lookup Event ==
/// One log record, tagged with the record label and key.
#[derive(Debug, Clone, Copy)]
pub struct LookupEvent<'a> {
    pub kind: EventKind,
    pub label: &'a str,
    pub key: &'a str,
    pub error: Option<&'a str>,
}

// == Lookup Log ==
/// Destination for lookup events, chosen when the engine is built.
pub trait LookupLog: Send + Sync {
    fn record(&self, event: &LookupEvent<'_>);
}

// == Tracing Log ==
/// Emits every event through `tracing` with `event`, `record` and `key`
/// fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingLog;

impl LookupLog for TracingLog {
    fn record(&self, event: &LookupEvent<'_>) {
        let LookupEvent {
            kind,
            label,
            key,
            error,
        } = *event;
        let error = error.unwrap_or_default();
        let event = kind.as_str();

        match kind {
            EventKind::Hit => {
                info!(event, record = label, key, "Found {} with primary key = {} in the cache", label, key)
            }
            EventKind::Miss => {
                info!(event, record = label, key, "{} with primary key = {} not cached", label, key)
            }
            EventKind::Fetched => {
                info!(event, record = label, key, "Found {} with primary key = {} in the backing store", label, key)
            }
            EventKind::Stored => {
                info!(event, record = label, key, "Added {} with primary key = {} to the cache", label, key)
            }
            EventKind::FetchFailed => {
                error!(event, record = label, key, error, "Could not find {} with primary key = {} in the backing store", label, key)
            }
            EventKind::StoreFailed => {
                warn!(event, record = label, key, error, "Could not cache {} with primary key = {}", label, key)
            }
            EventKind::EncodeFailed => {
                error!(event, record = label, key, error, "Could not encode {} with primary key = {}", label, key)
            }
            EventKind::DecodeFailed => {
                warn!(event, record = label, key, error, "Discarding unreadable cache entry for {} with primary key = {}", label, key)
            }
        }
    }
}

// == Silent Log ==
/// Discards every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentLog;

impl LookupLog for SilentLog {
    fn record(&self, _event: &LookupEvent<'_>) {}
}
