//! Lookup Module
//!
//! Cache-aside engine that answers single-record lookups from the cache and
//! falls back to a caller-supplied accessor on a miss.
//!
//! # Flow
//! 1. Read the entry for the key from the cache
//! 2. Hit: decode and return it
//! 3. Miss (or unreadable entry): call the accessor
//! 4. Accessor success: encode, store, return the record
//! 5. Accessor failure: return the error, cache nothing

mod engine;
mod flight;
mod log;
mod stats;

pub use engine::{Lookup, LookupEngine, Source};
pub use flight::{FlightGate, FlightPermit};
pub use log::{EventKind, LookupEvent, LookupLog, SilentLog, TracingLog};
pub use stats::{LookupCounters, LookupStats};
