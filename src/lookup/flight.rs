//! Single-flight gate for concurrent misses on the same key.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
struct Slot {
    lock: Arc<Mutex<()>>,
    /// Tasks holding or awaiting the lock
    users: usize,
}

// == Flight Gate ==
/// Hands out one async permit per key at a time.
///
/// Slots are created on first use and dropped once no task holds or waits for
/// them, so the map only ever contains keys with a miss in progress.
#[derive(Debug, Default)]
pub struct FlightGate {
    slots: DashMap<String, Slot>,
}

impl FlightGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Waits until no other task holds the permit for `key`, then takes it.
    ///
    /// Dropping the returned future while it waits gives up the place in line
    /// and releases the slot if it was the last user.
    pub async fn acquire(&self, key: &str) -> FlightPermit<'_> {
        let lock = {
            let mut slot = self.slots.entry(key.to_string()).or_default();
            slot.users += 1;
            Arc::clone(&slot.lock)
        };
        let registration = Registration {
            gate: self,
            key: key.to_string(),
        };

        let guard = lock.lock_owned().await;

        FlightPermit {
            _guard: guard,
            _registration: registration,
        }
    }

    fn release(&self, key: &str) {
        self.slots.remove_if_mut(key, |_, slot| {
            slot.users -= 1;
            slot.users == 0
        });
    }
}

/// One task's claim on a slot, counted from before the lock is awaited.
#[derive(Debug)]
struct Registration<'a> {
    gate: &'a FlightGate,
    key: String,
}

impl Drop for Registration<'_> {
    fn drop(&mut self) {
        self.gate.release(&self.key);
    }
}

// == Flight Permit ==
/// Exclusive right to resolve a miss for one key, released on drop.
#[derive(Debug)]
pub struct FlightPermit<'a> {
    // Field order matters: the lock is released before the slot is
    _guard: OwnedMutexGuard<()>,
    _registration: Registration<'a>,
}
