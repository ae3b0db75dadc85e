/// Double-buffered, keyed handoff between two threads.
///
/// Producers `post` into the write buffer; the consumer exchanges the whole
/// buffer for an empty one in a single critical section and processes the
/// filled one without holding any lock. Posting a key that is already present
/// replaces the previous value, so the consumer only ever sees the latest
/// value per key.
///
/// The critical section is always one map insert or one map swap. Callers
/// must never run backend work while holding the lock, and the API gives them
/// no way to.

use rustc_hash::FxHashMap;
use std::hash::Hash;
use std::sync::{Mutex, MutexGuard, PoisonError};

pub struct Mailbox<K, V> {
    buffer: Mutex<FxHashMap<K, V>>,
}

impl<K: Eq + Hash, V> Mailbox<K, V> {
    /// Create an empty mailbox
    pub fn new() -> Self {
        Self {
            buffer: Mutex::new(FxHashMap::default()),
        }
    }

    // A panic while holding the lock can only interrupt a map insert or swap;
    // the map itself stays consistent.
    fn lock(&self) -> MutexGuard<'_, FxHashMap<K, V>> {
        self.buffer.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Post a value, replacing any value already waiting under the same key.
    ///
    /// Returns true if a previous value was replaced.
    pub fn post(&self, key: K, value: V) -> bool {
        self.lock().insert(key, value).is_some()
    }

    /// Remove a waiting value without delivering it
    pub fn retract(&self, key: &K) -> Option<V> {
        self.lock().remove(key)
    }

    /// Exchange the write buffer for an empty one and return the filled buffer
    pub fn take(&self) -> FxHashMap<K, V> {
        std::mem::take(&mut *self.lock())
    }

    /// Exchange the write buffer with `spare`, which must be empty.
    ///
    /// Lets the consumer hand back its drained buffer so both maps keep their
    /// allocations across passes.
    pub fn swap_into(&self, spare: &mut FxHashMap<K, V>) {
        debug_assert!(spare.is_empty(), "spare buffer must be drained before swapping");
        std::mem::swap(&mut *self.lock(), spare);
    }

    /// Number of values waiting
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether nothing is waiting
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Whether a value is waiting under `key`
    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }
}

impl<K: Eq + Hash, V> Default for Mailbox<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "mailbox_tests.rs"]
mod tests;
