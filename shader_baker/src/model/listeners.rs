/// Weakly-held listener registry used by shaders and programs.
///
/// Listeners are stored as `Weak` trait objects in a SlotMap, so a listener
/// that is dropped without unsubscribing is pruned on the next notification.
/// Notifications iterate over a collected Vec of upgraded listeners, so a
/// listener may subscribe, unsubscribe or mutate the entity from inside a
/// callback.

use std::cell::RefCell;
use std::rc::{Rc, Weak};
use slotmap::{new_key_type, SlotMap};

// ===== SLOT MAP KEY =====

new_key_type! {
    /// Key returned by `subscribe`, used to unsubscribe.
    ///
    /// Keys stay valid until their own listener is unsubscribed.
    pub struct Subscription;
}

pub(crate) struct Listeners<L: ?Sized> {
    entries: RefCell<SlotMap<Subscription, Weak<L>>>,
}

impl<L: ?Sized> Listeners<L> {
    pub(crate) fn new() -> Self {
        Self {
            entries: RefCell::new(SlotMap::with_key()),
        }
    }

    pub(crate) fn subscribe(&self, listener: Weak<L>) -> Subscription {
        self.entries.borrow_mut().insert(listener)
    }

    /// Returns false if the key was unknown (already unsubscribed)
    pub(crate) fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.entries.borrow_mut().remove(subscription).is_some()
    }

    /// Number of registered listeners, including ones not yet pruned
    pub(crate) fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    /// Live listeners, in no particular order. Dead entries are dropped.
    pub(crate) fn live(&self) -> Vec<Rc<L>> {
        let mut entries = self.entries.borrow_mut();
        entries.retain(|_, weak| weak.strong_count() > 0);
        entries.values().filter_map(Weak::upgrade).collect()
    }
}

impl<L: ?Sized> Default for Listeners<L> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "listeners_tests.rs"]
mod tests;
