/// Publishes validation results on the control thread at a fixed cadence,
/// for loops that have no timer of their own.

use std::time::{Duration, Instant};
use crate::validation::{PublishStats, ValidationEngine};

pub struct PublishTicker {
    engine: ValidationEngine,
    interval: Duration,
    next_due: Option<Instant>,
}

impl PublishTicker {
    pub fn new(engine: ValidationEngine, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            next_due: None,
        }
    }

    pub fn engine(&self) -> &ValidationEngine {
        &self.engine
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Publish if the interval has elapsed since the last publish
    ///
    /// The first call always publishes. Returns `None` when not due.
    pub fn tick(&mut self, now: Instant) -> Option<PublishStats> {
        if self.next_due.is_some_and(|due| now < due) {
            return None;
        }
        self.next_due = Some(now + self.interval);
        Some(self.engine.publish_results())
    }

    pub fn into_engine(self) -> ValidationEngine {
        self.engine
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "publish_ticker_tests.rs"]
mod tests;
