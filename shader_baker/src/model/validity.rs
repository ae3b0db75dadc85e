/// Validity state machine shared by shaders and programs

use std::cell::RefCell;
use std::fmt;

/// Outcome of the last verification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Validity {
    /// Not yet verified, or invalidated by an edit
    #[default]
    Unknown,
    /// Verified without errors
    Valid,
    /// Verified, and verification reported errors
    Invalid,
}

impl fmt::Display for Validity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Validity::Unknown => "unknown",
            Validity::Valid => "valid",
            Validity::Invalid => "invalid",
        })
    }
}

/// A validity transition, as delivered to listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub old: Validity,
    pub new: Validity,
}

// The error text lives inside the Invalid variant, so "error present iff
// Invalid" cannot be broken.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
enum Verdict {
    #[default]
    Unknown,
    Valid,
    Invalid(String),
}

impl Verdict {
    fn validity(&self) -> Validity {
        match self {
            Verdict::Unknown => Validity::Unknown,
            Verdict::Valid => Validity::Valid,
            Verdict::Invalid(_) => Validity::Invalid,
        }
    }
}

/// Validity plus error text, with the legal transitions only
///
/// `mark_valid` / `mark_invalid` are only legal from Unknown. Calling them in
/// any other state is a caller bug: it panics in debug builds, and in release
/// builds the call is ignored with a warning.
#[derive(Debug, Default)]
pub(crate) struct ValidityCell {
    verdict: RefCell<Verdict>,
}

impl ValidityCell {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn validity(&self) -> Validity {
        self.verdict.borrow().validity()
    }

    pub(crate) fn error(&self) -> Option<String> {
        match &*self.verdict.borrow() {
            Verdict::Invalid(error) => Some(error.clone()),
            _ => None,
        }
    }

    fn set(&self, verdict: Verdict) -> Option<Transition> {
        let old = self.validity();
        let new = verdict.validity();
        *self.verdict.borrow_mut() = verdict;
        (old != new).then_some(Transition { old, new })
    }

    /// Back to Unknown; returns the transition if the state changed
    pub(crate) fn reset(&self) -> Option<Transition> {
        self.set(Verdict::Unknown)
    }

    pub(crate) fn mark_valid(&self, what: &str) -> Option<Transition> {
        if !self.check_unknown(what, "mark_valid") {
            return None;
        }
        self.set(Verdict::Valid)
    }

    pub(crate) fn mark_invalid(&self, what: &str, error: String) -> Option<Transition> {
        if !self.check_unknown(what, "mark_invalid") {
            return None;
        }
        self.set(Verdict::Invalid(error))
    }

    fn check_unknown(&self, what: &str, operation: &str) -> bool {
        let current = self.validity();
        debug_assert!(
            current == Validity::Unknown,
            "{}: {} called while validity is {}",
            what,
            operation,
            current
        );
        if current != Validity::Unknown {
            crate::baker_warn!(
                "shader_baker::Validity",
                "{}: {} ignored, validity is already {}",
                what,
                operation,
                current
            );
            return false;
        }
        true
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "validity_tests.rs"]
mod tests;
