/// Shader entity (control thread only).
///
/// A Shader owns no native resources. It holds the source text the user edits,
/// its last verification outcome, and a wrapping modification counter used to
/// reject results computed from older source.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use crate::context::ShaderStage;
use super::listeners::{Listeners, Subscription};
use super::validity::{Transition, Validity, ValidityCell};

static NEXT_SHADER_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, process-unique shader identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderId(u64);

impl ShaderId {
    fn next() -> Self {
        Self(NEXT_SHADER_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ShaderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shader #{}", self.0)
    }
}

/// Shader change notifications
///
/// All methods default to no-ops. Callbacks run on the control thread, after
/// the shader's state has been updated.
pub trait ShaderListener {
    /// The source text was replaced
    fn source_changed(&self, _shader: &Shader) {}

    /// Validity moved from `old` to `new`
    fn validity_changed(&self, _shader: &Shader, _old: Validity, _new: Validity) {}
}

pub struct Shader {
    id: ShaderId,
    stage: ShaderStage,
    name: RefCell<String>,
    source: RefCell<Arc<str>>,
    validity: ValidityCell,
    mod_count: Cell<u32>,
    listeners: Listeners<dyn ShaderListener>,
}

impl Shader {
    /// Create a shader with empty source, named after its stage
    pub fn new(stage: ShaderStage) -> Rc<Self> {
        Self::with_source(stage, "")
    }

    pub fn with_source(stage: ShaderStage, source: impl Into<Arc<str>>) -> Rc<Self> {
        let name = match stage {
            ShaderStage::Vertex => "VertexShader",
            ShaderStage::Geometry => "GeometryShader",
            ShaderStage::Fragment => "FragmentShader",
        };
        Rc::new(Self {
            id: ShaderId::next(),
            stage,
            name: RefCell::new(name.to_string()),
            source: RefCell::new(source.into()),
            validity: ValidityCell::new(),
            mod_count: Cell::new(0),
            listeners: Listeners::new(),
        })
    }

    pub fn id(&self) -> ShaderId {
        self.id
    }

    pub fn stage(&self) -> ShaderStage {
        self.stage
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    /// Rename; does not affect validity
    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = name.into();
    }

    pub fn source(&self) -> Arc<str> {
        self.source.borrow().clone()
    }

    /// Replace the source text
    ///
    /// Bumps the modification counter, notifies `source_changed`, then resets
    /// validity to Unknown.
    pub fn set_source(&self, source: impl Into<Arc<str>>) {
        *self.source.borrow_mut() = source.into();
        self.mod_count.set(self.mod_count.get().wrapping_add(1));

        for listener in self.listeners.live() {
            listener.source_changed(self);
        }
        self.reset_validity();
    }

    pub fn mod_count(&self) -> u32 {
        self.mod_count.get()
    }

    pub fn validity(&self) -> Validity {
        self.validity.validity()
    }

    /// Compiler output; present iff the shader is Invalid
    pub fn compilation_error(&self) -> Option<String> {
        self.validity.error()
    }

    pub fn reset_validity(&self) {
        let transition = self.validity.reset();
        self.notify_validity(transition);
    }

    /// Unknown → Valid. Panics in debug builds if not Unknown.
    pub fn mark_valid(&self) {
        let transition = self.validity.mark_valid(&self.id.to_string());
        self.notify_validity(transition);
    }

    /// Unknown → Invalid. Panics in debug builds if not Unknown.
    pub fn mark_invalid(&self, error: impl Into<String>) {
        let transition = self.validity.mark_invalid(&self.id.to_string(), error.into());
        self.notify_validity(transition);
    }

    fn notify_validity(&self, transition: Option<Transition>) {
        let Some(Transition { old, new }) = transition else {
            return;
        };
        for listener in self.listeners.live() {
            listener.validity_changed(self, old, new);
        }
    }

    /// Register a listener held by `Rc`; the shader keeps only a weak reference
    pub fn subscribe<L: ShaderListener + 'static>(&self, listener: &Rc<L>) -> Subscription {
        let weak: Weak<L> = Rc::downgrade(listener);
        self.subscribe_weak(weak)
    }

    pub fn subscribe_weak(&self, listener: Weak<dyn ShaderListener>) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    /// Registered listeners, including programs this shader is attached to
    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("id", &self.id)
            .field("stage", &self.stage)
            .field("name", &*self.name.borrow())
            .field("validity", &self.validity())
            .field("mod_count", &self.mod_count.get())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "shader_tests.rs"]
mod tests;
