/// Program entity (control thread only).
///
/// A Program maps each stage to at most one attached Shader. It watches its
/// attached shaders: a source edit or a reset to Unknown on any of them bumps
/// the program's modification counter and resets the program, so a program is
/// never left Valid on top of an unverified shader.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use crate::baker_bail;
use crate::context::{ShaderStage, StageFlags};
use crate::error::Result;
use super::listeners::{Listeners, Subscription};
use super::shader::{Shader, ShaderListener};
use super::validity::{Transition, Validity, ValidityCell};

static NEXT_PROGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// Stable, process-unique program identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramId(u64);

impl ProgramId {
    fn next() -> Self {
        Self(NEXT_PROGRAM_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ProgramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "program #{}", self.0)
    }
}

/// Program change notifications
///
/// All methods default to no-ops.
pub trait ProgramListener {
    fn shader_attached(&self, _program: &Program, _shader: &Rc<Shader>) {}

    fn shader_detached(&self, _program: &Program, _shader: &Rc<Shader>) {}

    /// The attachment set, or an attached shader, changed. The modification
    /// counter has already been bumped.
    fn inputs_changed(&self, _program: &Program) {}

    fn validity_changed(&self, _program: &Program, _old: Validity, _new: Validity) {}
}

struct Attachment {
    shader: Rc<Shader>,
    subscription: Subscription,
}

pub struct Program {
    id: ProgramId,
    name: RefCell<String>,
    self_ref: Weak<Program>,
    attachments: RefCell<BTreeMap<ShaderStage, Attachment>>,
    validity: ValidityCell,
    mod_count: Cell<u32>,
    listeners: Listeners<dyn ProgramListener>,
}

impl Program {
    pub fn new() -> Rc<Self> {
        Self::named("Program")
    }

    pub fn named(name: impl Into<String>) -> Rc<Self> {
        let name = name.into();
        Rc::new_cyclic(|self_ref| Self {
            id: ProgramId::next(),
            name: RefCell::new(name),
            self_ref: self_ref.clone(),
            attachments: RefCell::new(BTreeMap::new()),
            validity: ValidityCell::new(),
            mod_count: Cell::new(0),
            listeners: Listeners::new(),
        })
    }

    pub fn id(&self) -> ProgramId {
        self.id
    }

    pub fn name(&self) -> String {
        self.name.borrow().clone()
    }

    pub fn set_name(&self, name: impl Into<String>) {
        *self.name.borrow_mut() = name.into();
    }

    /// Attach a shader to its stage
    ///
    /// Fails if another shader already occupies that stage.
    pub fn attach_shader(&self, shader: &Rc<Shader>) -> Result<()> {
        let stage = shader.stage();
        if let Some(existing) = self.attachments.borrow().get(&stage) {
            baker_bail!(
                InvalidResource,
                "shader_baker::Program",
                "{}: {} stage is already occupied by {}",
                self.id,
                stage,
                existing.shader.id()
            );
        }

        let watch: Weak<dyn ShaderListener> = self.self_ref.clone();
        let subscription = shader.subscribe_weak(watch);
        self.attachments.borrow_mut().insert(stage, Attachment {
            shader: shader.clone(),
            subscription,
        });

        for listener in self.listeners.live() {
            listener.shader_attached(self, shader);
        }
        self.inputs_changed();
        Ok(())
    }

    /// Detach a previously attached shader
    pub fn detach_shader(&self, shader: &Rc<Shader>) -> Result<()> {
        let stage = shader.stage();
        let attached = self
            .attachments
            .borrow()
            .get(&stage)
            .is_some_and(|a| a.shader.id() == shader.id());
        if !attached {
            baker_bail!(
                InvalidResource,
                "shader_baker::Program",
                "{}: {} is not attached",
                self.id,
                shader.id()
            );
        }

        let removed = self.attachments.borrow_mut().remove(&stage);
        if let Some(attachment) = removed {
            attachment.shader.unsubscribe(attachment.subscription);
        }

        for listener in self.listeners.live() {
            listener.shader_detached(self, shader);
        }
        self.inputs_changed();
        Ok(())
    }

    pub fn shader(&self, stage: ShaderStage) -> Option<Rc<Shader>> {
        self.attachments.borrow().get(&stage).map(|a| a.shader.clone())
    }

    /// Attached shaders in pipeline stage order
    pub fn shaders(&self) -> Vec<Rc<Shader>> {
        self.attachments.borrow().values().map(|a| a.shader.clone()).collect()
    }

    pub fn attached_stages(&self) -> StageFlags {
        StageFlags::from_stages(self.attachments.borrow().keys().copied())
    }

    pub fn has_shaders(&self) -> bool {
        !self.attachments.borrow().is_empty()
    }

    pub fn mod_count(&self) -> u32 {
        self.mod_count.get()
    }

    pub fn validity(&self) -> Validity {
        self.validity.validity()
    }

    /// Linker output (or synthesized stage list); present iff Invalid
    pub fn link_error(&self) -> Option<String> {
        self.validity.error()
    }

    pub fn reset_validity(&self) {
        let transition = self.validity.reset();
        self.notify_validity(transition);
    }

    pub fn mark_valid(&self) {
        let transition = self.validity.mark_valid(&self.id.to_string());
        self.notify_validity(transition);
    }

    pub fn mark_invalid(&self, error: impl Into<String>) {
        let transition = self.validity.mark_invalid(&self.id.to_string(), error.into());
        self.notify_validity(transition);
    }

    pub fn subscribe<L: ProgramListener + 'static>(&self, listener: &Rc<L>) -> Subscription {
        let weak: Weak<L> = Rc::downgrade(listener);
        self.subscribe_weak(weak)
    }

    pub fn subscribe_weak(&self, listener: Weak<dyn ProgramListener>) -> Subscription {
        self.listeners.subscribe(listener)
    }

    pub fn unsubscribe(&self, subscription: Subscription) -> bool {
        self.listeners.unsubscribe(subscription)
    }

    fn inputs_changed(&self) {
        self.mod_count.set(self.mod_count.get().wrapping_add(1));
        self.reset_validity();
        for listener in self.listeners.live() {
            listener.inputs_changed(self);
        }
    }

    fn notify_validity(&self, transition: Option<Transition>) {
        let Some(Transition { old, new }) = transition else {
            return;
        };
        for listener in self.listeners.live() {
            listener.validity_changed(self, old, new);
        }
    }
}

/// A program watches its attached shaders through this impl
impl ShaderListener for Program {
    fn source_changed(&self, _shader: &Shader) {
        self.inputs_changed();
    }

    fn validity_changed(&self, _shader: &Shader, _old: Validity, new: Validity) {
        if new == Validity::Unknown {
            self.inputs_changed();
        }
    }
}

impl Drop for Program {
    fn drop(&mut self) {
        for attachment in self.attachments.get_mut().values() {
            attachment.shader.unsubscribe(attachment.subscription);
        }
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("id", &self.id)
            .field("name", &*self.name.borrow())
            .field("stages", &self.attached_stages())
            .field("validity", &self.validity())
            .field("mod_count", &self.mod_count.get())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "program_tests.rs"]
mod tests;
