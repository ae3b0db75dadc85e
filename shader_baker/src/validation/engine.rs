/// ValidationEngine - control-thread half of the engine.
///
/// Tracks registered shaders and programs, snapshots them into the pending
/// mailboxes whenever they change, and applies results coming back from the
/// execution thread. Entities are `Rc`, so this type is `!Send` and cannot
/// leave the control thread.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::baker_bail;
use crate::config::EngineConfig;
use crate::context::ShaderStage;
use crate::error::Result;
use crate::model::{
    Program, ProgramId, ProgramListener, Shader, ShaderId, ShaderListener, Subscription, Validity,
};
use super::snapshot::{Eviction, Mailboxes, ProgramSnapshot, ShaderSnapshot, ValidationResult};
use super::validator::{not_linked, Validator};

/// Counts returned by [`ValidationEngine::publish_results`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PublishStats {
    /// Results applied to an entity
    pub applied: usize,
    /// Results discarded because the entity changed or left the engine
    pub discarded: usize,
    /// Valid program results held back until their shaders are published
    pub deferred: usize,
}

enum Outcome {
    Applied,
    Discarded,
    Deferred,
}

struct Tracked<T> {
    entity: Rc<T>,
    subscription: Subscription,
}

// Listener target for every registered entity. Entities hold it weakly.
struct Registry {
    mailboxes: Arc<Mailboxes>,
    shaders: RefCell<FxHashMap<ShaderId, Tracked<Shader>>>,
    programs: RefCell<FxHashMap<ProgramId, Tracked<Program>>>,
    // Valid program results waiting for an attached shader to leave Unknown
    deferred: RefCell<FxHashMap<ProgramId, ValidationResult>>,
}

impl Registry {
    fn snapshot_shader(&self, shader: &Shader) {
        if !self.shaders.borrow().contains_key(&shader.id()) {
            return;
        }
        crate::baker_trace!(
            "shader_baker::ValidationEngine",
            "snapshot {} (mod {})",
            shader.id(),
            shader.mod_count()
        );
        self.mailboxes.pending_shaders.post(shader.id(), ShaderSnapshot::of(shader));
    }

    fn snapshot_program(&self, program: &Program) {
        if !self.programs.borrow().contains_key(&program.id()) {
            return;
        }
        crate::baker_trace!(
            "shader_baker::ValidationEngine",
            "snapshot {} (mod {})",
            program.id(),
            program.mod_count()
        );
        self.mailboxes.pending_programs.post(program.id(), ProgramSnapshot::of(program));
    }
}

impl ShaderListener for Registry {
    fn source_changed(&self, shader: &Shader) {
        self.snapshot_shader(shader);
    }

    fn validity_changed(&self, shader: &Shader, _old: Validity, new: Validity) {
        if new == Validity::Unknown {
            self.snapshot_shader(shader);
        }
    }
}

impl ProgramListener for Registry {
    fn inputs_changed(&self, program: &Program) {
        self.snapshot_program(program);
    }

    fn validity_changed(&self, program: &Program, _old: Validity, new: Validity) {
        if new == Validity::Unknown {
            self.snapshot_program(program);
        }
    }
}

impl Drop for Registry {
    fn drop(&mut self) {
        for tracked in self.shaders.get_mut().values() {
            tracked.entity.unsubscribe(tracked.subscription);
        }
        for tracked in self.programs.get_mut().values() {
            tracked.entity.unsubscribe(tracked.subscription);
        }
    }
}

/// Control-thread half of the validation engine
///
/// # Example
///
/// ```no_run
/// use shader_baker::baker::{EngineConfig, Shader, ShaderStage, ValidationEngine};
///
/// let (engine, validator) = ValidationEngine::new(&EngineConfig::default());
/// // move `validator` to the thread owning the graphics context...
///
/// let shader = Shader::new(ShaderStage::Fragment);
/// engine.add_shader(&shader)?;
/// shader.set_source("#version 450\nvoid main() {}\n");
///
/// // later, on a timer:
/// engine.publish_results();
/// # drop(validator);
/// # Ok::<(), shader_baker::baker::Error>(())
/// ```
pub struct ValidationEngine {
    registry: Rc<Registry>,
}

impl ValidationEngine {
    /// Create both halves of an engine sharing one set of mailboxes
    pub fn new(config: &EngineConfig) -> (Self, Validator) {
        let mailboxes = Arc::new(Mailboxes::default());
        let engine = Self {
            registry: Rc::new(Registry {
                mailboxes: mailboxes.clone(),
                shaders: RefCell::new(FxHashMap::default()),
                programs: RefCell::new(FxHashMap::default()),
                deferred: RefCell::new(FxHashMap::default()),
            }),
        };
        (engine, Validator::new(mailboxes, config.program_validation))
    }

    fn mailboxes(&self) -> &Mailboxes {
        &self.registry.mailboxes
    }

    // ===== REGISTRATION =====

    /// Start tracking a shader and queue it for validation
    pub fn add_shader(&self, shader: &Rc<Shader>) -> Result<()> {
        let id = shader.id();
        if self.registry.shaders.borrow().contains_key(&id) {
            baker_bail!(AlreadyRegistered, "shader_baker::ValidationEngine", "{}", id);
        }
        let subscription = shader.subscribe(&self.registry);
        self.registry.shaders.borrow_mut().insert(id, Tracked {
            entity: shader.clone(),
            subscription,
        });
        self.registry.snapshot_shader(shader);
        Ok(())
    }

    /// Stop tracking a shader
    ///
    /// The shader itself is untouched. Its native object is deleted by the
    /// execution thread on its next pass.
    pub fn remove_shader(&self, shader: &Rc<Shader>) -> Result<()> {
        let id = shader.id();
        let Some(tracked) = self.registry.shaders.borrow_mut().remove(&id) else {
            baker_bail!(NotRegistered, "shader_baker::ValidationEngine", "{}", id);
        };
        tracked.entity.unsubscribe(tracked.subscription);
        self.mailboxes().pending_shaders.retract(&id);
        self.mailboxes().evictions.post(Eviction::Shader(id), ());
        Ok(())
    }

    /// Start tracking a program and queue it for validation
    ///
    /// The program must not have shaders attached yet; attach them after
    /// registering so every attachment is observed.
    pub fn add_program(&self, program: &Rc<Program>) -> Result<()> {
        let id = program.id();
        if self.registry.programs.borrow().contains_key(&id) {
            baker_bail!(AlreadyRegistered, "shader_baker::ValidationEngine", "{}", id);
        }
        if program.has_shaders() {
            baker_bail!(
                InvalidResource,
                "shader_baker::ValidationEngine",
                "{} must be registered before shaders are attached",
                id
            );
        }
        let subscription = program.subscribe(&self.registry);
        self.registry.programs.borrow_mut().insert(id, Tracked {
            entity: program.clone(),
            subscription,
        });
        self.registry.snapshot_program(program);
        Ok(())
    }

    /// Stop tracking a program
    pub fn remove_program(&self, program: &Rc<Program>) -> Result<()> {
        let id = program.id();
        let Some(tracked) = self.registry.programs.borrow_mut().remove(&id) else {
            baker_bail!(NotRegistered, "shader_baker::ValidationEngine", "{}", id);
        };
        tracked.entity.unsubscribe(tracked.subscription);
        self.registry.deferred.borrow_mut().remove(&id);
        self.mailboxes().pending_programs.retract(&id);
        self.mailboxes().evictions.post(Eviction::Program(id), ());
        Ok(())
    }

    pub fn contains_shader(&self, id: ShaderId) -> bool {
        self.registry.shaders.borrow().contains_key(&id)
    }

    pub fn contains_program(&self, id: ProgramId) -> bool {
        self.registry.programs.borrow().contains_key(&id)
    }

    pub fn shader_count(&self) -> usize {
        self.registry.shaders.borrow().len()
    }

    pub fn program_count(&self) -> usize {
        self.registry.programs.borrow().len()
    }

    /// Shader snapshots waiting for the execution thread
    pub fn pending_shader_count(&self) -> usize {
        self.mailboxes().pending_shaders.len()
    }

    /// Program snapshots waiting for the execution thread
    pub fn pending_program_count(&self) -> usize {
        self.mailboxes().pending_programs.len()
    }

    // ===== RESULTS =====

    /// Apply every result posted by the execution thread since the last call
    ///
    /// A result is applied only if its entity is still registered, has not
    /// been modified since the snapshot, and is still Unknown. Shader results
    /// are applied before program results.
    ///
    /// A Valid program result is applied only once every attached shader is
    /// Valid. While an attached shader is still Unknown the result is kept and
    /// retried on the next call; if an attached shader turned out Invalid the
    /// program is marked Invalid instead, as if the link had been refused.
    pub fn publish_results(&self) -> PublishStats {
        let mut stats = PublishStats::default();

        // Programs are taken first. A pass posts its shader results before its
        // program results, so every program result seen here comes with the
        // shader results of its own pass.
        let mut program_results = self.mailboxes().program_results.take();
        let shader_results = self.mailboxes().shader_results.take();

        for (id, result) in shader_results {
            let shader = self.registry.shaders.borrow().get(&id).map(|t| t.entity.clone());
            let outcome = match shader {
                Some(shader) if Self::is_current(shader.mod_count(), shader.validity(), &result) => {
                    match result.error {
                        None => shader.mark_valid(),
                        Some(error) => shader.mark_invalid(error),
                    }
                    Outcome::Applied
                }
                _ => Outcome::Discarded,
            };
            Self::count(&mut stats, outcome, &id.to_string());
        }

        let deferred = std::mem::take(&mut *self.registry.deferred.borrow_mut());
        for (id, result) in deferred {
            program_results.entry(id).or_insert(result);
        }

        for (id, result) in program_results {
            let program = self.registry.programs.borrow().get(&id).map(|t| t.entity.clone());
            let outcome = match program {
                Some(program) if Self::is_current(program.mod_count(), program.validity(), &result) => {
                    match result.error {
                        None => self.apply_linked(&program, result),
                        Some(error) => {
                            program.mark_invalid(error);
                            Outcome::Applied
                        }
                    }
                }
                _ => Outcome::Discarded,
            };
            Self::count(&mut stats, outcome, &id.to_string());
        }

        stats
    }

    fn apply_linked(&self, program: &Program, result: ValidationResult) -> Outcome {
        let shaders = program.shaders();
        if shaders.iter().all(|s| s.validity() == Validity::Valid) {
            program.mark_valid();
            return Outcome::Applied;
        }
        let invalid: Vec<ShaderStage> = shaders
            .iter()
            .filter(|s| s.validity() == Validity::Invalid)
            .map(|s| s.stage())
            .collect();
        if !invalid.is_empty() {
            program.mark_invalid(not_linked(&invalid));
            return Outcome::Applied;
        }
        self.registry.deferred.borrow_mut().insert(program.id(), result);
        Outcome::Deferred
    }

    fn is_current(mod_count: u32, validity: Validity, result: &ValidationResult) -> bool {
        mod_count == result.mod_count && validity == Validity::Unknown
    }

    fn count(stats: &mut PublishStats, outcome: Outcome, what: &str) {
        match outcome {
            Outcome::Applied => stats.applied += 1,
            Outcome::Deferred => stats.deferred += 1,
            Outcome::Discarded => {
                stats.discarded += 1;
                crate::baker_trace!(
                    "shader_baker::ValidationEngine",
                    "discarded stale result for {}",
                    what
                );
            }
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
