/// Validator - execution-thread half of the engine.
///
/// Owns the resource cache. Each `validate` pass takes the pending snapshots,
/// compiles every pending shader, lazily compiles whatever the pending
/// programs reference, reads all compile logs, then links. Results go back
/// through the result mailboxes tagged with the modification counter they
/// were computed from.

use std::sync::Arc;
use rustc_hash::{FxHashMap, FxHashSet};
use crate::config::ProgramValidation;
use crate::context::{GraphicsContext, ProgramHandle, ShaderHandle, ShaderStage};
use crate::error::{Error, Result};
use crate::model::{ProgramId, ShaderId, Validity};
use super::resource_cache::{ContextCache, ProgramEntry, ResourceCache, ShaderEntry};
use super::snapshot::{Eviction, Mailboxes, ProgramSnapshot, ShaderSnapshot, ValidationResult};

/// Counts returned by [`Validator::validate`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ValidationPass {
    /// Pending shader snapshots processed
    pub shaders: usize,
    /// Pending program snapshots processed
    pub programs: usize,
    /// Shaders compiled, including lazy compiles for programs
    pub compiles: usize,
    /// Native link calls
    pub links: usize,
}

impl ValidationPass {
    pub fn is_empty(&self) -> bool {
        self.shaders == 0 && self.programs == 0
    }
}

/// Execution-thread half of the validation engine
///
/// Created by [`ValidationEngine::new`](super::ValidationEngine::new) and moved
/// to the thread owning the graphics context.
pub struct Validator {
    mailboxes: Arc<Mailboxes>,
    cache: ResourceCache,
    program_validation: ProgramValidation,
    // Spare buffers swapped with the pending mailboxes
    pending_shaders: FxHashMap<ShaderId, ShaderSnapshot>,
    pending_programs: FxHashMap<ProgramId, ProgramSnapshot>,
    // Removed shaders still referenced by a cached program; lazily compiled
    // entries for them are dropped after use
    evicted: FxHashSet<ShaderId>,
}

fn backend_failure(what: impl std::fmt::Display, err: Error) -> String {
    crate::baker_error!("shader_baker::Validator", "{}: {}", what, err);
    format!("backend error: {}", err.message())
}

/// Link error of a program refused because some of its stages did not compile
pub(super) fn not_linked(stages: &[ShaderStage]) -> String {
    let names: Vec<&str> = stages.iter().map(|s| s.name()).collect();
    format!(
        "not linked: invalid {} shader{}",
        names.join(", "),
        if names.len() > 1 { "s" } else { "" }
    )
}

impl Validator {
    pub(crate) fn new(mailboxes: Arc<Mailboxes>, program_validation: ProgramValidation) -> Self {
        Self {
            mailboxes,
            cache: ResourceCache::new(),
            program_validation,
            pending_shaders: FxHashMap::default(),
            pending_programs: FxHashMap::default(),
            evicted: FxHashSet::default(),
        }
    }

    pub fn cache(&self) -> &ResourceCache {
        &self.cache
    }

    /// Last successfully linked executable of a program, for rendering
    pub fn render_program(&self, id: ProgramId) -> Option<ProgramHandle> {
        self.cache.render_program(id)
    }

    /// Run one validation pass (execution thread only)
    pub fn validate(&mut self, context: &mut dyn GraphicsContext) -> ValidationPass {
        self.apply_evictions(context);

        self.mailboxes.pending_shaders.swap_into(&mut self.pending_shaders);
        self.mailboxes.pending_programs.swap_into(&mut self.pending_programs);

        let mut pass = ValidationPass {
            shaders: self.pending_shaders.len(),
            programs: self.pending_programs.len(),
            ..ValidationPass::default()
        };
        if pass.is_empty() {
            self.prune_evicted();
            return pass;
        }

        // Submit every compile first
        let pending_shaders = std::mem::take(&mut self.pending_shaders);
        for snapshot in pending_shaders.values() {
            self.evicted.remove(&snapshot.id);
            self.compile(context, snapshot);
            pass.compiles += 1;
        }

        let pending_programs = std::mem::take(&mut self.pending_programs);
        for program in pending_programs.values() {
            for snapshot in &program.shaders {
                let up_to_date = self
                    .cache
                    .shaders
                    .get(&snapshot.id)
                    .is_some_and(|entry| entry.source == snapshot.source);
                if !up_to_date {
                    self.compile(context, snapshot);
                    pass.compiles += 1;
                }
            }
        }

        // Then read the logs
        self.resolve_compiles(context);

        for id in pending_shaders.keys() {
            if let Some(entry) = self.cache.shaders.get(id) {
                self.mailboxes.shader_results.post(*id, ValidationResult {
                    mod_count: entry.mod_count,
                    error: entry.error.clone(),
                });
            }
        }

        for program in pending_programs.values() {
            let error = self.link(context, program, &mut pass);
            self.mailboxes.program_results.post(program.id, ValidationResult {
                mod_count: program.mod_count,
                error,
            });
        }

        self.drop_evicted_entries(context);

        crate::baker_trace!(
            "shader_baker::Validator",
            "pass: {} shader(s), {} program(s), {} compile(s), {} link(s)",
            pass.shaders,
            pass.programs,
            pass.compiles,
            pass.links
        );

        // Hand the (drained) allocations back for the next swap
        self.pending_shaders = pending_shaders;
        self.pending_shaders.clear();
        self.pending_programs = pending_programs;
        self.pending_programs.clear();
        pass
    }

    fn apply_evictions(&mut self, context: &mut dyn GraphicsContext) {
        for (eviction, ()) in self.mailboxes.evictions.take() {
            match eviction {
                Eviction::Shader(id) => {
                    self.cache.delete_shader(context, id);
                    self.evicted.insert(id);
                }
                Eviction::Program(id) => self.cache.delete_program(context, id),
            }
        }
    }

    // Upload and compile; the entry is left Unknown until `resolve_compiles`
    fn compile(&mut self, context: &mut dyn GraphicsContext, snapshot: &ShaderSnapshot) {
        let existing = self.cache.shaders.get(&snapshot.id).and_then(|entry| entry.handle);
        let outcome = Self::upload_and_compile(context, existing, snapshot);

        let (handle, validity, error) = match outcome {
            Ok(handle) => (Some(handle), Validity::Unknown, None),
            Err((handle, err)) => (handle, Validity::Invalid, Some(backend_failure(snapshot.id, err))),
        };
        self.cache.shaders.insert(snapshot.id, ShaderEntry {
            handle,
            stage: snapshot.stage,
            source: snapshot.source.clone(),
            mod_count: snapshot.mod_count,
            validity,
            error,
        });
    }

    fn upload_and_compile(
        context: &mut dyn GraphicsContext,
        existing: Option<ShaderHandle>,
        snapshot: &ShaderSnapshot,
    ) -> std::result::Result<ShaderHandle, (Option<ShaderHandle>, Error)> {
        let handle = match existing {
            Some(handle) => handle,
            None => context.create_shader(snapshot.stage).map_err(|err| (None, err))?,
        };
        Self::upload(context, handle, &snapshot.source).map_err(|err| (Some(handle), err))?;
        Ok(handle)
    }

    fn upload(context: &mut dyn GraphicsContext, shader: ShaderHandle, source: &str) -> Result<()> {
        context.shader_source(shader, source)?;
        context.compile_shader(shader)?;
        // The compile has its own copy of the source from here on
        context.shader_source(shader, "")
    }

    fn resolve_compiles(&mut self, context: &mut dyn GraphicsContext) {
        for (id, entry) in self.cache.shaders.iter_mut() {
            if entry.validity != Validity::Unknown {
                continue;
            }
            let Some(handle) = entry.handle else {
                continue;
            };
            let error = match context.shader_compile_error(handle) {
                Ok(None) => None,
                Ok(Some(log)) if log.trim().is_empty() => {
                    Some(format!("{} shader failed to compile", entry.stage))
                }
                Ok(Some(log)) => Some(log),
                Err(err) => Some(backend_failure(*id, err)),
            };
            entry.validity = if error.is_some() { Validity::Invalid } else { Validity::Valid };
            entry.error = error;
        }
    }

    // Returns the program's error, `None` if it linked
    fn link(
        &mut self,
        context: &mut dyn GraphicsContext,
        program: &ProgramSnapshot,
        pass: &mut ValidationPass,
    ) -> Option<String> {
        self.cache.programs.entry(program.id).or_default().shaders =
            program.shaders.iter().map(|s| s.id).collect();

        let mut handles = Vec::with_capacity(program.shaders.len());
        let mut invalid_stages: Vec<ShaderStage> = Vec::new();
        for snapshot in &program.shaders {
            let entry = self.cache.shaders.get(&snapshot.id);
            match entry.map(|e| (e.validity, e.handle)) {
                Some((Validity::Valid, Some(handle))) => handles.push(handle),
                Some((Validity::Invalid, _)) => invalid_stages.push(snapshot.stage),
                _ => panic!(
                    "{} references {} whose compile result is still unknown",
                    program.id, snapshot.id
                ),
            }
        }

        if !invalid_stages.is_empty() {
            return Some(not_linked(&invalid_stages));
        }

        pass.links += 1;
        let entry = self.cache.programs.entry(program.id).or_insert_with(ProgramEntry::default);
        let handle = match entry.link {
            Some(handle) => handle,
            None => match context.create_program() {
                Ok(handle) => {
                    entry.link = Some(handle);
                    handle
                }
                Err(err) => return Some(backend_failure(program.id, err)),
            },
        };

        let outcome = Self::link_attached(context, handle, &handles, self.program_validation);
        let error = match outcome {
            Ok(error) => error,
            Err(err) => Some(backend_failure(program.id, err)),
        };

        if error.is_none() {
            // Keep the previous executable as the next link target
            let entry = self.cache.programs.entry(program.id).or_default();
            entry.link = entry.render.take();
            entry.render = Some(handle);
        }
        error
    }

    fn link_attached(
        context: &mut dyn GraphicsContext,
        program: ProgramHandle,
        shaders: &[ShaderHandle],
        validation: ProgramValidation,
    ) -> Result<Option<String>> {
        let mut attached = Vec::with_capacity(shaders.len());
        let mut outcome = Ok(());
        for &shader in shaders {
            if let Err(err) = context.attach_shader(program, shader) {
                outcome = Err(err);
                break;
            }
            attached.push(shader);
        }
        if outcome.is_ok() {
            outcome = context.link_program(program);
        }
        for &shader in &attached {
            if let Err(err) = context.detach_shader(program, shader) {
                crate::baker_warn!("shader_baker::Validator", "detach failed: {}", err);
            }
        }
        outcome?;

        if let Some(log) = context.program_link_error(program)? {
            if log.trim().is_empty() {
                return Ok(Some("program failed to link".to_string()));
            }
            return Ok(Some(log));
        }

        match validation {
            ProgramValidation::Skip => Ok(None),
            ProgramValidation::Diagnostic => {
                if let Some(log) = context.validate_program(program)? {
                    crate::baker_warn!(
                        "shader_baker::Validator",
                        "program validation failed: {}",
                        log
                    );
                }
                Ok(None)
            }
            ProgramValidation::Strict => match context.validate_program(program)? {
                Some(log) if log.trim().is_empty() => Ok(Some("program failed validation".to_string())),
                other => Ok(other),
            },
        }
    }

    fn drop_evicted_entries(&mut self, context: &mut dyn GraphicsContext) {
        if self.evicted.is_empty() {
            return;
        }
        let lingering: Vec<ShaderId> = self
            .evicted
            .iter()
            .copied()
            .filter(|id| self.cache.shaders.contains_key(id))
            .collect();
        for id in lingering {
            self.cache.delete_shader(context, id);
        }
        self.prune_evicted();
    }

    // An evicted id is kept only while a cached program may still link it
    fn prune_evicted(&mut self) {
        let programs = &self.cache.programs;
        self.evicted.retain(|id| programs.values().any(|entry| entry.shaders.contains(id)));
    }
}

impl ContextCache for Validator {
    fn clear(&mut self, context: &mut dyn GraphicsContext) {
        self.cache.clear(context);
        self.evicted.clear();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
