/// Native objects owned by the execution thread, keyed by entity identity.

use std::sync::Arc;
use rustc_hash::FxHashMap;
use crate::context::{GraphicsContext, ProgramHandle, ShaderHandle, ShaderStage};
use crate::model::{ProgramId, ShaderId, Validity};

/// Something holding native objects that must be released on the thread
/// that created them, before the context goes away
pub trait ContextCache {
    /// Delete every cached native object
    fn clear(&mut self, context: &mut dyn GraphicsContext);
}

#[derive(Debug)]
pub(crate) struct ShaderEntry {
    /// `None` if the backend failed to create the object
    pub handle: Option<ShaderHandle>,
    pub stage: ShaderStage,
    /// Source last compiled into `handle`
    pub source: Arc<str>,
    /// Modification counter of the snapshot `source` came from
    pub mod_count: u32,
    pub validity: Validity,
    pub error: Option<String>,
}

#[derive(Debug, Default)]
pub(crate) struct ProgramEntry {
    /// Object used for the next link
    pub link: Option<ProgramHandle>,
    /// Last successfully linked executable
    pub render: Option<ProgramHandle>,
    /// Shaders of the last snapshot linked (or refused) for this program
    pub shaders: Vec<ShaderId>,
}

#[derive(Debug, Default)]
pub struct ResourceCache {
    pub(crate) shaders: FxHashMap<ShaderId, ShaderEntry>,
    pub(crate) programs: FxHashMap<ProgramId, ProgramEntry>,
}

impl ResourceCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shader_count(&self) -> usize {
        self.shaders.len()
    }

    pub fn program_count(&self) -> usize {
        self.programs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty() && self.programs.is_empty()
    }

    pub fn shader_handle(&self, id: ShaderId) -> Option<ShaderHandle> {
        self.shaders.get(&id).and_then(|entry| entry.handle)
    }

    /// Last successfully linked executable for `id`
    pub fn render_program(&self, id: ProgramId) -> Option<ProgramHandle> {
        self.programs.get(&id).and_then(|entry| entry.render)
    }

    pub(crate) fn delete_shader(&mut self, context: &mut dyn GraphicsContext, id: ShaderId) {
        if let Some(handle) = self.shaders.remove(&id).and_then(|entry| entry.handle) {
            if let Err(err) = context.delete_shader(handle) {
                crate::baker_warn!("shader_baker::ResourceCache", "delete {} failed: {}", id, err);
            }
        }
    }

    pub(crate) fn delete_program(&mut self, context: &mut dyn GraphicsContext, id: ProgramId) {
        let Some(entry) = self.programs.remove(&id) else {
            return;
        };
        for handle in [entry.link, entry.render].into_iter().flatten() {
            if let Err(err) = context.delete_program(handle) {
                crate::baker_warn!("shader_baker::ResourceCache", "delete {} failed: {}", id, err);
            }
        }
    }
}

impl ContextCache for ResourceCache {
    fn clear(&mut self, context: &mut dyn GraphicsContext) {
        let programs: Vec<ProgramId> = self.programs.keys().copied().collect();
        for id in programs {
            self.delete_program(context, id);
        }
        let shaders: Vec<ShaderId> = self.shaders.keys().copied().collect();
        for id in shaders {
            self.delete_shader(context, id);
        }
        crate::baker_info!("shader_baker::ResourceCache", "Cache cleared");
    }
}

impl Drop for ResourceCache {
    fn drop(&mut self) {
        if !self.is_empty() {
            crate::baker_warn!(
                "shader_baker::ResourceCache",
                "dropped with {} shader(s) and {} program(s) still cached; native objects leaked",
                self.shaders.len(),
                self.programs.len()
            );
        }
    }
}
