/// NagaContext - GraphicsContext backed by naga (no GPU)
///
/// Mirrors the GL object model: integer names, separate source upload and
/// compile, programs linked from attached shader objects. Compile and link
/// failures are reported through the info-log queries; `Err` is returned only
/// for misuse such as unknown handles.

use rustc_hash::FxHashMap;
use shader_baker::baker::{
    GraphicsContext, ProgramHandle, Result, ShaderHandle, ShaderStage, StageFlags,
};
use shader_baker::baker_bail;
use shader_baker::utils::NameAllocator;
use crate::naga_compile::{compile, CompiledShader};
use crate::naga_interface::check_vertex_fragment;

struct NagaShader {
    stage: ShaderStage,
    source: String,
    compiled: Option<std::result::Result<CompiledShader, String>>,
}

#[derive(Default)]
struct NagaProgram {
    attached: Vec<ShaderHandle>,
    linked: Option<std::result::Result<(), String>>,
}

/// GLSL validation context built on naga
pub struct NagaContext {
    shader_names: NameAllocator,
    program_names: NameAllocator,
    shaders: FxHashMap<ShaderHandle, NagaShader>,
    programs: FxHashMap<ProgramHandle, NagaProgram>,
    viewport: (u32, u32),
}

impl NagaContext {
    pub fn new() -> Self {
        Self {
            shader_names: NameAllocator::new(),
            program_names: NameAllocator::new(),
            shaders: FxHashMap::default(),
            programs: FxHashMap::default(),
            viewport: (0, 0),
        }
    }

    /// Last size passed to `set_viewport`
    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Shader and program objects not yet deleted
    pub fn live_objects(&self) -> usize {
        self.shaders.len() + self.programs.len()
    }

    fn shader_mut(&mut self, shader: ShaderHandle) -> Result<&mut NagaShader> {
        match self.shaders.get_mut(&shader) {
            Some(object) => Ok(object),
            None => baker_bail!(BackendError, "naga::Context", "unknown shader handle {}", shader.0),
        }
    }

    fn program_mut(&mut self, program: ProgramHandle) -> Result<&mut NagaProgram> {
        match self.programs.get_mut(&program) {
            Some(object) => Ok(object),
            None => baker_bail!(BackendError, "naga::Context", "unknown program handle {}", program.0),
        }
    }

    fn link(&self, attached: &[ShaderHandle]) -> std::result::Result<(), String> {
        if attached.is_empty() {
            return Err("error: no shaders attached".to_string());
        }

        let mut stages: FxHashMap<ShaderStage, &CompiledShader> = FxHashMap::default();
        for handle in attached {
            let Some(object) = self.shaders.get(handle) else {
                return Err(format!("error: attached shader {} was deleted", handle.0));
            };
            let Some(Ok(compiled)) = &object.compiled else {
                return Err(format!("error: {} shader {} is not compiled", object.stage, handle.0));
            };
            if stages.insert(object.stage, compiled).is_some() {
                return Err(format!("error: more than one {} shader attached", object.stage));
            }
        }

        if let (Some(vertex), Some(fragment)) =
            (stages.get(&ShaderStage::Vertex), stages.get(&ShaderStage::Fragment))
        {
            check_vertex_fragment(&vertex.interface, &fragment.interface)?;
        }
        Ok(())
    }
}

impl Default for NagaContext {
    fn default() -> Self {
        Self::new()
    }
}

impl GraphicsContext for NagaContext {
    fn supported_stages(&self) -> StageFlags {
        StageFlags::VERTEX | StageFlags::FRAGMENT
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle> {
        let handle = ShaderHandle(self.shader_names.alloc());
        self.shaders.insert(handle, NagaShader {
            stage,
            source: String::new(),
            compiled: None,
        });
        Ok(handle)
    }

    fn shader_source(&mut self, shader: ShaderHandle, source: &str) -> Result<()> {
        let object = self.shader_mut(shader)?;
        object.source.clear();
        object.source.push_str(source);
        Ok(())
    }

    fn compile_shader(&mut self, shader: ShaderHandle) -> Result<()> {
        let object = self.shader_mut(shader)?;
        let outcome = compile(object.stage, &object.source);
        if let Err(log) = &outcome {
            shader_baker::baker_trace!("naga::Context", "shader {} failed: {}", shader.0, log);
        }
        object.compiled = Some(outcome);
        Ok(())
    }

    fn shader_compile_error(&mut self, shader: ShaderHandle) -> Result<Option<String>> {
        Ok(match &self.shader_mut(shader)?.compiled {
            Some(Ok(_)) => None,
            Some(Err(log)) => Some(log.clone()),
            None => Some("error: shader has not been compiled".to_string()),
        })
    }

    fn delete_shader(&mut self, shader: ShaderHandle) -> Result<()> {
        if self.shaders.remove(&shader).is_none() {
            baker_bail!(BackendError, "naga::Context", "unknown shader handle {}", shader.0);
        }
        self.shader_names.free(shader.0);
        Ok(())
    }

    fn create_program(&mut self) -> Result<ProgramHandle> {
        let handle = ProgramHandle(self.program_names.alloc());
        self.programs.insert(handle, NagaProgram::default());
        Ok(handle)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) -> Result<()> {
        if !self.shaders.contains_key(&shader) {
            baker_bail!(BackendError, "naga::Context", "unknown shader handle {}", shader.0);
        }
        let object = self.program_mut(program)?;
        if object.attached.contains(&shader) {
            baker_bail!(
                BackendError,
                "naga::Context",
                "shader {} is already attached to program {}",
                shader.0,
                program.0
            );
        }
        object.attached.push(shader);
        Ok(())
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) -> Result<()> {
        let object = self.program_mut(program)?;
        let Some(index) = object.attached.iter().position(|s| *s == shader) else {
            baker_bail!(
                BackendError,
                "naga::Context",
                "shader {} is not attached to program {}",
                shader.0,
                program.0
            );
        };
        object.attached.swap_remove(index);
        Ok(())
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<()> {
        let attached = self.program_mut(program)?.attached.clone();
        let outcome = self.link(&attached);
        self.program_mut(program)?.linked = Some(outcome);
        Ok(())
    }

    fn program_link_error(&mut self, program: ProgramHandle) -> Result<Option<String>> {
        Ok(match &self.program_mut(program)?.linked {
            Some(Ok(())) => None,
            Some(Err(log)) => Some(log.clone()),
            None => Some("error: program has not been linked".to_string()),
        })
    }

    fn validate_program(&mut self, program: ProgramHandle) -> Result<Option<String>> {
        Ok(match &self.program_mut(program)?.linked {
            Some(Ok(())) => None,
            _ => Some("error: program is not successfully linked".to_string()),
        })
    }

    fn delete_program(&mut self, program: ProgramHandle) -> Result<()> {
        if self.programs.remove(&program).is_none() {
            baker_bail!(BackendError, "naga::Context", "unknown program handle {}", program.0);
        }
        self.program_names.free(program.0);
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.viewport = (width, height);
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "naga_context_tests.rs"]
mod tests;
