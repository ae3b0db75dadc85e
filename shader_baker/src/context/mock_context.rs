/// Mock GraphicsContext for unit tests (no GPU required)
///
/// Compile rule: a source containing `#error` fails to compile, and the log
/// quotes the offending line. Link rule: a program links if at least one
/// shader is attached, every attached shader compiled, and no attached source
/// contains `// link-error`.
///
/// Every call is checked against the thread that created the context, and
/// every call is appended to `calls` so tests can assert ordering.

use std::sync::mpsc::Sender;
use std::thread::{self, ThreadId};
use rustc_hash::FxHashMap;
use crate::context::{
    GraphicsContext, ProgramHandle, ShaderHandle, ShaderStage, StageFlags,
};
use crate::error::{Error, Result};
use crate::utils::NameAllocator;

#[derive(Debug)]
pub struct MockShaderObject {
    pub stage: ShaderStage,
    pub source: String,
    pub compiled_source: Option<String>,
    pub compile_result: Option<std::result::Result<(), String>>,
}

#[derive(Debug)]
pub struct MockProgramObject {
    pub attached: Vec<ShaderHandle>,
    pub link_result: Option<std::result::Result<(), String>>,
}

/// Recorded context call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    CreateShader(ShaderStage),
    Compile(ShaderHandle),
    CompileError(ShaderHandle),
    DeleteShader(ShaderHandle),
    CreateProgram,
    Link(ProgramHandle),
    Validate(ProgramHandle),
    DeleteProgram(ProgramHandle),
    Viewport(u32, u32),
}

pub struct MockContext {
    owner: ThreadId,
    shader_names: NameAllocator,
    program_names: NameAllocator,
    pub shaders: FxHashMap<ShaderHandle, MockShaderObject>,
    pub programs: FxHashMap<ProgramHandle, MockProgramObject>,
    pub calls: Vec<MockCall>,
    /// Sources passed to compile_shader, in call order
    pub compiled_sources: Vec<String>,
    /// When set, validate_program fails with this message
    pub validate_failure: Option<String>,
    /// When set, create_shader fails with a backend error
    pub fail_create_shader: bool,
    pub supported: StageFlags,
    /// When set, receives `live_objects()` as the context is dropped
    pub drop_report: Option<Sender<usize>>,
}

impl MockContext {
    pub fn new() -> Self {
        Self {
            owner: thread::current().id(),
            shader_names: NameAllocator::new(),
            program_names: NameAllocator::new(),
            shaders: FxHashMap::default(),
            programs: FxHashMap::default(),
            calls: Vec::new(),
            compiled_sources: Vec::new(),
            validate_failure: None,
            fail_create_shader: false,
            supported: StageFlags::all(),
            drop_report: None,
        }
    }

    fn check_thread(&self) {
        assert_eq!(
            thread::current().id(),
            self.owner,
            "MockContext used from a thread that does not own it"
        );
    }

    pub fn link_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, MockCall::Link(_))).count()
    }

    pub fn compile_calls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, MockCall::Compile(_))).count()
    }

    pub fn live_objects(&self) -> usize {
        self.shaders.len() + self.programs.len()
    }

    fn shader_mut(&mut self, shader: ShaderHandle) -> Result<&mut MockShaderObject> {
        self.shaders
            .get_mut(&shader)
            .ok_or_else(|| Error::BackendError(format!("unknown shader handle {}", shader.0)))
    }

    fn program_mut(&mut self, program: ProgramHandle) -> Result<&mut MockProgramObject> {
        self.programs
            .get_mut(&program)
            .ok_or_else(|| Error::BackendError(format!("unknown program handle {}", program.0)))
    }
}

impl Drop for MockContext {
    fn drop(&mut self) {
        if let Some(report) = self.drop_report.take() {
            let _ = report.send(self.live_objects());
        }
    }
}

impl GraphicsContext for MockContext {
    fn supported_stages(&self) -> StageFlags {
        self.supported
    }

    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle> {
        self.check_thread();
        if self.fail_create_shader {
            return Err(Error::BackendError("out of shader objects".to_string()));
        }
        self.calls.push(MockCall::CreateShader(stage));
        let handle = ShaderHandle(self.shader_names.alloc());
        self.shaders.insert(handle, MockShaderObject {
            stage,
            source: String::new(),
            compiled_source: None,
            compile_result: None,
        });
        Ok(handle)
    }

    fn shader_source(&mut self, shader: ShaderHandle, source: &str) -> Result<()> {
        self.check_thread();
        self.shader_mut(shader)?.source = source.to_string();
        Ok(())
    }

    fn compile_shader(&mut self, shader: ShaderHandle) -> Result<()> {
        self.check_thread();
        self.calls.push(MockCall::Compile(shader));
        let supported = self.supported;
        let object = self.shader_mut(shader)?;
        let source = object.source.clone();
        object.compile_result = Some(if !supported.contains_stage(object.stage) {
            Err(format!("{} shaders are not supported", object.stage))
        } else if let Some(line) = source.lines().find(|l| l.contains("#error")) {
            Err(format!("0:1: error: {}", line.trim()))
        } else {
            Ok(())
        });
        object.compiled_source = Some(source.clone());
        self.compiled_sources.push(source);
        Ok(())
    }

    fn shader_compile_error(&mut self, shader: ShaderHandle) -> Result<Option<String>> {
        self.check_thread();
        self.calls.push(MockCall::CompileError(shader));
        match &self.shader_mut(shader)?.compile_result {
            Some(Ok(())) => Ok(None),
            Some(Err(log)) => Ok(Some(log.clone())),
            None => Ok(Some("shader has not been compiled".to_string())),
        }
    }

    fn delete_shader(&mut self, shader: ShaderHandle) -> Result<()> {
        self.check_thread();
        self.calls.push(MockCall::DeleteShader(shader));
        self.shaders
            .remove(&shader)
            .ok_or_else(|| Error::BackendError(format!("unknown shader handle {}", shader.0)))?;
        self.shader_names.free(shader.0);
        Ok(())
    }

    fn create_program(&mut self) -> Result<ProgramHandle> {
        self.check_thread();
        self.calls.push(MockCall::CreateProgram);
        let handle = ProgramHandle(self.program_names.alloc());
        self.programs.insert(handle, MockProgramObject {
            attached: Vec::new(),
            link_result: None,
        });
        Ok(handle)
    }

    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) -> Result<()> {
        self.check_thread();
        if !self.shaders.contains_key(&shader) {
            return Err(Error::BackendError(format!("unknown shader handle {}", shader.0)));
        }
        let object = self.program_mut(program)?;
        if object.attached.contains(&shader) {
            return Err(Error::BackendError(format!("shader {} already attached", shader.0)));
        }
        object.attached.push(shader);
        Ok(())
    }

    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) -> Result<()> {
        self.check_thread();
        let object = self.program_mut(program)?;
        let before = object.attached.len();
        object.attached.retain(|s| *s != shader);
        if object.attached.len() == before {
            return Err(Error::BackendError(format!("shader {} not attached", shader.0)));
        }
        Ok(())
    }

    fn link_program(&mut self, program: ProgramHandle) -> Result<()> {
        self.check_thread();
        self.calls.push(MockCall::Link(program));
        let attached = self.program_mut(program)?.attached.clone();

        let mut result = Ok(());
        if attached.is_empty() {
            result = Err("no shaders attached".to_string());
        }
        for shader in &attached {
            let Some(object) = self.shaders.get(shader) else {
                result = Err(format!("shader {} was deleted", shader.0));
                break;
            };
            match &object.compile_result {
                Some(Ok(())) => {}
                _ => {
                    result = Err(format!("{} shader {} is not compiled", object.stage, shader.0));
                    break;
                }
            }
            if object.compiled_source.as_deref().is_some_and(|s| s.contains("// link-error")) {
                result = Err(format!("unresolved symbol in {} shader", object.stage));
                break;
            }
        }

        self.program_mut(program)?.link_result = Some(result);
        Ok(())
    }

    fn program_link_error(&mut self, program: ProgramHandle) -> Result<Option<String>> {
        self.check_thread();
        match &self.program_mut(program)?.link_result {
            Some(Ok(())) => Ok(None),
            Some(Err(log)) => Ok(Some(log.clone())),
            None => Ok(Some("program has not been linked".to_string())),
        }
    }

    fn validate_program(&mut self, program: ProgramHandle) -> Result<Option<String>> {
        self.check_thread();
        self.calls.push(MockCall::Validate(program));
        self.program_mut(program)?;
        Ok(self.validate_failure.clone())
    }

    fn delete_program(&mut self, program: ProgramHandle) -> Result<()> {
        self.check_thread();
        self.calls.push(MockCall::DeleteProgram(program));
        self.programs
            .remove(&program)
            .ok_or_else(|| Error::BackendError(format!("unknown program handle {}", program.0)))?;
        self.program_names.free(program.0);
        Ok(())
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.check_thread();
        self.calls.push(MockCall::Viewport(width, height));
    }
}
