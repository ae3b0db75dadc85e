/// GraphicsContext trait - the native graphics context seen by the engine
///
/// The trait is deliberately GL-shaped: objects are named by plain integers,
/// sources are uploaded and compiled in separate calls, programs are linked
/// from attached shader objects. Every method must be called on the thread
/// that created the context, and every handle is only meaningful to the
/// context that returned it.

use crate::context::{ShaderStage, StageFlags};
use crate::error::Result;

/// Native shader object name (non-zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShaderHandle(pub u32);

/// Native program object name (non-zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProgramHandle(pub u32);

/// Native graphics context
///
/// Implemented by backends (e.g. `shader_baker_backend_naga::NagaContext`).
/// Not `Send`: a context is created on the execution thread and dies there.
///
/// `Err` results are reserved for backend failures (unknown handle, lost
/// context, ...). A shader that does not compile or a program that does not
/// link is a normal outcome reported through the `*_error` queries.
pub trait GraphicsContext {
    /// Stages this context can compile
    fn supported_stages(&self) -> StageFlags;

    // ===== SHADER OBJECTS =====

    /// Create an empty shader object for `stage`
    fn create_shader(&mut self, stage: ShaderStage) -> Result<ShaderHandle>;

    /// Replace the source held by the driver for `shader`
    ///
    /// Uploading an empty string after compiling releases the driver's copy;
    /// it does not affect the compile result.
    fn shader_source(&mut self, shader: ShaderHandle, source: &str) -> Result<()>;

    /// Compile the source currently held for `shader`
    ///
    /// The driver may finish the work asynchronously; the result is only
    /// observed through [`GraphicsContext::shader_compile_error`].
    fn compile_shader(&mut self, shader: ShaderHandle) -> Result<()>;

    /// `None` if the last compile succeeded, otherwise the compile log
    fn shader_compile_error(&mut self, shader: ShaderHandle) -> Result<Option<String>>;

    /// Delete a shader object
    fn delete_shader(&mut self, shader: ShaderHandle) -> Result<()>;

    // ===== PROGRAM OBJECTS =====

    /// Create an empty program object
    fn create_program(&mut self) -> Result<ProgramHandle>;

    /// Attach a shader object to a program object
    fn attach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) -> Result<()>;

    /// Detach a shader object from a program object
    ///
    /// A linked program keeps its executable after its shaders are detached.
    fn detach_shader(&mut self, program: ProgramHandle, shader: ShaderHandle) -> Result<()>;

    /// Link the shaders currently attached to `program`
    fn link_program(&mut self, program: ProgramHandle) -> Result<()>;

    /// `None` if the last link succeeded, otherwise the link log
    fn program_link_error(&mut self, program: ProgramHandle) -> Result<Option<String>>;

    /// Run the driver's program validation; `None` if it passed
    fn validate_program(&mut self, program: ProgramHandle) -> Result<Option<String>>;

    /// Delete a program object
    fn delete_program(&mut self, program: ProgramHandle) -> Result<()>;

    // ===== FRAMEBUFFER =====

    /// Resize the default framebuffer / viewport
    fn set_viewport(&mut self, _width: u32, _height: u32) {}
}
