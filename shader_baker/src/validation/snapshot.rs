/// Immutable copies of entity state handed to the execution thread, and the
/// results handed back.

use std::sync::Arc;
use crate::context::ShaderStage;
use crate::model::{Program, ProgramId, Shader, ShaderId};
use crate::utils::Mailbox;

/// Shader state at snapshot time
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShaderSnapshot {
    pub id: ShaderId,
    pub stage: ShaderStage,
    pub source: Arc<str>,
    pub mod_count: u32,
}

impl ShaderSnapshot {
    pub fn of(shader: &Shader) -> Self {
        Self {
            id: shader.id(),
            stage: shader.stage(),
            source: shader.source(),
            mod_count: shader.mod_count(),
        }
    }
}

/// Program state at snapshot time, including a copy of every attached shader
/// so the execution thread can compile shaders it has never seen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgramSnapshot {
    pub id: ProgramId,
    pub mod_count: u32,
    /// Attached shaders in pipeline stage order
    pub shaders: Vec<ShaderSnapshot>,
}

impl ProgramSnapshot {
    pub fn of(program: &Program) -> Self {
        Self {
            id: program.id(),
            mod_count: program.mod_count(),
            shaders: program.shaders().iter().map(|s| ShaderSnapshot::of(s)).collect(),
        }
    }
}

/// Outcome of one compile or link, tagged with the modification counter of
/// the input it was computed from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResult {
    pub mod_count: u32,
    /// `None` when valid
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum Eviction {
    Shader(ShaderId),
    Program(ProgramId),
}

/// Every piece of state shared by the two threads
#[derive(Default)]
pub(crate) struct Mailboxes {
    pub pending_shaders: Mailbox<ShaderId, ShaderSnapshot>,
    pub pending_programs: Mailbox<ProgramId, ProgramSnapshot>,
    pub shader_results: Mailbox<ShaderId, ValidationResult>,
    pub program_results: Mailbox<ProgramId, ValidationResult>,
    pub evictions: Mailbox<Eviction, ()>,
}
