//! Entity model: shaders, programs and their validity state machine

mod validity;
mod listeners;
mod shader;
mod program;

pub use validity::{Validity, Transition};
pub use listeners::Subscription;
pub use shader::{Shader, ShaderId, ShaderListener};
pub use program::{Program, ProgramId, ProgramListener};
