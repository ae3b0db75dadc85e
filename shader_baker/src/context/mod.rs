//! Native graphics context abstraction

mod stage;
mod graphics_context;

pub use stage::{ShaderStage, StageFlags};
pub use graphics_context::{GraphicsContext, ShaderHandle, ProgramHandle};

// Mock context for tests (no GPU required)
#[cfg(test)]
pub mod mock_context;
