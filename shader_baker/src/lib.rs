/*!
# Shader Baker

Background compile/link validation for interactively edited GLSL shaders.

The user edits shader sources on a control thread while a dedicated execution
thread, the only thread allowed to touch the native graphics context,
recompiles and relinks them. Results computed from stale input never overwrite
newer state.

## Architecture

- **Entity model**: `Shader` / `Program` with a validity state machine and
  wrapping modification counters (control thread, `Rc`)
- **ValidationEngine**: registry of tracked entities; snapshots them on every
  change and publishes results back (control thread)
- **Validator**: owns the native resource cache and runs validation passes
  (execution thread)
- **TaskQueue / CoalescingTask**: work submission to the execution thread
- **ExecutionThread**: owns the `GraphicsContext` and runs the loop
- **GraphicsContext**: GL-shaped backend trait (see `shader_baker_backend_naga`)

The two engine halves only share locked mailboxes. Mailbox locks are never
held across a compile or link call.
*/

// Internal modules
mod error;
mod config;
pub mod log;
pub mod utils;
pub mod context;
pub mod task;
pub mod model;
pub mod validation;
pub mod execution;

// Main baker namespace module
pub mod baker {
    // Error types
    pub use crate::error::{Error, Result};

    // Configuration
    pub use crate::config::{EngineConfig, ProgramValidation};

    // Entities
    pub use crate::model::{
        Program, ProgramId, ProgramListener, Shader, ShaderId, ShaderListener, Subscription,
        Transition, Validity,
    };

    // Engine halves
    pub use crate::validation::{
        ContextCache, PublishStats, ResourceCache, ValidationEngine, ValidationPass, Validator,
    };

    // Native context
    pub use crate::context::{GraphicsContext, ProgramHandle, ShaderHandle, ShaderStage, StageFlags};

    // Execution thread
    pub use crate::execution::{ExecutionThread, FrameHook, NoRender, PublishTicker};
    pub use crate::task::{CoalescingTask, ContextTask, TaskQueue};

    // Logging sub-module (types only, macros are exported at the crate root)
    pub mod log {
        pub use crate::log::{
            reset_logger, set_logger, DefaultLogger, LogEntry, LogSeverity, Logger,
        };
    }
}
