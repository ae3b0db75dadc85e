//! Validation engine: control-thread registry, execution-thread validator and
//! the mailboxes between them

mod snapshot;
mod resource_cache;
mod validator;
mod engine;

pub use snapshot::{ShaderSnapshot, ProgramSnapshot, ValidationResult};
pub use resource_cache::{ContextCache, ResourceCache};
pub use validator::{Validator, ValidationPass};
pub use engine::{ValidationEngine, PublishStats};
