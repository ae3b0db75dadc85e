/// Engine configuration

use std::time::Duration;

/// What to do with the driver's program validation status after a link
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProgramValidation {
    /// Never query it
    #[default]
    Skip,
    /// Query it after a successful link and log failures as warnings
    Diagnostic,
    /// Query it after a successful link; a failure makes the program Invalid
    Strict,
}

/// Engine configuration
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// How often the control thread should call `publish_results`
    pub publish_interval: Duration,
    /// Sleep between two iterations of the execution thread loop
    pub frame_interval: Duration,
    /// Use of the program validation status (see [`ProgramValidation`])
    pub program_validation: ProgramValidation,
    /// Name of the execution thread
    pub thread_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            publish_interval: Duration::from_millis(250),
            frame_interval: Duration::from_millis(16),
            program_validation: ProgramValidation::Skip,
            thread_name: "shader-baker-gl".to_string(),
        }
    }
}
