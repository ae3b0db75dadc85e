//! Error types for Shader Baker
//!
//! These cover infrastructure failures only: backend calls, registration
//! mistakes and thread startup. Shader compile and program link failures are
//! never reported through this type; they travel as `Validity::Invalid` plus
//! an error string through the validation pipeline.

use std::fmt;

/// Result type for Shader Baker operations
pub type Result<T> = std::result::Result<T, Error>;

/// Shader Baker errors
#[derive(Debug, Clone)]
pub enum Error {
    /// Graphics backend failure (context call rejected, unknown handle, ...)
    BackendError(String),

    /// Invalid resource (handle, entity state, ...)
    InvalidResource(String),

    /// Initialization failed (context creation, thread spawn)
    InitializationFailed(String),

    /// Entity is already tracked by the validation engine
    AlreadyRegistered(String),

    /// Entity is not tracked by the validation engine
    NotRegistered(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::InvalidResource(msg) => write!(f, "Invalid resource: {}", msg),
            Error::InitializationFailed(msg) => write!(f, "Initialization failed: {}", msg),
            Error::AlreadyRegistered(msg) => write!(f, "Already registered: {}", msg),
            Error::NotRegistered(msg) => write!(f, "Not registered: {}", msg),
        }
    }
}

impl Error {
    /// The message carried by the error, without the variant prefix
    pub fn message(&self) -> &str {
        match self {
            Error::BackendError(msg)
            | Error::InvalidResource(msg)
            | Error::InitializationFailed(msg)
            | Error::AlreadyRegistered(msg)
            | Error::NotRegistered(msg) => msg,
        }
    }
}

impl std::error::Error for Error {}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
