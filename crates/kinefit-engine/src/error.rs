//! Error types for engine construction.
//!
//! Per-frame degradations (malformed poses, missing history, singular fits,
//! unusable reference statistics) never surface here — they degrade to "no
//! signal" inside the components. `EngineError` covers construction-time
//! API misuse only.

use thiserror::Error;

/// Result type for engine construction.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors raised when a component is constructed with unusable parameters.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("window size must be at least {min}, got {got}")]
    WindowTooSmall { min: usize, got: usize },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl EngineError {
    /// Create an invalid-configuration error.
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::InvalidConfig(message.into())
    }
}
