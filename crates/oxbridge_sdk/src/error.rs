//! Error types for SDK operations.

use oxbridge_core::CoreError;
use thiserror::Error;

/// Result type for SDK operations.
pub type SdkResult<T> = Result<T, SdkError>;

/// Errors surfaced by the SDK.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SdkError {
    /// Marshaling or native failure.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A value was rejected by its native validator.
    #[error("invalid {kind}: {reason}")]
    Invalid {
        /// Entity that failed validation.
        kind: &'static str,
        /// Reason reported by the native library.
        reason: String,
    },

    /// The environment has not been initialized.
    #[error("SDK environment is not initialized")]
    NotInitialized,

    /// The environment was already initialized.
    #[error("SDK environment is already initialized")]
    AlreadyInitialized,

    /// The environment was torn down and cannot be used again.
    #[error("SDK environment has been torn down")]
    TornDown,
}

impl SdkError {
    /// Turns a native failure into a validation error for `kind`.
    ///
    /// Other errors pass through unchanged.
    pub(crate) fn invalid(kind: &'static str, err: CoreError) -> Self {
        match err {
            CoreError::Native { message } => Self::Invalid {
                kind,
                reason: message,
            },
            other => Self::Core(other),
        }
    }
}
