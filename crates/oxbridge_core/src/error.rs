//! Error types for marshaling operations.

use thiserror::Error;

/// Result type for marshaling operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors surfaced by the marshaling layer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// The native call set its failure flag.
    #[error("{message}")]
    Native {
        /// Message produced by the native library.
        message: String,
    },

    /// A native call reported success but handed back a null handle.
    #[error("native library returned a null {entity} handle")]
    NullHandle {
        /// Entity the handle was expected to belong to.
        entity: &'static str,
    },

    /// A foreign vector whose byte span does not fit in memory.
    #[error("foreign vector of {count} records with stride {stride} overflows the address space")]
    LengthOverflow {
        /// Number of records.
        count: usize,
        /// Record stride in bytes.
        stride: usize,
    },
}

impl CoreError {
    /// Creates a native failure error.
    pub fn native(message: impl Into<String>) -> Self {
        Self::Native {
            message: message.into(),
        }
    }

    /// Returns the native message if this is a native failure.
    pub fn native_message(&self) -> Option<&str> {
        match self {
            Self::Native { message } => Some(message),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn native_displays_message_verbatim() {
        let err = CoreError::native("boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.native_message(), Some("boom"));
    }

    #[test]
    fn null_handle_display() {
        let err = CoreError::NullHandle { entity: "UserId" };
        assert_eq!(err.to_string(), "native library returned a null UserId handle");
        assert_eq!(err.native_message(), None);
    }
}
