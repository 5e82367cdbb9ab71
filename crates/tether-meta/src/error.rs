//! Errors reported by the native side.

use thiserror::Error;

/// Failure reported by the native object system or the invocation
/// subsystem, carrying the foreign error convention's message.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum NativeError {
    /// Generic native failure.
    #[error("{0}")]
    Message(String),

    /// A value could not be represented in the requested native form.
    #[error("Type mismatch: expected {expected}, got {got}")]
    TypeMismatch {
        /// Expected native type name.
        expected: String,
        /// Actual value description.
        got: String,
    },

    /// A field could not be read in place (nested aggregate, array or
    /// other non-flat layout).
    #[error("Unable to read field {name}: complex types not supported")]
    ComplexField {
        /// Field name.
        name: String,
    },
}

impl From<String> for NativeError {
    fn from(s: String) -> Self {
        NativeError::Message(s)
    }
}

impl From<&str> for NativeError {
    fn from(s: &str) -> Self {
        NativeError::Message(s.to_string())
    }
}
