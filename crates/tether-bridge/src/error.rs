//! Bridge errors.
//!
//! Every failure surfaces synchronously at the operation that detected it.
//! Native-side failures are translated into the same channel, carrying the
//! foreign error's message. The only deliberate non-error path is the
//! logged fallback to default member lookup (see [`crate::diag`]).

use thiserror::Error;

use tether_meta::{NativeError, TypeId};

/// Result alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors raised by proxy construction and member dispatch.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum BridgeError {
    /// No type descriptor is loaded for the requested identifier.
    #[error("Missing metadata for {type_id}")]
    MetadataMissing {
        /// The identifier that failed to resolve.
        type_id: TypeId,
    },

    /// A boxed type has neither a usable constructor nor size information.
    #[error("Boxed allocation failed: no constructor found")]
    AllocationFailed,

    /// A native constructor invocation failed.
    #[error("Construction failed: {message}")]
    ConstructionFailed {
        /// The native error's message.
        message: String,
    },

    /// A field has a complex (non-flat) type unsupported by direct access.
    #[error("Unable to get field {name} (complex types not allowed)")]
    FieldAccessDenied {
        /// Host-convention field name as requested.
        name: String,
    },

    /// Attempt to set a property declared non-writable.
    #[error("Property {name} is not writable")]
    PropertyNotWritable {
        /// Host-convention property name as requested.
        name: String,
    },

    /// A value could not be converted to a property's native representation.
    #[error("Cannot convert value for property {name}: {message}")]
    PropertyConversionFailed {
        /// Host-convention property name as requested.
        name: String,
        /// The converter's message.
        message: String,
    },

    /// No signal with the requested name on the class, its interfaces or
    /// any ancestor.
    #[error("Signal {signal} not found for instance of {type_name}")]
    SignalNotFound {
        /// Signal name after detail stripping.
        signal: String,
        /// Qualified name of the searched type.
        type_name: String,
    },

    /// A proxy class was invoked without the construction protocol.
    #[error("Not a construct call")]
    NotAConstructCall,

    /// Any other failure reported by the native side.
    #[error("{0}")]
    Native(#[from] NativeError),
}

/// Failure converting a host value to a native representation.
#[derive(Debug, Clone, Error, PartialEq)]
#[error("{0}")]
pub struct ConvertError(pub String);

impl From<&str> for ConvertError {
    fn from(s: &str) -> Self {
        ConvertError(s.to_string())
    }
}
