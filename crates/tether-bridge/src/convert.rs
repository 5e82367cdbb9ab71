//! The value-marshaling contract.

use tether_meta::{NativeArg, ValueKind};

use crate::error::ConvertError;
use crate::value::HostValue;

/// Converts between native argument representations and host values.
///
/// The bridge treats this as a black box: it chooses *which* member or
/// argument to convert and propagates failures, never interpreting the
/// values itself. Integrations that wrap object-valued results hold their
/// own bridge handle for that purpose.
pub trait Marshaler {
    /// Convert a native value to a host value. Infallible by contract;
    /// unrepresentable values surface as the host's undefined.
    fn to_host(&self, kind: &ValueKind, arg: &NativeArg) -> HostValue;

    /// Convert a host value into the native representation expected by
    /// `kind`. Failure is a propagated error, never a coercion.
    fn to_native(&self, kind: &ValueKind, value: &HostValue) -> Result<NativeArg, ConvertError>;
}
