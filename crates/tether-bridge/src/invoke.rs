//! The function-invocation contract.

use tether_meta::{MethodInfo, NativeArg, NativeError, NativePtr};

use crate::value::HostValue;

/// Executes a resolved native method or constructor.
///
/// The bridge resolves *which* method to call and supplies the receiver
/// and host-side arguments; argument conversion, the calling convention
/// and native error capture live behind this trait.
pub trait Invoker {
    /// Call `method` on `receiver` (or as a free/static function when
    /// `None`) with the given host arguments, returning the native result.
    fn call(
        &self,
        method: &MethodInfo,
        receiver: Option<NativePtr>,
        args: &[HostValue],
    ) -> Result<NativeArg, NativeError>;
}
