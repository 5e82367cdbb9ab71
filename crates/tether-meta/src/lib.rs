//! Tether metadata model — contracts between the bridge core and the
//! native side it wraps.
//!
//! This crate is the lightweight contract layer: it defines the opaque
//! handles ([`TypeId`], [`NativePtr`]), the reflection descriptors
//! ([`TypeInfo`] and its member records), the read-only [`Introspection`]
//! provider trait, and the [`ObjectSystem`] trait through which the bridge
//! reaches the manually reference-counted native object model. Reflection
//! providers and native-system backends compile against this crate alone,
//! without depending on the bridge core.
//!
//! Everything here is data or a trait; no caching, no lifetime policy.
//! Those live in `tether-bridge`.

#![warn(missing_docs)]

mod error;
mod handle;
mod info;
mod provider;
mod system;

pub use error::NativeError;
pub use handle::{NativePtr, TypeId};
pub use info::{
    ConstantInfo, FieldInfo, MethodInfo, PropertyInfo, SignalInfo, TypeInfo, TypeKind, ValueKind,
};
pub use provider::Introspection;
pub use system::{NativeArg, ObjectSystem, SignalClosure, ToggleNotify};
