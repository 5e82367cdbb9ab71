//! Tether bridge core.
//!
//! Exposes a reflective, runtime-discovered native type system inside a
//! dynamically-typed, garbage-collected host runtime. Host code
//! instantiates native types, reads and writes their fields and
//! properties, calls their methods and subscribes to their signals with
//! no compile-time knowledge on either side.
//!
//! The three hard problems this crate owns:
//!
//! - **Proxy classes**: one host class per native type identifier,
//!   generated on demand from metadata and cached for the process
//!   lifetime, chained along the native inheritance graph
//!   ([`ProxyClass`], [`ClassRegistry`]).
//! - **Lifetime reconciliation**: native code counts references by hand,
//!   the host traces. Each wrapped object runs a two-state automaton
//!   (collectible/pinned) driven by native toggle notifications, with an
//!   identity association guaranteeing one live proxy per native pointer
//!   and exactly-once finalization ([`ProxyHeap`], [`Bridge::collect`]).
//! - **Dynamic member resolution**: property/method/field lookup with
//!   naming-convention translation ([`naming`]) over a class/interface
//!   graph that is only known at runtime.
//!
//! The reflection provider, the native object system, value marshaling
//! and function invocation are collaborators behind traits
//! ([`tether_meta::Introspection`], [`tether_meta::ObjectSystem`],
//! [`Marshaler`], [`Invoker`]); the bridge decides *what* to call and
//! owns the bookkeeping, never the conversions or calling conventions.

#![warn(missing_docs)]

mod boxed;
mod bridge;
mod class;
mod convert;
mod diag;
mod error;
mod heap;
mod instance;
mod invoke;
pub mod naming;
mod object;
mod resolve;
mod signal;
mod value;

pub use bridge::{Bridge, ClassCall};
pub use class::{ClassRegistry, DispatchKind, ProxyClass};
pub use convert::Marshaler;
pub use diag::{set_fallback_hook, FallbackHook};
pub use error::{BridgeError, BridgeResult, ConvertError};
pub use heap::{Finalizer, ProxyHeap};
pub use instance::{InstanceKind, ProxyObject, ProxyRef};
pub use invoke::Invoker;
pub use value::{BoundMethod, HostCallback, HostValue, RootMember};
