//! The signal binder.
//!
//! Each `subscribe` call produces one independent binding: a closure that
//! converts emitted native arguments to host values and invokes the host
//! callback. Bindings live in the native system's per-object tables, so
//! destroying the owning object drops them; the bridge keeps no
//! subscription table of its own.

use std::rc::Rc;

use tether_meta::{NativeError, SignalClosure};

use crate::bridge::BridgeInner;
use crate::error::{BridgeError, BridgeResult};
use crate::instance::{InstanceKind, ProxyRef};
use crate::naming;
use crate::resolve;
use crate::value::{HostCallback, HostValue};

/// Resolve a signal and connect a host callback to it. Returns the native
/// handler identifier.
pub(crate) fn subscribe(
    inner: &Rc<BridgeInner>,
    proxy: &ProxyRef,
    signal: &str,
    callback: HostCallback,
    after: bool,
) -> BridgeResult<u64> {
    if proxy.kind() != InstanceKind::Object {
        return Err(BridgeError::Native(NativeError::Message(
            "instance is not a reference-counted object".to_string(),
        )));
    }
    let info = proxy.class().info().ok_or_else(|| {
        BridgeError::Native(NativeError::Message(
            "instance has no type metadata".to_string(),
        ))
    })?;

    // The detail participates in connection, not in resolution.
    let bare = naming::strip_detail(signal);
    let resolved = resolve::find_signal_deep(inner.provider.as_ref(), info, bare).ok_or_else(
        || BridgeError::SignalNotFound {
            signal: bare.to_string(),
            type_name: info.qualified_name(),
        },
    )?;

    let marshal = Rc::clone(&inner.marshal);
    let params = resolved.params;
    let closure: SignalClosure = Box::new(move |args| {
        let host: Vec<HostValue> = params
            .iter()
            .zip(args.iter())
            .map(|(kind, arg)| marshal.to_host(kind, arg))
            .collect();
        callback(&host);
    });

    Ok(inner
        .system
        .connect(proxy.native(), signal, closure, after))
}

/// Detach a binding by handler identifier.
///
/// Identifiers are not re-validated: passing one that was never returned
/// by [`subscribe`] is undefined behavior at the native layer and must be
/// guarded by the caller.
pub(crate) fn unsubscribe(
    inner: &Rc<BridgeInner>,
    proxy: &ProxyRef,
    handler: u64,
) -> BridgeResult<()> {
    if proxy.kind() != InstanceKind::Object {
        return Err(BridgeError::Native(NativeError::Message(
            "instance is not a reference-counted object".to_string(),
        )));
    }
    inner.system.disconnect(proxy.native(), handler);
    Ok(())
}
