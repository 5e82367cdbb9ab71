//! The reference-type (object) wrapper.
//!
//! Reference-counted instances carry the dual-ownership reconciliation:
//! the bridge holds one native reference per live proxy, a toggle
//! notification flips the proxy between collectible and pinned as native
//! holders come and go, and a process-wide identity association (the
//! attached-data word on the native object) guarantees at most one live
//! proxy per native pointer.

use std::rc::Rc;

use tether_meta::{NativeArg, NativePtr};

use crate::bridge::BridgeInner;
use crate::class::ProxyClass;
use crate::diag;
use crate::error::{BridgeError, BridgeResult};
use crate::instance::{InstanceKind, ProxyObject, ProxyRef};
use crate::naming;
use crate::resolve;
use crate::value::{BoundMethod, HostValue, RootMember};

/// Wrap a native object pointer, reusing the live proxy when one exists.
pub(crate) fn wrap(inner: &Rc<BridgeInner>, ptr: NativePtr) -> BridgeResult<HostValue> {
    if ptr.is_null() {
        return Ok(HostValue::Null);
    }

    if let Some(id) = inner.system.attached_data(ptr) {
        if let Some(proxy) = inner.heap.get(id) {
            return Ok(HostValue::Object(proxy));
        }
        // Dead but not yet swept: finalize the stale association now so
        // the fresh one below starts clean.
        if let Some(finalizer) = inner.heap.take_dead(id) {
            finalizer();
        }
    }

    let class = inner
        .classes
        .get_or_create(inner.provider.as_ref(), inner.system.type_of(ptr))?;
    Ok(HostValue::Object(associate(inner, &class, ptr)))
}

/// User construction from named initializers.
///
/// Every fallible step (property resolution, conversion, the native
/// construction itself) happens before association, so a failure leaves
/// no identity entry behind.
pub(crate) fn construct_user(
    inner: &Rc<BridgeInner>,
    class: &Rc<ProxyClass>,
    props: &[(String, HostValue)],
) -> BridgeResult<ProxyRef> {
    let info = match class.info() {
        Some(info) => info,
        None => {
            return Err(BridgeError::ConstructionFailed {
                message: "cannot instantiate the root class".to_string(),
            })
        }
    };

    let mut params: Vec<(String, NativeArg)> = Vec::with_capacity(props.len());
    for (name, value) in props {
        let native_name = naming::to_native_name(name);
        // Unknown initializer names are ignored, not errors.
        let Some(prop) = resolve::find_property_deep(inner.provider.as_ref(), info, &native_name)
        else {
            continue;
        };
        let arg = inner.marshal.to_native(&prop.kind, value).map_err(|e| {
            BridgeError::PropertyConversionFailed {
                name: name.clone(),
                message: e.to_string(),
            }
        })?;
        params.push((prop.name.clone(), arg));
    }

    let ptr = inner
        .system
        .construct(info.id, &params)
        .map_err(|e| BridgeError::ConstructionFailed {
            message: e.to_string(),
        })?;

    Ok(associate(inner, class, ptr))
}

/// Associate a proxy with a native object: take the bridge's reference,
/// install the toggle notification, record the identity association and
/// enter the heap with the reachability matching the current holders.
pub(crate) fn associate(
    inner: &Rc<BridgeInner>,
    class: &Rc<ProxyClass>,
    ptr: NativePtr,
) -> ProxyRef {
    let id = inner.next_proxy_id();
    let proxy = Rc::new(ProxyObject::new(
        Rc::clone(class),
        ptr,
        InstanceKind::Object,
        id,
    ));

    inner.system.ref_sink(ptr);

    let weak_inner = Rc::downgrade(inner);
    inner.system.add_toggle_notify(
        ptr,
        Box::new(move |_, toggle_down| {
            let Some(inner) = weak_inner.upgrade() else {
                return;
            };
            if toggle_down {
                // Bridge is the last holder: collection is safe and
                // should release the native reference.
                inner.heap.unpin(id);
            } else {
                // A second native holder appeared: the proxy must stay
                // alive as long as the native side can hand it back.
                inner.heap.pin(id);
            }
        }),
    );

    inner.system.set_attached_data(ptr, Some(id));

    let weak_inner = Rc::downgrade(inner);
    let finalizer = Box::new(move || {
        let Some(inner) = weak_inner.upgrade() else {
            return;
        };
        inner.system.set_attached_data(ptr, None);
        inner.system.remove_toggle_notify(ptr);
        inner.system.unref(ptr);
    });

    let pinned = inner.system.ref_count(ptr) > 1;
    inner.heap.insert(id, &proxy, pinned, finalizer);
    proxy
}

/// Getter resolution: synthetic identity property, declared property
/// (readable flag honored), method, root builtins, logged fallback.
pub(crate) fn get(
    inner: &Rc<BridgeInner>,
    proxy: &ProxyRef,
    name: &str,
) -> BridgeResult<HostValue> {
    if name == "__typeid__" {
        let ty = inner.system.type_of(proxy.native());
        return Ok(HostValue::Int(ty.raw() as i64));
    }

    let Some(info) = proxy.class().info() else {
        return Ok(fallback_get(proxy, name));
    };
    let native_name = naming::to_native_name(name);

    if let Some(prop) = resolve::find_property_deep(inner.provider.as_ref(), info, &native_name) {
        if !prop.readable {
            return Ok(HostValue::Undefined);
        }
        let arg = inner.system.get_property(proxy.native(), &prop.name)?;
        return Ok(inner.marshal.to_host(&prop.kind, &arg));
    }

    if let Some(method) = resolve::find_method_deep(inner.provider.as_ref(), info, &native_name) {
        return Ok(HostValue::Callable(BoundMethod {
            method,
            receiver: Some(proxy.native()),
        }));
    }

    if let Some(member) = RootMember::from_host_name(name) {
        return Ok(HostValue::Builtin(member));
    }

    Ok(fallback_get(proxy, name))
}

/// Setter: writable declared properties go through the native mechanism;
/// everything else is the logged fallback.
pub(crate) fn set(
    inner: &Rc<BridgeInner>,
    proxy: &ProxyRef,
    name: &str,
    value: &HostValue,
) -> BridgeResult<()> {
    if let Some(info) = proxy.class().info() {
        let native_name = naming::to_native_name(name);
        if let Some(prop) = resolve::find_property_deep(inner.provider.as_ref(), info, &native_name)
        {
            if !prop.writable {
                return Err(BridgeError::PropertyNotWritable {
                    name: name.to_string(),
                });
            }
            let arg = inner.marshal.to_native(&prop.kind, value).map_err(|e| {
                BridgeError::PropertyConversionFailed {
                    name: name.to_string(),
                    message: e.to_string(),
                }
            })?;
            inner.system.set_property(proxy.native(), &prop.name, arg)?;
            return Ok(());
        }
    }

    diag::fallback_hit(proxy.class().name(), name);
    proxy.expando_set(name, value.clone());
    Ok(())
}

pub(crate) fn has(inner: &Rc<BridgeInner>, proxy: &ProxyRef, name: &str) -> BridgeResult<bool> {
    if name == "__typeid__" {
        return Ok(true);
    }
    if let Some(info) = proxy.class().info() {
        let native_name = naming::to_native_name(name);
        let provider = inner.provider.as_ref();
        if resolve::find_property_deep(provider, info, &native_name).is_some()
            || resolve::find_method_deep(provider, info, &native_name).is_some()
        {
            return Ok(true);
        }
    }
    if RootMember::from_host_name(name).is_some() {
        return Ok(true);
    }
    Ok(proxy.expando_has(name))
}

pub(crate) fn enumerate(inner: &Rc<BridgeInner>, proxy: &ProxyRef) -> BridgeResult<Vec<String>> {
    match proxy.class().info() {
        Some(info) => Ok(resolve::enumerate_object_members(
            inner.provider.as_ref(),
            info,
        )),
        None => Ok(Vec::new()),
    }
}

/// `[Namespace.TypeName:ClassName 0x...]`, mirroring the runtime type,
/// the constructing class and the wrapped address.
pub(crate) fn display_string(proxy: &ProxyRef) -> String {
    let type_name = proxy
        .class()
        .info()
        .map(|info| info.qualified_name())
        .unwrap_or_else(|| proxy.class().name().to_string());
    format!(
        "[{}:{} {:#x}]",
        type_name,
        proxy.class().name(),
        proxy.native().raw()
    )
}

fn fallback_get(proxy: &ProxyRef, name: &str) -> HostValue {
    diag::fallback_hit(proxy.class().name(), name);
    proxy.expando_get(name).unwrap_or(HostValue::Undefined)
}
