//! The value-type (boxed) wrapper.
//!
//! Boxed instances wrap copy-semantics aggregates. Three ownership
//! categories exist, decided at construction and recorded on the
//! instance: constructor-owned (released through the generic deallocator
//! when the type is managed), sized allocation (freed with exactly the
//! recorded byte count), and borrowed (never freed; release is someone
//! else's responsibility and collection only logs a diagnostic).

use std::rc::Rc;

use tether_meta::NativePtr;

use crate::bridge::BridgeInner;
use crate::class::ProxyClass;
use crate::diag;
use crate::error::{BridgeError, BridgeResult};
use crate::instance::{InstanceKind, ProxyObject, ProxyRef};
use crate::naming;
use crate::resolve;
use crate::value::{BoundMethod, HostValue};

/// User construction: find a constructor, or fall back to a sized
/// zero-initialized allocation.
pub(crate) fn construct_user(
    inner: &Rc<BridgeInner>,
    class: &Rc<ProxyClass>,
    args: &[HostValue],
) -> BridgeResult<ProxyRef> {
    let info = match class.info() {
        Some(info) => info,
        None => {
            return Err(BridgeError::ConstructionFailed {
                message: "cannot instantiate the root class".to_string(),
            })
        }
    };

    if let Some(ctor) = inner.classes.boxed_constructor(info) {
        let ret = inner
            .invoker
            .call(&ctor, None, args)
            .map_err(|e| BridgeError::ConstructionFailed {
                message: e.to_string(),
            })?;
        let ptr = match ret {
            tether_meta::NativeArg::Ptr(ptr) if !ptr.is_null() => ptr,
            _ => {
                return Err(BridgeError::ConstructionFailed {
                    message: format!("constructor {} did not return a value", ctor.name),
                })
            }
        };
        return Ok(register(inner, class, ptr, 0));
    }

    if info.size != 0 {
        let ptr = inner.system.alloc_zeroed(info.size);
        return Ok(register(inner, class, ptr, info.size));
    }

    Err(BridgeError::AllocationFailed)
}

/// Adopt path: borrow an existing pointer without allocating. Ownership
/// stays elsewhere unless the type is a managed boxed type.
pub(crate) fn adopt(
    inner: &Rc<BridgeInner>,
    class: &Rc<ProxyClass>,
    ptr: NativePtr,
) -> ProxyRef {
    register(inner, class, ptr, 0)
}

fn register(
    inner: &Rc<BridgeInner>,
    class: &Rc<ProxyClass>,
    ptr: NativePtr,
    size: usize,
) -> ProxyRef {
    let id = inner.next_proxy_id();
    let proxy = Rc::new(ProxyObject::new(
        Rc::clone(class),
        ptr,
        InstanceKind::Boxed { size },
        id,
    ));

    let type_id = class.type_id();
    let type_name = class.name().to_string();
    let weak_inner = Rc::downgrade(inner);
    let finalizer = Box::new(move || {
        let Some(inner) = weak_inner.upgrade() else {
            return;
        };
        match type_id {
            Some(ty) if inner.system.is_managed_boxed(ty) => {
                inner.system.free_managed(ty, ptr);
            }
            _ if size != 0 => {
                inner.system.free_sized(ptr, size);
            }
            _ => {
                // Borrowed pointer of unmanaged type: ownership is
                // indeterminate, leak rather than double-free.
                diag::warn(&format!("boxed {type_name} at {ptr} possibly not freed"));
            }
        }
    });

    inner.heap.insert(id, &proxy, false, finalizer);
    proxy
}

/// Getter: exact-named field, then exact-named method, then the logged
/// fallback to default lookup.
pub(crate) fn get(
    inner: &Rc<BridgeInner>,
    proxy: &ProxyRef,
    name: &str,
) -> BridgeResult<HostValue> {
    let class = proxy.class();
    let Some(info) = class.info() else {
        return Ok(fallback_get(proxy, name));
    };

    if name == "__typeid__" {
        return Ok(HostValue::Int(info.id.raw() as i64));
    }

    let native_name = naming::to_native_name(name);

    if let Some(field) = info.find_field(&native_name) {
        if !field.flat {
            return Err(BridgeError::FieldAccessDenied {
                name: name.to_string(),
            });
        }
        let arg = inner
            .system
            .read_field(proxy.native(), field)
            .map_err(|_| BridgeError::FieldAccessDenied {
                name: name.to_string(),
            })?;
        return Ok(inner.marshal.to_host(&field.kind, &arg));
    }

    if let Some(method) = info.find_method(&native_name) {
        return Ok(HostValue::Callable(BoundMethod {
            method: method.clone(),
            receiver: Some(proxy.native()),
        }));
    }

    Ok(fallback_get(proxy, name))
}

/// Setter: per-field writes are not implemented; every write falls
/// through to the default member mechanism. Explicit limitation, kept
/// visible through the fallback log.
pub(crate) fn set(proxy: &ProxyRef, name: &str, value: &HostValue) -> BridgeResult<()> {
    diag::fallback_hit(proxy.class().name(), name);
    proxy.expando_set(name, value.clone());
    Ok(())
}

pub(crate) fn has(proxy: &ProxyRef, name: &str) -> BridgeResult<bool> {
    let class = proxy.class();
    if name == "__typeid__" {
        return Ok(true);
    }
    if let Some(info) = class.info() {
        let native_name = naming::to_native_name(name);
        if info.find_field(&native_name).is_some() || info.find_method(&native_name).is_some() {
            return Ok(true);
        }
    }
    Ok(proxy.expando_has(name))
}

pub(crate) fn enumerate(proxy: &ProxyRef) -> BridgeResult<Vec<String>> {
    match proxy.class().info() {
        Some(info) => Ok(resolve::enumerate_boxed_members(info)),
        None => Ok(Vec::new()),
    }
}

fn fallback_get(proxy: &ProxyRef, name: &str) -> HostValue {
    diag::fallback_hit(proxy.class().name(), name);
    proxy.expando_get(name).unwrap_or(HostValue::Undefined)
}
