//! The bridge facade.
//!
//! A [`Bridge`] owns the process-scoped registries (class cache, proxy
//! heap) and the handles to the four collaborators, and routes every
//! host-visible operation to the per-kind dispatch in [`crate::boxed`]
//! and [`crate::object`]. All state is reachable only through the value;
//! nothing is ambient.

use std::cell::Cell;
use std::rc::Rc;

use tether_meta::{Introspection, NativePtr, ObjectSystem, TypeId};

use crate::class::{ClassRegistry, DispatchKind, ProxyClass};
use crate::convert::Marshaler;
use crate::error::{BridgeError, BridgeResult};
use crate::heap::ProxyHeap;
use crate::instance::{ProxyObject, ProxyRef};
use crate::invoke::Invoker;
use crate::value::{BoundMethod, HostCallback, HostValue};
use crate::{boxed, naming, object, signal};

/// How a proxy class was invoked by host code.
#[derive(Clone)]
pub enum ClassCall {
    /// Construction with named property initializers (object classes).
    WithProperties(Vec<(String, HostValue)>),
    /// Construction with positional constructor arguments (boxed classes).
    WithArguments(Vec<HostValue>),
    /// Internal adopt path: associate an existing native pointer.
    Adopt(NativePtr),
    /// The class was called without the construction protocol.
    Plain,
}

pub(crate) struct BridgeInner {
    pub(crate) provider: Rc<dyn Introspection>,
    pub(crate) system: Rc<dyn ObjectSystem>,
    pub(crate) marshal: Rc<dyn Marshaler>,
    pub(crate) invoker: Rc<dyn Invoker>,
    pub(crate) classes: ClassRegistry,
    pub(crate) heap: ProxyHeap<ProxyObject>,
    next_id: Cell<u64>,
}

impl BridgeInner {
    pub(crate) fn next_proxy_id(&self) -> u64 {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        id
    }
}

/// Entry point for hosting a native type system.
///
/// Single logical thread of control: nothing here may be driven from two
/// threads without external synchronization, matching the native object
/// model. Cloning the handle shares the same registries.
#[derive(Clone)]
pub struct Bridge {
    inner: Rc<BridgeInner>,
}

impl Bridge {
    /// Create a bridge over the four collaborators.
    pub fn new(
        provider: Rc<dyn Introspection>,
        system: Rc<dyn ObjectSystem>,
        marshal: Rc<dyn Marshaler>,
        invoker: Rc<dyn Invoker>,
    ) -> Self {
        Self {
            inner: Rc::new(BridgeInner {
                provider,
                system,
                marshal,
                invoker,
                classes: ClassRegistry::new(),
                heap: ProxyHeap::new(),
                next_id: Cell::new(1),
            }),
        }
    }

    /// The proxy class for a native type, generated on first use.
    pub fn proxy_class(&self, id: TypeId) -> BridgeResult<Rc<ProxyClass>> {
        self.inner
            .classes
            .get_or_create(self.inner.provider.as_ref(), id)
    }

    /// The shared root class.
    #[must_use]
    pub fn root_class(&self) -> Rc<ProxyClass> {
        self.inner.classes.root()
    }

    /// Drop the cached class for a type whose metadata is unloaded.
    pub fn invalidate_class(&self, id: TypeId) {
        self.inner.classes.invalidate(id);
    }

    /// Wrap a reference-counted native object. Repeated wraps of the same
    /// pointer yield the same proxy identity; the null pointer wraps to
    /// the host null.
    pub fn wrap_object(&self, ptr: NativePtr) -> BridgeResult<HostValue> {
        object::wrap(&self.inner, ptr)
    }

    /// Wrap an existing boxed pointer of the given type without taking
    /// ownership. The null pointer wraps to the host null.
    pub fn wrap_boxed(&self, ty: TypeId, ptr: NativePtr) -> BridgeResult<HostValue> {
        if ptr.is_null() {
            return Ok(HostValue::Null);
        }
        let class = self.proxy_class(ty)?;
        if class.dispatch() != DispatchKind::Boxed {
            return Err(BridgeError::ConstructionFailed {
                message: format!("{} is not a boxed type", class.name()),
            });
        }
        Ok(HostValue::Object(boxed::adopt(&self.inner, &class, ptr)))
    }

    /// Run a class invocation. `ClassCall::Plain` — invoking the class
    /// without the construction protocol — always fails.
    pub fn construct(&self, class: &Rc<ProxyClass>, call: ClassCall) -> BridgeResult<ProxyRef> {
        match call {
            ClassCall::Plain => Err(BridgeError::NotAConstructCall),
            ClassCall::Adopt(ptr) => match class.dispatch() {
                DispatchKind::Boxed => Ok(boxed::adopt(&self.inner, class, ptr)),
                DispatchKind::Object => match object::wrap(&self.inner, ptr)? {
                    HostValue::Object(proxy) => Ok(proxy),
                    _ => Err(BridgeError::ConstructionFailed {
                        message: "cannot adopt the null pointer".to_string(),
                    }),
                },
                DispatchKind::Root => Err(BridgeError::ConstructionFailed {
                    message: "cannot instantiate the root class".to_string(),
                }),
            },
            ClassCall::WithProperties(props) => match class.dispatch() {
                DispatchKind::Object => object::construct_user(&self.inner, class, &props),
                _ => Err(BridgeError::ConstructionFailed {
                    message: format!("{} does not take named initializers", class.name()),
                }),
            },
            ClassCall::WithArguments(args) => match class.dispatch() {
                DispatchKind::Boxed => boxed::construct_user(&self.inner, class, &args),
                _ => Err(BridgeError::ConstructionFailed {
                    message: format!("{} takes named initializers", class.name()),
                }),
            },
        }
    }

    /// Dynamic property/member read.
    pub fn get(&self, proxy: &ProxyRef, name: &str) -> BridgeResult<HostValue> {
        match proxy.class().dispatch() {
            DispatchKind::Boxed => boxed::get(&self.inner, proxy, name),
            DispatchKind::Object | DispatchKind::Root => object::get(&self.inner, proxy, name),
        }
    }

    /// Dynamic property/member write.
    pub fn set(&self, proxy: &ProxyRef, name: &str, value: &HostValue) -> BridgeResult<()> {
        match proxy.class().dispatch() {
            DispatchKind::Boxed => boxed::set(proxy, name, value),
            DispatchKind::Object | DispatchKind::Root => {
                object::set(&self.inner, proxy, name, value)
            }
        }
    }

    /// Dynamic member existence query.
    pub fn has(&self, proxy: &ProxyRef, name: &str) -> BridgeResult<bool> {
        match proxy.class().dispatch() {
            DispatchKind::Boxed => boxed::has(proxy, name),
            DispatchKind::Object | DispatchKind::Root => object::has(&self.inner, proxy, name),
        }
    }

    /// Enumerate member names, host-translated and sorted.
    pub fn enumerate(&self, proxy: &ProxyRef) -> BridgeResult<Vec<String>> {
        match proxy.class().dispatch() {
            DispatchKind::Boxed => boxed::enumerate(proxy),
            DispatchKind::Object | DispatchKind::Root => object::enumerate(&self.inner, proxy),
        }
    }

    /// A static member of a class, discoverable without an instance:
    /// constructors and static methods under their host names, then
    /// declared constants.
    pub fn static_member(&self, class: &Rc<ProxyClass>, name: &str) -> Option<HostValue> {
        if let Some(method) = class.static_method(name) {
            return Some(HostValue::Callable(BoundMethod {
                method: method.clone(),
                receiver: None,
            }));
        }
        let info = class.info()?;
        let constant = info.find_constant(&naming::to_native_name(name))?;
        Some(self.inner.marshal.to_host(&constant.kind, &constant.value))
    }

    /// Call a bound native method with host arguments.
    pub fn invoke(&self, bound: &BoundMethod, args: &[HostValue]) -> BridgeResult<HostValue> {
        let ret = self
            .inner
            .invoker
            .call(&bound.method, bound.receiver, args)?;
        Ok(self.inner.marshal.to_host(&bound.method.ret, &ret))
    }

    /// Attach a callback to a signal of a wrapped object. Returns the
    /// handler identifier to pass to [`unsubscribe`](Bridge::unsubscribe).
    pub fn subscribe(
        &self,
        proxy: &ProxyRef,
        signal: &str,
        callback: HostCallback,
        after: bool,
    ) -> BridgeResult<u64> {
        signal::subscribe(&self.inner, proxy, signal, callback, after)
    }

    /// Detach a signal callback by handler identifier. Identifiers are
    /// not re-validated; passing an unknown one is undefined behavior at
    /// the native layer.
    pub fn unsubscribe(&self, proxy: &ProxyRef, handler: u64) -> BridgeResult<()> {
        signal::unsubscribe(&self.inner, proxy, handler)
    }

    /// Render the `[TypeName:ClassName 0x...]` description of a proxy.
    #[must_use]
    pub fn to_display_string(&self, proxy: &ProxyRef) -> String {
        object::display_string(proxy)
    }

    /// Run the cooperative collection pass: finalize every proxy that is
    /// unreachable from host code and not pinned by a native holder.
    /// Returns the number of instances finalized.
    pub fn collect(&self) -> usize {
        self.inner.heap.collect()
    }

    /// Number of live tracked proxies.
    #[must_use]
    pub fn live_proxies(&self) -> usize {
        self.inner.heap.len()
    }
}
