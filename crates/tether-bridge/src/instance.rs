//! Proxy instances.
//!
//! A [`ProxyObject`] is the host-side stand-in for one native value. It
//! holds exactly one native pointer in a single internal slot, a link to
//! its generated class, and an expando table standing in for the host
//! runtime's default own-property mechanism (the place fallback reads and
//! writes land).

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use tether_meta::NativePtr;

use crate::class::ProxyClass;
use crate::value::HostValue;

/// Shared handle to a proxy instance. Host identity is `Rc` identity.
pub type ProxyRef = Rc<ProxyObject>;

/// Ownership category of an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceKind {
    /// Wraps a reference-counted native object; lifetime reconciled
    /// through the toggle automaton.
    Object,
    /// Wraps a boxed aggregate. `size` is the byte count to free on
    /// destruction; 0 means ownership lies elsewhere (constructor-owned
    /// managed types are released through the generic deallocator).
    Boxed {
        /// Recorded allocation size.
        size: usize,
    },
}

/// A host proxy for one native value.
pub struct ProxyObject {
    class: Rc<ProxyClass>,
    native: NativePtr,
    kind: InstanceKind,
    id: u64,
    expando: RefCell<FxHashMap<String, HostValue>>,
}

impl ProxyObject {
    pub(crate) fn new(class: Rc<ProxyClass>, native: NativePtr, kind: InstanceKind, id: u64) -> Self {
        Self {
            class,
            native,
            kind,
            id,
            expando: RefCell::new(FxHashMap::default()),
        }
    }

    /// The generated class this instance was constructed from.
    #[must_use]
    pub fn class(&self) -> &Rc<ProxyClass> {
        &self.class
    }

    /// The wrapped native pointer.
    #[must_use]
    pub fn native(&self) -> NativePtr {
        self.native
    }

    /// Ownership category.
    #[must_use]
    pub fn kind(&self) -> InstanceKind {
        self.kind
    }

    /// Heap identifier of this instance.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    pub(crate) fn expando_get(&self, name: &str) -> Option<HostValue> {
        self.expando.borrow().get(name).cloned()
    }

    pub(crate) fn expando_set(&self, name: &str, value: HostValue) {
        self.expando.borrow_mut().insert(name.to_string(), value);
    }

    pub(crate) fn expando_has(&self, name: &str) -> bool {
        self.expando.borrow().contains_key(name)
    }
}

impl std::fmt::Debug for ProxyObject {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProxyObject")
            .field("class", &self.class.name())
            .field("native", &self.native)
            .field("kind", &self.kind)
            .field("id", &self.id)
            .finish()
    }
}
