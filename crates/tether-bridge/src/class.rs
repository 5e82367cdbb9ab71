//! Proxy classes and the process-scoped class registry.
//!
//! One [`ProxyClass`] exists per native type identifier for the process
//! lifetime; lookups are cache-or-create. Object classes chain to their
//! native parent's class, or to the shared root class exposing
//! `subscribe`/`unsubscribe`/`toDisplayString` when the hierarchy ends.
//! Boxed classes stand alone. The registry also caches the boxed
//! constructor chosen for each type, since the search is deterministic.

use std::rc::Rc;
use std::sync::Arc;

use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use tether_meta::{Introspection, MethodInfo, TypeId, TypeInfo, TypeKind};

use crate::error::{BridgeError, BridgeResult};
use crate::naming;

/// Member-dispatch strategy attached to a generated class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchKind {
    /// The shared root class; never instantiated.
    Root,
    /// Field/method dispatch for boxed aggregates.
    Boxed,
    /// Property/method/signal dispatch for object types and interfaces.
    Object,
}

/// A host-runtime class generated from one native type descriptor.
#[derive(Debug)]
pub struct ProxyClass {
    info: Option<Arc<TypeInfo>>,
    parent: Option<Rc<ProxyClass>>,
    dispatch: DispatchKind,
    name: String,
    statics: Vec<(String, MethodInfo)>,
}

impl ProxyClass {
    fn root() -> Self {
        Self {
            info: None,
            parent: None,
            dispatch: DispatchKind::Root,
            name: "NativeObject".to_string(),
            statics: Vec::new(),
        }
    }

    fn from_info(info: Arc<TypeInfo>, parent: Option<Rc<ProxyClass>>) -> Self {
        let dispatch = if info.kind.is_boxed() {
            DispatchKind::Boxed
        } else {
            DispatchKind::Object
        };
        // Constructors and static-flagged methods are reachable without an
        // instance, under their host names.
        let statics = info
            .methods
            .iter()
            .filter(|m| m.is_static || m.is_constructor)
            .map(|m| (naming::to_host_name(&m.name), m.clone()))
            .collect();
        Self {
            name: info.name.clone(),
            info: Some(info),
            parent,
            dispatch,
            statics,
        }
    }

    /// The descriptor this class was generated from; `None` for the root.
    #[must_use]
    pub fn info(&self) -> Option<&Arc<TypeInfo>> {
        self.info.as_ref()
    }

    /// Native type identifier, or `None` for the root class.
    #[must_use]
    pub fn type_id(&self) -> Option<TypeId> {
        self.info.as_ref().map(|i| i.id)
    }

    /// Parent class in the generated chain.
    #[must_use]
    pub fn parent(&self) -> Option<&Rc<ProxyClass>> {
        self.parent.as_ref()
    }

    /// Dispatch strategy.
    #[must_use]
    pub fn dispatch(&self) -> DispatchKind {
        self.dispatch
    }

    /// Display name of the class.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this is the shared root class.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.dispatch == DispatchKind::Root
    }

    /// Static member by host-convention name.
    #[must_use]
    pub fn static_method(&self, host_name: &str) -> Option<&MethodInfo> {
        self.statics
            .iter()
            .find(|(name, _)| name == host_name)
            .map(|(_, m)| m)
    }

    /// Host names of the static members, in declaration order.
    pub fn static_names(&self) -> impl Iterator<Item = &str> {
        self.statics.iter().map(|(name, _)| name.as_str())
    }
}

/// Process-scoped registry of generated classes and cached boxed
/// constructors. Populated on demand, cleared per type via
/// [`invalidate`](ClassRegistry::invalidate) when a type's metadata is
/// unloaded.
pub struct ClassRegistry {
    classes: Mutex<FxHashMap<TypeId, Rc<ProxyClass>>>,
    ctors: Mutex<FxHashMap<TypeId, Option<MethodInfo>>>,
    root: Rc<ProxyClass>,
}

impl ClassRegistry {
    /// Create an empty registry with a fresh root class.
    pub fn new() -> Self {
        Self {
            classes: Mutex::new(FxHashMap::default()),
            ctors: Mutex::new(FxHashMap::default()),
            root: Rc::new(ProxyClass::root()),
        }
    }

    /// The shared root class.
    #[must_use]
    pub fn root(&self) -> Rc<ProxyClass> {
        Rc::clone(&self.root)
    }

    /// The class for a type identifier, generating (and caching) it on
    /// first use. Fails with [`BridgeError::MetadataMissing`] when no
    /// descriptor is loaded; the cache is left untouched on failure.
    pub fn get_or_create(
        &self,
        provider: &dyn Introspection,
        id: TypeId,
    ) -> BridgeResult<Rc<ProxyClass>> {
        if let Some(class) = self.classes.lock().get(&id) {
            return Ok(Rc::clone(class));
        }

        let info = provider
            .describe_type(id)
            .ok_or(BridgeError::MetadataMissing { type_id: id })?;

        // Object classes mirror the native chain; the recursion is bounded
        // by the hierarchy depth and takes the lock only in short scopes.
        let parent = match info.kind {
            TypeKind::Object => match info.parent {
                Some(parent_id) => Some(self.get_or_create(provider, parent_id)?),
                None => Some(self.root()),
            },
            TypeKind::Interface => Some(self.root()),
            TypeKind::Struct | TypeKind::Union => None,
        };

        let class = Rc::new(ProxyClass::from_info(info, parent));
        let mut classes = self.classes.lock();
        // A re-entrant generation may have won; the first insert stands.
        Ok(Rc::clone(classes.entry(id).or_insert(class)))
    }

    /// The boxed constructor chosen for a type, searching in precedence
    /// order: a zero-argument constructor-flagged method, a method named
    /// `new`, then any constructor-flagged method in declaration order.
    /// The result (including a miss) is cached per type.
    pub fn boxed_constructor(&self, info: &TypeInfo) -> Option<MethodInfo> {
        if let Some(cached) = self.ctors.lock().get(&info.id) {
            return cached.clone();
        }

        let found = info
            .methods
            .iter()
            .find(|m| m.is_zero_arg_constructor())
            .or_else(|| info.find_method("new"))
            .or_else(|| info.methods.iter().find(|m| m.is_constructor))
            .cloned();

        self.ctors.lock().insert(info.id, found.clone());
        found
    }

    /// Drop the cached class and constructor for a type whose metadata is
    /// being unloaded. The next lookup regenerates from the provider.
    pub fn invalidate(&self, id: TypeId) {
        self.classes.lock().remove(&id);
        self.ctors.lock().remove(&id);
    }

    /// Number of generated classes currently cached.
    pub fn len(&self) -> usize {
        self.classes.lock().len()
    }

    /// Whether no classes are cached.
    pub fn is_empty(&self) -> bool {
        self.classes.lock().is_empty()
    }
}

impl Default for ClassRegistry {
    fn default() -> Self {
        Self::new()
    }
}
