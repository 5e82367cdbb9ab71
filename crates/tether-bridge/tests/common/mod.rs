//! Mock collaborators for integration tests.
//!
//! `MockWorld` implements all four collaborator traits over plain maps:
//! a metadata table, reference-counted mock objects with real toggle
//! emission, a boxed allocator that records frees, a strict primitive
//! marshaler and a name-keyed invoker. One `Rc<MockWorld>` is handed to
//! the bridge as provider, object system, marshaler and invoker at once.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use tether_bridge::{naming, Bridge, ConvertError, HostValue, Invoker, Marshaler};
use tether_meta::{
    FieldInfo, Introspection, MethodInfo, NativeArg, NativeError, NativePtr, ObjectSystem,
    PropertyInfo, SignalClosure, SignalInfo, ToggleNotify, TypeId, TypeInfo, TypeKind, ValueKind,
};

type NativeHandler = Box<dyn Fn(&[HostValue]) -> Result<NativeArg, NativeError>>;

struct MockObject {
    ty: TypeId,
    refcount: usize,
    floating: bool,
    attached: Option<u64>,
    toggle: Option<Rc<dyn Fn(NativePtr, bool)>>,
    props: HashMap<String, NativeArg>,
    handlers: HashMap<u64, (String, Rc<dyn Fn(&[NativeArg])>)>,
}

/// The whole native side in one value.
pub struct MockWorld {
    types: RefCell<HashMap<TypeId, Arc<TypeInfo>>>,
    objects: RefCell<HashMap<NativePtr, MockObject>>,
    fields: RefCell<HashMap<(NativePtr, String), NativeArg>>,
    managed: RefCell<HashSet<TypeId>>,
    natives: RefCell<HashMap<String, NativeHandler>>,
    invoked: RefCell<Vec<String>>,
    allocations: RefCell<HashMap<NativePtr, usize>>,
    freed_sized: RefCell<Vec<(NativePtr, usize)>>,
    freed_managed: RefCell<Vec<(TypeId, NativePtr)>>,
    next_ptr: Cell<usize>,
    next_handler: Cell<u64>,
    fail_construct: Cell<bool>,
}

impl MockWorld {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            types: RefCell::new(HashMap::new()),
            objects: RefCell::new(HashMap::new()),
            fields: RefCell::new(HashMap::new()),
            managed: RefCell::new(HashSet::new()),
            natives: RefCell::new(HashMap::new()),
            invoked: RefCell::new(Vec::new()),
            allocations: RefCell::new(HashMap::new()),
            freed_sized: RefCell::new(Vec::new()),
            freed_managed: RefCell::new(Vec::new()),
            next_ptr: Cell::new(0x1000),
            next_handler: Cell::new(1),
            fail_construct: Cell::new(false),
        })
    }

    // ------------------------------------------------------------------
    // World building
    // ------------------------------------------------------------------

    pub fn add_type(&self, info: TypeInfo) {
        self.types.borrow_mut().insert(info.id, Arc::new(info));
    }

    pub fn mark_managed(&self, ty: TypeId) {
        self.managed.borrow_mut().insert(ty);
    }

    /// Register a native implementation under a method name.
    pub fn register_native(
        &self,
        name: &str,
        handler: impl Fn(&[HostValue]) -> Result<NativeArg, NativeError> + 'static,
    ) {
        self.natives
            .borrow_mut()
            .insert(name.to_string(), Box::new(handler));
    }

    /// Create a native object holding one floating reference, the
    /// convention for objects produced for adoption.
    pub fn new_floating_object(&self, ty: TypeId) -> NativePtr {
        let ptr = self.fresh_ptr();
        self.objects.borrow_mut().insert(
            ptr,
            MockObject {
                ty,
                refcount: 1,
                floating: true,
                attached: None,
                toggle: None,
                props: HashMap::new(),
                handlers: HashMap::new(),
            },
        );
        ptr
    }

    /// Make the next generic object construction fail natively.
    pub fn fail_next_construct(&self) {
        self.fail_construct.set(true);
    }

    /// Seed a boxed field value readable through `read_field`.
    pub fn set_field(&self, ptr: NativePtr, name: &str, value: NativeArg) {
        self.fields
            .borrow_mut()
            .insert((ptr, name.to_string()), value);
    }

    /// Seed a property value on a mock object.
    pub fn set_object_property(&self, ptr: NativePtr, name: &str, value: NativeArg) {
        if let Some(obj) = self.objects.borrow_mut().get_mut(&ptr) {
            obj.props.insert(canonical(name), value);
        }
    }

    // ------------------------------------------------------------------
    // Native-side actors
    // ------------------------------------------------------------------

    /// A native holder acquires a reference.
    pub fn external_ref(&self, ptr: NativePtr) {
        self.change_refcount(ptr, 1);
    }

    /// A native holder releases a reference.
    pub fn external_unref(&self, ptr: NativePtr) {
        self.change_refcount(ptr, -1);
    }

    /// Emit a signal with the given bare name.
    pub fn emit(&self, ptr: NativePtr, signal: &str, args: &[NativeArg]) {
        let handlers: Vec<Rc<dyn Fn(&[NativeArg])>> = {
            let objects = self.objects.borrow();
            match objects.get(&ptr) {
                Some(obj) => obj
                    .handlers
                    .values()
                    .filter(|(name, _)| naming::strip_detail(name) == signal)
                    .map(|(_, closure)| Rc::clone(closure))
                    .collect(),
                None => Vec::new(),
            }
        };
        // Closures run outside the borrow: they may re-enter the world.
        for handler in handlers {
            handler(args);
        }
    }

    // ------------------------------------------------------------------
    // Assertion helpers
    // ------------------------------------------------------------------

    pub fn is_alive(&self, ptr: NativePtr) -> bool {
        self.objects.borrow().contains_key(&ptr)
    }

    pub fn refcount(&self, ptr: NativePtr) -> usize {
        self.objects.borrow().get(&ptr).map_or(0, |o| o.refcount)
    }

    pub fn attached(&self, ptr: NativePtr) -> Option<u64> {
        self.objects.borrow().get(&ptr).and_then(|o| o.attached)
    }

    pub fn handler_count(&self, ptr: NativePtr) -> usize {
        self.objects.borrow().get(&ptr).map_or(0, |o| o.handlers.len())
    }

    pub fn invocations(&self) -> Vec<String> {
        self.invoked.borrow().clone()
    }

    pub fn freed_sized(&self) -> Vec<(NativePtr, usize)> {
        self.freed_sized.borrow().clone()
    }

    pub fn freed_managed(&self) -> Vec<(TypeId, NativePtr)> {
        self.freed_managed.borrow().clone()
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn fresh_ptr(&self) -> NativePtr {
        let ptr = self.next_ptr.get();
        self.next_ptr.set(ptr + 0x10);
        NativePtr(ptr)
    }

    fn change_refcount(&self, ptr: NativePtr, delta: isize) {
        let notify = {
            let mut objects = self.objects.borrow_mut();
            let Some(obj) = objects.get_mut(&ptr) else {
                return;
            };
            let before = obj.refcount;
            let after = (before as isize + delta) as usize;
            obj.refcount = after;
            let toggle = obj.toggle.clone();
            if after == 0 {
                objects.remove(&ptr);
                None
            } else if (before == 1 && after == 2) || (before == 2 && after == 1) {
                toggle.map(|t| (t, after == 1))
            } else {
                None
            }
        };
        // Toggle fires outside the borrow: it re-enters the bridge.
        if let Some((toggle, down)) = notify {
            toggle(ptr, down);
        }
    }
}

impl Introspection for MockWorld {
    fn describe_type(&self, id: TypeId) -> Option<Arc<TypeInfo>> {
        self.types.borrow().get(&id).cloned()
    }
}

impl ObjectSystem for MockWorld {
    fn type_of(&self, obj: NativePtr) -> TypeId {
        self.objects
            .borrow()
            .get(&obj)
            .map_or(TypeId::NONE, |o| o.ty)
    }

    fn ref_sink(&self, obj: NativePtr) {
        let mut objects = self.objects.borrow_mut();
        if let Some(object) = objects.get_mut(&obj) {
            if object.floating {
                object.floating = false;
            } else {
                // Plain increment; the 1->2 transition of interest only
                // happens after a toggle notify is installed, which is
                // never the case during ref_sink.
                object.refcount += 1;
            }
        }
    }

    fn unref(&self, obj: NativePtr) {
        self.change_refcount(obj, -1);
    }

    fn ref_count(&self, obj: NativePtr) -> usize {
        self.refcount(obj)
    }

    fn add_toggle_notify(&self, obj: NativePtr, notify: ToggleNotify) {
        if let Some(object) = self.objects.borrow_mut().get_mut(&obj) {
            object.toggle = Some(Rc::from(notify));
        }
    }

    fn remove_toggle_notify(&self, obj: NativePtr) {
        if let Some(object) = self.objects.borrow_mut().get_mut(&obj) {
            object.toggle = None;
        }
    }

    fn attached_data(&self, obj: NativePtr) -> Option<u64> {
        self.attached(obj)
    }

    fn set_attached_data(&self, obj: NativePtr, data: Option<u64>) {
        if let Some(object) = self.objects.borrow_mut().get_mut(&obj) {
            object.attached = data;
        }
    }

    fn construct(
        &self,
        ty: TypeId,
        props: &[(String, NativeArg)],
    ) -> Result<NativePtr, NativeError> {
        if self.fail_construct.replace(false) {
            return Err(NativeError::Message("construction vetoed".to_string()));
        }
        if self.types.borrow().get(&ty).is_none() {
            return Err(NativeError::Message(format!("unknown type {ty}")));
        }
        let ptr = self.new_floating_object(ty);
        let mut objects = self.objects.borrow_mut();
        let object = objects.get_mut(&ptr).expect("just inserted");
        for (name, value) in props {
            object.props.insert(canonical(name), value.clone());
        }
        Ok(ptr)
    }

    fn get_property(&self, obj: NativePtr, name: &str) -> Result<NativeArg, NativeError> {
        self.objects
            .borrow()
            .get(&obj)
            .and_then(|o| o.props.get(&canonical(name)).cloned())
            .ok_or_else(|| NativeError::Message(format!("no value for property {name}")))
    }

    fn set_property(
        &self,
        obj: NativePtr,
        name: &str,
        value: NativeArg,
    ) -> Result<(), NativeError> {
        let mut objects = self.objects.borrow_mut();
        let object = objects
            .get_mut(&obj)
            .ok_or_else(|| NativeError::Message("object destroyed".to_string()))?;
        object.props.insert(canonical(name), value);
        Ok(())
    }

    fn connect(&self, obj: NativePtr, signal: &str, closure: SignalClosure, after: bool) -> u64 {
        let _ = after;
        let id = self.next_handler.get();
        self.next_handler.set(id + 1);
        if let Some(object) = self.objects.borrow_mut().get_mut(&obj) {
            object
                .handlers
                .insert(id, (signal.to_string(), Rc::from(closure)));
        }
        id
    }

    fn disconnect(&self, obj: NativePtr, handler: u64) {
        if let Some(object) = self.objects.borrow_mut().get_mut(&obj) {
            object.handlers.remove(&handler);
        }
    }

    fn alloc_zeroed(&self, size: usize) -> NativePtr {
        let ptr = self.fresh_ptr();
        self.allocations.borrow_mut().insert(ptr, size);
        ptr
    }

    fn free_sized(&self, ptr: NativePtr, size: usize) {
        self.allocations.borrow_mut().remove(&ptr);
        self.freed_sized.borrow_mut().push((ptr, size));
    }

    fn is_managed_boxed(&self, ty: TypeId) -> bool {
        self.managed.borrow().contains(&ty)
    }

    fn free_managed(&self, ty: TypeId, ptr: NativePtr) {
        self.freed_managed.borrow_mut().push((ty, ptr));
    }

    fn read_field(&self, ptr: NativePtr, field: &FieldInfo) -> Result<NativeArg, NativeError> {
        self.fields
            .borrow()
            .get(&(ptr, field.name.clone()))
            .cloned()
            .ok_or_else(|| NativeError::ComplexField {
                name: field.name.clone(),
            })
    }
}

impl Marshaler for MockWorld {
    fn to_host(&self, kind: &ValueKind, arg: &NativeArg) -> HostValue {
        match (kind, arg) {
            (ValueKind::Bool, NativeArg::Bool(b)) => HostValue::Bool(*b),
            (ValueKind::Int, NativeArg::Int(i)) => HostValue::Int(*i),
            (ValueKind::Float, NativeArg::Float(f)) => HostValue::Float(*f),
            (ValueKind::Str, NativeArg::Str(s)) => HostValue::Str(s.clone()),
            _ => HostValue::Undefined,
        }
    }

    fn to_native(&self, kind: &ValueKind, value: &HostValue) -> Result<NativeArg, ConvertError> {
        match (kind, value) {
            (ValueKind::Bool, HostValue::Bool(b)) => Ok(NativeArg::Bool(*b)),
            (ValueKind::Int, HostValue::Int(i)) => Ok(NativeArg::Int(*i)),
            (ValueKind::Float, HostValue::Float(f)) => Ok(NativeArg::Float(*f)),
            (ValueKind::Str, HostValue::Str(s)) => Ok(NativeArg::Str(s.clone())),
            (expected, got) => Err(ConvertError(format!(
                "expected {expected:?}, got {got:?}"
            ))),
        }
    }
}

impl Invoker for MockWorld {
    fn call(
        &self,
        method: &MethodInfo,
        _receiver: Option<NativePtr>,
        args: &[HostValue],
    ) -> Result<NativeArg, NativeError> {
        self.invoked.borrow_mut().push(method.name.clone());
        let natives = self.natives.borrow();
        match natives.get(&method.name) {
            Some(handler) => handler(args),
            None => Err(NativeError::Message(format!(
                "no native implementation for {}",
                method.name
            ))),
        }
    }
}

fn canonical(name: &str) -> String {
    name.replace('-', "_")
}

// ----------------------------------------------------------------------
// Descriptor builders
// ----------------------------------------------------------------------

pub fn obj_type(id: u64, name: &str) -> TypeInfo {
    TypeInfo::new(TypeId(id), "Demo", name, TypeKind::Object)
}

pub fn iface_type(id: u64, name: &str) -> TypeInfo {
    TypeInfo::new(TypeId(id), "Demo", name, TypeKind::Interface)
}

pub fn struct_type(id: u64, name: &str, size: usize) -> TypeInfo {
    let mut info = TypeInfo::new(TypeId(id), "Demo", name, TypeKind::Struct);
    info.size = size;
    info
}

pub fn union_type(id: u64, name: &str, size: usize) -> TypeInfo {
    let mut info = TypeInfo::new(TypeId(id), "Demo", name, TypeKind::Union);
    info.size = size;
    info
}

pub fn prop(name: &str, kind: ValueKind, readable: bool, writable: bool) -> PropertyInfo {
    PropertyInfo {
        name: name.to_string(),
        kind,
        readable,
        writable,
    }
}

pub fn method(name: &str, n_args: usize, ret: ValueKind) -> MethodInfo {
    MethodInfo {
        name: name.to_string(),
        n_args,
        ret,
        is_constructor: false,
        is_static: false,
    }
}

pub fn ctor(name: &str, n_args: usize, ret: ValueKind) -> MethodInfo {
    MethodInfo {
        is_constructor: true,
        ..method(name, n_args, ret)
    }
}

pub fn field(name: &str, kind: ValueKind, flat: bool) -> FieldInfo {
    FieldInfo {
        name: name.to_string(),
        kind,
        flat,
    }
}

pub fn sig(name: &str, params: Vec<ValueKind>) -> SignalInfo {
    SignalInfo {
        name: name.to_string(),
        params,
    }
}

/// A bridge wired to the world four ways.
pub fn bridge_over(world: &Rc<MockWorld>) -> Bridge {
    Bridge::new(
        Rc::clone(world) as Rc<dyn Introspection>,
        Rc::clone(world) as Rc<dyn ObjectSystem>,
        Rc::clone(world) as Rc<dyn Marshaler>,
        Rc::clone(world) as Rc<dyn Invoker>,
    )
}
