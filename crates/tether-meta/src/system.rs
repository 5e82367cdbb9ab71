//! The native object system contract.
//!
//! Everything the bridge does to native memory goes through
//! [`ObjectSystem`]: reference counting, toggle notification, the
//! attached-data word used for wrapper identity, generic object
//! construction, native property access, signal connection and boxed
//! memory management. The trait is object-safe; the bridge holds it as
//! `Rc<dyn ObjectSystem>`.

use crate::error::NativeError;
use crate::handle::{NativePtr, TypeId};
use crate::info::FieldInfo;

/// A value in the native argument representation.
///
/// The marshaling subsystem interprets these; the bridge only moves them
/// between collaborators.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeArg {
    /// No value.
    None,
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Floating point.
    Float(f64),
    /// String.
    Str(String),
    /// Pointer to native memory (objects, boxed values, opaque blocks).
    Ptr(NativePtr),
}

/// Callback installed on a native object's toggle reference.
///
/// Invoked with `(object, toggle_down)`: `toggle_down` is true when the
/// holder count just dropped to exactly one (the bridge's own reference),
/// false when it rose above one again.
pub type ToggleNotify = Box<dyn Fn(NativePtr, bool)>;

/// Closure connected to a native signal. Receives the emission arguments
/// in native form; conversion to host values happens inside.
pub type SignalClosure = Box<dyn Fn(&[NativeArg])>;

/// The manually reference-counted native object model.
///
/// No operation here takes internal locks; the whole system is driven from
/// the host runtime's single execution context. Operations may re-enter
/// the bridge (a signal firing during construction, a toggle flip during a
/// property set); implementations must deliver those callbacks on the same
/// call stack, not defer them.
pub trait ObjectSystem {
    /// Runtime type of a reference-counted object.
    fn type_of(&self, obj: NativePtr) -> TypeId;

    /// Take ownership of a reference: converts a floating reference into
    /// an owned one, otherwise increments the count.
    fn ref_sink(&self, obj: NativePtr);

    /// Release one reference.
    fn unref(&self, obj: NativePtr);

    /// Current holder count of an object.
    fn ref_count(&self, obj: NativePtr) -> usize;

    /// Install the toggle notification for an object. At most one per
    /// object; the bridge installs exactly one per wrapper.
    fn add_toggle_notify(&self, obj: NativePtr, notify: ToggleNotify);

    /// Remove a previously installed toggle notification.
    fn remove_toggle_notify(&self, obj: NativePtr);

    /// Read the opaque word attached to an object, if any.
    fn attached_data(&self, obj: NativePtr) -> Option<u64>;

    /// Attach an opaque word to an object, or clear it with `None`.
    fn set_attached_data(&self, obj: NativePtr, data: Option<u64>);

    /// Construct a new object of the given type through the generic
    /// construction entry point. `props` carries already-converted
    /// property values. The returned reference is owned by the caller.
    fn construct(
        &self,
        ty: TypeId,
        props: &[(String, NativeArg)],
    ) -> Result<NativePtr, NativeError>;

    /// Read a property through the native property-get mechanism.
    fn get_property(&self, obj: NativePtr, name: &str) -> Result<NativeArg, NativeError>;

    /// Write a property through the native property-set mechanism.
    fn set_property(&self, obj: NativePtr, name: &str, value: NativeArg)
        -> Result<(), NativeError>;

    /// Connect a closure to a signal. `signal` keeps any `::detail`
    /// suffix. Returns the handler identifier.
    fn connect(&self, obj: NativePtr, signal: &str, closure: SignalClosure, after: bool) -> u64;

    /// Disconnect a handler by identifier. Passing an identifier that was
    /// never returned by [`connect`](ObjectSystem::connect) is undefined
    /// behavior at the native layer.
    fn disconnect(&self, obj: NativePtr, handler: u64);

    /// Allocate a zero-initialized block of the given size.
    fn alloc_zeroed(&self, size: usize) -> NativePtr;

    /// Free a block of exactly `size` bytes previously obtained from
    /// [`alloc_zeroed`](ObjectSystem::alloc_zeroed).
    fn free_sized(&self, ptr: NativePtr, size: usize);

    /// Whether the native system can release instances of this type
    /// through its generic boxed deallocator.
    fn is_managed_boxed(&self, ty: TypeId) -> bool;

    /// Release a boxed instance through the generic deallocator.
    fn free_managed(&self, ty: TypeId, ptr: NativePtr);

    /// Read a flat field from a boxed instance.
    fn read_field(&self, ptr: NativePtr, field: &FieldInfo) -> Result<NativeArg, NativeError>;
}
