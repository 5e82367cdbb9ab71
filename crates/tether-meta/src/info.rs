//! Reflection descriptors.
//!
//! A [`TypeInfo`] is the complete runtime description of one native type:
//! its kind, hierarchy links and member lists. Descriptors are produced by
//! the reflection provider, shared as `Arc<TypeInfo>`, and never mutated by
//! the bridge.
//!
//! Member names are stored in the native convention (lowercase words joined
//! by `_`, properties and signals may use `-`). The native system treats
//! `-` and `_` as equivalent in names; the `find_*` helpers below honor
//! that canonical-name rule.

use crate::handle::TypeId;
use crate::system::NativeArg;

/// Category of a native type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// Copy-semantics aggregate without reference counting.
    Struct,
    /// Copy-semantics untagged union.
    Union,
    /// Reference-counted object class with inheritance and signals.
    Object,
    /// Abstract interface implemented by object classes.
    Interface,
}

impl TypeKind {
    /// Whether values of this kind are boxed aggregates (struct or union).
    #[must_use]
    pub fn is_boxed(self) -> bool {
        matches!(self, TypeKind::Struct | TypeKind::Union)
    }
}

/// Category of a field, property, parameter or return value.
///
/// The bridge treats these as opaque tags handed to the marshaler; only
/// `Object`/`Boxed` carry structure the bridge itself consults (the wrapped
/// type id).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    /// No value (void returns).
    Void,
    /// Boolean.
    Bool,
    /// Integer of any native width.
    Int,
    /// Floating point of any native width.
    Float,
    /// String.
    Str,
    /// Reference-counted object instance of the given type.
    Object(TypeId),
    /// Boxed aggregate instance of the given type.
    Boxed(TypeId),
    /// Anything the bridge does not interpret (callbacks, arrays, ...).
    Opaque,
}

/// A field of a struct or union.
#[derive(Debug, Clone)]
pub struct FieldInfo {
    /// Field name, native convention.
    pub name: String,
    /// Value category of the field.
    pub kind: ValueKind,
    /// Whether the field is a flat scalar readable in place. Non-flat
    /// fields (nested aggregates, arrays) cannot be read directly.
    pub flat: bool,
}

/// A declared property of an object class or interface.
#[derive(Debug, Clone)]
pub struct PropertyInfo {
    /// Property name, native convention.
    pub name: String,
    /// Value category of the property.
    pub kind: ValueKind,
    /// Whether the property may be read.
    pub readable: bool,
    /// Whether the property may be written.
    pub writable: bool,
}

/// A method of any native type.
#[derive(Debug, Clone)]
pub struct MethodInfo {
    /// Method name, native convention.
    pub name: String,
    /// Declared argument count, excluding the receiver.
    pub n_args: usize,
    /// Return value category.
    pub ret: ValueKind,
    /// Whether the native system flags this method as a constructor.
    pub is_constructor: bool,
    /// Whether the method is callable without an instance.
    pub is_static: bool,
}

impl MethodInfo {
    /// Whether this is a constructor taking no arguments.
    #[must_use]
    pub fn is_zero_arg_constructor(&self) -> bool {
        self.is_constructor && self.n_args == 0
    }
}

/// A signal declared on an object class or interface.
#[derive(Debug, Clone)]
pub struct SignalInfo {
    /// Signal name, native convention (no detail suffix).
    pub name: String,
    /// Value categories of the emission arguments.
    pub params: Vec<ValueKind>,
}

/// A constant exposed by an object class or interface.
#[derive(Debug, Clone)]
pub struct ConstantInfo {
    /// Constant name, native convention.
    pub name: String,
    /// Value category of the constant.
    pub kind: ValueKind,
    /// The constant's value in native argument form.
    pub value: NativeArg,
}

/// Complete runtime description of one native type.
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// The type's identifier.
    pub id: TypeId,
    /// Namespace the type was loaded from.
    pub namespace: String,
    /// Type name within the namespace.
    pub name: String,
    /// Type category.
    pub kind: TypeKind,
    /// Instance size in bytes for value types; 0 when unknown.
    pub size: usize,
    /// Parent type for object classes; `None` for hierarchy roots and
    /// non-object kinds.
    pub parent: Option<TypeId>,
    /// Interfaces implemented by this type.
    pub interfaces: Vec<TypeId>,
    /// Declared fields (value types).
    pub fields: Vec<FieldInfo>,
    /// Declared properties (object types and interfaces).
    pub properties: Vec<PropertyInfo>,
    /// Declared methods.
    pub methods: Vec<MethodInfo>,
    /// Declared signals (object types and interfaces).
    pub signals: Vec<SignalInfo>,
    /// Declared constants.
    pub constants: Vec<ConstantInfo>,
}

impl TypeInfo {
    /// Create an empty descriptor of the given identity and kind.
    pub fn new(
        id: TypeId,
        namespace: impl Into<String>,
        name: impl Into<String>,
        kind: TypeKind,
    ) -> Self {
        Self {
            id,
            namespace: namespace.into(),
            name: name.into(),
            kind,
            size: 0,
            parent: None,
            interfaces: Vec::new(),
            fields: Vec::new(),
            properties: Vec::new(),
            methods: Vec::new(),
            signals: Vec::new(),
            constants: Vec::new(),
        }
    }

    /// Qualified `Namespace.Name` form used in messages.
    #[must_use]
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.namespace, self.name)
    }

    /// Find a declared field by canonical name.
    pub fn find_field(&self, name: &str) -> Option<&FieldInfo> {
        self.fields.iter().find(|f| canonical_eq(&f.name, name))
    }

    /// Find a declared property by canonical name.
    pub fn find_property(&self, name: &str) -> Option<&PropertyInfo> {
        self.properties.iter().find(|p| canonical_eq(&p.name, name))
    }

    /// Find a declared method by canonical name.
    pub fn find_method(&self, name: &str) -> Option<&MethodInfo> {
        self.methods.iter().find(|m| canonical_eq(&m.name, name))
    }

    /// Find a declared signal by canonical name.
    pub fn find_signal(&self, name: &str) -> Option<&SignalInfo> {
        self.signals.iter().find(|s| canonical_eq(&s.name, name))
    }

    /// Find a declared constant by canonical name.
    pub fn find_constant(&self, name: &str) -> Option<&ConstantInfo> {
        self.constants.iter().find(|c| canonical_eq(&c.name, name))
    }
}

/// Canonical name comparison: `-` and `_` are interchangeable.
#[must_use]
pub(crate) fn canonical_eq(a: &str, b: &str) -> bool {
    a.len() == b.len()
        && a.bytes().zip(b.bytes()).all(|(x, y)| {
            let x = if x == b'-' { b'_' } else { x };
            let y = if y == b'-' { b'_' } else { y };
            x == y
        })
}
