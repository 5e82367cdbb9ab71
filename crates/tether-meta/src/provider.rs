//! The reflection provider contract.

use std::sync::Arc;

use crate::handle::TypeId;
use crate::info::TypeInfo;

/// Read-only access to native type metadata.
///
/// The provider owns every descriptor; the bridge caches `Arc` handles but
/// never mutates them. The hierarchy helpers are layered on
/// [`describe_type`](Introspection::describe_type) so a provider only has
/// to implement the single lookup.
pub trait Introspection {
    /// Descriptor for a type identifier, or `None` when no metadata is
    /// loaded for it.
    fn describe_type(&self, id: TypeId) -> Option<Arc<TypeInfo>>;

    /// Descriptor of a type's parent class.
    fn parent(&self, info: &TypeInfo) -> Option<Arc<TypeInfo>> {
        info.parent.and_then(|id| self.describe_type(id))
    }

    /// Descriptors of the interfaces a type implements. Interfaces whose
    /// metadata is missing are skipped.
    fn interfaces(&self, info: &TypeInfo) -> Vec<Arc<TypeInfo>> {
        info.interfaces
            .iter()
            .filter_map(|id| self.describe_type(*id))
            .collect()
    }
}
