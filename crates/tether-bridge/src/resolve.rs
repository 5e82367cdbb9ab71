//! Member resolution over the runtime-discovered hierarchy.
//!
//! The native class/interface graph is only known through the reflection
//! provider, so members are resolved by traversal: at each level of the
//! parent chain the type's own declarations are searched first, then its
//! interfaces, before moving to the parent. Properties are resolved over
//! the whole chain before methods are considered anywhere, so a property
//! shadows a same-named method at every depth.

use std::collections::BTreeSet;
use std::sync::Arc;

use tether_meta::{Introspection, MethodInfo, PropertyInfo, SignalInfo, TypeInfo};

use crate::naming;

/// The parent chain of a type, starting at the type itself. Types whose
/// parent metadata is missing end the walk.
pub(crate) fn ancestry(
    provider: &dyn Introspection,
    info: &Arc<TypeInfo>,
) -> Vec<Arc<TypeInfo>> {
    let mut chain = vec![Arc::clone(info)];
    let mut current = Arc::clone(info);
    while let Some(parent) = provider.parent(&current) {
        chain.push(Arc::clone(&parent));
        current = parent;
    }
    chain
}

/// Find a declared property: own, then interfaces, then the parent chain.
pub(crate) fn find_property_deep(
    provider: &dyn Introspection,
    info: &Arc<TypeInfo>,
    native_name: &str,
) -> Option<PropertyInfo> {
    for level in ancestry(provider, info) {
        if let Some(prop) = level.find_property(native_name) {
            return Some(prop.clone());
        }
        for iface in provider.interfaces(&level) {
            if let Some(prop) = iface.find_property(native_name) {
                return Some(prop.clone());
            }
        }
    }
    None
}

/// Find a declared method: own, then interfaces, then the parent chain.
pub(crate) fn find_method_deep(
    provider: &dyn Introspection,
    info: &Arc<TypeInfo>,
    native_name: &str,
) -> Option<MethodInfo> {
    for level in ancestry(provider, info) {
        if let Some(method) = level.find_method(native_name) {
            return Some(method.clone());
        }
        for iface in provider.interfaces(&level) {
            if let Some(method) = iface.find_method(native_name) {
                return Some(method.clone());
            }
        }
    }
    None
}

/// Find a declared signal: the concrete class, then its interfaces, then
/// recursively the parent chain. First match wins; shadowed declarations
/// deeper in the graph are unreachable.
pub(crate) fn find_signal_deep(
    provider: &dyn Introspection,
    info: &Arc<TypeInfo>,
    bare_name: &str,
) -> Option<SignalInfo> {
    for level in ancestry(provider, info) {
        if let Some(signal) = level.find_signal(bare_name) {
            return Some(signal.clone());
        }
        for iface in provider.interfaces(&level) {
            if let Some(signal) = iface.find_signal(bare_name) {
                return Some(signal.clone());
            }
        }
    }
    None
}

/// Host names of every property, method and constant on the type, its
/// interfaces and the whole parent chain. Deduplicated by translated name
/// and sorted, so repeated enumeration is deterministic.
pub(crate) fn enumerate_object_members(
    provider: &dyn Introspection,
    info: &Arc<TypeInfo>,
) -> Vec<String> {
    let mut names = BTreeSet::new();
    for level in ancestry(provider, info) {
        collect_level(&level, &mut names);
        for iface in provider.interfaces(&level) {
            collect_level(&iface, &mut names);
        }
    }
    names.into_iter().collect()
}

fn collect_level(info: &TypeInfo, names: &mut BTreeSet<String>) {
    for prop in &info.properties {
        names.insert(naming::to_host_name(&prop.name));
    }
    for method in &info.methods {
        names.insert(naming::to_host_name(&method.name));
    }
    for constant in &info.constants {
        names.insert(naming::to_host_name(&constant.name));
    }
}

/// Host names of every method and field of a boxed type, sorted.
pub(crate) fn enumerate_boxed_members(info: &TypeInfo) -> Vec<String> {
    let mut names = BTreeSet::new();
    for method in &info.methods {
        names.insert(naming::to_host_name(&method.name));
    }
    for field in &info.fields {
        names.insert(naming::to_host_name(&field.name));
    }
    names.into_iter().collect()
}
