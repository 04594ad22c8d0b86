#![deny(missing_docs)]

//! # Capability Lookups
//!
//! - [`CapabilityCache`]: memoized "does this type provide capability X" answers.
//! - [`ServiceRegistry`]: whether a type is resolved from the service container.
//!
//! The cache is shared by every endpoint described during startup, possibly
//! from several threads. Entries are keyed by the whole descriptor, so two
//! types that share a name but declare different capabilities never collide.
//! Each key is written at most once with a value that only depends on the key.

use crate::signature::{Capability, ParameterDescriptor, TypeDescriptor, TypeShape};
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// Thread-safe memo of capability lookups, keyed by type identity.
#[derive(Debug, Default)]
pub struct CapabilityCache {
    parseable_types: HashSet<String>,
    parse: RwLock<HashMap<TypeDescriptor, bool>>,
    async_bind: RwLock<HashMap<TypeDescriptor, bool>>,
}

impl CapabilityCache {
    /// Empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache that also treats the given type names as parseable from a string.
    pub fn with_parseable_types<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            parseable_types: names.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Text, primitives, declared `FromStr` types and their `Option<_>` wrappers.
    pub fn has_parse_capability(&self, ty: &TypeDescriptor) -> bool {
        memoize(&self.parse, ty, || self.compute_parse(ty))
    }

    /// Whether the parameter's type binds itself from the request.
    pub fn has_async_bind_capability(&self, parameter: &ParameterDescriptor) -> bool {
        let ty = parameter.ty.without_nullable();
        memoize(&self.async_bind, ty, || {
            ty.has_capability(Capability::AsyncBind)
        })
    }

    /// Number of memoized entries across both lookups.
    pub fn len(&self) -> usize {
        self.parse.read().len() + self.async_bind.read().len()
    }

    /// `true` before the first lookup.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn compute_parse(&self, ty: &TypeDescriptor) -> bool {
        match ty.shape() {
            TypeShape::Text | TypeShape::Primitive(_) => true,
            TypeShape::Nullable(inner) => self.compute_parse(inner),
            TypeShape::Named => {
                ty.has_capability(Capability::ParseFromStr)
                    || self.parseable_types.contains(ty.name())
            }
            _ => false,
        }
    }
}

fn memoize(
    map: &RwLock<HashMap<TypeDescriptor, bool>>,
    key: &TypeDescriptor,
    compute: impl FnOnce() -> bool,
) -> bool {
    if let Some(hit) = map.read().get(key) {
        return *hit;
    }
    let value = compute();
    *map.write().entry(key.clone()).or_insert(value)
}

/// Answers whether a type is a registered service.
pub trait ServiceRegistry: Send + Sync {
    /// `true` when the container can provide `ty`.
    fn is_registered_service(&self, ty: &TypeDescriptor) -> bool;
}

/// Registry that knows no services.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoServices;

impl ServiceRegistry for NoServices {
    fn is_registered_service(&self, _ty: &TypeDescriptor) -> bool {
        false
    }
}

/// Registry backed by a set of type names.
#[derive(Debug, Clone, Default)]
pub struct RegisteredServices {
    names: HashSet<String>,
}

impl RegisteredServices {
    /// Registers the given type names.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }
}

impl ServiceRegistry for RegisteredServices {
    fn is_registered_service(&self, ty: &TypeDescriptor) -> bool {
        self.names.contains(ty.without_nullable().name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signature::PrimitiveKind;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_parse_capability() {
        let cache = CapabilityCache::with_parseable_types(["Slug"]);

        assert!(cache.has_parse_capability(&TypeDescriptor::text()));
        assert!(cache.has_parse_capability(&TypeDescriptor::primitive("i32", PrimitiveKind::Int32)));
        assert!(cache.has_parse_capability(&TypeDescriptor::named("Slug")));
        assert!(cache.has_parse_capability(&TypeDescriptor::nullable(
            TypeDescriptor::named("Uuid").with_capability(Capability::ParseFromStr)
        )));
        assert!(!cache.has_parse_capability(&TypeDescriptor::named("Widget")));
        assert!(!cache.has_parse_capability(&TypeDescriptor::sequence(TypeDescriptor::text())));
    }

    #[test]
    fn test_lookups_are_memoized() {
        let cache = CapabilityCache::new();
        assert!(cache.is_empty());

        let param = ParameterDescriptor::new(
            "filter",
            TypeDescriptor::named("Filter").with_capability(Capability::AsyncBind),
        );
        assert!(cache.has_async_bind_capability(&param));
        assert!(cache.has_async_bind_capability(&param));
        cache.has_parse_capability(&TypeDescriptor::text());

        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_same_name_different_capabilities() {
        let cache = CapabilityCache::new();
        let plain = TypeDescriptor::named("Slug");
        let parseable = TypeDescriptor::named("Slug").with_capability(Capability::ParseFromStr);

        assert!(!cache.has_parse_capability(&plain));
        assert!(cache.has_parse_capability(&parseable));
        assert!(!cache.has_parse_capability(&plain));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_concurrent_writers_agree() {
        let cache = Arc::new(CapabilityCache::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let cache = Arc::clone(&cache);
                thread::spawn(move || {
                    let ty = if i % 2 == 0 {
                        TypeDescriptor::text()
                    } else {
                        TypeDescriptor::named("Widget")
                    };
                    (i, cache.has_parse_capability(&ty))
                })
            })
            .collect();

        for handle in handles {
            let (i, parseable) = handle.join().unwrap();
            assert_eq!(parseable, i % 2 == 0);
        }
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_registered_services() {
        let registry = RegisteredServices::from_names(["AppState"]);
        assert!(registry.is_registered_service(&TypeDescriptor::named("AppState")));
        assert!(!registry.is_registered_service(&TypeDescriptor::named("Widget")));
        assert!(!NoServices.is_registered_service(&TypeDescriptor::named("AppState")));
    }
}
