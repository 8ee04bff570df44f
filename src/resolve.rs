//! Type resolution boundary.
//!
//! Closure repair and typed query conversion need to look *outside* the
//! scanned corpus: given a textual type key, obtain an introspectable handle
//! describing that type's own supertypes and tags. Resolution failure is a
//! normal, silently-skipped outcome: the unresolvable branch simply does not
//! expand.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// An introspectable view of one resolved type.
///
/// `supertype_names` holds the direct superclass and interfaces in order,
/// excluding the universal root type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypeHandle {
    name: String,
    supertype_names: Vec<String>,
    tags: Vec<String>,
}

impl TypeHandle {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            supertype_names: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_supertypes<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.supertype_names = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Direct superclass plus interfaces, in order, root type excluded.
    pub fn supertype_names(&self) -> &[String] {
        &self.supertype_names
    }

    /// Attached metadata tag names, in order.
    pub fn tags(&self) -> &[String] {
        &self.tags
    }
}

/// Resolves a textual type key into a live handle.
pub trait TypeResolver: Send + Sync {
    /// `None` when the name cannot be resolved; callers skip, never fail.
    fn resolve(&self, name: &str) -> Option<TypeHandle>;
}

/// An in-memory resolver over a fixed registry of handles.
#[derive(Debug, Clone, Default)]
pub struct MapResolver {
    types: HashMap<String, TypeHandle>,
}

impl MapResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handle, keyed by its own name.
    pub fn register(mut self, handle: TypeHandle) -> Self {
        self.types.insert(handle.name().to_string(), handle);
        self
    }
}

impl TypeResolver for MapResolver {
    fn resolve(&self, name: &str) -> Option<TypeHandle> {
        self.types.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_resolver_roundtrip() {
        let resolver = MapResolver::new()
            .register(TypeHandle::new("pkg.B").with_supertypes(["pkg.A"]));

        let handle = resolver.resolve("pkg.B").unwrap();
        assert_eq!(handle.name(), "pkg.B");
        assert_eq!(handle.supertype_names(), ["pkg.A"]);
        assert!(handle.tags().is_empty());
    }

    #[test]
    fn test_unknown_name_resolves_to_none() {
        assert!(MapResolver::new().resolve("pkg.Missing").is_none());
    }
}
