//! The top-level facade: scan a configured corpus once, then query it.

use std::sync::Arc;

use indexmap::IndexSet;
use tracing::{info, warn};

use crate::config::Config;
use crate::query::{self, QueryFn};
use crate::repair;
use crate::resolve::{TypeHandle, TypeResolver};
use crate::scan;
use crate::store::{Store, StoreStats};

/// A scanned, repaired, immutable type index.
///
/// Construction runs the whole pipeline: scan the configured roots, merge
/// into the store, and (when enabled and a resolver is available) run
/// closure repair before the store becomes visible to any query.
pub struct TypeIndex {
    store: Store,
    resolver: Option<Arc<dyn TypeResolver>>,
}

impl TypeIndex {
    pub fn new(config: Config) -> Self {
        let mut store = scan::scan(&config);
        if config.expand_super_types {
            match &config.resolver {
                Some(resolver) => repair::expand_super_types(&mut store, resolver.as_ref()),
                None => warn!("super-type expansion enabled but no resolver configured; skipping"),
            }
        }
        info!(stats = %store.stats(), "type index ready");
        Self {
            store,
            resolver: config.resolver,
        }
    }

    /// The finished store. Read-only from here on.
    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn stats(&self) -> StoreStats {
        self.store.stats()
    }

    /// Apply a composed query against this index's store.
    pub fn get<T>(&self, query: &QueryFn<Store, T>) -> IndexSet<T>
    where
        T: Clone + Eq + std::hash::Hash + Send + Sync + 'static,
    {
        query.apply(&self.store)
    }

    /// All subtypes in the hierarchy below `key`, transitively.
    pub fn sub_types_of(&self, key: impl Into<String>) -> IndexSet<String> {
        self.get(&query::sub_types_of(key))
    }

    /// Resolved handles for all subtypes below `key`; unresolvable names are
    /// silently skipped. Empty when no resolver is configured.
    pub fn sub_type_handles_of(&self, key: impl Into<String>) -> IndexSet<TypeHandle> {
        match &self.resolver {
            Some(resolver) => {
                self.get(&query::sub_types_of(key).as_types(resolver.clone()))
            }
            None => IndexSet::new(),
        }
    }

    /// Types carrying the metadata tag `tag`.
    pub fn types_with_tag(&self, tag: impl Into<String>) -> IndexSet<String> {
        self.get(&query::types_with_tag(tag))
    }
}
