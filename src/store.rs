//! The multi-index store.
//!
//! A [`Store`] maps index names to key → value-set indices. It is built once
//! by the scan merge, optionally extended in place exactly once by closure
//! repair, then read-only for the rest of its life. Its shape
//! (`index name → key → value set`) is the only structure external
//! persistence may rely on, hence the serde derives.

use std::collections::HashMap;
use std::fmt;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// One index: key → insertion-ordered, deduplicated values.
pub type Index = IndexMap<String, IndexSet<String>>;

/// The finished multi-index result of a scan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Store {
    indices: HashMap<String, Index>,
}

impl Store {
    pub(crate) fn new(indices: HashMap<String, Index>) -> Self {
        Self { indices }
    }

    /// Direct values indexed under `key` in the index named `index`.
    ///
    /// The one safe read primitive: returns an empty set, never a failure,
    /// when the index or the key is absent.
    pub fn lookup(&self, index: &str, key: &str) -> IndexSet<String> {
        self.indices
            .get(index)
            .and_then(|idx| idx.get(key))
            .cloned()
            .unwrap_or_default()
    }

    /// The keys of the index named `index`, in insertion order.
    pub fn keys(&self, index: &str) -> Vec<&str> {
        self.indices
            .get(index)
            .map(|idx| idx.keys().map(String::as_str).collect())
            .unwrap_or_default()
    }

    /// Names of the indices present in the store.
    pub fn index_names(&self) -> Vec<&str> {
        self.indices.keys().map(String::as_str).collect()
    }

    pub fn stats(&self) -> StoreStats {
        let mut stats = StoreStats {
            index_count: self.indices.len(),
            ..StoreStats::default()
        };
        for index in self.indices.values() {
            stats.key_count += index.len();
            stats.value_count += index.values().map(IndexSet::len).sum::<usize>();
        }
        stats
    }

    // Closure repair mutates the backing maps in place, before the store is
    // published to any reader. Crate-private by design.

    pub(crate) fn take_index(&mut self, name: &str) -> Option<Index> {
        self.indices.remove(name)
    }

    pub(crate) fn put_index(&mut self, name: &str, index: Index) {
        self.indices.insert(name.to_string(), index);
    }
}

/// Size summary of a store.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreStats {
    pub index_count: usize,
    pub key_count: usize,
    pub value_count: usize,
}

impl fmt::Display for StoreStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} indices, {} keys, {} values",
            self.index_count, self.key_count, self.value_count
        )
    }
}
