//! Scanner contract and built-in scanners.
//!
//! A scanner turns one unit descriptor into zero or more raw edges under its
//! own named index. Scanner instances are immutable value objects: all
//! configuration happens at construction, so one instance can serve
//! concurrent root workers without interior state.

use crate::descriptor::{TypeDescriptor, UNIT_SUFFIX};
use crate::filter::FilterChain;

/// Index name for supertype → direct-subtype edges.
pub const SUB_TYPES: &str = "SubTypes";

/// Index name for tag → tagged-type edges.
pub const TYPES_TAGGED: &str = "TypesTagged";

/// Name of the universal root supertype. Excluded from subtype keys by
/// default to keep the store small, and never a closure-repair candidate.
pub const ROOT_TYPE: &str = "lang.Object";

/// A single (key, value) relation produced by a scanner. The key may be
/// absent — e.g. a unit with no declared superclass — in which case the
/// merge drops the edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEdge {
    pub key: Option<String>,
    pub value: String,
}

impl RawEdge {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            value: value.into(),
        }
    }

    pub fn keyless(value: impl Into<String>) -> Self {
        Self {
            key: None,
            value: value.into(),
        }
    }
}

/// A pluggable indexing unit: declares which inputs it accepts and which
/// index it feeds, and maps a descriptor to raw edges.
pub trait Scanner: Send + Sync {
    /// Unique name of the index this scanner feeds.
    fn index_name(&self) -> &str;

    /// Whether the unit entry named `name` (path or qualified name) should
    /// be offered to this scanner.
    fn accepts_input(&self, name: &str) -> bool {
        name.ends_with(UNIT_SUFFIX)
    }

    /// Produce this scanner's edges for one descriptor.
    fn scan(&self, descriptor: &TypeDescriptor) -> Vec<RawEdge>;
}

// ─── SubTypes ───────────────────────────────────────────────────

/// Scans a unit's direct superclass and interfaces into [`SUB_TYPES`] edges:
/// key = supertype, value = the unit itself.
///
/// A per-scanner result filter decides which *keys* are retained; the default
/// drops [`ROOT_TYPE`] so the root's huge bucket never enters the store. The
/// filter only suppresses an edge's key bucket, never rewrites its value.
#[derive(Debug, Clone)]
pub struct SubTypesScanner {
    result_filter: FilterChain,
}

impl SubTypesScanner {
    pub fn new() -> Self {
        Self {
            // Infallible: the escaped literal always compiles.
            result_filter: FilterChain::new()
                .exclude(&regex::escape(ROOT_TYPE))
                .unwrap(),
        }
    }

    /// Replace the result filter, e.g. `filter_results_by(FilterChain::new())`
    /// to index the root type as well. Consumes self: the configured scanner
    /// is a fresh value, never a reconfigured shared one.
    pub fn filter_results_by(mut self, filter: FilterChain) -> Self {
        self.result_filter = filter;
        self
    }
}

impl Default for SubTypesScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for SubTypesScanner {
    fn index_name(&self) -> &str {
        SUB_TYPES
    }

    fn scan(&self, descriptor: &TypeDescriptor) -> Vec<RawEdge> {
        let mut edges = Vec::with_capacity(1 + descriptor.interfaces.len());
        edges.push(RawEdge {
            key: descriptor.superclass.clone(),
            value: descriptor.name.clone(),
        });
        for interface in &descriptor.interfaces {
            edges.push(RawEdge::new(interface, &descriptor.name));
        }
        // Result filter applies to present keys only; keyless edges fall
        // through and are dropped at merge.
        edges.retain(|edge| {
            edge.key
                .as_deref()
                .map_or(true, |key| self.result_filter.test(key))
        });
        edges
    }
}

// ─── TypesTagged ────────────────────────────────────────────────

/// Scans a unit's attached metadata tags into [`TYPES_TAGGED`] edges:
/// key = tag name, value = the tagged unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct TaggedTypesScanner;

impl TaggedTypesScanner {
    pub fn new() -> Self {
        Self
    }
}

impl Scanner for TaggedTypesScanner {
    fn index_name(&self) -> &str {
        TYPES_TAGGED
    }

    fn scan(&self, descriptor: &TypeDescriptor) -> Vec<RawEdge> {
        descriptor
            .tags
            .iter()
            .map(|tag| RawEdge::new(tag, &descriptor.name))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::new("pkg.B")
            .with_superclass("pkg.A")
            .with_interfaces(["pkg.I"])
            .with_tags(["pkg.Stored", "pkg.Audited"])
    }

    #[test]
    fn test_accepts_input_default_suffix() {
        let scanner = SubTypesScanner::new();
        assert!(scanner.accepts_input("pkg/B.tyd"));
        assert!(scanner.accepts_input("pkg.B.tyd"));
        assert!(!scanner.accepts_input("pkg/B.json"));
    }

    #[test]
    fn test_subtypes_emits_superclass_and_interfaces() {
        let edges = SubTypesScanner::new().scan(&descriptor());
        assert_eq!(
            edges,
            vec![
                RawEdge::new("pkg.A", "pkg.B"),
                RawEdge::new("pkg.I", "pkg.B"),
            ]
        );
    }

    #[test]
    fn test_subtypes_keeps_keyless_edge_for_rootless_unit() {
        let edges = SubTypesScanner::new().scan(&TypeDescriptor::new("pkg.A"));
        assert_eq!(edges, vec![RawEdge::keyless("pkg.A")]);
    }

    #[test]
    fn test_subtypes_excludes_root_type_key_by_default() {
        let input = TypeDescriptor::new("pkg.A").with_superclass(ROOT_TYPE);
        let edges = SubTypesScanner::new().scan(&input);
        assert!(edges.is_empty());
    }

    #[test]
    fn test_result_filter_is_replaceable() {
        let input = TypeDescriptor::new("pkg.A").with_superclass(ROOT_TYPE);
        let scanner = SubTypesScanner::new().filter_results_by(FilterChain::new());
        let edges = scanner.scan(&input);
        assert_eq!(edges, vec![RawEdge::new(ROOT_TYPE, "pkg.A")]);
    }

    #[test]
    fn test_result_filter_spares_other_keys() {
        // Excluding one key must not suppress edges under other keys of the
        // same scan pass.
        let scanner = SubTypesScanner::new().filter_results_by(
            FilterChain::new().exclude(r"pkg\.A").unwrap(),
        );
        let edges = scanner.scan(&descriptor());
        assert_eq!(edges, vec![RawEdge::new("pkg.I", "pkg.B")]);
    }

    #[test]
    fn test_tagged_types_edges() {
        let edges = TaggedTypesScanner::new().scan(&descriptor());
        assert_eq!(
            edges,
            vec![
                RawEdge::new("pkg.Stored", "pkg.B"),
                RawEdge::new("pkg.Audited", "pkg.B"),
            ]
        );
    }

    #[test]
    fn test_tagged_types_untagged_unit_is_silent() {
        let edges = TaggedTypesScanner::new().scan(&TypeDescriptor::new("pkg.A"));
        assert!(edges.is_empty());
    }
}
