//! Composable, side-effect-free query functions.
//!
//! A [`QueryFn`] is a pure function value from a context (usually the
//! [`Store`]) to an insertion-ordered result set. Composition stays lazy:
//! nothing touches the context until the composed function is applied, and
//! applying the same function twice with the same context yields the same
//! result.

use std::hash::Hash;
use std::sync::Arc;

use indexmap::IndexSet;

use crate::resolve::{TypeHandle, TypeResolver};
use crate::scanner::{SUB_TYPES, TYPES_TAGGED};
use crate::store::Store;

/// A reusable query: `&C -> IndexSet<T>`. Cloning is cheap (shared function
/// value); the function captures no mutable state.
pub struct QueryFn<C, T> {
    f: Arc<dyn Fn(&C) -> IndexSet<T> + Send + Sync>,
}

impl<C, T> Clone for QueryFn<C, T> {
    fn clone(&self) -> Self {
        Self { f: self.f.clone() }
    }
}

impl<C, T> QueryFn<C, T>
where
    C: 'static,
    T: Clone + Eq + Hash + Send + Sync + 'static,
{
    pub fn new(f: impl Fn(&C) -> IndexSet<T> + Send + Sync + 'static) -> Self {
        Self { f: Arc::new(f) }
    }

    /// A constant query returning the given elements, deduplicated, in order.
    pub fn of<I>(elements: I) -> Self
    where
        I: IntoIterator<Item = T>,
    {
        let set: IndexSet<T> = elements.into_iter().collect();
        Self::new(move |_| set.clone())
    }

    /// Run the query against `ctx`.
    pub fn apply(&self, ctx: &C) -> IndexSet<T> {
        (self.f)(ctx)
    }

    /// Narrow the result set by `predicate`, lazily.
    pub fn filter(self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        Self::new(move |ctx| self.apply(ctx).into_iter().filter(|t| predicate(t)).collect())
    }

    /// Concatenate with `other` over the same context, deduplicated, keeping
    /// this query's elements first.
    pub fn union(self, other: Self) -> Self {
        Self::new(move |ctx| {
            let mut result = self.apply(ctx);
            result.extend(other.apply(ctx));
            result
        })
    }

    /// Transitive closure: repeatedly applies `step` to each newly discovered
    /// element, breadth-first over a worklist, until nothing new turns up.
    ///
    /// The starting elements are *not* part of the result unless some chain
    /// rediscovers them. Terminates on cyclic data: membership is checked
    /// before an element is enqueued, and the result only grows.
    pub fn get_all(self, step: impl Fn(&T) -> QueryFn<C, T> + Send + Sync + 'static) -> Self {
        Self::new(move |ctx| {
            let mut work: Vec<T> = self.apply(ctx).into_iter().collect();
            let mut result = IndexSet::new();
            let mut i = 0;
            while i < work.len() {
                for found in step(&work[i]).apply(ctx) {
                    if result.insert(found.clone()) {
                        work.push(found);
                    }
                }
                i += 1;
            }
            result
        })
    }
}

impl QueryFn<Store, String> {
    /// Convert textual keys into resolved [`TypeHandle`]s.
    ///
    /// Names that fail to resolve are silently skipped, so the converted set
    /// may be smaller than the input. A set whose elements already have the
    /// requested shape passes through conversion untouched; here that is the
    /// identity at the type level. The asymmetry between the two directions
    /// is kept deliberately.
    pub fn as_types(self, resolver: Arc<dyn TypeResolver>) -> QueryFn<Store, TypeHandle> {
        QueryFn::new(move |store| {
            self.apply(store)
                .iter()
                .filter_map(|name| resolver.resolve(name))
                .collect()
        })
    }
}

// ─── Index-Scoped Builders ──────────────────────────────────────

/// Entry point for queries scoped to one named index.
pub fn index(name: impl Into<String>) -> IndexQuery {
    IndexQuery { name: name.into() }
}

/// Builds direct and transitive lookups against one index.
#[derive(Debug, Clone)]
pub struct IndexQuery {
    name: String,
}

impl IndexQuery {
    /// Direct values indexed under `key`. Empty set when absent.
    pub fn get(&self, key: impl Into<String>) -> QueryFn<Store, String> {
        let name = self.name.clone();
        let key = key.into();
        QueryFn::new(move |store: &Store| store.lookup(&name, &key))
    }

    /// Transitive values reachable from `keys`, not including `keys`.
    pub fn get_all<I, S>(&self, keys: I) -> QueryFn<Store, String>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let this = self.clone();
        QueryFn::of(keys.into_iter().map(Into::into))
            .get_all(move |key: &String| this.get(key.clone()))
    }
}

/// All subtypes in the hierarchy below `key`, transitively.
pub fn sub_types_of(key: impl Into<String>) -> QueryFn<Store, String> {
    index(SUB_TYPES).get_all([key.into()])
}

/// Types carrying the metadata tag `tag`.
pub fn types_with_tag(tag: impl Into<String>) -> QueryFn<Store, String> {
    index(TYPES_TAGGED).get(tag)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::MapResolver;
    use crate::store::Index;
    use std::collections::HashMap;

    fn store(edges: &[(&str, &str)]) -> Store {
        let mut index = Index::new();
        for (key, value) in edges {
            index
                .entry((*key).to_string())
                .or_default()
                .insert((*value).to_string());
        }
        Store::new(HashMap::from([(SUB_TYPES.to_string(), index)]))
    }

    fn names(set: IndexSet<String>) -> Vec<String> {
        set.into_iter().collect()
    }

    #[test]
    fn test_of_dedupes_and_keeps_order() {
        let q: QueryFn<Store, String> =
            QueryFn::of(["b", "a", "b"].map(String::from));
        assert_eq!(names(q.apply(&store(&[]))), vec!["b", "a"]);
    }

    #[test]
    fn test_filter_narrows() {
        let q = sub_types_of("A").filter(|t| t.as_str() != "C");
        let s = store(&[("A", "B"), ("A", "C")]);
        assert_eq!(names(q.apply(&s)), vec!["B"]);
    }

    #[test]
    fn test_union_dedupes_preserving_left_order() {
        let left: QueryFn<Store, String> = QueryFn::of(["a", "b"].map(String::from));
        let right = QueryFn::of(["b", "c"].map(String::from));
        let q = left.union(right);
        assert_eq!(names(q.apply(&store(&[]))), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_closure_excludes_start() {
        let s = store(&[("A", "B"), ("B", "C")]);
        assert_eq!(names(sub_types_of("A").apply(&s)), vec!["B", "C"]);
        assert!(!sub_types_of("A").apply(&s).contains("A"));
    }

    #[test]
    fn test_closure_dedupes_diamond() {
        let s = store(&[("A", "B"), ("A", "C"), ("B", "D"), ("C", "D")]);
        assert_eq!(names(sub_types_of("A").apply(&s)), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_closure_survives_cycles() {
        let s = store(&[("A", "B"), ("B", "A")]);
        // A is rediscovered through B's chain, so it does appear.
        assert_eq!(names(sub_types_of("A").apply(&s)), vec!["B", "A"]);
    }

    #[test]
    fn test_queries_are_referentially_transparent() {
        let s = store(&[("A", "B"), ("B", "C")]);
        let q = sub_types_of("A").filter(|t| t.len() == 1);
        assert_eq!(q.apply(&s), q.apply(&s));
        let q2 = q.clone();
        assert_eq!(q.apply(&s), q2.apply(&s));
    }

    #[test]
    fn test_lookup_on_missing_index_is_empty() {
        let s = store(&[]);
        assert!(index("NoSuchIndex").get("A").apply(&s).is_empty());
        assert!(types_with_tag("pkg.Tag").apply(&s).is_empty());
    }

    #[test]
    fn test_as_types_skips_unresolvable() {
        let s = store(&[("A", "B"), ("A", "C")]);
        let resolver = Arc::new(MapResolver::new().register(TypeHandle::new("B")));
        let handles = index(SUB_TYPES).get("A").as_types(resolver).apply(&s);
        // C has no live handle: silently dropped, result is smaller.
        assert_eq!(handles.len(), 1);
        assert_eq!(handles.first().unwrap().name(), "B");
    }
}
