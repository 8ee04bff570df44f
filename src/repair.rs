//! Closure repair: extend the store for supertypes that were referenced but
//! never scanned.
//!
//! Scanning a subset of the universe leaves dangling supertypes: unit `C`
//! records its supertype `B`, but `B` itself was outside the corpus, so `B`
//! is only a *value* in the SubTypes index and transitive queries rooted at
//! `B`'s own supertype `A` would miss `C`. This pass resolves each topmost
//! unresolved supertype through the [`TypeResolver`] and stitches the missing
//! `A → B` entries in, recording the resolved types' tags along the way.
//!
//! Runs single-threaded, after merge and before the store is published, and
//! mutates the store's backing maps in place. Idempotent: a second run finds
//! no new candidates.

use std::collections::HashSet;

use tracing::debug;

use crate::resolve::{TypeHandle, TypeResolver};
use crate::scanner::{ROOT_TYPE, SUB_TYPES, TYPES_TAGGED};
use crate::store::{Index, Store};

/// Extend the SubTypes index (and, when present, the TypesTagged index) with
/// resolvable supertypes of the topmost scanned keys.
pub(crate) fn expand_super_types(store: &mut Store, resolver: &dyn TypeResolver) {
    let Some(mut sub_types) = store.take_index(SUB_TYPES) else {
        return;
    };
    if sub_types.is_empty() {
        store.put_index(SUB_TYPES, sub_types);
        return;
    }
    let mut tagged = store.take_index(TYPES_TAGGED);

    // Topmost unresolved supertypes: keys that never appear as a value.
    let values: HashSet<&String> = sub_types.values().flatten().collect();
    let candidates: Vec<String> = sub_types
        .keys()
        .filter(|key| !values.contains(key) && key.as_str() != ROOT_TYPE)
        .cloned()
        .collect();
    debug!(candidates = candidates.len(), "expanding super types");

    for key in candidates {
        let Some(handle) = resolver.resolve(&key) else {
            continue;
        };
        expand_one(&mut sub_types, tagged.as_mut(), resolver, key, handle);
    }

    store.put_index(SUB_TYPES, sub_types);
    if let Some(tagged) = tagged {
        store.put_index(TYPES_TAGGED, tagged);
    }
}

/// Walk one candidate's supertype graph with an explicit work stack.
///
/// A supertype becoming a key for the first time is the signal to keep
/// walking; one already present as a key is left alone, since the closure
/// already continues naturally from there. That guard also makes cycles and
/// diamonds terminate without revisiting.
fn expand_one(
    sub_types: &mut Index,
    mut tagged: Option<&mut Index>,
    resolver: &dyn TypeResolver,
    key: String,
    handle: TypeHandle,
) {
    let mut stack: Vec<(String, TypeHandle)> = vec![(key, handle)];

    while let Some((key, handle)) = stack.pop() {
        if let Some(tagged) = tagged.as_mut() {
            record_tags(tagged, &handle);
        }
        for supertype in handle.supertype_names() {
            if let Some(bucket) = sub_types.get_mut(supertype) {
                bucket.insert(key.clone());
            } else {
                sub_types
                    .entry(supertype.clone())
                    .or_default()
                    .insert(key.clone());
                if let Some(next) = resolver.resolve(supertype) {
                    stack.push((supertype.clone(), next));
                }
            }
        }
    }
}

fn record_tags(tagged: &mut Index, handle: &TypeHandle) {
    for tag in handle.tags() {
        tagged
            .entry(tag.clone())
            .or_default()
            .insert(handle.name().to_string());
    }
}
