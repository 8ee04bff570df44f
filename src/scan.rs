//! Scan coordinator: roots → raw edges → merged store.
//!
//! Roots are processed by a rayon worker pool when parallel scanning is on;
//! within one root, unit iteration and scanner dispatch stay sequential.
//! Every scanner owns one shared accumulator guarded by its own lock, so
//! workers on different roots append into the same scanner's collection
//! without a global lock. Merge runs single-threaded after the join, so no
//! reader ever observes a half-built index.
//!
//! There is no timeout or cancellation: a hung locator or stream blocks its
//! root until it returns. Acceptable for the trusted local corpora this
//! crate targets.

use std::collections::HashMap;
use std::path::Path;
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tracing::{debug, warn};

use crate::config::Config;
use crate::descriptor::TypeDescriptor;
use crate::locate::ArtifactFile;
use crate::scanner::RawEdge;
use crate::store::{Index, Store};

type Accumulators = HashMap<String, Mutex<Vec<RawEdge>>>;

/// Run the configured scan and merge the results into a [`Store`].
///
/// Unit-level failures (unreadable stream, unparsable descriptor) are logged
/// and skipped; a root that cannot be opened yields no edges. The returned
/// store is always usable, though it may be incomplete if many units failed.
pub(crate) fn scan(config: &Config) -> Store {
    let accumulators: Accumulators = config
        .scanners
        .iter()
        .map(|s| (s.index_name().to_string(), Mutex::new(Vec::new())))
        .collect();

    if config.parallel {
        config
            .roots
            .par_iter()
            .for_each(|root| scan_root(config, root, &accumulators));
    } else {
        for root in &config.roots {
            scan_root(config, root, &accumulators);
        }
    }

    merge(accumulators)
}

/// Scan every unit of one root into the shared accumulators.
fn scan_root(config: &Config, root: &Path, accumulators: &Accumulators) {
    let mut dir = match config.locator.open(root) {
        Ok(dir) => dir,
        Err(e) => {
            warn!(root = %root.display(), error = %e, "skipping unopenable root");
            return;
        }
    };

    let mut units = 0usize;
    for file in dir.files() {
        let path = file.relative_path().to_string();
        let fqn = path.replace('/', ".");
        if !config.filter.test(&path) && !config.filter.test(&fqn) {
            continue;
        }
        units += 1;

        // The descriptor is parsed lazily, at most once, and shared across
        // all scanners accepting this unit. A parse failure poisons only
        // this unit.
        let mut descriptor: Option<Option<TypeDescriptor>> = None;
        for scanner in &config.scanners {
            if !scanner.accepts_input(&path) && !scanner.accepts_input(&fqn) {
                continue;
            }
            let parsed = descriptor.get_or_insert_with(|| parse_unit(config, &path, &*file));
            let Some(parsed) = parsed else { break };

            let edges = scanner.scan(parsed);
            if edges.is_empty() {
                continue;
            }
            if let Some(accumulator) = accumulators.get(scanner.index_name()) {
                accumulator
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .extend(edges);
            }
        }
    }
    // Root resources release here on every path (Drop on the dir).
    debug!(root = %root.display(), units, "root scan complete");
}

fn parse_unit(config: &Config, path: &str, file: &dyn ArtifactFile) -> Option<TypeDescriptor> {
    let mut reader = match file.open() {
        Ok(reader) => reader,
        Err(e) => {
            warn!(unit = path, error = %e, "could not open unit stream");
            return None;
        }
    };
    match config.parser.parse(path, &mut reader) {
        Ok(descriptor) => Some(descriptor),
        Err(e) => {
            warn!(unit = path, error = %e, "could not parse unit descriptor");
            None
        }
    }
}

/// Group each accumulator's edges by key into one index per scanner.
/// Edges with an absent key are dropped; values within a key deduplicate.
fn merge(accumulators: Accumulators) -> Store {
    let mut indices = HashMap::with_capacity(accumulators.len());
    for (name, edges) in accumulators {
        let edges = edges.into_inner().unwrap_or_else(PoisonError::into_inner);
        let mut index = Index::new();
        for edge in edges {
            if let Some(key) = edge.key {
                index.entry(key).or_default().insert(edge.value);
            }
        }
        debug!(index = %name, keys = index.len(), "merged index");
        indices.insert(name, index);
    }
    Store::new(indices)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;
    use crate::filter::FilterChain;
    use crate::scanner::{SubTypesScanner, TaggedTypesScanner, SUB_TYPES, TYPES_TAGGED};
    use std::fs;
    use tempfile::TempDir;

    fn write_unit(dir: &TempDir, rel: &str, json: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, json).unwrap();
    }

    fn corpus() -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        write_unit(&dir, "pkg/A.tyd", r#"{"name":"pkg.A"}"#);
        write_unit(
            &dir,
            "pkg/B.tyd",
            r#"{"name":"pkg.B","superclass":"pkg.A","tags":["pkg.Stored"]}"#,
        );
        write_unit(
            &dir,
            "pkg/C.tyd",
            r#"{"name":"pkg.C","superclass":"pkg.B","interfaces":["pkg.A"]}"#,
        );
        dir
    }

    fn scan_corpus(dir: &TempDir, parallel: bool) -> Store {
        let config = ConfigBuilder::new()
            .add_root(dir.path())
            .add_scanner(SubTypesScanner::new())
            .add_scanner(TaggedTypesScanner::new())
            .parallel(parallel)
            .expand_super_types(false)
            .build()
            .unwrap();
        scan(&config)
    }

    #[test]
    fn test_scan_builds_both_indices() {
        let dir = corpus();
        let store = scan_corpus(&dir, false);

        let b_subs: Vec<_> = store.lookup(SUB_TYPES, "pkg.B").into_iter().collect();
        assert_eq!(b_subs, vec!["pkg.C"]);
        // pkg.A keys both B's superclass edge and C's interface edge.
        let a_subs = store.lookup(SUB_TYPES, "pkg.A");
        assert!(a_subs.contains("pkg.B") && a_subs.contains("pkg.C"));

        let stored: Vec<_> = store.lookup(TYPES_TAGGED, "pkg.Stored").into_iter().collect();
        assert_eq!(stored, vec!["pkg.B"]);
    }

    #[test]
    fn test_keyless_edges_are_dropped_at_merge() {
        let dir = tempfile::tempdir().unwrap();
        write_unit(&dir, "A.tyd", r#"{"name":"pkg.A"}"#);
        let config = ConfigBuilder::new()
            .add_root(dir.path())
            .parallel(false)
            .expand_super_types(false)
            .build()
            .unwrap();
        let store = scan(&config);
        // A rootless unit emits only a keyless edge; merge drops it.
        assert!(store.keys(SUB_TYPES).is_empty());
    }

    #[test]
    fn test_duplicate_edges_dedupe_within_key() {
        let dir = tempfile::tempdir().unwrap();
        // Same superclass edge reachable from two roots.
        write_unit(&dir, "B.tyd", r#"{"name":"pkg.B","superclass":"pkg.A"}"#);
        let config = ConfigBuilder::new()
            .add_root(dir.path())
            .add_root(dir.path())
            .parallel(false)
            .expand_super_types(false)
            .build()
            .unwrap();
        let store = scan(&config);
        assert_eq!(store.lookup(SUB_TYPES, "pkg.A").len(), 1);
    }

    #[test]
    fn test_input_filter_prunes_units() {
        let dir = corpus();
        let config = ConfigBuilder::new()
            .add_root(dir.path())
            .filter_inputs_by(FilterChain::new().exclude(r".*C\.tyd").unwrap())
            .parallel(false)
            .expand_super_types(false)
            .build()
            .unwrap();
        let store = scan(&config);
        let a_subs = store.lookup(SUB_TYPES, "pkg.A");
        assert!(a_subs.contains("pkg.B"));
        assert!(!a_subs.contains("pkg.C"), "filtered unit must not contribute");
    }

    #[test]
    fn test_malformed_unit_is_isolated() {
        let dir = corpus();
        write_unit(&dir, "pkg/Broken.tyd", "not json at all");
        let store = scan_corpus(&dir, false);
        // The broken unit is skipped; everything else is intact.
        assert!(store.lookup(SUB_TYPES, "pkg.A").contains("pkg.B"));
    }

    #[test]
    fn test_unopenable_root_aborts_only_that_root() {
        let dir = corpus();
        let config = ConfigBuilder::new()
            .add_root("/definitely/not/here")
            .add_root(dir.path())
            .parallel(false)
            .expand_super_types(false)
            .build()
            .unwrap();
        let store = scan(&config);
        assert!(store.lookup(SUB_TYPES, "pkg.A").contains("pkg.B"));
    }

    #[test]
    fn test_parallel_and_sequential_agree_on_content() {
        let dir = corpus();
        let sequential = scan_corpus(&dir, false);
        for _ in 0..4 {
            let parallel = scan_corpus(&dir, true);
            for key in sequential.keys(SUB_TYPES) {
                let a: std::collections::HashSet<_> =
                    sequential.lookup(SUB_TYPES, key).into_iter().collect();
                let b: std::collections::HashSet<_> =
                    parallel.lookup(SUB_TYPES, key).into_iter().collect();
                assert_eq!(a, b, "content must not depend on interleaving");
            }
            assert_eq!(
                sequential.keys(SUB_TYPES).len(),
                parallel.keys(SUB_TYPES).len()
            );
        }
    }
}
