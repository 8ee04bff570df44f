//! Scan configuration.
//!
//! [`ConfigBuilder`] assembles everything a scan needs: artifact roots,
//! scanners, the input filter chain, and the pluggable collaborators.
//! Validation happens at `build()`, before any scan runs: an empty root set
//! is a configuration error, not a late surprise.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::descriptor::{DescriptorParser, JsonDescriptorParser};
use crate::error::{IndexError, Result};
use crate::filter::FilterChain;
use crate::locate::{FsLocator, Locator};
use crate::resolve::TypeResolver;
use crate::scanner::{Scanner, SubTypesScanner};

/// A validated, immutable scan configuration.
pub struct Config {
    pub(crate) roots: Vec<PathBuf>,
    pub(crate) scanners: Vec<Arc<dyn Scanner>>,
    pub(crate) filter: FilterChain,
    pub(crate) parallel: bool,
    pub(crate) expand_super_types: bool,
    pub(crate) locator: Arc<dyn Locator>,
    pub(crate) parser: Arc<dyn DescriptorParser>,
    pub(crate) resolver: Option<Arc<dyn TypeResolver>>,
}

impl Config {
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("roots", &self.roots)
            .field("scanners", &self.scanners.len())
            .field("parallel", &self.parallel)
            .field("expand_super_types", &self.expand_super_types)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Config`].
pub struct ConfigBuilder {
    roots: Vec<PathBuf>,
    scanners: Vec<Arc<dyn Scanner>>,
    filter: FilterChain,
    parallel: bool,
    expand_super_types: bool,
    locator: Arc<dyn Locator>,
    parser: Arc<dyn DescriptorParser>,
    resolver: Option<Arc<dyn TypeResolver>>,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            scanners: Vec::new(),
            filter: FilterChain::new(),
            parallel: true,
            expand_super_types: true,
            locator: Arc::new(FsLocator),
            parser: Arc::new(JsonDescriptorParser),
            resolver: None,
        }
    }
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add one artifact root to scan.
    pub fn add_root(mut self, root: impl AsRef<Path>) -> Self {
        self.roots.push(root.as_ref().to_path_buf());
        self
    }

    /// Add several artifact roots.
    pub fn add_roots<I, P>(mut self, roots: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.roots
            .extend(roots.into_iter().map(|r| r.as_ref().to_path_buf()));
        self
    }

    /// Scan `root` but only units under the package `prefix`: appends an
    /// include-prefix rule to the input filter.
    pub fn for_package(mut self, root: impl AsRef<Path>, prefix: &str) -> Result<Self> {
        self.roots.push(root.as_ref().to_path_buf());
        self.filter = self.filter.include_prefix(prefix)?;
        Ok(self)
    }

    /// Add a scanner. When none are added, a default [`SubTypesScanner`]
    /// is used.
    pub fn add_scanner(mut self, scanner: impl Scanner + 'static) -> Self {
        self.scanners.push(Arc::new(scanner));
        self
    }

    /// Replace the input filter chain applied to every unit entry.
    pub fn filter_inputs_by(mut self, filter: FilterChain) -> Self {
        self.filter = filter;
        self
    }

    /// Scan roots in parallel (default) or sequentially.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Run closure repair after the merge (default). Requires a resolver to
    /// have any effect.
    pub fn expand_super_types(mut self, expand: bool) -> Self {
        self.expand_super_types = expand;
        self
    }

    pub fn locator(mut self, locator: impl Locator + 'static) -> Self {
        self.locator = Arc::new(locator);
        self
    }

    pub fn parser(mut self, parser: impl DescriptorParser + 'static) -> Self {
        self.parser = Arc::new(parser);
        self
    }

    pub fn resolver(mut self, resolver: impl TypeResolver + 'static) -> Self {
        self.resolver = Some(Arc::new(resolver));
        self
    }

    /// Validate and freeze the configuration.
    pub fn build(mut self) -> Result<Config> {
        if self.roots.is_empty() {
            return Err(IndexError::Config(
                "no artifact roots given; add at least one root to scan".to_string(),
            ));
        }
        if self.scanners.is_empty() {
            self.scanners.push(Arc::new(SubTypesScanner::new()));
        }
        Ok(Config {
            roots: self.roots,
            scanners: self.scanners,
            filter: self.filter,
            parallel: self.parallel,
            expand_super_types: self.expand_super_types,
            locator: self.locator,
            parser: self.parser,
            resolver: self.resolver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::SUB_TYPES;

    #[test]
    fn test_no_roots_is_a_config_error() {
        let err = ConfigBuilder::new().build().unwrap_err();
        assert!(matches!(err, IndexError::Config(_)));
    }

    #[test]
    fn test_default_scanner_is_subtypes() {
        let config = ConfigBuilder::new().add_root("corpus").build().unwrap();
        assert_eq!(config.scanners.len(), 1);
        assert_eq!(config.scanners[0].index_name(), SUB_TYPES);
        assert!(config.parallel);
        assert!(config.expand_super_types);
    }

    #[test]
    fn test_for_package_installs_input_filter() {
        let config = ConfigBuilder::new()
            .for_package("corpus", "app")
            .unwrap()
            .build()
            .unwrap();
        assert!(config.filter.test("app.Service"));
        assert!(!config.filter.test("lib.Helper"));
    }
}
