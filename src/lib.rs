//! # typedex
//!
//! A queryable structural index over type-descriptor corpora.
//!
//! typedex scans artifact roots full of unit descriptors (which type
//! extends which, which types carry which metadata tags) and builds an
//! in-memory multi-index answering "find all X" queries fast and repeatably,
//! without loading or executing any unit.
//!
//! ## Key pieces
//!
//! - **Scan pipeline**: roots are walked (in parallel by default), each
//!   accepted unit is parsed once into a [`TypeDescriptor`], and every
//!   configured [`Scanner`] contributes edges to its own index.
//! - **Store**: immutable `index → key → value set` multi-index.
//! - **Query algebra**: lazy, composable [`QueryFn`] values supporting
//!   lookup, filtering, union, transitive closure, and typed conversion.
//! - **Closure repair**: a post-merge pass stitching in supertypes that were
//!   referenced by scanned units but live outside the corpus.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use typedex::{ConfigBuilder, TypeIndex};
//!
//! let index = TypeIndex::new(
//!     ConfigBuilder::new().add_root("target/descriptors").build()?,
//! );
//! let subtypes = index.sub_types_of("app.Repository");
//! # Ok::<(), typedex::IndexError>(())
//! ```

pub mod config;
pub mod descriptor;
pub mod error;
pub mod filter;
pub mod index;
pub mod locate;
pub mod query;
pub mod resolve;
pub mod scanner;
pub mod store;

mod repair;
mod scan;

// Re-exports for convenience
pub use error::{IndexError, Result};

pub use config::{Config, ConfigBuilder};
pub use descriptor::{DescriptorParser, JsonDescriptorParser, TypeDescriptor, UNIT_SUFFIX};
pub use filter::FilterChain;
pub use index::TypeIndex;
pub use locate::{ArtifactDir, ArtifactFile, FsLocator, Locator};
pub use query::{index as query_index, sub_types_of, types_with_tag, IndexQuery, QueryFn};
pub use resolve::{MapResolver, TypeHandle, TypeResolver};
pub use scanner::{
    RawEdge, Scanner, SubTypesScanner, TaggedTypesScanner, ROOT_TYPE, SUB_TYPES, TYPES_TAGGED,
};
pub use store::{Store, StoreStats};
