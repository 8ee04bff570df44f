//! Error types for typedex.
//!
//! Nothing on the scan/merge/repair/query path escapes to the caller; these
//! errors surface only while building configuration or opening collaborators.

use std::path::PathBuf;
use thiserror::Error;

/// All errors the crate can surface to callers.
#[derive(Debug, Error)]
pub enum IndexError {
    /// Invalid or incomplete configuration, detected before any scan runs.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A filter pattern failed to compile.
    #[error("invalid filter pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// An artifact root could not be opened.
    #[error("could not open artifact root {root}: {source}")]
    RootOpen {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A unit's descriptor could not be parsed.
    #[error("could not parse descriptor {path}: {message}")]
    Parse { path: String, message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IndexError>;
