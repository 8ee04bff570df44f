//! Structural unit descriptors and the parsing boundary.
//!
//! A [`TypeDescriptor`] is the minimal structural view of one program unit:
//! its name, direct superclass, interfaces, and attached metadata tags.
//! Parsing never loads or executes the unit. The crate ships a JSON parser
//! for `.tyd` documents; other formats plug in via [`DescriptorParser`].

use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::{IndexError, Result};

/// File suffix of a compiled unit descriptor.
pub const UNIT_SUFFIX: &str = ".tyd";

/// The structural shape of a single scanned unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Fully-qualified unit name, unique within the corpus.
    pub name: String,
    /// Direct superclass, absent for units at the top of their hierarchy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    /// Directly implemented interfaces, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    /// Attached metadata tag names, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl TypeDescriptor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            superclass: None,
            interfaces: Vec::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn with_interfaces<I, S>(mut self, interfaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.interfaces = interfaces.into_iter().map(Into::into).collect();
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
}

/// Turns a unit's byte stream into its structural descriptor.
pub trait DescriptorParser: Send + Sync {
    /// Parse the stream of the unit at `path` (relative, for diagnostics).
    fn parse(&self, path: &str, reader: &mut dyn Read) -> Result<TypeDescriptor>;
}

/// Parses `.tyd` documents: one JSON object per unit.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonDescriptorParser;

impl DescriptorParser for JsonDescriptorParser {
    fn parse(&self, path: &str, reader: &mut dyn Read) -> Result<TypeDescriptor> {
        serde_json::from_reader(reader).map_err(|e| IndexError::Parse {
            path: path.to_string(),
            message: e.to_string(),
        })
    }
}
