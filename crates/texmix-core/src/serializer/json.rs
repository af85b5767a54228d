//! JSON serialization for [`ParseTree`]
//!
//! The tree types implement `Serialize`, so this is a thin wrapper around
//! `serde_json` with a pretty/compact switch.

use crate::content::ParseTree;
use serde_json::{to_string, to_string_pretty};

/// Options for JSON serialization
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct JsonOptions {
    /// Pretty-print with indentation (default: true)
    pub pretty: bool,
}

impl Default for JsonOptions {
    #[inline]
    fn default() -> Self {
        Self { pretty: true }
    }
}

/// JSON serializer for [`ParseTree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct JsonSerializer {
    options: JsonOptions,
}

impl JsonSerializer {
    /// Create a new JSON serializer with default options (pretty-printed)
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub const fn new() -> Self {
        Self {
            options: JsonOptions { pretty: true },
        }
    }

    /// Create a new JSON serializer with custom options
    #[inline]
    #[must_use = "creates serializer with custom options"]
    pub const fn with_options(options: JsonOptions) -> Self {
        Self { options }
    }

    /// Serialize a parse tree to JSON
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[must_use = "this function returns serialized JSON that should be used"]
    pub fn serialize(&self, tree: &ParseTree) -> Result<String, serde_json::Error> {
        if self.options.pretty {
            to_string_pretty(tree)
        } else {
            to_string(tree)
        }
    }
}
