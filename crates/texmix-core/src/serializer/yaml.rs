//! YAML serialization for [`ParseTree`]
//!
//! YAML is more human-readable than JSON and handy when eyeballing parser
//! output for a question.

use crate::content::ParseTree;

/// YAML serializer for [`ParseTree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct YamlSerializer;

impl YamlSerializer {
    /// Create a new YAML serializer
    #[inline]
    #[must_use = "creates serializer"]
    pub const fn new() -> Self {
        Self
    }

    /// Serialize a parse tree to YAML
    ///
    /// # Errors
    /// Returns error if serialization fails
    #[allow(clippy::unused_self)] // Kept as a method to mirror the JSON serializer
    #[must_use = "this function returns serialized YAML that should be used"]
    pub fn serialize(&self, tree: &ParseTree) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(tree)
    }
}
