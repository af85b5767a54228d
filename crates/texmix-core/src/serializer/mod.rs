//! Parse-tree serialization module
//!
//! This module provides serializers for converting a [`crate::ParseTree`] to
//! JSON, YAML, or Markdown.

pub mod json;
pub mod markdown;
pub mod yaml;

pub use json::{JsonOptions, JsonSerializer};
pub use markdown::{MarkdownOptions, MarkdownSerializer};
pub use yaml::YamlSerializer;
