//! # texmix-core
//!
//! Data model and serializers shared by the texmix crates.
//!
//! The `texmix-latex` crate turns author-entered question text (prose mixed
//! with `$…$` math, LaTeX environments, `\includegraphics` directives and
//! `**Part (a) [2 marks]**` markers) into a [`ParseTree`]. This crate defines
//! that tree and the formats it can be written to.
//!
//! ## Tree shape
//!
//! | Type | Meaning |
//! |------|---------|
//! | [`ParseTree`] | Ordered question blocks |
//! | [`ParsedBlock`] | A `Main` stem or a lettered `Part` with its segments |
//! | [`Segment`] | Text, math span, image, or environment |
//! | [`EnvironmentBody`] | List, opaque math, tasks grid, table, parts, or layout block |
//!
//! ## Serialization
//!
//! ```rust
//! use texmix_core::content::{MathSpan, ParseTree, Segment};
//! use texmix_core::{JsonSerializer, MarkdownSerializer, YamlSerializer};
//!
//! let tree = ParseTree::single(vec![Segment::Math(MathSpan::display("a^2+b^2=c^2"))]);
//!
//! let json = JsonSerializer::new().serialize(&tree)?;
//! let yaml = YamlSerializer::new().serialize(&tree)?;
//! let markdown = MarkdownSerializer::new().serialize(&tree);
//!
//! assert!(json.contains("a^2+b^2=c^2"));
//! assert!(yaml.contains("display: true"));
//! assert_eq!(markdown, "$$\na^2+b^2=c^2\n$$");
//! # Ok::<(), texmix_core::TexmixError>(())
//! ```

pub mod content;
pub mod error;
pub mod serializer;

pub use content::{
    AlignVariant, BlockKind, EnvironmentBody, EnvironmentKind, EnvironmentNode, ImageNode,
    ImageRef, ImageWidth, Layout, MathSpan, MatrixVariant, ParseTree, ParsedBlock, PartItem,
    QuestionBlock, Segment, TaskCell, LINE_BREAK,
};
pub use error::{Result, TexmixError};
pub use serializer::{
    JsonOptions, JsonSerializer, MarkdownOptions, MarkdownSerializer, YamlSerializer,
};
