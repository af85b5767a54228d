//! Parse-tree types for structured question content
//!
//! This module defines the node types produced by the `texmix-latex` parser.
//! The tree carries semantic kind and content only; layout, styling and math
//! typesetting belong to the presentation layer that consumes it.

use serde::{Deserialize, Serialize};

/// Hard line-break marker left in text segments by the preprocessor.
pub const LINE_BREAK: &str = "<br>";

/// An image directive captured from `\includegraphics[options]{url}`.
///
/// The URL is already trimmed; it is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageRef {
    /// Image location, handed unmodified to the resource loader
    pub url: String,
    /// Raw option list (e.g. `width=200px`), empty when absent
    pub options: String,
}

impl ImageRef {
    /// Create an image reference
    #[inline]
    #[must_use = "creates an image reference"]
    pub fn new(url: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            options: options.into(),
        }
    }

    /// Reconstruct the `\includegraphics` directive this reference came from
    #[must_use = "returns the directive source text"]
    pub fn to_directive(&self) -> String {
        if self.options.is_empty() {
            format!("\\includegraphics{{{}}}", self.url)
        } else {
            format!("\\includegraphics[{}]{{{}}}", self.options, self.url)
        }
    }
}

/// Display width requested by an image's `width=` option.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ImageWidth {
    /// No usable width; the presentation layer picks one
    #[default]
    Auto,
    /// Numeric width with its unit suffix (`px`, `cm`, `\textwidth`, or empty)
    Length { value: f64, unit: String },
}

impl std::fmt::Display for ImageWidth {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Auto => write!(f, "auto"),
            Self::Length { value, unit } => write!(f, "{value}{unit}"),
        }
    }
}

/// A resolved image placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageNode {
    pub image: ImageRef,
    pub width: ImageWidth,
}

/// A math expression bounded by one of the four delimiter pairs, or an
/// opaque environment handed whole to the typesetter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MathSpan {
    /// LaTeX source without its delimiters
    pub latex: String,
    /// Display (block) mode when true, inline otherwise
    pub display: bool,
}

impl MathSpan {
    /// Inline math span
    #[inline]
    #[must_use = "creates an inline math span"]
    pub fn inline(latex: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
            display: false,
        }
    }

    /// Display math span
    #[inline]
    #[must_use = "creates a display math span"]
    pub fn display(latex: impl Into<String>) -> Self {
        Self {
            latex: latex.into(),
            display: true,
        }
    }
}

/// Align-family environment names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlignVariant {
    Align,
    AlignStar,
    Alignat,
    AlignatStar,
    Eqnarray,
    EqnarrayStar,
}

impl AlignVariant {
    /// Environment name as written in source
    #[inline]
    #[must_use = "returns the environment name"]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Align => "align",
            Self::AlignStar => "align*",
            Self::Alignat => "alignat",
            Self::AlignatStar => "alignat*",
            Self::Eqnarray => "eqnarray",
            Self::EqnarrayStar => "eqnarray*",
        }
    }
}

/// Matrix environment names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatrixVariant {
    /// `matrix`
    Plain,
    /// `pmatrix`
    Paren,
    /// `bmatrix`
    Bracket,
    /// `vmatrix`
    Bar,
    /// `Vmatrix`
    DoubleBar,
}

impl MatrixVariant {
    /// Environment name as written in source
    #[inline]
    #[must_use = "returns the environment name"]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Plain => "matrix",
            Self::Paren => "pmatrix",
            Self::Bracket => "bmatrix",
            Self::Bar => "vmatrix",
            Self::DoubleBar => "Vmatrix",
        }
    }
}

/// Environment classification, derived solely from the environment name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "variant", rename_all = "snake_case")]
pub enum EnvironmentKind {
    Enumerate,
    Itemize,
    Align(AlignVariant),
    Cases,
    Matrix(MatrixVariant),
    Tasks,
    Tabular,
    Parts,
    Center,
    /// Any name outside the recognized set
    Generic(String),
}

impl EnvironmentKind {
    /// Classify an environment name
    #[must_use = "returns the environment kind"]
    pub fn from_name(name: &str) -> Self {
        match name {
            "enumerate" => Self::Enumerate,
            "itemize" => Self::Itemize,
            "align" => Self::Align(AlignVariant::Align),
            "align*" => Self::Align(AlignVariant::AlignStar),
            "alignat" => Self::Align(AlignVariant::Alignat),
            "alignat*" => Self::Align(AlignVariant::AlignatStar),
            "eqnarray" => Self::Align(AlignVariant::Eqnarray),
            "eqnarray*" => Self::Align(AlignVariant::EqnarrayStar),
            "cases" => Self::Cases,
            "matrix" => Self::Matrix(MatrixVariant::Plain),
            "pmatrix" => Self::Matrix(MatrixVariant::Paren),
            "bmatrix" => Self::Matrix(MatrixVariant::Bracket),
            "vmatrix" => Self::Matrix(MatrixVariant::Bar),
            "Vmatrix" => Self::Matrix(MatrixVariant::DoubleBar),
            "tasks" => Self::Tasks,
            "tabular" => Self::Tabular,
            "parts" => Self::Parts,
            "center" => Self::Center,
            other => Self::Generic(other.to_string()),
        }
    }

    /// True for kinds handed whole to the typesetter as display math
    #[inline]
    #[must_use = "returns whether the environment is opaque"]
    pub const fn is_opaque(&self) -> bool {
        matches!(
            self,
            Self::Align(_) | Self::Cases | Self::Matrix(_) | Self::Generic(_)
        )
    }
}

impl std::fmt::Display for EnvironmentKind {
    #[inline]
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Enumerate => "enumerate",
            Self::Itemize => "itemize",
            Self::Align(variant) => variant.name(),
            Self::Cases => "cases",
            Self::Matrix(variant) => variant.name(),
            Self::Tasks => "tasks",
            Self::Tabular => "tabular",
            Self::Parts => "parts",
            Self::Center => "center",
            Self::Generic(name) => name.as_str(),
        };
        write!(f, "{s}")
    }
}

/// Layout-only annotation on a wrapper environment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Layout {
    #[default]
    Centered,
}

/// One cell of a `tasks` grid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskCell {
    /// 1-based position in the grid
    pub number: usize,
    /// Cell content, typeset inline
    pub content: MathSpan,
}

/// One `\part` of a `parts` environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartItem {
    /// Marks badge, when the marker carried `[n]`
    pub marks: Option<u32>,
    pub content: Vec<Segment>,
}

/// What the dispatcher made of an environment's inner text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EnvironmentBody {
    /// `enumerate` (ordered) or `itemize`
    List {
        ordered: bool,
        items: Vec<Vec<Segment>>,
    },
    /// Opaque environment rendered as one display math span
    Math { span: MathSpan },
    /// `tasks` grid
    Tasks { columns: u32, cells: Vec<TaskCell> },
    /// `tabular`; the first row is the header for presentation purposes
    Table { rows: Vec<Vec<String>> },
    /// `parts` sub-questions
    Parts { parts: Vec<PartItem> },
    /// Layout wrapper around re-parsed content
    Block {
        layout: Layout,
        content: Vec<Segment>,
    },
}

/// A dispatched environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnvironmentNode {
    pub kind: EnvironmentKind,
    /// Environment name as captured from `\begin{name}`
    pub name: String,
    /// Text between `\begin{name}` and `\end{name}`
    pub raw_inner: String,
    pub body: EnvironmentBody,
}

/// One typed unit of parser output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Segment {
    /// Plain text; may carry inline HTML and `<br>` breaks
    Text { text: String },
    /// Inline or display math
    Math(MathSpan),
    /// Resolved image placeholder
    Image(ImageNode),
    /// Dispatched environment
    Environment(EnvironmentNode),
}

impl Segment {
    /// Plain text segment
    #[inline]
    #[must_use = "creates a text segment"]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Text content when this is a text segment
    #[inline]
    #[must_use = "returns the text content"]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// Block kind of a question fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BlockKind {
    /// Question stem, or the whole question when it has no parts
    Main,
    /// Lettered sub-question with its marks
    Part { letter: char, marks: u32 },
}

/// A question fragment before parsing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QuestionBlock {
    pub kind: BlockKind,
    pub content: String,
}

impl QuestionBlock {
    /// Main block
    #[inline]
    #[must_use = "creates a main block"]
    pub fn main(content: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Main,
            content: content.into(),
        }
    }

    /// Part block
    #[inline]
    #[must_use = "creates a part block"]
    pub fn part(letter: char, marks: u32, content: impl Into<String>) -> Self {
        Self {
            kind: BlockKind::Part { letter, marks },
            content: content.into(),
        }
    }
}

/// A question fragment after parsing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedBlock {
    pub kind: BlockKind,
    pub segments: Vec<Segment>,
}

/// Parser output for one question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseTree {
    pub blocks: Vec<ParsedBlock>,
}

impl ParseTree {
    /// Tree holding a single main block
    #[must_use = "creates a parse tree"]
    pub fn single(segments: Vec<Segment>) -> Self {
        Self {
            blocks: vec![ParsedBlock {
                kind: BlockKind::Main,
                segments,
            }],
        }
    }

    /// True when the question was split into lettered parts
    #[inline]
    #[must_use = "returns whether the tree has parts"]
    pub fn is_multi_part(&self) -> bool {
        self.blocks
            .iter()
            .any(|block| matches!(block.kind, BlockKind::Part { .. }))
    }

    /// Sum of the marks of every part
    #[must_use = "returns the total marks"]
    pub fn total_marks(&self) -> u32 {
        self.blocks
            .iter()
            .filter_map(|block| match block.kind {
                BlockKind::Part { marks, .. } => Some(marks),
                BlockKind::Main => None,
            })
            .fold(0, u32::saturating_add)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_kind_from_name() {
        assert_eq!(
            EnvironmentKind::from_name("align*"),
            EnvironmentKind::Align(AlignVariant::AlignStar)
        );
        assert_eq!(
            EnvironmentKind::from_name("Vmatrix"),
            EnvironmentKind::Matrix(MatrixVariant::DoubleBar)
        );
        assert_eq!(
            EnvironmentKind::from_name("figure"),
            EnvironmentKind::Generic("figure".to_string())
        );
    }

    #[test]
    fn test_environment_kind_display_round_trips_name() {
        for name in ["itemize", "alignat*", "bmatrix", "tasks", "center", "proof"] {
            assert_eq!(EnvironmentKind::from_name(name).to_string(), name);
        }
    }

    #[test]
    fn test_opaque_kinds() {
        assert!(EnvironmentKind::Cases.is_opaque());
        assert!(EnvironmentKind::Generic("gather".to_string()).is_opaque());
        assert!(!EnvironmentKind::Itemize.is_opaque());
        assert!(!EnvironmentKind::Center.is_opaque());
    }

    #[test]
    fn test_image_ref_directive() {
        assert_eq!(
            ImageRef::new("a.png", "").to_directive(),
            r"\includegraphics{a.png}"
        );
        assert_eq!(
            ImageRef::new("a.png", "width=3cm").to_directive(),
            r"\includegraphics[width=3cm]{a.png}"
        );
    }

    #[test]
    fn test_image_width_display() {
        assert_eq!(ImageWidth::Auto.to_string(), "auto");
        let width = ImageWidth::Length {
            value: 200.0,
            unit: "px".to_string(),
        };
        assert_eq!(width.to_string(), "200px");
    }

    #[test]
    fn test_segment_serde_tag() {
        let json = serde_json::to_string(&Segment::text("hi")).unwrap();
        assert_eq!(json, r#"{"type":"text","text":"hi"}"#);

        let json = serde_json::to_string(&Segment::Math(MathSpan::inline("x"))).unwrap();
        assert_eq!(json, r#"{"type":"math","latex":"x","display":false}"#);
    }

    #[test]
    fn test_total_marks() {
        let tree = ParseTree {
            blocks: vec![
                ParsedBlock {
                    kind: BlockKind::Main,
                    segments: vec![],
                },
                ParsedBlock {
                    kind: BlockKind::Part {
                        letter: 'a',
                        marks: 2,
                    },
                    segments: vec![],
                },
                ParsedBlock {
                    kind: BlockKind::Part {
                        letter: 'b',
                        marks: 3,
                    },
                    segments: vec![],
                },
            ],
        };
        assert!(tree.is_multi_part());
        assert_eq!(tree.total_marks(), 5);
        assert!(!ParseTree::single(vec![]).is_multi_part());
    }
}
