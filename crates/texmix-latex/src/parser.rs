//! Parse pipeline entry points
//!
//! ```text
//! raw text ─▶ question split ─▶ per block:
//!     environment split ─┬─▶ text:        image extract ─▶ math split ─▶ preprocess ─▶ resolve images
//!                        └─▶ environment: dispatch (re-enters the pipeline)
//! ```
//!
//! Every call is independent: the only state is the image table, which lives
//! for one top-level call.

use crate::dispatch::dispatch;
use crate::environment::{split_environments, Piece};
use crate::images::ImageTable;
use crate::math::{split_math, Span};
use crate::preprocess::preprocess;
use crate::question::split_question;
use serde::{Deserialize, Serialize};
use texmix_core::{ParseTree, ParsedBlock, Segment};

/// Parser configuration.
///
/// Deserializes from a partial table; missing keys keep their defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Environment nesting levels dispatched structurally; deeper
    /// environments render as opaque display math
    pub max_depth: usize,
    /// Split `**Part (x) [n marks]**` markers into part blocks
    pub split_parts: bool,
}

impl Default for ParseOptions {
    #[inline]
    fn default() -> Self {
        Self {
            max_depth: 16,
            split_parts: true,
        }
    }
}

/// Per-call parser state
#[derive(Debug)]
pub(crate) struct Parser {
    images: ImageTable,
    options: ParseOptions,
}

impl Parser {
    pub(crate) fn new(source: &str, options: &ParseOptions) -> Self {
        Self {
            images: ImageTable::for_source(source),
            options: *options,
        }
    }

    #[inline]
    pub(crate) const fn max_depth(&self) -> usize {
        self.options.max_depth
    }

    /// Full pipeline: environments first, then inline content
    pub(crate) fn parse_block(&mut self, text: &str, depth: usize) -> Vec<Segment> {
        let mut segments = Vec::new();
        for piece in split_environments(text) {
            match piece {
                Piece::Text(text) => self.inline_into(text, &mut segments),
                Piece::Environment(env) => {
                    segments.push(Segment::Environment(dispatch(self, env, depth)));
                }
            }
        }
        segments
    }

    /// Inline pipeline: images, math spans and macro rewriting
    pub(crate) fn parse_inline(&mut self, text: &str) -> Vec<Segment> {
        let mut segments = Vec::new();
        self.inline_into(text, &mut segments);
        segments
    }

    fn inline_into(&mut self, text: &str, out: &mut Vec<Segment>) {
        let extracted = self.images.extract(text);
        for span in split_math(&extracted) {
            match span {
                Span::Text(text) => {
                    let rewritten = preprocess(&text);
                    self.images.resolve_into(&rewritten, out);
                }
                Span::Math(mut math) => {
                    math.latex = self.images.restore(&math.latex);
                    out.push(Segment::Math(math));
                }
            }
        }
    }
}

/// Parse one block of content into segments.
///
/// Never fails and never panics: unmatched markup passes through as text and
/// unknown environments render as opaque display math.
///
/// # Examples
///
/// ```rust
/// use texmix_core::{MathSpan, Segment};
/// use texmix_latex::parse;
///
/// let segments = parse("$a$ and $b$");
/// assert_eq!(
///     segments,
///     vec![
///         Segment::Math(MathSpan::inline("a")),
///         Segment::text(" and "),
///         Segment::Math(MathSpan::inline("b")),
///     ]
/// );
/// ```
#[must_use = "returns the parsed segments"]
pub fn parse(text: &str) -> Vec<Segment> {
    parse_with_options(text, &ParseOptions::default())
}

/// [`parse`] with explicit options
#[must_use = "returns the parsed segments"]
pub fn parse_with_options(text: &str, options: &ParseOptions) -> Vec<Segment> {
    Parser::new(text, options).parse_block(text, 0)
}

/// Parse a whole question, splitting it into main and part blocks.
///
/// Image placeholders share one table across all blocks of the question.
#[must_use = "returns the parse tree"]
pub fn parse_question(text: &str) -> ParseTree {
    parse_question_with_options(text, &ParseOptions::default())
}

/// [`parse_question`] with explicit options
#[must_use = "returns the parse tree"]
pub fn parse_question_with_options(text: &str, options: &ParseOptions) -> ParseTree {
    let mut parser = Parser::new(text, options);
    if !options.split_parts {
        return ParseTree::single(parser.parse_block(text, 0));
    }

    let blocks = split_question(text)
        .into_iter()
        .map(|block| ParsedBlock {
            kind: block.kind,
            segments: parser.parse_block(&block.content, 0),
        })
        .collect();
    ParseTree { blocks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use texmix_core::{
        BlockKind, EnvironmentBody, EnvironmentKind, ImageNode, ImageRef, ImageWidth, MathSpan,
    };

    #[test]
    fn test_parse_options_default() {
        let options = ParseOptions::default();
        assert_eq!(options.max_depth, 16);
        assert!(options.split_parts);
    }

    #[test]
    fn test_parse_options_partial_deserialize() {
        let options: ParseOptions = serde_json::from_str(r#"{"split_parts":false}"#).unwrap();
        assert_eq!(options.max_depth, 16);
        assert!(!options.split_parts);
    }

    #[test]
    fn test_plain_text_single_segment() {
        assert_eq!(parse("No markup here."), vec![Segment::text("No markup here.")]);
    }

    #[test]
    fn test_display_math_no_stray_dollars() {
        assert_eq!(parse("$$a$$"), vec![Segment::Math(MathSpan::display("a"))]);
    }

    #[test]
    fn test_math_keeps_raw_latex() {
        // Rewrites apply to text only; the typesetter tries them on math itself
        assert_eq!(
            parse(r"$\cfrac{1}{2}$"),
            vec![Segment::Math(MathSpan::inline(r"\cfrac{1}{2}"))]
        );
    }

    #[test]
    fn test_text_line_breaks() {
        assert_eq!(
            parse(r"one\\two $x \\ y$"),
            vec![
                Segment::text("one<br>two "),
                Segment::Math(MathSpan::inline(r"x \\ y")),
            ]
        );
    }

    #[test]
    fn test_image_segment() {
        let segments = parse(r"See \includegraphics[width=200px]{  http://x/y.png  } below");
        assert_eq!(
            segments,
            vec![
                Segment::text("See "),
                Segment::Image(ImageNode {
                    image: ImageRef::new("http://x/y.png", "width=200px"),
                    width: ImageWidth::Length {
                        value: 200.0,
                        unit: "px".to_string(),
                    },
                }),
                Segment::text(" below"),
            ]
        );
    }

    #[test]
    fn test_image_inside_math_restored() {
        assert_eq!(
            parse(r"$x \includegraphics{a.png}$"),
            vec![Segment::Math(MathSpan::inline(r"x \includegraphics{a.png}"))]
        );
    }

    #[test]
    fn test_empty_image_url_dropped() {
        assert_eq!(parse(r"a\includegraphics{ }b"), vec![Segment::text("ab")]);
    }

    #[test]
    fn test_itemize_two_items() {
        let segments = parse(r"\begin{itemize}\item A\item B\end{itemize}");
        assert_eq!(segments.len(), 1);
        let Segment::Environment(node) = &segments[0] else {
            panic!("expected environment");
        };
        assert_eq!(node.kind, EnvironmentKind::Itemize);
        assert_eq!(
            node.body,
            EnvironmentBody::List {
                ordered: false,
                items: vec![vec![Segment::text("A")], vec![Segment::text("B")]],
            }
        );
    }

    #[test]
    fn test_unclosed_environment_matches_no_environment_case() {
        let text = r"Start \begin{cases} x $y$";
        let without_env = parse_with_options(text, &ParseOptions::default());
        assert_eq!(
            without_env,
            vec![
                Segment::text(r"Start \begin{cases} x "),
                Segment::Math(MathSpan::inline("y")),
            ]
        );
    }

    #[test]
    fn test_reparse_plain_leaf_is_stable() {
        let first = parse("Plain words.");
        let Some(text) = first[0].as_text() else {
            panic!("expected text");
        };
        assert_eq!(parse(text), first);
    }

    #[test]
    fn test_parse_question_blocks() {
        let tree = parse_question(
            "Intro **Part (a) [2 marks]** Do $x$ **Part (b) [3 marks]** Do Y",
        );
        assert_eq!(tree.blocks.len(), 3);
        assert_eq!(tree.blocks[0].kind, BlockKind::Main);
        assert_eq!(tree.blocks[0].segments, vec![Segment::text("Intro")]);
        assert_eq!(tree.blocks[1].kind, BlockKind::Part { letter: 'a', marks: 2 });
        assert_eq!(
            tree.blocks[1].segments,
            vec![Segment::text("Do "), Segment::Math(MathSpan::inline("x"))]
        );
        assert_eq!(tree.total_marks(), 5);
    }

    #[test]
    fn test_parse_question_without_splitting() {
        let options = ParseOptions {
            split_parts: false,
            ..ParseOptions::default()
        };
        let tree = parse_question_with_options("A **Part (a) [2 marks]** B", &options);
        assert_eq!(
            tree,
            ParseTree::single(vec![Segment::text("A **Part (a) [2 marks]** B")])
        );
    }

    #[test]
    fn test_images_across_parts_share_table() {
        let tree = parse_question(
            r"\includegraphics{a.png} **Part (a) [1 marks]** \includegraphics{b.png}",
        );
        let urls: Vec<&str> = tree
            .blocks
            .iter()
            .flat_map(|block| &block.segments)
            .filter_map(|segment| match segment {
                Segment::Image(node) => Some(node.image.url.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(urls, vec!["a.png", "b.png"]);
    }
}
