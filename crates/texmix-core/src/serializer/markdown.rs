//! Markdown serialization for [`ParseTree`].
//!
//! Produces a readable Markdown rendition of a parsed question: math keeps
//! its `$`/`$$` delimiters, lists and parts become numbered or bulleted
//! lists, `tabular` becomes a GitHub-style table and images become image
//! links.
//!
//! # Examples
//!
//! ```rust
//! use texmix_core::content::{MathSpan, ParseTree, Segment};
//! use texmix_core::MarkdownSerializer;
//!
//! let tree = ParseTree::single(vec![
//!     Segment::text("Solve "),
//!     Segment::Math(MathSpan::inline("x^2 = 4")),
//! ]);
//! assert_eq!(MarkdownSerializer::new().serialize(&tree), "Solve $x^2 = 4$");
//! ```

use crate::content::{
    BlockKind, EnvironmentBody, EnvironmentNode, ImageNode, ImageWidth, MathSpan, ParseTree,
    Segment, LINE_BREAK,
};
use log::trace;

/// Configuration options for markdown serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkdownOptions {
    /// Number of spaces used to indent list-item continuation lines.
    ///
    /// Default: 3 (aligns with `1. `).
    pub indent: usize,

    /// Render `<br>` markers as Markdown hard breaks (two spaces + newline).
    ///
    /// When `false` the marker is kept as inline HTML.
    ///
    /// Default: `true`.
    pub hard_breaks: bool,

    /// Include a `[n marks]` badge after part headings and `\part` items.
    ///
    /// Default: `true`.
    pub show_marks: bool,
}

impl Default for MarkdownOptions {
    #[inline]
    fn default() -> Self {
        Self {
            indent: 3,
            hard_breaks: true,
            show_marks: true,
        }
    }
}

/// Markdown serializer for [`ParseTree`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MarkdownSerializer {
    options: MarkdownOptions,
}

impl MarkdownSerializer {
    /// Create a new markdown serializer with default options
    #[inline]
    #[must_use = "creates serializer with default options"]
    pub const fn new() -> Self {
        Self {
            options: MarkdownOptions {
                indent: 3,
                hard_breaks: true,
                show_marks: true,
            },
        }
    }

    /// Create a new markdown serializer with custom options
    #[inline]
    #[must_use = "creates serializer with custom options"]
    pub const fn with_options(options: MarkdownOptions) -> Self {
        Self { options }
    }

    /// Serialize a whole question
    #[must_use = "serialization returns markdown string"]
    pub fn serialize(&self, tree: &ParseTree) -> String {
        let parts: Vec<String> = tree
            .blocks
            .iter()
            .map(|block| {
                let body = self.serialize_segments(&block.segments);
                match block.kind {
                    BlockKind::Main => body,
                    BlockKind::Part { letter, marks } => {
                        let heading = if self.options.show_marks {
                            format!("**Part ({letter})** [{marks} marks]")
                        } else {
                            format!("**Part ({letter})**")
                        };
                        if body.is_empty() {
                            heading
                        } else {
                            format!("{heading}\n\n{body}")
                        }
                    }
                }
            })
            .filter(|part| !part.is_empty())
            .collect();
        parts.join("\n\n")
    }

    /// Serialize a segment sequence
    #[must_use = "serialization returns markdown string"]
    pub fn serialize_segments(&self, segments: &[Segment]) -> String {
        let mut out = String::new();
        let mut after_block = false;

        for segment in segments {
            match segment {
                Segment::Text { text } => {
                    let text = self.post_process(text);
                    if after_block {
                        let text = text.trim_start();
                        if text.is_empty() {
                            continue;
                        }
                        out.push_str("\n\n");
                        out.push_str(text);
                        after_block = false;
                    } else {
                        out.push_str(&text);
                    }
                }
                Segment::Math(span) if !span.display => {
                    if after_block {
                        out.push_str("\n\n");
                        after_block = false;
                    }
                    out.push_str(&Self::inline_math(span));
                }
                Segment::Math(span) => {
                    Self::push_block(&mut out, &Self::display_math(span));
                    after_block = true;
                }
                Segment::Image(image) => {
                    Self::push_block(&mut out, &Self::serialize_image(image));
                    after_block = true;
                }
                Segment::Environment(env) => {
                    let block = self.serialize_environment(env);
                    if block.is_empty() {
                        trace!("environment '{}' serialized to nothing", env.name);
                        continue;
                    }
                    Self::push_block(&mut out, &block);
                    after_block = true;
                }
            }
        }

        out.trim_end().to_string()
    }

    fn serialize_environment(&self, env: &EnvironmentNode) -> String {
        match &env.body {
            EnvironmentBody::List { ordered, items } => {
                let lines: Vec<String> = items
                    .iter()
                    .enumerate()
                    .map(|(idx, item)| {
                        let marker = if *ordered {
                            format!("{}.", idx + 1)
                        } else {
                            "-".to_string()
                        };
                        self.list_item(&marker, &self.serialize_segments(item))
                    })
                    .collect();
                lines.join("\n")
            }
            EnvironmentBody::Math { span } => Self::display_math(span),
            EnvironmentBody::Tasks { cells, .. } => cells
                .iter()
                .map(|cell| {
                    self.list_item(&format!("{}.", cell.number), &Self::inline_math(&cell.content))
                })
                .collect::<Vec<_>>()
                .join("\n"),
            EnvironmentBody::Table { rows } => Self::serialize_table(rows).unwrap_or_default(),
            EnvironmentBody::Parts { parts } => parts
                .iter()
                .enumerate()
                .map(|(idx, part)| {
                    let content = self.serialize_segments(&part.content);
                    let content = match part.marks {
                        Some(marks) if self.options.show_marks => {
                            format!("[{marks} marks] {content}")
                        }
                        _ => content,
                    };
                    self.list_item(&format!("{}.", idx + 1), &content)
                })
                .collect::<Vec<_>>()
                .join("\n"),
            EnvironmentBody::Block { content, .. } => self.serialize_segments(content),
        }
    }

    /// Format one list item, indenting continuation lines under the marker
    fn list_item(&self, marker: &str, content: &str) -> String {
        let indent = " ".repeat(self.options.indent);
        let mut lines = content.lines();
        let first = lines.next().unwrap_or_default();
        let mut item = format!("{marker} {first}");
        for line in lines {
            item.push('\n');
            if !line.is_empty() {
                item.push_str(&indent);
                item.push_str(line);
            }
        }
        item
    }

    /// Serialize table rows to a GitHub-style table; the first row is the header
    fn serialize_table(rows: &[Vec<String>]) -> Option<String> {
        let num_cols = rows.iter().map(Vec::len).max()?;
        if num_cols == 0 {
            return None;
        }

        let format_row = |row: &Vec<String>| {
            let cells: Vec<String> = (0..num_cols)
                .map(|idx| {
                    row.get(idx)
                        .map(|cell| cell.replace('|', "\\|"))
                        .unwrap_or_default()
                })
                .collect();
            format!("| {} |", cells.join(" | "))
        };

        let mut md_lines = Vec::with_capacity(rows.len() + 1);
        md_lines.push(format_row(&rows[0]));
        let separators = vec!["---"; num_cols];
        md_lines.push(format!("|{}|", separators.join("|")));
        md_lines.extend(rows.iter().skip(1).map(format_row));
        Some(md_lines.join("\n"))
    }

    fn serialize_image(image: &ImageNode) -> String {
        match &image.width {
            ImageWidth::Auto => format!("![image]({})", image.image.url),
            width @ ImageWidth::Length { .. } => {
                format!("![image]({}) <!-- width: {width} -->", image.image.url)
            }
        }
    }

    fn inline_math(span: &MathSpan) -> String {
        format!("${}$", span.latex)
    }

    fn display_math(span: &MathSpan) -> String {
        format!("$$\n{}\n$$", span.latex.trim())
    }

    /// Start a block-level element on its own paragraph
    fn push_block(out: &mut String, block: &str) {
        let trimmed_len = out.trim_end().len();
        out.truncate(trimmed_len);
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str(block);
    }

    fn post_process(&self, text: &str) -> String {
        if self.options.hard_breaks {
            text.replace(LINE_BREAK, "  \n")
        } else {
            text.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{
        EnvironmentKind, ImageRef, Layout, ParsedBlock, PartItem, TaskCell,
    };

    fn env(name: &str, body: EnvironmentBody) -> Segment {
        Segment::Environment(EnvironmentNode {
            kind: EnvironmentKind::from_name(name),
            name: name.to_string(),
            raw_inner: String::new(),
            body,
        })
    }

    #[test]
    fn test_serialize_inline_and_display_math() {
        let serializer = MarkdownSerializer::new();
        let md = serializer.serialize_segments(&[
            Segment::text("Let "),
            Segment::Math(MathSpan::inline("x")),
            Segment::text(" be real."),
            Segment::Math(MathSpan::display("x^2 \\ge 0")),
            Segment::text(" Done."),
        ]);
        assert_eq!(md, "Let $x$ be real.\n\n$$\nx^2 \\ge 0\n$$\n\nDone.");
    }

    #[test]
    fn test_serialize_line_breaks() {
        let md = MarkdownSerializer::new().serialize_segments(&[Segment::text("a<br>b")]);
        assert_eq!(md, "a  \nb");

        let serializer = MarkdownSerializer::with_options(MarkdownOptions {
            hard_breaks: false,
            ..Default::default()
        });
        assert_eq!(
            serializer.serialize_segments(&[Segment::text("a<br>b")]),
            "a<br>b"
        );
    }

    #[test]
    fn test_serialize_lists() {
        let serializer = MarkdownSerializer::new();
        let md = serializer.serialize_segments(&[env(
            "enumerate",
            EnvironmentBody::List {
                ordered: true,
                items: vec![vec![Segment::text("A")], vec![Segment::text("B")]],
            },
        )]);
        assert_eq!(md, "1. A\n2. B");

        let md = serializer.serialize_segments(&[env(
            "itemize",
            EnvironmentBody::List {
                ordered: false,
                items: vec![vec![Segment::text("A")]],
            },
        )]);
        assert_eq!(md, "- A");
    }

    #[test]
    fn test_serialize_table() {
        let md = MarkdownSerializer::new().serialize_segments(&[env(
            "tabular",
            EnvironmentBody::Table {
                rows: vec![
                    vec!["x".to_string(), "y".to_string()],
                    vec!["1".to_string(), "2".to_string()],
                ],
            },
        )]);
        assert_eq!(md, "| x | y |\n|---|---|\n| 1 | 2 |");
    }

    #[test]
    fn test_serialize_ragged_table_pads_cells() {
        let md = MarkdownSerializer::serialize_table(&[
            vec!["a".to_string()],
            vec!["b".to_string(), "c|d".to_string()],
        ])
        .unwrap();
        assert_eq!(md, "| a |  |\n|---|---|\n| b | c\\|d |");
    }

    #[test]
    fn test_serialize_tasks_and_parts() {
        let serializer = MarkdownSerializer::new();
        let md = serializer.serialize_segments(&[env(
            "tasks",
            EnvironmentBody::Tasks {
                columns: 2,
                cells: vec![
                    TaskCell {
                        number: 1,
                        content: MathSpan::inline("x+1"),
                    },
                    TaskCell {
                        number: 2,
                        content: MathSpan::inline("x-1"),
                    },
                ],
            },
        )]);
        assert_eq!(md, "1. $x+1$\n2. $x-1$");

        let md = serializer.serialize_segments(&[env(
            "parts",
            EnvironmentBody::Parts {
                parts: vec![
                    PartItem {
                        marks: Some(3),
                        content: vec![Segment::text("Find x.")],
                    },
                    PartItem {
                        marks: None,
                        content: vec![Segment::text("Hence y.")],
                    },
                ],
            },
        )]);
        assert_eq!(md, "1. [3 marks] Find x.\n2. Hence y.");
    }

    #[test]
    fn test_serialize_image_and_center() {
        let md = MarkdownSerializer::new().serialize_segments(&[env(
            "center",
            EnvironmentBody::Block {
                layout: Layout::Centered,
                content: vec![Segment::Image(ImageNode {
                    image: ImageRef::new("http://x/y.png", "width=200px"),
                    width: ImageWidth::Length {
                        value: 200.0,
                        unit: "px".to_string(),
                    },
                })],
            },
        )]);
        assert_eq!(md, "![image](http://x/y.png) <!-- width: 200px -->");
    }

    #[test]
    fn test_serialize_multi_part_tree() {
        let tree = ParseTree {
            blocks: vec![
                ParsedBlock {
                    kind: BlockKind::Main,
                    segments: vec![Segment::text("Intro")],
                },
                ParsedBlock {
                    kind: BlockKind::Part {
                        letter: 'a',
                        marks: 2,
                    },
                    segments: vec![Segment::text("Do X")],
                },
            ],
        };
        assert_eq!(
            MarkdownSerializer::new().serialize(&tree),
            "Intro\n\n**Part (a)** [2 marks]\n\nDo X"
        );
    }

    #[test]
    fn test_markdown_serializer_default() {
        assert_eq!(MarkdownSerializer::default(), MarkdownSerializer::new());
    }
}
