//! Typesetting adapter and the fallback chain around it
//!
//! The math engine is an external collaborator behind [`Typesetter`]. Every
//! span goes through three tiers, composed with `Result::or_else`:
//!
//! 1. the span with the math-level rewrites applied ([`preprocess_math`])
//! 2. the span exactly as written
//! 3. the span as literal text
//!
//! The last tier cannot fail, so [`typeset`] returns a plain [`Typeset`], never
//! a `Result`: something readable is always produced.

use crate::preprocess::preprocess_math;
use serde::Serialize;
use texmix_core::{EnvironmentBody, MathSpan, ParseTree, Segment, LINE_BREAK};
use thiserror::Error;

/// Typesetting failure reported by an adapter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesetError {
    #[error("unbalanced braces")]
    UnbalancedBraces,

    #[error("unbalanced \\left/\\right delimiters")]
    UnbalancedDelimiters,

    #[error("mismatched environment: expected \\end{{{expected}}}, found {found}")]
    MismatchedEnvironment { expected: String, found: String },

    #[error("unsupported command {0}")]
    UnsupportedCommand(String),

    #[error("markup leaked into math: {0}")]
    LeakedMarkup(String),

    /// Error raised by the engine itself
    #[error("typesetting engine error: {0}")]
    Engine(String),
}

/// Math typesetting engine
pub trait Typesetter {
    /// Rendered form of one span
    type Output;

    /// Render `latex` in display or inline mode
    ///
    /// # Errors
    ///
    /// Returns [`TypesetError`] when the engine rejects the input.
    fn render(&self, latex: &str, display: bool) -> Result<Self::Output, TypesetError>;
}

/// Outcome of the fallback chain, by tier reached
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Typeset<T> {
    /// Rendered after math-level rewriting
    Rendered(T),
    /// Rendered from the span as written
    RenderedRaw(T),
    /// Engine rejected both; the raw LaTeX shown as text
    Literal(String),
}

impl<T> Typeset<T> {
    /// Tier reached
    #[inline]
    #[must_use = "returns the fallback tier"]
    pub const fn tier(&self) -> Tier {
        match self {
            Self::Rendered(_) => Tier::Rendered,
            Self::RenderedRaw(_) => Tier::RenderedRaw,
            Self::Literal(_) => Tier::Literal,
        }
    }

    /// True when the engine produced output
    #[inline]
    #[must_use = "returns whether the span rendered"]
    pub const fn is_rendered(&self) -> bool {
        !matches!(self, Self::Literal(_))
    }
}

/// Fallback tier, without the payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Rendered,
    RenderedRaw,
    Literal,
}

/// Typeset one span through the three-tier fallback chain
pub fn typeset<T: Typesetter + ?Sized>(typesetter: &T, span: &MathSpan) -> Typeset<T::Output> {
    let preprocessed = preprocess_math(&span.latex);
    typesetter
        .render(&preprocessed, span.display)
        .map(Typeset::Rendered)
        .or_else(|err| {
            log::warn!("typesetting failed ({err}); retrying without rewrites");
            typesetter
                .render(&span.latex, span.display)
                .map(Typeset::RenderedRaw)
        })
        .unwrap_or_else(|err| {
            log::warn!("typesetting failed again ({err}); showing literal LaTeX");
            Typeset::Literal(span.latex.clone())
        })
}

/// Syntax checker used as a stand-in engine.
///
/// Accepts any span a conventional engine would plausibly accept: braces
/// balance (escaped `\{`/`\}` ignored), `\left`/`\right` pair up,
/// `\begin`/`\end` nest properly, no `<br>` markers and no command from
/// `unsupported_commands`. On success the output is the checked LaTeX.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxCheck {
    /// Commands the target engine lacks (matched on a word boundary)
    pub unsupported_commands: Vec<String>,
}

impl Default for SyntaxCheck {
    fn default() -> Self {
        Self {
            unsupported_commands: vec![r"\cfrac".to_string()],
        }
    }
}

impl SyntaxCheck {
    /// Checker rejecting the given commands
    #[must_use = "creates a syntax checker"]
    pub fn with_unsupported<I, S>(commands: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            unsupported_commands: commands.into_iter().map(Into::into).collect(),
        }
    }

    fn check_braces(latex: &str) -> Result<(), TypesetError> {
        let mut depth = 0i64;
        let mut chars = latex.chars();
        while let Some(ch) = chars.next() {
            match ch {
                '\\' => {
                    chars.next();
                }
                '{' => depth += 1,
                '}' => {
                    depth -= 1;
                    if depth < 0 {
                        return Err(TypesetError::UnbalancedBraces);
                    }
                }
                _ => {}
            }
        }
        if depth == 0 {
            Ok(())
        } else {
            Err(TypesetError::UnbalancedBraces)
        }
    }

    fn check_environments(latex: &str) -> Result<(), TypesetError> {
        let mut stack: Vec<&str> = Vec::new();
        for (at, command) in commands(latex) {
            let (is_begin, is_end) = (command == "begin", command == "end");
            if !is_begin && !is_end {
                continue;
            }
            let Some(name) = braced_name(&latex[at..]) else {
                continue;
            };
            if is_begin {
                stack.push(name);
            } else {
                match stack.pop() {
                    Some(open) if open == name => {}
                    Some(open) => {
                        return Err(TypesetError::MismatchedEnvironment {
                            expected: open.to_string(),
                            found: format!("\\end{{{name}}}"),
                        })
                    }
                    None => {
                        return Err(TypesetError::MismatchedEnvironment {
                            expected: String::new(),
                            found: format!("\\end{{{name}}}"),
                        })
                    }
                }
            }
        }
        match stack.pop() {
            Some(open) => Err(TypesetError::MismatchedEnvironment {
                expected: open.to_string(),
                found: "end of input".to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl Typesetter for SyntaxCheck {
    type Output = String;

    fn render(&self, latex: &str, _display: bool) -> Result<String, TypesetError> {
        if latex.contains(LINE_BREAK) {
            return Err(TypesetError::LeakedMarkup(LINE_BREAK.to_string()));
        }
        Self::check_braces(latex)?;

        let mut balance = 0i64;
        for (_, command) in commands(latex) {
            match command {
                "left" => balance += 1,
                "right" => {
                    balance -= 1;
                    if balance < 0 {
                        return Err(TypesetError::UnbalancedDelimiters);
                    }
                }
                _ => {}
            }
            if let Some(unsupported) = self
                .unsupported_commands
                .iter()
                .find(|c| c.trim_start_matches('\\') == command)
            {
                return Err(TypesetError::UnsupportedCommand(unsupported.clone()));
            }
        }
        if balance != 0 {
            return Err(TypesetError::UnbalancedDelimiters);
        }

        Self::check_environments(latex)?;
        Ok(latex.to_string())
    }
}

/// Alphabetic command names in `latex`, each with the byte offset just past
/// the name
fn commands(latex: &str) -> impl Iterator<Item = (usize, &str)> {
    let bytes = latex.as_bytes();
    let mut i = 0;
    std::iter::from_fn(move || {
        while i < bytes.len() {
            if bytes[i] != b'\\' {
                i += 1;
                continue;
            }
            let start = i + 1;
            let end = start
                + bytes[start..]
                    .iter()
                    .take_while(|b| b.is_ascii_alphabetic())
                    .count();
            if end == start {
                // Control symbol such as `\\` or `\{`: skip both bytes
                i = start + 1;
                continue;
            }
            i = end;
            return Some((end, &latex[start..end]));
        }
        None
    })
}

/// `name` from a `{name}` group at the start of `rest`
fn braced_name(rest: &str) -> Option<&str> {
    let inner = rest.strip_prefix('{')?;
    let close = inner.find('}')?;
    Some(&inner[..close])
}

/// Where a typeset span came from
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SpanSource {
    /// Inline or display math segment
    Math,
    /// Opaque environment
    Environment { name: String },
    /// `tasks` cell
    TaskCell { number: usize },
    /// `tabular` cell
    TableCell { row: usize, column: usize },
}

impl std::fmt::Display for SpanSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Math => write!(f, "math"),
            Self::Environment { name } => write!(f, "environment {name}"),
            Self::TaskCell { number } => write!(f, "task cell {number}"),
            Self::TableCell { row, column } => write!(f, "table cell ({row}, {column})"),
        }
    }
}

/// One typeset span in a report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SpanReport {
    /// Index of the block holding the span
    pub block: usize,
    pub source: SpanSource,
    pub latex: String,
    pub display: bool,
    pub tier: Tier,
}

/// Result of typesetting every span of a tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TypesetReport {
    pub spans: Vec<SpanReport>,
}

impl TypesetReport {
    /// Number of spans that reached `tier`
    #[must_use = "returns the tier count"]
    pub fn count(&self, tier: Tier) -> usize {
        self.spans.iter().filter(|span| span.tier == tier).count()
    }

    /// Spans that fell back to literal text
    pub fn literals(&self) -> impl Iterator<Item = &SpanReport> {
        self.spans.iter().filter(|span| span.tier == Tier::Literal)
    }

    /// True when every span rendered
    #[must_use = "returns whether every span rendered"]
    pub fn all_rendered(&self) -> bool {
        self.literals().next().is_none()
    }
}

/// Typeset every math span of `tree`: math segments, opaque environments,
/// task cells and table cells (inline), including those nested in lists,
/// parts and layout blocks
pub fn typeset_tree<T: Typesetter + ?Sized>(typesetter: &T, tree: &ParseTree) -> TypesetReport {
    let mut report = TypesetReport::default();
    for (index, block) in tree.blocks.iter().enumerate() {
        walk_segments(typesetter, index, &block.segments, &mut report);
    }
    report
}

fn walk_segments<T: Typesetter + ?Sized>(
    typesetter: &T,
    block: usize,
    segments: &[Segment],
    report: &mut TypesetReport,
) {
    for segment in segments {
        match segment {
            Segment::Text { .. } | Segment::Image(_) => {}
            Segment::Math(span) => record(typesetter, block, SpanSource::Math, span, report),
            Segment::Environment(node) => match &node.body {
                EnvironmentBody::Math { span } => {
                    let source = SpanSource::Environment {
                        name: node.name.clone(),
                    };
                    record(typesetter, block, source, span, report);
                }
                EnvironmentBody::List { items, .. } => {
                    for item in items {
                        walk_segments(typesetter, block, item, report);
                    }
                }
                EnvironmentBody::Parts { parts } => {
                    for part in parts {
                        walk_segments(typesetter, block, &part.content, report);
                    }
                }
                EnvironmentBody::Block { content, .. } => {
                    walk_segments(typesetter, block, content, report);
                }
                EnvironmentBody::Tasks { cells, .. } => {
                    for cell in cells {
                        let source = SpanSource::TaskCell {
                            number: cell.number,
                        };
                        record(typesetter, block, source, &cell.content, report);
                    }
                }
                EnvironmentBody::Table { rows } => {
                    for (row, cells) in rows.iter().enumerate() {
                        for (column, cell) in cells.iter().enumerate() {
                            if cell.is_empty() {
                                continue;
                            }
                            let source = SpanSource::TableCell { row, column };
                            let span = MathSpan::inline(cell.as_str());
                            record(typesetter, block, source, &span, report);
                        }
                    }
                }
            },
        }
    }
}

fn record<T: Typesetter + ?Sized>(
    typesetter: &T,
    block: usize,
    source: SpanSource,
    span: &MathSpan,
    report: &mut TypesetReport,
) {
    let tier = typeset(typesetter, span).tier();
    report.spans.push(SpanReport {
        block,
        source,
        latex: span.latex.clone(),
        display: span.display,
        tier,
    });
}
