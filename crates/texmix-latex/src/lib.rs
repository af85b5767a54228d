//! # texmix-latex
//!
//! Parser for author-entered question text: prose mixed with inline and
//! display math, LaTeX-style environments, `\includegraphics` directives and
//! `**Part (a) [2 marks]**` sub-question markers. The output is a
//! [`texmix_core::ParseTree`] of typed segments; layout and math typesetting
//! are left to the consumer.
//!
//! Parsing never fails. Malformed markup passes through as text and unknown
//! environments render as opaque display math, so every input yields
//! something readable.
//!
//! ## Supported Markup
//!
//! ### Math Delimiters
//!
//! | Delimiter | Mode |
//! |-----------|------|
//! | `$$…$$` | Display |
//! | `$…$` | Inline (single line, non-empty) |
//! | `\[…\]` | Display |
//! | `\(…\)` | Inline |
//!
//! ### Environments
//!
//! | Environment | Output |
//! |-------------|--------|
//! | `enumerate`, `itemize` | Ordered / unordered list |
//! | `align`, `alignat`, `eqnarray` (and starred) | Opaque display math |
//! | `cases`, `matrix`, `pmatrix`, `bmatrix`, `vmatrix`, `Vmatrix` | Opaque display math |
//! | `tasks` | Numbered grid of inline-math cells |
//! | `tabular` | Rows of cells, first row as header |
//! | `parts` | Numbered sub-questions with marks badges |
//! | `center` | Re-parsed content, centered |
//! | anything else | Opaque display math |
//!
//! ### Text Macros
//!
//! | Command | Rewrite |
//! |---------|---------|
//! | `\textcolor{c}{x}` | `\color{c}{x}` |
//! | `\cfrac` | `\frac` |
//! | `\item[n]`, `\item` | `n. `, `• ` |
//! | `\\`, `\newline`, `\par` | `<br>`, `<br>`, `<br><br>` |
//! | `\centering`, `\vspace{}`, `\hspace{}` | removed |
//!
//! ## Quick Start
//!
//! ```rust
//! use texmix_core::{BlockKind, MarkdownSerializer};
//! use texmix_latex::parse_question;
//!
//! let tree = parse_question(
//!     "Let $f(x) = x^2$. **Part (a) [2 marks]** Find $f(3)$. **Part (b) [1 marks]** Sketch $f$.",
//! );
//!
//! assert_eq!(tree.blocks.len(), 3);
//! assert_eq!(tree.blocks[1].kind, BlockKind::Part { letter: 'a', marks: 2 });
//! assert_eq!(tree.total_marks(), 3);
//!
//! let markdown = MarkdownSerializer::new().serialize(&tree);
//! assert!(markdown.contains("**Part (a)** [2 marks]"));
//! ```
//!
//! ## Typesetting
//!
//! Math spans carry the LaTeX as written. [`typeset()`] runs a span through a
//! [`Typesetter`] with a three-tier fallback (rewritten, as written, literal
//! text); [`typeset_tree`] does so for every span of a tree. [`SyntaxCheck`]
//! is a built-in checker usable as an engine.
//!
//! ## Limitations
//!
//! - **Same-name nesting**: `\begin{x}` closes at the first `\end{x}`, so an
//!   environment nested in one of the same name truncates the outer one.
//! - **No macro expansion**: user-defined commands are left as written.
//! - **Inline HTML**: passes through untouched.

pub mod dispatch;
pub mod environment;
pub mod images;
pub mod math;
pub mod parser;
pub mod preprocess;
pub mod question;
pub mod typeset;

pub use dispatch::{split_list_items, split_parts, split_table_rows, split_tasks};
pub use environment::{split_environments, Piece, RawEnvironment};
pub use images::{
    cdn_image_url, extract_images, has_image_references, image_urls, parse_width,
    rewrite_image_urls, ImageExtraction, ImageTable,
};
pub use math::{split_math, Span};
pub use parser::{
    parse, parse_question, parse_question_with_options, parse_with_options, ParseOptions,
};
pub use preprocess::{preprocess, preprocess_math};
pub use question::split_question;
pub use typeset::{
    typeset, typeset_tree, SpanReport, SpanSource, SyntaxCheck, Tier, Typeset, TypesetError,
    TypesetReport, Typesetter,
};
