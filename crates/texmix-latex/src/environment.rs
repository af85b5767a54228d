//! `\begin{name}…\end{name}` block extraction
//!
//! Matching is shallow: a `\begin{name}` closes at the first following
//! `\end{name}`, without counting nested openers of the same name. An
//! environment nested inside one of the same name therefore truncates the
//! outer block at the inner `\end`. Blocks of different names nest fine,
//! since the inner one travels inside the outer block's raw text.

use regex::Regex;
use std::sync::LazyLock;
use texmix_core::EnvironmentKind;

static RE_BEGIN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\begin\{([A-Za-z0-9_]+\*?)\}").expect("valid begin regex"));

/// An environment located in the source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawEnvironment<'a> {
    /// Name captured from `\begin{name}`
    pub name: &'a str,
    /// Text between the opening and closing tags
    pub inner: &'a str,
}

impl RawEnvironment<'_> {
    /// Classify by name
    #[must_use = "returns the environment kind"]
    pub fn kind(&self) -> EnvironmentKind {
        EnvironmentKind::from_name(self.name)
    }

    /// `\begin{name}inner\end{name}` as written
    #[must_use = "returns the environment source"]
    pub fn source(&self) -> String {
        format!("\\begin{{{0}}}{1}\\end{{{0}}}", self.name, self.inner)
    }
}

/// One piece of a split block, in source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Text(&'a str),
    Environment(RawEnvironment<'a>),
}

/// Split `text` into plain-text pieces and environments.
///
/// A `\begin` without a matching `\end` is left in the text untouched. When
/// an opaque environment (align family, cases, matrices, unknown names) sits
/// directly inside an open `$$…$$` or `\[…\]`, the wrapping delimiters are
/// consumed with it, since the environment already renders as display math.
/// Empty text pieces are not emitted.
#[must_use = "returns the split pieces"]
pub fn split_environments(text: &str) -> Vec<Piece<'_>> {
    let mut pieces = Vec::new();
    let mut text_start = 0;
    let mut search = 0;

    while let Some(cap) = RE_BEGIN.captures_at(text, search) {
        let (Some(open), Some(name)) = (cap.get(0), cap.get(1)) else {
            break;
        };
        let name = name.as_str();
        let close = format!("\\end{{{name}}}");

        let Some(offset) = text[open.end()..].find(&close) else {
            log::debug!("unmatched \\begin{{{name}}} left as text");
            search = open.end();
            continue;
        };
        let inner_end = open.end() + offset;
        let env = RawEnvironment {
            name,
            inner: &text[open.end()..inner_end],
        };

        let mut start = open.start();
        let mut end = inner_end + close.len();
        if env.kind().is_opaque() {
            if let Some((outer_start, outer_end)) =
                display_wrapper(text, text_start, start, end)
            {
                start = outer_start;
                end = outer_end;
            }
        }

        if start > text_start {
            pieces.push(Piece::Text(&text[text_start..start]));
        }
        log::trace!("environment '{name}' at {start}..{end}");
        pieces.push(Piece::Environment(env));
        text_start = end;
        search = end;
    }

    if text_start < text.len() {
        pieces.push(Piece::Text(&text[text_start..]));
    }
    pieces
}

/// Bounds of an open display delimiter pair directly around `start..end`.
///
/// `$$` only counts as an opener when the text piece before it holds an odd
/// number of `$$`; `\[` is always an opener.
fn display_wrapper(
    text: &str,
    piece_start: usize,
    start: usize,
    end: usize,
) -> Option<(usize, usize)> {
    let before = text[piece_start..start].trim_end();
    let after = &text[end..];
    let after_trimmed = after.trim_start();
    let gap = after.len() - after_trimmed.len();

    let (opener, closer) = if before.ends_with("$$") && before.matches("$$").count() % 2 == 1 {
        ("$$", "$$")
    } else if before.ends_with(r"\[") {
        (r"\[", r"\]")
    } else {
        return None;
    };
    if !after_trimmed.starts_with(closer) {
        return None;
    }
    Some((
        piece_start + before.len() - opener.len(),
        end + gap + closer.len(),
    ))
}
