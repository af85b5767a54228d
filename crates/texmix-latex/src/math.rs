//! Math delimiter splitting
//!
//! A single left-to-right regex scan over a text run. The alternation is
//! ordered so `$$…$$` wins over `$…$` at the same position; the scan is
//! leftmost-first, so whichever delimiter opens earliest is taken. Matched
//! spans never nest and never overlap.

use regex::Regex;
use std::sync::LazyLock;
use texmix_core::MathSpan;

static RE_MATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\$\$(?P<dd>(?s:(?:\\.|[^\\])*?))\$\$|\$(?P<d>(?:\\.|[^$\\\n])+?)\$|\\\[(?P<br>(?s:(?:\\.|[^\\])*?))\\\]|\\\((?P<pa>(?s:(?:\\.|[^\\])*?))\\\)",
    )
    .expect("valid math delimiter regex")
});

/// A piece of a text run after delimiter splitting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Span {
    Text(String),
    Math(MathSpan),
}

/// Split `text` into alternating text and math spans.
///
/// * `$$…$$` and `\[…\]` are display math and may span lines.
/// * `$…$` is inline, non-empty and confined to one line.
/// * `\(…\)` is inline and may contain backslashes.
///
/// An opening delimiter preceded by an odd run of backslashes (`\$`,
/// `\\[2pt]`) is literal text. Inside a span, a backslash always pairs with
/// the next character, so an escaped `\$` never closes it. Unmatched
/// delimiters stay in the surrounding text. Empty text spans are not emitted.
#[must_use = "returns the split spans"]
pub fn split_math(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut last = 0;
    let mut pos = 0;

    while let Some(cap) = RE_MATH.captures_at(text, pos) {
        let Some(whole) = cap.get(0) else { break };
        if is_escaped(text, whole.start()) {
            // Delimiters are ASCII, so the next byte is a char boundary
            pos = whole.start() + 1;
            continue;
        }
        if whole.start() > last {
            spans.push(Span::Text(text[last..whole.start()].to_string()));
        }
        last = whole.end();
        pos = whole.end();

        let span = if let Some(m) = cap.name("dd") {
            MathSpan::display(m.as_str())
        } else if let Some(m) = cap.name("br") {
            MathSpan::display(m.as_str())
        } else if let Some(m) = cap.name("d") {
            MathSpan::inline(m.as_str())
        } else if let Some(m) = cap.name("pa") {
            MathSpan::inline(m.as_str())
        } else {
            continue;
        };
        log::trace!("math span at {}: display={}", whole.start(), span.display);
        spans.push(Span::Math(span));
    }

    if last < text.len() {
        spans.push(Span::Text(text[last..].to_string()));
    }
    spans
}

/// True when the delimiter at `at` is preceded by an odd run of backslashes
fn is_escaped(text: &str, at: usize) -> bool {
    let run = text.as_bytes()[..at]
        .iter()
        .rev()
        .take_while(|&&b| b == b'\\')
        .count();
    run % 2 == 1
}
