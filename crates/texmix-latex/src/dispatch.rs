//! Environment dispatch
//!
//! Routes each extracted environment to its sub-renderer by name:
//!
//! | Kind | Body |
//! |------|------|
//! | `enumerate`, `itemize` | list of items, each through the inline pipeline |
//! | align family, `cases`, matrices | one opaque display math span |
//! | `tasks` | numbered inline-math cells with a column count |
//! | `tabular` | rows of trimmed cell strings |
//! | `parts` | numbered sub-questions with optional marks |
//! | `center` | re-parsed content with a centered layout |
//! | anything else | one opaque display math span |
//!
//! The string-level splitters are public so callers can reuse them on raw
//! environment bodies.

use crate::environment::RawEnvironment;
use crate::parser::Parser;
use regex::Regex;
use std::sync::LazyLock;
use texmix_core::{
    EnvironmentBody, EnvironmentKind, EnvironmentNode, Layout, MathSpan, PartItem, TaskCell,
};

static RE_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\item\b").expect("valid item regex"));
static RE_TASK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\task\b").expect("valid task regex"));
static RE_TASK_COLUMNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*\((\d+)\)").expect("valid task columns regex"));
static RE_PART: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\part\b(?:\[(\d+)\])?").expect("valid part regex"));
static RE_HLINE_EDGES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:\s*\\hline\b)+|(?:\\hline\b\s*)+$").expect("valid hline regex")
});

const ROW_END: &str = r"\\";
const HLINE: &str = r"\hline";

/// Build the node for one environment found at nesting `depth`
pub(crate) fn dispatch(
    parser: &mut Parser,
    env: RawEnvironment<'_>,
    depth: usize,
) -> EnvironmentNode {
    let kind = env.kind();
    let body = if depth >= parser.max_depth() {
        log::warn!(
            "environment '{}' exceeds max depth {}; rendering as opaque math",
            env.name,
            parser.max_depth()
        );
        opaque(&env)
    } else {
        log::debug!("dispatching environment '{}' as {kind:?}", env.name);
        match &kind {
            EnvironmentKind::Enumerate | EnvironmentKind::Itemize => EnvironmentBody::List {
                ordered: kind == EnvironmentKind::Enumerate,
                items: split_list_items(env.inner)
                    .into_iter()
                    .map(|item| parser.parse_inline(item))
                    .collect(),
            },
            EnvironmentKind::Tasks => {
                let (columns, fragments) = split_tasks(env.inner);
                EnvironmentBody::Tasks {
                    columns,
                    cells: fragments
                        .into_iter()
                        .enumerate()
                        .map(|(i, fragment)| TaskCell {
                            number: i + 1,
                            content: MathSpan::inline(fragment),
                        })
                        .collect(),
                }
            }
            EnvironmentKind::Tabular => EnvironmentBody::Table {
                rows: split_table_rows(env.inner),
            },
            EnvironmentKind::Parts => EnvironmentBody::Parts {
                parts: split_parts(env.inner)
                    .into_iter()
                    .map(|(marks, content)| PartItem {
                        marks,
                        content: parser.parse_inline(content),
                    })
                    .collect(),
            },
            EnvironmentKind::Center => EnvironmentBody::Block {
                layout: Layout::Centered,
                content: parser.parse_block(env.inner, depth + 1),
            },
            EnvironmentKind::Align(_)
            | EnvironmentKind::Cases
            | EnvironmentKind::Matrix(_)
            | EnvironmentKind::Generic(_) => opaque(&env),
        }
    };

    EnvironmentNode {
        kind,
        name: env.name.to_string(),
        raw_inner: env.inner.to_string(),
        body,
    }
}

fn opaque(env: &RawEnvironment<'_>) -> EnvironmentBody {
    EnvironmentBody::Math {
        span: MathSpan::display(env.source()),
    }
}

/// Item fragments of a list body, trimmed, empties dropped
#[must_use = "returns the list items"]
pub fn split_list_items(inner: &str) -> Vec<&str> {
    RE_ITEM
        .split(inner)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .collect()
}

/// Column count and cell fragments of a `tasks` body.
///
/// A leading `(N)`, optionally after whitespace, sets the column count; it
/// defaults to 1 and `(0)` also reads as 1. Every non-empty fragment becomes a
/// cell, including text before the first `\task`, whatever the column count.
#[must_use = "returns the task columns and cells"]
pub fn split_tasks(inner: &str) -> (u32, Vec<&str>) {
    let (columns, rest) = match RE_TASK_COLUMNS.captures(inner) {
        Some(cap) => {
            let columns = cap
                .get(1)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(1);
            let consumed = cap.get(0).map_or(0, |m| m.end());
            (columns, &inner[consumed..])
        }
        None => (1, inner),
    };

    let cells = RE_TASK
        .split(rest)
        .map(str::trim)
        .filter(|cell| !cell.is_empty())
        .collect();
    (columns, cells)
}

/// Rows of a `tabular` body.
///
/// A leading column spec `{…}` is discarded. Lines that are empty or only
/// `\hline` are skipped; `\\` ends a row even mid-line. Cells are split on
/// `&` and trimmed, and rows without any non-empty cell are dropped.
#[must_use = "returns the table rows"]
pub fn split_table_rows(inner: &str) -> Vec<Vec<String>> {
    let body = strip_column_spec(inner);
    let mut rows = Vec::new();

    for line in body.lines() {
        for row_text in line.split(ROW_END) {
            let trimmed = row_text.trim();
            if trimmed.is_empty() || trimmed == HLINE {
                continue;
            }

            let cleaned = RE_HLINE_EDGES.replace_all(trimmed, "");
            let cells: Vec<String> = cleaned
                .split('&')
                .map(|cell| cell.replace(HLINE, "").trim().to_string())
                .collect();

            if cells.iter().any(|cell| !cell.is_empty()) {
                rows.push(cells);
            }
        }
    }

    rows
}

/// Marks and content of each `\part` in a `parts` body.
///
/// Text before the first marker and parts with empty content are dropped.
/// A marks value that does not fit in `u32` leaves the badge off.
#[must_use = "returns the parts"]
pub fn split_parts(inner: &str) -> Vec<(Option<u32>, &str)> {
    let markers: Vec<_> = RE_PART
        .captures_iter(inner)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let marks = cap.get(1).and_then(|m| m.as_str().parse::<u32>().ok());
            Some((whole.start(), whole.end(), marks))
        })
        .collect();

    markers
        .iter()
        .enumerate()
        .filter_map(|(i, &(_, content_start, marks))| {
            let content_end = markers.get(i + 1).map_or(inner.len(), |next| next.0);
            let content = inner[content_start..content_end].trim();
            (!content.is_empty()).then_some((marks, content))
        })
        .collect()
}

/// Drop a leading `{…}` column spec, matching nested braces
fn strip_column_spec(inner: &str) -> &str {
    let trimmed = inner.trim_start();
    if !trimmed.starts_with('{') {
        return inner;
    }

    let mut depth = 0usize;
    for (i, byte) in trimmed.bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return &trimmed[i + 1..];
                }
            }
            _ => {}
        }
    }
    // Unbalanced spec: keep everything
    inner
}
