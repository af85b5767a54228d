//! `\includegraphics` extraction, placeholder tokens and image URL helpers
//!
//! Image directives are pulled out of a plain-text run before preprocessing
//! and math splitting, so nothing downstream can mangle their URLs. Each one
//! is replaced by a placeholder token `<prefix><index>__`; the prefix carries
//! a per-call nonce chosen so that it occurs nowhere in the input, which makes
//! tokens impossible to confuse with author text.

use regex::Regex;
use std::sync::LazyLock;
use texmix_core::{ImageNode, ImageRef, ImageWidth, Segment};

const PLACEHOLDER_BASE: &str = "__INCLUDEGRAPHICS_";
const PLACEHOLDER_SUFFIX: &str = "__";

static RE_INCLUDEGRAPHICS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\\includegraphics(?:\[([^\]]*)\])?\{([^}]*)\}")
        .expect("valid includegraphics regex")
});
static RE_WIDTH_OPTION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"width\s*=\s*([^,}]+)").expect("valid width regex"));
static RE_LENGTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+(?:\.\d*)?|\.\d+)\s*(.*)$").expect("valid length regex")
});
static RE_UNSAFE_FILENAME_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.-]").expect("valid filename regex"));

/// Placeholder table scoped to one top-level parse call.
///
/// Token index `i` in emitted text always refers to `entries[i]`; indices
/// are assigned in order and never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageTable {
    prefix: String,
    entries: Vec<ImageRef>,
}

impl ImageTable {
    /// Create a table whose tokens cannot collide with anything in `source`
    #[must_use = "creates an image table"]
    pub fn for_source(source: &str) -> Self {
        Self {
            prefix: choose_placeholder_prefix(source),
            entries: Vec::new(),
        }
    }

    /// Registered images, in token order
    #[inline]
    #[must_use = "returns the registered images"]
    pub fn entries(&self) -> &[ImageRef] {
        &self.entries
    }

    /// Placeholder token for table index `index`
    #[must_use = "returns the placeholder token"]
    pub fn token(&self, index: usize) -> String {
        format!("{}{index}{PLACEHOLDER_SUFFIX}", self.prefix)
    }

    /// Replace every image directive in `text` with a placeholder token.
    ///
    /// Directives whose URL is empty after trimming are dropped without a
    /// token or a table entry.
    pub fn extract(&mut self, text: &str) -> String {
        if !text.contains(r"\includegraphics") {
            return text.to_string();
        }

        let mut out = String::with_capacity(text.len());
        let mut last = 0;
        for cap in RE_INCLUDEGRAPHICS.captures_iter(text) {
            let Some(whole) = cap.get(0) else { continue };
            out.push_str(&text[last..whole.start()]);
            last = whole.end();

            let url = cap.get(2).map_or("", |m| m.as_str().trim());
            if url.is_empty() {
                log::debug!("dropping \\includegraphics with empty URL");
                continue;
            }
            let options = cap.get(1).map_or("", |m| m.as_str());
            log::debug!("found includegraphics: {url} (options: {options:?})");

            let index = self.entries.len();
            self.entries.push(ImageRef::new(url, options));
            out.push_str(&self.token(index));
        }
        out.push_str(&text[last..]);
        out
    }

    /// Split a text span on placeholder tokens, producing text and image
    /// segments. Malformed or out-of-range tokens render nothing.
    pub fn resolve_into(&self, text: &str, out: &mut Vec<Segment>) {
        let mut rest = text;
        while let Some(pos) = rest.find(&self.prefix) {
            push_text(out, &rest[..pos]);
            let after = &rest[pos + self.prefix.len()..];
            let digits_len = after
                .bytes()
                .take_while(u8::is_ascii_digit)
                .count();
            let index = after[..digits_len].parse::<usize>().ok();
            let tail = &after[digits_len..];

            match (index, tail.strip_prefix(PLACEHOLDER_SUFFIX)) {
                (Some(index), Some(remaining)) => {
                    match self.entries.get(index) {
                        Some(image) => out.push(Segment::Image(image_node(image))),
                        None => log::warn!("placeholder index {index} out of range; dropped"),
                    }
                    rest = remaining;
                }
                _ => {
                    log::warn!("malformed image placeholder dropped");
                    rest = tail;
                }
            }
        }
        push_text(out, rest);
    }

    /// Put the original directives back in place of tokens (used for tokens
    /// that ended up inside a math span)
    #[must_use = "returns the restored text"]
    pub fn restore(&self, text: &str) -> String {
        if !text.contains(&self.prefix) {
            return text.to_string();
        }
        let mut restored = text.to_string();
        for (index, image) in self.entries.iter().enumerate().rev() {
            restored = restored.replace(&self.token(index), &image.to_directive());
        }
        restored
    }
}

/// Result of [`extract_images`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageExtraction {
    /// Input with each directive replaced by its placeholder token
    pub text: String,
    /// Image table; token `i` refers to `images[i]`
    pub images: Vec<ImageRef>,
    /// Placeholder token prefix used for `text`
    pub prefix: String,
}

/// Extract image directives from a standalone piece of text
#[must_use = "returns the extraction result"]
pub fn extract_images(text: &str) -> ImageExtraction {
    let mut table = ImageTable::for_source(text);
    let text = table.extract(text);
    ImageExtraction {
        text,
        images: table.entries,
        prefix: table.prefix,
    }
}

/// Build the image node for a table entry, sizing it from `width=`
#[must_use = "returns the image node"]
pub fn image_node(image: &ImageRef) -> ImageNode {
    ImageNode {
        image: image.clone(),
        width: parse_width(&image.options),
    }
}

/// Parse the `width=` entry of an option list.
///
/// The leading number becomes the value and whatever follows the unit
/// (`200px` → 200 + `px`, `0.4\textwidth` → 0.4 + `\textwidth`). Missing or
/// non-numeric widths fall back to [`ImageWidth::Auto`].
#[must_use = "returns the parsed width"]
pub fn parse_width(options: &str) -> ImageWidth {
    let Some(raw) = RE_WIDTH_OPTION
        .captures(options)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
    else {
        return ImageWidth::Auto;
    };

    RE_LENGTH
        .captures(raw)
        .and_then(|cap| {
            let value = cap.get(1)?.as_str().parse::<f64>().ok()?;
            let unit = cap.get(2).map_or("", |m| m.as_str().trim());
            Some(ImageWidth::Length {
                value,
                unit: unit.to_string(),
            })
        })
        .unwrap_or(ImageWidth::Auto)
}

/// True when `text` contains at least one `\includegraphics` directive with
/// a non-empty URL
#[must_use = "returns whether the text references images"]
pub fn has_image_references(text: &str) -> bool {
    RE_INCLUDEGRAPHICS
        .captures_iter(text)
        .any(|cap| cap.get(2).is_some_and(|m| !m.as_str().trim().is_empty()))
}

/// Trimmed URLs of every image directive, in document order
#[must_use = "returns the image URLs"]
pub fn image_urls(text: &str) -> Vec<String> {
    RE_INCLUDEGRAPHICS
        .captures_iter(text)
        .filter_map(|cap| {
            let url = cap.get(2)?.as_str().trim();
            (!url.is_empty()).then(|| url.to_string())
        })
        .collect()
}

/// Point every image directive at `new_url`, keeping its options
#[must_use = "returns the rewritten text"]
pub fn rewrite_image_urls(text: &str, new_url: &str) -> String {
    RE_INCLUDEGRAPHICS
        .replace_all(text, |cap: &regex::Captures<'_>| match cap.get(1) {
            Some(options) => format!("\\includegraphics[{}]{{{new_url}}}", options.as_str()),
            None => format!("\\includegraphics{{{new_url}}}"),
        })
        .into_owned()
}

/// CDN location for an uploaded question image.
///
/// The filename is reduced to `[A-Za-z0-9.-]` (other characters become `_`)
/// and prefixed with `timestamp` to keep uploads unique.
#[must_use = "returns the CDN URL"]
pub fn cdn_image_url(
    cdn_base: &str,
    filename: &str,
    question_id: Option<&str>,
    timestamp: u64,
) -> String {
    let base = cdn_base.trim_end_matches('/');
    let clean = RE_UNSAFE_FILENAME_CHARS.replace_all(filename, "_");
    match question_id {
        Some(id) => format!("{base}/question-images/{id}/{timestamp}-{clean}"),
        None => format!("{base}/question-images/{timestamp}-{clean}"),
    }
}

fn push_text(out: &mut Vec<Segment>, text: &str) {
    if !text.is_empty() {
        out.push(Segment::text(text));
    }
}

/// Pick a token prefix that occurs nowhere in `source`
fn choose_placeholder_prefix(source: &str) -> String {
    use std::hash::{Hash, Hasher};

    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    source.hash(&mut hasher);
    let mut nonce = hasher.finish();

    loop {
        let prefix = format!("{PLACEHOLDER_BASE}{nonce:x}_");
        if !source.contains(&prefix) {
            return prefix;
        }
        nonce = nonce.wrapping_add(1);
    }
}
