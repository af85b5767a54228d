//! Multi-part question splitting
//!
//! Questions may carry lettered sub-questions introduced by markers of the
//! exact form `**Part (x) [n marks]**`, where `x` is `a` to `e`. The text
//! before the first marker is the main block; each part runs up to the next
//! marker.

use regex::Regex;
use std::sync::LazyLock;
use texmix_core::QuestionBlock;

static RE_PART_MARKER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\*\*Part \(([a-e])\) \[(\d+) marks\]\*\*").expect("valid part marker regex")
});

/// A marker found in the source
struct Marker {
    start: usize,
    end: usize,
    letter: char,
    marks: u32,
}

fn find_markers(text: &str) -> Vec<Marker> {
    RE_PART_MARKER
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let letter = cap.get(1)?.as_str().chars().next()?;
            // A mark count that does not fit is not a marker
            let marks = cap.get(2)?.as_str().parse::<u32>().ok()?;
            Some(Marker {
                start: whole.start(),
                end: whole.end(),
                letter,
                marks,
            })
        })
        .collect()
}

/// Split a question into a main block and lettered part blocks.
///
/// Without any marker the whole input is returned unchanged as a single main
/// block. Otherwise the text before the first marker becomes the main block
/// (trimmed, and omitted when empty) followed by one part block per marker,
/// in source order, with trimmed content. Letters are not required to be
/// unique or ordered.
#[must_use = "returns the question blocks"]
pub fn split_question(text: &str) -> Vec<QuestionBlock> {
    let markers = find_markers(text);
    let Some(first) = markers.first() else {
        return vec![QuestionBlock::main(text)];
    };

    let mut blocks = Vec::with_capacity(markers.len() + 1);
    let stem = text[..first.start].trim();
    if !stem.is_empty() {
        blocks.push(QuestionBlock::main(stem));
    }

    for (i, marker) in markers.iter().enumerate() {
        let end = markers.get(i + 1).map_or(text.len(), |next| next.start);
        let content = text[marker.end..end].trim();
        blocks.push(QuestionBlock::part(marker.letter, marker.marks, content));
    }

    log::debug!(
        "split question into {} part(s){}",
        markers.len(),
        if stem.is_empty() { "" } else { " plus stem" }
    );
    blocks
}

#[cfg(test)]
mod tests {
    use super::*;
    use texmix_core::BlockKind;

    #[test]
    fn test_no_markers_single_main_block() {
        let text = "  Solve $x^2=4$.\n";
        assert_eq!(split_question(text), vec![QuestionBlock::main(text)]);
    }

    #[test]
    fn test_stem_and_parts() {
        let text = "Given $f(x)=x^2$.\n**Part (a) [2 marks]** Find $f(2)$.\n**Part (b) [3 marks]** Find $f'(x)$.";
        assert_eq!(
            split_question(text),
            vec![
                QuestionBlock::main("Given $f(x)=x^2$."),
                QuestionBlock::part('a', 2, "Find $f(2)$."),
                QuestionBlock::part('b', 3, "Find $f'(x)$."),
            ]
        );
    }

    #[test]
    fn test_empty_stem_omitted() {
        let blocks = split_question("  **Part (a) [1 marks]** only part");
        assert_eq!(blocks, vec![QuestionBlock::part('a', 1, "only part")]);
    }

    #[test]
    fn test_letters_not_validated() {
        let blocks = split_question("**Part (c) [1 marks]** x **Part (a) [4 marks]** y **Part (c) [2 marks]** z");
        let kinds: Vec<BlockKind> = blocks.iter().map(|b| b.kind).collect();
        assert_eq!(
            kinds,
            vec![
                BlockKind::Part { letter: 'c', marks: 1 },
                BlockKind::Part { letter: 'a', marks: 4 },
                BlockKind::Part { letter: 'c', marks: 2 },
            ]
        );
    }

    #[test]
    fn test_inexact_markers_are_text() {
        for text in [
            "**Part (f) [2 marks]** out of range letter",
            "**Part (a) [1 mark]** singular",
            "**part (a) [2 marks]** lowercase",
            "Part (a) [2 marks] no bold",
        ] {
            assert_eq!(split_question(text), vec![QuestionBlock::main(text)]);
        }
    }

    #[test]
    fn test_overflowing_marks_not_a_marker() {
        let text = "**Part (a) [99999999999 marks]** huge";
        assert_eq!(split_question(text), vec![QuestionBlock::main(text)]);
    }

    #[test]
    fn test_empty_part_content() {
        let blocks = split_question("Stem **Part (a) [2 marks]****Part (b) [3 marks]** B");
        assert_eq!(
            blocks,
            vec![
                QuestionBlock::main("Stem"),
                QuestionBlock::part('a', 2, ""),
                QuestionBlock::part('b', 3, "B"),
            ]
        );
    }
}
