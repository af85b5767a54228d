//! Macro rewriting for plain-text runs
//!
//! The rewrite is an ordered table of rules. Each rule is one forward
//! `replace_all` pass over the output of the previous rule, so the order in
//! [`RULES`] is the contract:
//!
//! 1. `\textcolor{c}{body}` → `\color{c}{body}` (one level of nested braces in
//!    `body`); a bare `\textcolor{c}` → `\color{c}`
//! 2. `\cfrac` → `\frac`
//! 3. `\begin{enumerate}` / `\end{enumerate}` leaking through as text → removed
//! 4. `\item[N]` → `N. `, `\item` → `• `
//! 5. `\centering`, `\vspace{…}`, `\hspace{…}` → removed
//! 6. `\\` and `\newline` → `<br>`, `\par` → `<br><br>`
//!
//! Rules 1–5 also make up the math-level rewrite used as the first tier of
//! the typesetting fallback ([`preprocess_math`]).

use regex::Regex;
use std::sync::LazyLock;
use texmix_core::LINE_BREAK;

/// One ordered rewrite.
struct Rule {
    name: &'static str,
    pattern: Regex,
    replacement: String,
    /// Applied to math content as well as text
    math: bool,
}

impl Rule {
    fn new(name: &'static str, pattern: &str, replacement: &str, math: bool) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("valid preprocess regex"),
            replacement: replacement.to_string(),
            math,
        }
    }
}

static RULES: LazyLock<Vec<Rule>> = LazyLock::new(|| {
    let paragraph = format!("{LINE_BREAK}{LINE_BREAK}");
    vec![
        // (1) color macros
        Rule::new(
            "textcolor",
            r"\\textcolor\{([^{}]+)\}\{([^{}]*(?:\{[^{}]*\}[^{}]*)*)\}",
            r"\color{${1}}{${2}}",
            true,
        ),
        Rule::new(
            "textcolor-bare",
            r"\\textcolor\{([^{}]+)\}",
            r"\color{${1}}",
            true,
        ),
        // (2) fraction alias
        Rule::new("cfrac", r"\\cfrac\b", r"\frac", true),
        // (3) leaked enumerate markers
        Rule::new("enumerate", r"\\(?:begin|end)\{enumerate\}", "", true),
        // (4) item markers
        Rule::new("item-numbered", r"\\item\[(\d+)\][ \t]*", "${1}. ", true),
        Rule::new("item", r"\\item\b[ \t]*", "• ", true),
        // (5) layout-only macros
        Rule::new("centering", r"\\centering\b", "", true),
        Rule::new("spacing", r"\\[vh]space\*?\{[^}]*\}", "", true),
        // (6) line breaks
        Rule::new("line-break", r"\\\\|\\newline\b", LINE_BREAK, false),
        Rule::new("paragraph", r"\\par\b", &paragraph, false),
    ]
});

/// Rewrite a plain-text run (all rules)
#[must_use = "returns the rewritten text"]
pub fn preprocess(text: &str) -> String {
    apply(text, false)
}

/// Rewrite math content (rules 1–5; line breaks are left to the typesetter)
#[must_use = "returns the rewritten LaTeX"]
pub fn preprocess_math(latex: &str) -> String {
    apply(latex, true)
}

fn apply(input: &str, math_only: bool) -> String {
    let mut result = input.to_string();
    for rule in RULES.iter().filter(|rule| rule.math || !math_only) {
        if rule.pattern.is_match(&result) {
            log::trace!("preprocess rule '{}' matched", rule.name);
            result = rule
                .pattern
                .replace_all(&result, rule.replacement.as_str())
                .into_owned();
        }
    }
    result
}
