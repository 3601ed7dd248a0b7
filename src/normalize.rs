//! Punctuation and whitespace normalization
//!
//! The last pipeline stage. A fixed, ordered list of substitutions folds
//! smart punctuation to the ASCII forms Pandoc's `smart` extension reads back
//! (`'`, `"`, `--`, `---`, `...`) and cleans up the line-break artifacts the
//! renderer leaves behind.
//!
//! # Substitution Order
//!
//! | # | Pattern | Replacement |
//! |---|---|---|
//! | 1 | `‘ ’ ‚ ‛ ´` | `'` |
//! | 2 | `“ ” „ ‟ ′ ″` | `"` |
//! | 3 | `− • · ▪` | `-` |
//! | 4 | `‒ – ―` | `--` |
//! | 5 | `—` | `---` |
//! | 6 | `…` | `...` |
//! | 7 | spaces before a newline | removed |
//! | 8 | whitespace before a hard break | absorbed into the break |
//! | 9 | two hard breaks separated by whitespace | paragraph break |
//! | 10 | hard break followed by a blank line | the blank line |
//! | 11 | a line holding a single `-` | removed |
//! | 12 | hard break following a blank line | the blank line |
//! | 13 | three or more newlines | one blank line |
//! | 14 | trailing spaces on any line | removed |
//! | 15 | leading whitespace and trailing whitespace or `\` of the document | removed |
//!
//! Later substitutions depend on the artifacts earlier ones leave, so the
//! order must not change. The list is applied repeatedly until the text
//! stops changing, which makes [`normalize`] idempotent.
//!
//! # Examples
//!
//! ```rust
//! use clipboard_markdown_converter::normalize::normalize;
//!
//! assert_eq!(normalize("\u{201C}Quoted\u{201D} \u{2014} done\u{2026}"), "\"Quoted\" --- done...");
//! assert_eq!(normalize("line\\\n\\\nnext"), "line\n\nnext");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Upper bound on repeated passes; two are enough for any input seen so far
const MAX_PASSES: usize = 16;

/// Ordered substitution table: (pattern, replacement)
const SUBSTITUTIONS: &[(&str, &str)] = &[
    (r"[\x{2018}\x{2019}\x{201A}\x{201B}\x{00B4}]", "'"),
    (r"[\x{201C}\x{201D}\x{201E}\x{201F}\x{2032}\x{2033}]", "\""),
    (r"[\x{2212}\x{2022}\x{00B7}\x{25AA}]", "-"),
    (r"[\x{2012}\x{2013}\x{2015}]", "--"),
    (r"\x{2014}", "---"),
    (r"\x{2026}", "..."),
    (r"[ ]+\n", "\n"),
    (r"\s*\\\n", "\\\n"),
    (r"\s*\\\n\s*\\\n", "\n\n"),
    (r"\s*\\\n\n", "\n\n"),
    (r"\n-\n", "\n"),
    (r"\n\n\s*\\\n", "\n\n"),
    (r"\n\n\n*", "\n\n"),
    (r"(?m)[ ]+$", ""),
    (r"^\s+|[\s\\]+$", ""),
];

fn substitution_table() -> &'static [(Regex, &'static str)] {
    static TABLE: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        SUBSTITUTIONS
            .iter()
            .filter_map(|(pattern, replacement)| match Regex::new(pattern) {
                Ok(regex) => Some((regex, *replacement)),
                Err(err) => {
                    tracing::warn!(pattern, error = %err, "invalid normalization pattern");
                    None
                }
            })
            .collect()
    })
}

/// Apply the ordered substitution list once
fn normalize_pass(text: &str) -> String {
    let mut output = text.to_string();
    for (regex, replacement) in substitution_table() {
        if regex.is_match(&output) {
            output = regex.replace_all(&output, regex::NoExpand(replacement)).into_owned();
        }
    }
    output
}

/// Normalize punctuation and whitespace in rendered Markdown
///
/// # Examples
///
/// ```rust
/// use clipboard_markdown_converter::normalize::normalize;
///
/// let text = "  Title  \n\n\n\nBody \u{2013} text\\\n";
/// assert_eq!(normalize(text), "Title\n\nBody -- text");
///
/// let once = normalize("a\n-\n-\nb");
/// assert_eq!(normalize(&once), once);
/// ```
pub fn normalize(markdown: &str) -> String {
    let mut current = normalize_pass(markdown);

    for pass in 1..MAX_PASSES {
        let next = normalize_pass(&current);
        if next == current {
            tracing::trace!(passes = pass, "normalization reached a fixed point");
            return current;
        }
        current = next;
    }

    tracing::debug!(passes = MAX_PASSES, "normalization pass limit reached");
    current
}
