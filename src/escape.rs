//! Markdown escaping for text nodes
//!
//! Literal text that happens to look like Markdown syntax is backslash
//! escaped so that it survives as text. Inline syntax characters are escaped
//! anywhere; block markers (`-`, `+ `, `=`, `#`, `>`, `~~~`, `1. `) only at
//! the start of the text node, where they could begin a block.

use regex::Regex;
use std::sync::OnceLock;

/// Ordered escape table: (pattern, replacement)
///
/// The backslash rule must run first so that later escapes are not doubled.
const ESCAPE_PATTERNS: &[(&str, &str)] = &[
    (r"\\", r"\\"),
    (r"\*", r"\*"),
    (r"^-", r"\-"),
    (r"^\+ ", r"\+ "),
    (r"^(=+)", r"\${1}"),
    (r"^(#{1,6}) ", r"\${1} "),
    (r"`", r"\`"),
    (r"^~~~", r"\~~~"),
    (r"\[", r"\["),
    (r"\]", r"\]"),
    (r"^>", r"\>"),
    (r"_", r"\_"),
    (r"^(\d+)\. ", r"${1}\. "),
];

fn escape_table() -> &'static [(Regex, &'static str)] {
    static TABLE: OnceLock<Vec<(Regex, &'static str)>> = OnceLock::new();
    TABLE.get_or_init(|| {
        ESCAPE_PATTERNS
            .iter()
            .filter_map(|(pattern, replacement)| {
                Regex::new(pattern).ok().map(|regex| (regex, *replacement))
            })
            .collect()
    })
}

/// Escape Markdown syntax in a text node
///
/// # Examples
///
/// ```rust
/// use clipboard_markdown_converter::escape::escape_markdown;
///
/// assert_eq!(escape_markdown("snake_case * 2"), r"snake\_case \* 2");
/// assert_eq!(escape_markdown("# not a heading"), r"\# not a heading");
/// assert_eq!(escape_markdown("1. not a list"), r"1\. not a list");
/// assert_eq!(escape_markdown("a - b"), "a - b");
/// ```
pub fn escape_markdown(text: &str) -> String {
    let mut output = text.to_string();
    for (regex, replacement) in escape_table() {
        if regex.is_match(&output) {
            output = regex.replace_all(&output, *replacement).into_owned();
        }
    }
    output
}
