//! Normalizer characterization tests
//!
//! Pins the observable effect of each substitution and of their order. A
//! change in any of these outputs means the normalizer's contract changed.

use clipboard_markdown_converter::normalize::normalize;
use proptest::prelude::*;

// ============================================================================
// Punctuation folding
// ============================================================================

#[test]
fn test_single_quote_family() {
    for quote in ['\u{2018}', '\u{2019}', '\u{201A}', '\u{201B}', '\u{00B4}'] {
        assert_eq!(normalize(&format!("it{quote}s")), "it's", "quote U+{:04X}", quote as u32);
    }
}

#[test]
fn test_double_quote_family() {
    for quote in ['\u{201C}', '\u{201D}', '\u{201E}', '\u{201F}', '\u{2032}', '\u{2033}'] {
        assert_eq!(normalize(&format!("{quote}x{quote}")), "\"x\"", "quote U+{:04X}", quote as u32);
    }
}

#[test]
fn test_hyphen_family() {
    for dash in ['\u{2212}', '\u{2022}', '\u{00B7}', '\u{25AA}'] {
        assert_eq!(normalize(&format!("a {dash} b")), "a - b", "char U+{:04X}", dash as u32);
    }
}

#[test]
fn test_dash_family() {
    for dash in ['\u{2012}', '\u{2013}', '\u{2015}'] {
        assert_eq!(normalize(&format!("1{dash}2")), "1--2", "dash U+{:04X}", dash as u32);
    }
    assert_eq!(normalize("a\u{2014}b"), "a---b");
    assert_eq!(normalize("so\u{2026}"), "so...");
}

// ============================================================================
// Line-break artifacts
// ============================================================================

#[test]
fn test_space_before_hard_break_absorbed() {
    assert_eq!(normalize("one  \\\ntwo"), "one\\\ntwo");
}

#[test]
fn test_double_hard_break_is_paragraph() {
    assert_eq!(normalize("one\\\n  \\\ntwo"), "one\n\ntwo");
}

#[test]
fn test_hard_break_before_blank_line_dropped() {
    assert_eq!(normalize("one\\\n\ntwo"), "one\n\ntwo");
}

#[test]
fn test_hard_break_after_blank_line_absorbs_it() {
    // The whitespace-before-break substitution runs first and takes the
    // blank line with it
    assert_eq!(normalize("one\n\n\\\ntwo"), "one\\\ntwo");
    assert_eq!(normalize("one\n\n \\\n\ntwo"), "one\n\ntwo");
}

#[test]
fn test_lone_dash_lines_removed() {
    assert_eq!(normalize("a\n-\nb"), "a\nb");
    // Overlapping matches need a second pass
    assert_eq!(normalize("a\n-\n-\nb"), "a\nb");
}

#[test]
fn test_bullet_line_becomes_removed_dash_line() {
    assert_eq!(normalize("a\n\u{2022}\nb"), "a\nb");
}

#[test]
fn test_blank_line_runs() {
    assert_eq!(normalize("a\n\n\n\nb\n\n\nc"), "a\n\nb\n\nc");
}

#[test]
fn test_trailing_spaces_per_line() {
    assert_eq!(normalize("a  \nb \n\nc   "), "a\nb\n\nc");
}

#[test]
fn test_document_edges() {
    assert_eq!(normalize("\n \n  text"), "text");
    assert_eq!(normalize("text\\\n"), "text");
    assert_eq!(normalize("text \\ \\"), "text");
}

#[test]
fn test_indentation_inside_document_kept() {
    assert_eq!(normalize("-   item\n    continued"), "-   item\n    continued");
}

#[test]
fn test_already_normal_text_unchanged() {
    let text = "Title\n=====\n\nSome **bold** text.\n\n| a | b |\n| --- | --- |";
    assert_eq!(normalize(text), text);
}

proptest! {
    #[test]
    fn prop_idempotent(text in "[a-z \n\\\\\u{2022}\u{2014}\u{2019}-]{0,120}") {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once.clone());
    }

    #[test]
    fn prop_no_smart_punctuation_survives(text in "[a-z \u{2018}\u{2019}\u{201C}\u{201D}\u{2013}\u{2014}\u{2026}]{0,60}") {
        let output = normalize(&text);
        let has_smart_punctuation = output.chars().any(|c| matches!(c, '\u{2018}' | '\u{2019}' | '\u{201C}' | '\u{201D}' | '\u{2013}' | '\u{2014}' | '\u{2026}'));
        prop_assert!(!has_smart_punctuation);
    }

    #[test]
    fn prop_no_trailing_whitespace(text in "[a-z \t\n]{0,80}") {
        let output = normalize(&text);
        prop_assert_eq!(output.trim_end(), output.as_str());
        prop_assert_eq!(output.trim_start(), output.as_str());
    }
}
