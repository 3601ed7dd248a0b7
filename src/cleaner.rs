//! Office and source markup pre-cleaner
//!
//! Word processors and spreadsheets put a lot of markup on the clipboard that
//! has no Markdown meaning: namespaced tags (`<o:p>`, `<w:sdt>`, `<st1:place>`),
//! embedded `<style>` and `<xml>` blocks, bookmark anchors, and spans that do
//! nothing but restate the document font. This module removes that noise so
//! the renderer only sees structural markup.
//!
//! # Actions
//!
//! Each element gets exactly one [`CleanAction`]:
//!
//! - **Remove**: vendor-namespace tags and `style`/`xml` blocks, with content
//! - **Bookmark**: `mso-bookmark` spans become a plain text node
//! - **Unwrap**: `span`/`font` wrappers whose style is empty after stripping
//!   presentational declarations are replaced by their children
//! - **Keep**: everything else; span styles are rewritten to the declarations
//!   that survived stripping (bold, italic, underline, colour...)
//!
//! # Examples
//!
//! ```rust
//! use clipboard_markdown_converter::cleaner::clean;
//!
//! let html = r#"<p class=MsoNormal><span style="font-family:Calibri;mso-ansi-language:EN-US">Hello</span><o:p></o:p></p>"#;
//! let cleaned = clean(html);
//! assert!(cleaned.contains("<p class=\"MsoNormal\">Hello</p>"));
//! ```

use crate::clipboard::looks_like_html;
use crate::dom::{Document, Element, Node};
use crate::parser::parse_html;
use crate::style::{self, Declaration};

/// Non-namespaced elements removed together with their content
const REMOVED_ELEMENTS: &[&str] = &["style", "xml"];

/// Generic inline wrappers eligible for unwrapping
const WRAPPER_ELEMENTS: &[&str] = &["span", "font"];

/// What the cleaner does with one element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanAction {
    /// Drop the element and its content
    Remove,
    /// Replace the element with its text content
    Bookmark,
    /// Splice the children into the parent
    Unwrap,
    /// Keep the element; `Some` carries a rewritten style attribute
    Keep(Option<String>),
}

/// Per-call counters, reported through `tracing`
#[derive(Debug, Default)]
struct CleanStats {
    removed: usize,
    bookmarks: usize,
    unwrapped: usize,
}

/// Clean clipboard HTML and serialize the result back to HTML
///
/// Input that does not look like HTML is returned unchanged, as is input the
/// parser rejects; cleaning never fails.
pub fn clean(html: &str) -> String {
    if !looks_like_html(html) {
        return html.to_string();
    }

    match parse_html(html) {
        Ok(document) => clean_document(&document).to_html(),
        Err(err) => {
            tracing::debug!(error = %err, "skipping source cleaning");
            html.to_string()
        }
    }
}

/// Produce a cleaned copy of a parsed document
pub fn clean_document(document: &Document) -> Document {
    let mut stats = CleanStats::default();
    let children = clean_nodes(&document.children, &mut stats);

    tracing::debug!(
        removed = stats.removed,
        bookmarks = stats.bookmarks,
        unwrapped = stats.unwrapped,
        "cleaned source markup"
    );

    Document { children }
}

/// Decide what to do with an element
///
/// ```rust
/// use clipboard_markdown_converter::cleaner::{classify, CleanAction};
/// use clipboard_markdown_converter::dom::Element;
///
/// assert_eq!(classify(&Element::new("o:p", vec![])), CleanAction::Remove);
///
/// let span = Element::new("span", vec![]).with_attr("style", "font-size:11pt");
/// assert_eq!(classify(&span), CleanAction::Unwrap);
///
/// let bold = Element::new("span", vec![]).with_attr("style", "font-size:11pt;font-weight:bold");
/// assert_eq!(classify(&bold), CleanAction::Keep(Some("font-weight:bold".to_string())));
/// ```
pub fn classify(element: &Element) -> CleanAction {
    if element.tag.contains(':') || element.is_any(REMOVED_ELEMENTS) {
        return CleanAction::Remove;
    }

    if !element.is_any(WRAPPER_ELEMENTS) {
        return CleanAction::Keep(None);
    }

    let declarations = style::parse_style(element.attr("style").unwrap_or_default());
    if style::is_bookmark(&declarations) {
        return CleanAction::Bookmark;
    }

    let remaining: Vec<Declaration> = declarations
        .into_iter()
        .filter(|declaration| !style::is_presentational(declaration))
        .collect();

    if remaining.is_empty() {
        CleanAction::Unwrap
    } else {
        CleanAction::Keep(Some(style::serialize_style(&remaining)))
    }
}

fn clean_nodes(nodes: &[Node], stats: &mut CleanStats) -> Vec<Node> {
    let mut output = Vec::with_capacity(nodes.len());

    for node in nodes {
        let Node::Element(element) = node else {
            output.push(node.clone());
            continue;
        };

        match classify(element) {
            CleanAction::Remove => stats.removed += 1,
            CleanAction::Bookmark => {
                stats.bookmarks += 1;
                let text = element.text_content();
                if !text.is_empty() {
                    output.push(Node::Text(text));
                }
            }
            CleanAction::Unwrap => {
                stats.unwrapped += 1;
                output.extend(clean_nodes(&element.children, stats));
            }
            CleanAction::Keep(rewritten_style) => {
                let mut attrs = element.attrs.clone();
                if let Some(rewritten) = rewritten_style {
                    for (name, value) in attrs.iter_mut() {
                        if name.eq_ignore_ascii_case("style") {
                            *value = rewritten.clone();
                        }
                    }
                }
                output.push(Node::Element(Element {
                    tag: element.tag.clone(),
                    attrs,
                    children: clean_nodes(&element.children, stats),
                }));
            }
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body_html(html: &str) -> String {
        let cleaned = clean(html);
        let start = cleaned.find("<body>").map(|i| i + "<body>".len()).unwrap_or(0);
        let end = cleaned.rfind("</body>").unwrap_or(cleaned.len());
        cleaned[start..end].to_string()
    }

    // ============================================================================
    // Removal
    // ============================================================================

    #[test]
    fn test_vendor_namespace_tags_removed_with_content() {
        assert_eq!(
            body_html("<p>Text<o:p>&nbsp;</o:p></p><st1:place>Paris</st1:place>"),
            "<p>Text</p>"
        );
    }

    #[test]
    fn test_style_and_xml_blocks_removed() {
        let html = "<style>p { color: red }</style><xml><w:WordDocument>x</w:WordDocument></xml><p>Body</p>";
        let cleaned = clean(html);
        assert!(!cleaned.contains("color: red"));
        assert!(!cleaned.contains("WordDocument"));
        assert!(cleaned.contains("<p>Body</p>"));
    }

    // ============================================================================
    // Bookmarks and unwrapping
    // ============================================================================

    #[test]
    fn test_bookmark_span_replaced_by_text() {
        assert_eq!(
            body_html(r#"<p><span style="mso-bookmark:_Toc1"><b>Intro</b></span> text</p>"#),
            "<p>Intro text</p>"
        );
    }

    #[test]
    fn test_presentational_span_unwrapped() {
        assert_eq!(
            body_html(r#"<p><span style="font-family:Arial;font-size:11pt;color:black">Plain</span></p>"#),
            "<p>Plain</p>"
        );
    }

    #[test]
    fn test_span_without_style_unwrapped() {
        assert_eq!(body_html(r#"<p><span class="x">a</span><font face="Arial">b</font></p>"#), "<p>ab</p>");
    }

    #[test]
    fn test_nested_wrappers_unwrapped() {
        assert_eq!(
            body_html(r#"<p><span style="font-size:12pt"><span style="mso-fareast-font-family:Calibri">deep</span></span></p>"#),
            "<p>deep</p>"
        );
    }

    #[test]
    fn test_emphasis_span_kept_with_reduced_style() {
        assert_eq!(
            body_html(r#"<p><span style="font-family:Calibri;font-weight:bold">Bold</span></p>"#),
            r#"<p><span style="font-weight:bold">Bold</span></p>"#
        );
    }

    #[test]
    fn test_colored_span_kept() {
        let html = body_html(r#"<p><span style="color:red">Red</span></p>"#);
        assert!(html.contains(r#"<span style="color:red">"#));
    }

    #[test]
    fn test_structural_elements_untouched() {
        assert_eq!(
            body_html(r#"<table><tbody><tr><td style="font-size:9pt">x</td></tr></tbody></table>"#),
            r#"<table><tbody><tr><td style="font-size:9pt">x</td></tr></tbody></table>"#
        );
    }

    #[test]
    fn test_plain_text_returned_unchanged() {
        assert_eq!(clean("Name  Age\nBob  42"), "Name  Age\nBob  42");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_classify_paragraph_is_kept() {
        assert_eq!(classify(&Element::new("p", vec![])), CleanAction::Keep(None));
    }

    proptest! {
        #[test]
        fn prop_clean_keeps_plain_text(word in "[a-zA-Z0-9]{1,30}") {
            let html = format!(r#"<p><span style="font-size:11pt">{word}</span><o:p></o:p></p>"#);
            let cleaned = clean(&html);
            let document = parse_html(&cleaned).expect("Parse failed");
            prop_assert_eq!(document.text_content(), word);
        }
    }
}
