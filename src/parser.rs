//! HTML5 parser using html5ever
//!
//! This module turns clipboard HTML into the owned [`Document`] tree used by
//! the rest of the pipeline.
//!
//! # Overview
//!
//! The parser uses html5ever, which implements the WHATWG HTML5 parsing
//! algorithm. Malformed markup (unclosed tags, misnested formatting, stray
//! end tags) is recovered the same way a browser would recover it, which is
//! exactly what pasted office and web content needs.
//!
//! # Examples
//!
//! ```rust
//! use clipboard_markdown_converter::parser::parse_html;
//!
//! // Well-formed fragment
//! let document = parse_html("<h1>Hello</h1>").expect("Failed to parse HTML");
//! assert!(document.text_content().contains("Hello"));
//!
//! // Malformed fragment (missing closing tags)
//! let document = parse_html("<p><b>Hello").expect("Parser handles malformed HTML");
//! assert!(document.text_content().contains("Hello"));
//! ```
//!
//! # Depth Limit
//!
//! Elements nested deeper than [`MAX_NESTING_DEPTH`] are flattened into a
//! single text node so that the recursive stages downstream have a bounded
//! stack depth.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::dom::{Document, Element, Node};
use crate::error::ConversionError;

/// Maximum element nesting depth copied into the owned tree
pub const MAX_NESTING_DEPTH: usize = 256;

/// Parse an HTML string into an owned document tree
///
/// # Errors
///
/// - `ConversionError::InvalidInput`: the input is empty
///
/// html5ever itself never rejects input, so any non-empty string produces a
/// document (plain text ends up as a text node inside `<body>`).
///
/// # Examples
///
/// ```rust
/// use clipboard_markdown_converter::parser::parse_html;
///
/// let document = parse_html("<p>First</p><p>Second</p>").expect("Parse failed");
/// assert_eq!(document.text_content(), "FirstSecond");
///
/// assert!(parse_html("").is_err());
/// ```
pub fn parse_html(html: &str) -> Result<Document, ConversionError> {
    if html.is_empty() {
        return Err(ConversionError::InvalidInput(
            "HTML input is empty".to_string(),
        ));
    }

    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    tracing::trace!(bytes = html.len(), "parsed clipboard HTML");

    let children = dom
        .document
        .children
        .borrow()
        .iter()
        .filter_map(|child| copy_node(child, 0))
        .collect();

    Ok(Document { children })
}

/// Copy one html5ever node into the owned tree
fn copy_node(handle: &Handle, depth: usize) -> Option<Node> {
    match handle.data {
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            if depth >= MAX_NESTING_DEPTH {
                tracing::debug!(depth, "flattening deeply nested markup to text");
                return Some(Node::Text(flatten_text(handle)));
            }

            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            let children = handle
                .children
                .borrow()
                .iter()
                .filter_map(|child| copy_node(child, depth + 1))
                .collect();

            Some(Node::Element(Element {
                tag: name.local.to_string(),
                attrs,
                children,
            }))
        }
        NodeData::Text { ref contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { ref contents } => Some(Node::Comment(contents.to_string())),
        // DOCTYPE declarations and processing instructions carry no content
        NodeData::Doctype { .. } | NodeData::ProcessingInstruction { .. } => None,
        NodeData::Document => None,
    }
}

/// Collect descendant text without recursion
fn flatten_text(handle: &Handle) -> String {
    let mut output = String::new();
    let mut stack = vec![handle.clone()];

    while let Some(node) = stack.pop() {
        if let NodeData::Text { ref contents } = node.data {
            output.push_str(&contents.borrow());
        }
        // Push in reverse so children pop in document order
        for child in node.children.borrow().iter().rev() {
            stack.push(child.clone());
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn body(document: &Document) -> &Element {
        let html = document
            .children
            .iter()
            .find_map(Node::as_element)
            .expect("html element");
        html.element_children()
            .find(|element| element.tag == "body")
            .expect("body element")
    }

    #[test]
    fn test_parse_simple_html() {
        let result = parse_html("<html><body><h1>Hello</h1></body></html>");
        assert!(result.is_ok(), "Should parse simple HTML");
    }

    #[test]
    fn test_parse_fragment_is_wrapped_in_body() {
        let document = parse_html("<p>Content</p>").expect("Parse failed");
        let body = body(&document);
        assert_eq!(body.element_children().next().map(|e| e.tag.as_str()), Some("p"));
    }

    #[test]
    fn test_parse_empty_input() {
        match parse_html("") {
            Err(ConversionError::InvalidInput(_)) => (),
            _ => panic!("Expected InvalidInput error"),
        }
    }

    #[test]
    fn test_parse_keeps_attributes_in_order() {
        let document =
            parse_html(r#"<a href="http://x.com" title="X" class="c">x</a>"#).expect("Parse failed");
        let anchor = body(&document).element_children().next().expect("anchor");
        let names: Vec<&str> = anchor.attrs.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["href", "title", "class"]);
    }

    #[test]
    fn test_parse_decodes_entities() {
        let document = parse_html("<p>&lt;tag&gt; &amp; &quot;quotes&quot;</p>").expect("Parse failed");
        assert_eq!(document.text_content(), "<tag> & \"quotes\"");
    }

    #[test]
    fn test_parse_office_namespace_tags() {
        let document = parse_html("<p class=MsoNormal>Text<o:p>&nbsp;</o:p></p>").expect("Parse failed");
        let paragraph = body(&document).element_children().next().expect("paragraph");
        assert!(paragraph.element_children().any(|e| e.tag == "o:p"));
    }

    #[test]
    fn test_parse_comments_are_kept() {
        let document = parse_html("<p>Text</p><!--EndFragment-->").expect("Parse failed");
        let body = body(&document);
        assert!(body.children.iter().any(|n| matches!(n, Node::Comment(_))));
    }

    #[test]
    fn test_parse_misnested_tags() {
        let result = parse_html("<b><i>text</b></i>");
        assert!(result.is_ok(), "Should handle misnested tags");
    }

    #[test]
    fn test_deep_nesting_is_flattened() {
        let depth = MAX_NESTING_DEPTH + 50;
        let html = format!("{}deep{}", "<div>".repeat(depth), "</div>".repeat(depth));
        let document = parse_html(&html).expect("Parse failed");
        assert_eq!(document.text_content(), "deep");
    }

    proptest! {
        #[test]
        fn prop_malformed_html_no_crash(
            tag in prop::sample::select(vec!["div", "p", "span", "h1", "ul", "li", "table", "tr", "td", "o:p"]),
            content in "[a-zA-Z0-9 ]{0,100}",
            close_tag in prop::bool::ANY,
            add_invalid_nesting in prop::bool::ANY,
        ) {
            let mut html = format!("<{}>{}", tag, content);
            if close_tag {
                html.push_str(&format!("</{}>", tag));
            }
            if add_invalid_nesting {
                html.push_str("<p><div>Invalid nesting</div></p>");
            }

            let result = parse_html(&html);
            prop_assert!(result.is_ok(), "Parser should handle malformed HTML: {}", html);
        }

        #[test]
        fn prop_text_content_survives_parsing(content in "[a-zA-Z0-9]{1,50}") {
            let html = format!("<div><span>{}</span></div>", content);
            let document = parse_html(&html).expect("Parse failed");
            prop_assert_eq!(document.text_content(), content);
        }
    }
}
