//! Whitespace collapsing before rendering
//!
//! HTML rendering ignores most source whitespace; Markdown does not. Before
//! the tree is rendered, runs of ASCII whitespace in text nodes are collapsed
//! to a single space and the spaces a browser would never display are
//! removed:
//!
//! - whitespace at the start of the content and after another space
//! - a trailing space directly before a block element or `<br>`
//! - the trailing space at the very end of the content
//!
//! Void elements (`img`, `input`...) and inline `pre` keep the space that
//! follows them. `pre` content is never touched and comments are dropped.
//! Non-breaking spaces are not whitespace here and always survive.
//!
//! The pass runs in two phases over an immutable input: a document-order walk
//! that decides the final value of every text node, then a rebuild that
//! produces the new tree.

use crate::dom::{Document, Element, Node};

/// Collapse insignificant whitespace in a whole document
pub fn collapse_whitespace(document: &Document) -> Document {
    let mut collapser = Collapser::default();
    collapser.visit_children(&document.children);
    collapser.finish();

    let mut texts = collapser.texts.into_iter();
    Document {
        children: rebuild_children(&document.children, &mut texts),
    }
}

/// Collapse insignificant whitespace below a single element
///
/// The element itself is the root of the pass: its own block or inline
/// nature does not affect its children.
///
/// ```rust
/// use clipboard_markdown_converter::dom::{Element, Node};
/// use clipboard_markdown_converter::whitespace::collapse_element;
///
/// let paragraph = Element::new("p", vec![Node::Text("  Hello \n\t world  ".to_string())]);
/// assert_eq!(collapse_element(&paragraph).text_content(), "Hello world");
/// ```
pub fn collapse_element(element: &Element) -> Element {
    if element.tag == "pre" {
        return element.clone();
    }

    let mut collapser = Collapser::default();
    collapser.visit_children(&element.children);
    collapser.finish();

    let mut texts = collapser.texts.into_iter();
    Element {
        tag: element.tag.clone(),
        attrs: element.attrs.clone(),
        children: rebuild_children(&element.children, &mut texts),
    }
}

/// Walk state; `texts` holds the final value of every visited text node in
/// document order, `None` for removed nodes.
#[derive(Debug, Default)]
struct Collapser {
    texts: Vec<Option<String>>,
    prev_text: Option<usize>,
    keep_leading_ws: bool,
}

impl Collapser {
    fn visit_children(&mut self, children: &[Node]) {
        for child in children {
            match child {
                Node::Text(text) => self.visit_text(text),
                Node::Element(element) => self.visit_element(element),
                Node::Comment(_) => {}
            }
        }
    }

    fn visit_element(&mut self, element: &Element) {
        self.boundary(element);

        // `pre` is opaque; childless elements are only seen once
        if element.tag == "pre" || element.children.is_empty() {
            return;
        }

        self.visit_children(&element.children);
        self.boundary(element);
    }

    /// Element entry and exit share the same effect on the text state
    fn boundary(&mut self, element: &Element) {
        if element.is_block() || element.tag == "br" {
            self.trim_prev_text();
            self.prev_text = None;
            self.keep_leading_ws = false;
        } else if element.is_void() || element.tag == "pre" {
            self.prev_text = None;
            self.keep_leading_ws = true;
        } else if self.prev_text.is_some() {
            self.keep_leading_ws = false;
        }
    }

    fn visit_text(&mut self, text: &str) {
        let mut collapsed = collapse_runs(text);

        let prev_ends_with_space = match self.prev_text {
            Some(index) => self.texts[index]
                .as_deref()
                .is_some_and(|prev| prev.ends_with(' ')),
            None => true,
        };
        if prev_ends_with_space && !self.keep_leading_ws && collapsed.starts_with(' ') {
            collapsed.remove(0);
        }

        if collapsed.is_empty() {
            self.texts.push(None);
            return;
        }

        self.texts.push(Some(collapsed));
        self.prev_text = Some(self.texts.len() - 1);
    }

    fn trim_prev_text(&mut self) {
        if let Some(index) = self.prev_text
            && let Some(text) = self.texts[index].as_mut()
            && text.ends_with(' ')
        {
            text.pop();
        }
    }

    fn finish(&mut self) {
        self.trim_prev_text();
        if let Some(index) = self.prev_text
            && self.texts[index].as_deref() == Some("")
        {
            self.texts[index] = None;
        }
    }
}

/// Replace every run of `[ \r\n\t]` with a single space
fn collapse_runs(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    let mut in_run = false;

    for ch in text.chars() {
        if matches!(ch, ' ' | '\r' | '\n' | '\t') {
            if !in_run {
                output.push(' ');
                in_run = true;
            }
        } else {
            output.push(ch);
            in_run = false;
        }
    }

    output
}

fn rebuild_children<I>(children: &[Node], texts: &mut I) -> Vec<Node>
where
    I: Iterator<Item = Option<String>>,
{
    let mut output = Vec::with_capacity(children.len());

    for child in children {
        match child {
            Node::Text(_) => {
                if let Some(Some(text)) = texts.next() {
                    output.push(Node::Text(text));
                }
            }
            Node::Element(element) => {
                let children = if element.tag == "pre" {
                    element.children.clone()
                } else {
                    rebuild_children(&element.children, texts)
                };
                output.push(Node::Element(Element {
                    tag: element.tag.clone(),
                    attrs: element.attrs.clone(),
                    children,
                }));
            }
            Node::Comment(_) => {}
        }
    }

    output
}
