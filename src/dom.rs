//! Owned HTML tree used by every pipeline stage
//!
//! html5ever builds a reference-counted `RcDom`; the parser copies it into
//! this plain owned tree so that each stage (cleaning, whitespace collapsing,
//! rendering) can take a snapshot and return a new one without sharing
//! mutable structure. Trees are created per conversion call and dropped at
//! the end of it.

/// Elements rendered as blocks (surrounded by blank lines)
pub const BLOCK_ELEMENTS: &[&str] = &[
    "address",
    "article",
    "aside",
    "audio",
    "blockquote",
    "body",
    "canvas",
    "center",
    "dd",
    "dir",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "frameset",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "html",
    "isindex",
    "li",
    "main",
    "menu",
    "nav",
    "noframes",
    "noscript",
    "ol",
    "output",
    "p",
    "pre",
    "section",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
];

/// Elements that never have content
pub const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "command", "embed", "hr", "img", "input", "keygen", "link",
    "meta", "param", "source", "track", "wbr",
];

/// Elements that still produce output when they contain no text
const MEANINGFUL_WHEN_BLANK: &[&str] = &[
    "a", "table", "thead", "tbody", "tfoot", "th", "td", "iframe", "script", "audio", "video",
];

/// Elements whose text content is serialized without escaping
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "plaintext",
];

/// A node of the owned HTML tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    /// Element with tag name, attributes and children
    Element(Element),
    /// Text payload (entities already decoded)
    Text(String),
    /// Comment payload
    Comment(String),
}

/// An HTML element
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Element {
    /// Lowercase tag name; vendor tags keep their prefix (`o:p`)
    pub tag: String,
    /// Attributes in source order
    pub attrs: Vec<(String, String)>,
    /// Child nodes in source order
    pub children: Vec<Node>,
}

/// A parsed document: the top-level node list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    /// Top-level nodes (normally a single `html` element)
    pub children: Vec<Node>,
}

impl Element {
    /// Create an element without attributes
    pub fn new(tag: impl Into<String>, children: Vec<Node>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        }
    }

    /// Builder-style attribute setter, mostly for tests and custom rules
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Value of the first attribute with the given name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Returns true if the tag name matches one of `tags`
    pub fn is_any(&self, tags: &[&str]) -> bool {
        tags.contains(&self.tag.as_str())
    }

    /// Returns true if the element is rendered as a block
    pub fn is_block(&self) -> bool {
        self.is_any(BLOCK_ELEMENTS)
    }

    /// Returns true if the element can never have content
    pub fn is_void(&self) -> bool {
        self.is_any(VOID_ELEMENTS)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self) -> String {
        let mut output = String::new();
        collect_text(&self.children, &mut output);
        output
    }

    /// Element children only, skipping text and comments
    pub fn element_children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(Node::as_element)
    }

    /// An element is blank when it has no text, is not meaningful on its
    /// own and contains nothing that would render (images, links, cells).
    pub fn is_blank(&self) -> bool {
        !self.is_void()
            && !self.is_any(MEANINGFUL_WHEN_BLANK)
            && self.text_content().trim().is_empty()
            && !has_meaningful_descendant(&self.children)
    }
}

impl Node {
    /// Borrow the element payload
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Text content of this node
    pub fn text_content(&self) -> String {
        match self {
            Node::Element(element) => element.text_content(),
            Node::Text(text) => text.clone(),
            Node::Comment(_) => String::new(),
        }
    }
}

impl Document {
    /// Serialize the tree back to an HTML string
    pub fn to_html(&self) -> String {
        let mut output = String::new();
        for node in &self.children {
            serialize_node(node, false, &mut output);
        }
        output
    }

    /// Concatenated text of the whole document
    pub fn text_content(&self) -> String {
        let mut output = String::new();
        collect_text(&self.children, &mut output);
        output
    }
}

fn collect_text(nodes: &[Node], output: &mut String) {
    for node in nodes {
        match node {
            Node::Text(text) => output.push_str(text),
            Node::Element(element) => collect_text(&element.children, output),
            Node::Comment(_) => {}
        }
    }
}

fn has_meaningful_descendant(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Element(element) => {
            element.is_void()
                || element.is_any(MEANINGFUL_WHEN_BLANK)
                || has_meaningful_descendant(&element.children)
        }
        _ => false,
    })
}

fn serialize_node(node: &Node, raw_text: bool, output: &mut String) {
    match node {
        Node::Text(text) => {
            if raw_text {
                output.push_str(text);
            } else {
                escape_text(text, output);
            }
        }
        Node::Comment(text) => {
            output.push_str("<!--");
            output.push_str(text);
            output.push_str("-->");
        }
        Node::Element(element) => {
            output.push('<');
            output.push_str(&element.tag);
            for (name, value) in &element.attrs {
                output.push(' ');
                output.push_str(name);
                output.push_str("=\"");
                escape_attribute(value, output);
                output.push('"');
            }
            output.push('>');

            if element.is_void() {
                return;
            }

            let raw = element.is_any(RAW_TEXT_ELEMENTS);
            for child in &element.children {
                serialize_node(child, raw, output);
            }

            output.push_str("</");
            output.push_str(&element.tag);
            output.push('>');
        }
    }
}

fn escape_text(text: &str, output: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(ch),
        }
    }
}

fn escape_attribute(value: &str, output: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '"' => output.push_str("&quot;"),
            '\u{a0}' => output.push_str("&nbsp;"),
            _ => output.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(value: &str) -> Node {
        Node::Text(value.to_string())
    }

    #[test]
    fn test_attr_lookup_is_case_insensitive() {
        let element = Element::new("a", vec![]).with_attr("HREF", "http://x.com");
        assert_eq!(element.attr("href"), Some("http://x.com"));
        assert_eq!(element.attr("title"), None);
    }

    #[test]
    fn test_text_content_skips_comments() {
        let element = Element::new(
            "p",
            vec![
                text("Hello "),
                Node::Comment("ignored".to_string()),
                Node::Element(Element::new("b", vec![text("world")])),
            ],
        );
        assert_eq!(element.text_content(), "Hello world");
    }

    #[test]
    fn test_blank_detection() {
        assert!(Element::new("p", vec![text("  ")]).is_blank());
        assert!(!Element::new("p", vec![text("x")]).is_blank());
        // Images make their parent meaningful even without text
        assert!(!Element::new("p", vec![Node::Element(Element::new("img", vec![]))]).is_blank());
        // Anchors and cells are meaningful on their own
        assert!(!Element::new("a", vec![]).is_blank());
        assert!(!Element::new("td", vec![]).is_blank());
        assert!(!Element::new("br", vec![]).is_blank());
    }

    #[test]
    fn test_serialize_escapes_text_and_attributes() {
        let document = Document {
            children: vec![Node::Element(
                Element::new("p", vec![text("a < b & c\u{a0}d")]).with_attr("title", "say \"hi\""),
            )],
        };
        assert_eq!(
            document.to_html(),
            "<p title=\"say &quot;hi&quot;\">a &lt; b &amp; c&nbsp;d</p>"
        );
    }

    #[test]
    fn test_serialize_void_and_raw_text() {
        let document = Document {
            children: vec![
                Node::Element(Element::new("br", vec![])),
                Node::Element(Element::new("script", vec![text("if (a < b) {}")])),
                Node::Comment("note".to_string()),
            ],
        };
        assert_eq!(
            document.to_html(),
            "<br><script>if (a < b) {}</script><!--note-->"
        );
    }

    #[test]
    fn test_element_children_filters_text() {
        let element = Element::new(
            "ol",
            vec![
                text("\n"),
                Node::Element(Element::new("li", vec![text("a")])),
                text("\n"),
                Node::Element(Element::new("li", vec![text("b")])),
            ],
        );
        assert_eq!(element.element_children().count(), 2);
    }
}
