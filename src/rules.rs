//! Node renderer registry
//!
//! A [`Rule`] decides whether it applies to an element and turns the
//! element's already-rendered child content into a Markdown fragment. The
//! converter keeps rules in registration order and asks them in reverse, so a
//! rule registered later overrides an earlier one for the same element.
//!
//! Block rules return their fragment surrounded by the blank lines they need
//! (`"\n\n...\n\n"`); the converter merges adjacent newline runs and the
//! normalizer removes whatever is left over.
//!
//! # Built-in Rules
//!
//! | Element | Output |
//! |---|---|
//! | `h1`, `h2` | setext heading (`=` / `-` underline of the content's length) |
//! | `h3`-`h6` | ATX heading |
//! | `p`, `blockquote`, `hr`, `br` | paragraph, `> ` quote, `* * * * *`, `\` + newline |
//! | `ul`, `ol`, `li` | `-   item` / `1.  item`, nested content indented by 4 |
//! | `pre`, `code`, `kbd`, `samp`, `tt` | fenced block, backtick spans |
//! | `em`, `i`, `cite`, `var`, `strong`, `b` | `*text*`, `**text**` |
//! | `sup`, `sub` | `^text^`, `~text~` |
//! | `a[href]`, `img` | `<url>`, `[text](url "title")`, `![alt](src "title")` |
//! | `table` and parts | pipe table with a header separator row |
//! | styled `span`, `font` | bold, italic, underline, superscript or subscript from inline style |
//!
//! # Custom Rules
//!
//! ```rust
//! use clipboard_markdown_converter::converter::MarkdownConverter;
//! use clipboard_markdown_converter::rules::FnRule;
//!
//! let mut converter = MarkdownConverter::new();
//! converter.add_rule(FnRule::for_tags(&["mark"], |content, _node| {
//!     format!("=={content}==")
//! }));
//! assert_eq!(converter.convert("<p>a <mark>key</mark> point</p>"), "a ==key== point");
//! ```

use crate::dom::{Element, Node};
use crate::style;

/// Per-node view of the tree handed to rules
///
/// Holds the element, the chain of ancestor contexts, and the sibling slice
/// the element lives in. Contexts are created on the stack while walking and
/// only borrowed by rules.
#[derive(Debug, Clone, Copy)]
pub struct ConversionContext<'a> {
    element: &'a Element,
    parent: Option<&'a ConversionContext<'a>>,
    siblings: &'a [Node],
    index: usize,
}

impl<'a> ConversionContext<'a> {
    /// Create a context for `siblings[index]`, which must be `element`
    pub fn new(
        element: &'a Element,
        parent: Option<&'a ConversionContext<'a>>,
        siblings: &'a [Node],
        index: usize,
    ) -> Self {
        Self {
            element,
            parent,
            siblings,
            index,
        }
    }

    /// Context for an element without surrounding tree, mainly for tests
    pub fn detached(element: &'a Element) -> Self {
        Self {
            element,
            parent: None,
            siblings: &[],
            index: 0,
        }
    }

    /// The element being rendered
    pub fn element(&self) -> &'a Element {
        self.element
    }

    /// Lowercase tag name
    pub fn tag(&self) -> &'a str {
        self.element.tag.as_str()
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.element.attr(name)
    }

    /// Context of the parent element, `None` at the top of the document
    pub fn parent(&self) -> Option<&'a ConversionContext<'a>> {
        self.parent
    }

    /// Tag of the parent element
    pub fn parent_tag(&self) -> Option<&'a str> {
        self.parent.map(|parent| parent.tag())
    }

    /// Ancestor contexts, nearest first
    pub fn ancestors(&self) -> impl Iterator<Item = &'a ConversionContext<'a>> {
        std::iter::successors(self.parent, |context| context.parent)
    }

    /// Node directly before this element
    pub fn previous_sibling(&self) -> Option<&'a Node> {
        self.siblings.get(self.index.checked_sub(1)?)
    }

    /// Node directly after this element
    pub fn next_sibling(&self) -> Option<&'a Node> {
        self.siblings.get(self.index + 1)
    }

    /// 1-based position among the parent's element children
    pub fn element_position(&self) -> usize {
        self.siblings[..self.index.min(self.siblings.len())]
            .iter()
            .filter(|node| node.as_element().is_some())
            .count()
            + 1
    }

    /// Returns true if an element sibling follows this element
    pub fn has_next_element_sibling(&self) -> bool {
        self.siblings
            .iter()
            .skip(self.index + 1)
            .any(|node| node.as_element().is_some())
    }

    /// Number of enclosing `ul`/`ol` elements
    pub fn list_depth(&self) -> usize {
        self.ancestors()
            .filter(|ancestor| ancestor.element.is_any(&["ul", "ol"]))
            .count()
    }
}

/// A rendering rule: element predicate plus renderer
///
/// `render` receives the element's children already rendered to Markdown and
/// must never fail; missing attributes fall back to documented defaults.
pub trait Rule: Send + Sync {
    /// Returns true if this rule renders the element
    fn matches(&self, node: &ConversionContext<'_>) -> bool;

    /// Combine the rendered child content into the element's fragment
    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String;
}

type Matcher = Box<dyn Fn(&ConversionContext<'_>) -> bool + Send + Sync>;
type Renderer = Box<dyn Fn(&str, &ConversionContext<'_>) -> String + Send + Sync>;

/// Rule built from closures, for custom rules registered at runtime
pub struct FnRule {
    matcher: Matcher,
    renderer: Renderer,
}

impl FnRule {
    /// Create a rule from a predicate and a renderer
    pub fn new<M, R>(matcher: M, renderer: R) -> Self
    where
        M: Fn(&ConversionContext<'_>) -> bool + Send + Sync + 'static,
        R: Fn(&str, &ConversionContext<'_>) -> String + Send + Sync + 'static,
    {
        Self {
            matcher: Box::new(matcher),
            renderer: Box::new(renderer),
        }
    }

    /// Create a rule matching a fixed set of tag names
    pub fn for_tags<R>(tags: &[&str], renderer: R) -> Self
    where
        R: Fn(&str, &ConversionContext<'_>) -> String + Send + Sync + 'static,
    {
        let tags: Vec<String> = tags.iter().map(|tag| tag.to_ascii_lowercase()).collect();
        Self::new(move |node| tags.iter().any(|tag| tag == node.tag()), renderer)
    }
}

impl Rule for FnRule {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        (self.matcher)(node)
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        (self.renderer)(content, node)
    }
}

/// Built-in rules in registration order
///
/// Table rules are only registered when `tables` is true; without them table
/// markup falls back to the default block rendering.
pub fn default_rules(tables: bool) -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = vec![
        Box::new(Paragraph),
        Box::new(LineBreak),
        Box::new(Heading),
        Box::new(Blockquote),
        Box::new(List),
        Box::new(ListItem),
        Box::new(HorizontalRule),
        Box::new(FencedCode),
        Box::new(InlineCode),
        Box::new(Monospace),
        Box::new(Emphasis),
        Box::new(Strong),
        Box::new(DocsBoldWrapper),
        Box::new(Superscript),
        Box::new(Subscript),
        Box::new(Link),
        Box::new(Image),
        Box::new(StyledSpan),
    ];

    if tables {
        rules.push(Box::new(TableSection));
        rules.push(Box::new(TableCell));
        rules.push(Box::new(TableRow));
        rules.push(Box::new(TableCaption));
        rules.push(Box::new(Table));
    }

    rules
}

/// Wrap content in delimiters, keeping its edge whitespace outside
///
/// Whitespace-only content produces nothing.
///
/// ```rust
/// use clipboard_markdown_converter::rules::wrap_trimmed;
///
/// assert_eq!(wrap_trimmed(" bold ", "**", "**"), " **bold** ");
/// assert_eq!(wrap_trimmed("   ", "**", "**"), "");
/// ```
pub fn wrap_trimmed(content: &str, open: &str, close: &str) -> String {
    let trimmed = content.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let leading = &content[..content.len() - content.trim_start().len()];
    let trailing = &content[content.trim_end().len()..];
    format!("{leading}{open}{trimmed}{close}{trailing}")
}

/// Count of `char`s, used for setext underline width
fn display_len(text: &str) -> usize {
    text.chars().count()
}

// ============================================================================
// Block rules
// ============================================================================

struct Paragraph;

impl Rule for Paragraph {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "p"
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        format!("\n\n{content}\n\n")
    }
}

struct LineBreak;

impl Rule for LineBreak {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "br"
    }

    fn render(&self, _content: &str, _node: &ConversionContext<'_>) -> String {
        "\\\n".to_string()
    }
}

/// `h1`/`h2` as setext headings, `h3`-`h6` as ATX headings
struct Heading;

impl Rule for Heading {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.element().is_any(&["h1", "h2", "h3", "h4", "h5", "h6"])
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        let level = node.tag()[1..].parse::<usize>().unwrap_or(1);

        match level {
            1 | 2 => {
                let marker = if level == 1 { "=" } else { "-" };
                let underline = marker.repeat(display_len(content));
                format!("\n\n{content}\n{underline}\n\n")
            }
            _ => format!("\n\n{} {content}\n\n", "#".repeat(level)),
        }
    }
}

struct Blockquote;

impl Rule for Blockquote {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "blockquote"
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        let quoted = content
            .trim_matches('\n')
            .split('\n')
            .map(|line| format!("> {line}"))
            .collect::<Vec<_>>()
            .join("\n");
        format!("\n\n{quoted}\n\n")
    }
}

struct List;

impl Rule for List {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.element().is_any(&["ul", "ol"])
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        // A nested list closing its item attaches directly below the item text
        if node.parent_tag() == Some("li") && !node.has_next_element_sibling() {
            format!("\n{content}")
        } else {
            format!("\n\n{content}\n\n")
        }
    }
}

/// List items with Pandoc spacing: the marker is padded to four columns
/// and continuation lines are indented by four spaces.
struct ListItem;

impl ListItem {
    fn prefix(node: &ConversionContext<'_>) -> String {
        if node.parent_tag() == Some("ol") {
            format!("{:<4}", format!("{}. ", node.element_position()))
        } else {
            "-   ".to_string()
        }
    }
}

impl Rule for ListItem {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "li"
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        let body = content.trim_start().trim_end().replace('\n', "\n    ");
        let separator = if node.has_next_element_sibling() { "\n" } else { "" };
        format!("{}{body}{separator}", Self::prefix(node))
    }
}

struct HorizontalRule;

impl Rule for HorizontalRule {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "hr"
    }

    fn render(&self, _content: &str, _node: &ConversionContext<'_>) -> String {
        "\n\n* * * * *\n\n".to_string()
    }
}

/// `pre` blocks as fenced code
///
/// The code is taken verbatim from the element text; the language comes from
/// a `language-*` or `lang-*` class on the inner `code` or on the `pre`.
struct FencedCode;

impl FencedCode {
    fn language(node: &ConversionContext<'_>) -> String {
        let code = node.element().element_children().find(|child| child.tag == "code");
        [code, Some(node.element())]
            .into_iter()
            .flatten()
            .filter_map(|element| element.attr("class"))
            .flat_map(str::split_whitespace)
            .find_map(|class| {
                class
                    .strip_prefix("language-")
                    .or_else(|| class.strip_prefix("lang-"))
            })
            .unwrap_or_default()
            .to_string()
    }

    /// Shortest backtick fence (at least three) longer than any fence-like
    /// run at the start of a code line
    fn fence(code: &str) -> String {
        let longest = code
            .lines()
            .map(|line| line.chars().take_while(|c| *c == '`').count())
            .filter(|run| *run >= 3)
            .max()
            .unwrap_or(0);
        "`".repeat((longest + 1).max(3))
    }
}

impl Rule for FencedCode {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "pre"
    }

    fn render(&self, _content: &str, node: &ConversionContext<'_>) -> String {
        let text = node.element().text_content().replace("\r\n", "\n");
        let code = text.strip_suffix('\n').unwrap_or(&text);
        let fence = Self::fence(code);
        let language = Self::language(node);
        format!("\n\n{fence}{language}\n{code}\n{fence}\n\n")
    }
}

// ============================================================================
// Inline rules
// ============================================================================

/// Inline `code` with a delimiter longer than any backtick run inside
struct InlineCode;

impl Rule for InlineCode {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "code" && node.parent_tag() != Some("pre")
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        if content.is_empty() {
            return String::new();
        }

        let code = content.replace("\r\n", " ").replace(['\r', '\n'], " ");
        let padded = code.starts_with('`')
            || code.ends_with('`')
            || (code.starts_with(' ') && code.ends_with(' ') && !code.trim().is_empty());
        let extra = if padded { " " } else { "" };

        // Backtick runs inside the code must differ from the delimiter
        let mut delimiter = "`".to_string();
        while code.split(|c| c != '`').any(|run| run == delimiter) {
            delimiter.push('`');
        }

        format!("{delimiter}{extra}{code}{extra}{delimiter}")
    }
}

/// `kbd`, `samp` and `tt` as plain backtick spans
struct Monospace;

impl Rule for Monospace {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.element().is_any(&["kbd", "samp", "tt"])
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        format!("`{content}`")
    }
}

struct Emphasis;

impl Rule for Emphasis {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.element().is_any(&["em", "i", "cite", "var"])
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        wrap_trimmed(content, "*", "*")
    }
}

struct Strong;

impl Rule for Strong {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.element().is_any(&["strong", "b"])
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        wrap_trimmed(content, "**", "**")
    }
}

/// Google Docs wraps whole selections in `<b style="font-weight:normal">`
struct DocsBoldWrapper;

impl Rule for DocsBoldWrapper {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        if node.tag() != "b" {
            return false;
        }
        let declarations = style::parse_style(node.attr("style").unwrap_or_default());
        style::declaration_value(&declarations, "font-weight")
            .is_some_and(|_| !style::implies_bold(&declarations))
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        content.to_string()
    }
}

struct Superscript;

impl Rule for Superscript {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "sup"
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        format!("^{content}^")
    }
}

struct Subscript;

impl Rule for Subscript {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "sub"
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        format!("~{content}~")
    }
}

/// Anchors with an `href`; anchors without one pass their content through
struct Link;

impl Rule for Link {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "a" && node.attr("href").is_some_and(|href| !href.is_empty())
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        let href = node.attr("href").unwrap_or_default();
        let text = node.element().text_content();
        let text = text.trim();

        let leading = &content[..content.len() - content.trim_start().len()];
        let trailing = &content[content.trim_end().len()..];
        let label = content.trim();

        let link = if label == href || text == href {
            format!("<{href}>")
        } else if href.strip_prefix("mailto:") == Some(text) && !text.is_empty() {
            format!("<{text}>")
        } else {
            let title = node
                .attr("title")
                .filter(|title| !title.is_empty())
                .map(|title| format!(" \"{}\"", title.replace('"', "\\\"")))
                .unwrap_or_default();
            format!("[{label}]({href}{title})")
        };

        format!("{leading}{link}{trailing}")
    }
}

struct Image;

impl Rule for Image {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "img"
    }

    fn render(&self, _content: &str, node: &ConversionContext<'_>) -> String {
        let Some(src) = node.attr("src").filter(|src| !src.is_empty()) else {
            return String::new();
        };

        let alt = clean_attribute(node.attr("alt").unwrap_or_default());
        let title = clean_attribute(node.attr("title").unwrap_or_default());
        let title = if title.is_empty() {
            String::new()
        } else {
            format!(" \"{}\"", title.replace('"', "\\\""))
        };

        format!("![{alt}]({src}{title})")
    }
}

/// Collapse line breaks inside attribute values used in Markdown syntax
fn clean_attribute(value: &str) -> String {
    value
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// `span` and `font` wrappers the cleaner kept because their style carries
/// meaning
struct StyledSpan;

impl Rule for StyledSpan {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        if !node.element().is_any(&["span", "font"]) {
            return false;
        }
        let declarations = style::parse_style(node.attr("style").unwrap_or_default());
        style::implies_bold(&declarations)
            || style::implies_italic(&declarations)
            || style::implies_underline(&declarations)
            || vertical_align(&declarations).is_some()
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        let declarations = style::parse_style(node.attr("style").unwrap_or_default());
        let mut output = content.to_string();

        if style::implies_italic(&declarations) {
            output = wrap_trimmed(&output, "*", "*");
        }
        if style::implies_bold(&declarations) {
            output = wrap_trimmed(&output, "**", "**");
        }
        if style::implies_underline(&declarations) {
            output = wrap_trimmed(&output, "[", "]{.underline}");
        }
        match vertical_align(&declarations) {
            Some("super") => output = format!("^{output}^"),
            Some("sub") => output = format!("~{output}~"),
            _ => {}
        }

        output
    }
}

fn vertical_align(declarations: &[style::Declaration]) -> Option<&'static str> {
    match style::declaration_value(declarations, "vertical-align")?.as_str() {
        "super" => Some("super"),
        "sub" => Some("sub"),
        _ => None,
    }
}

// ============================================================================
// Table rules
// ============================================================================

/// Column alignment for the header separator row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TableAlignment {
    Default,
    Left,
    Center,
    Right,
}

impl TableAlignment {
    fn of(cell: &Element) -> Self {
        let align = cell.attr("align").map(str::to_ascii_lowercase).or_else(|| {
            let declarations = style::parse_style(cell.attr("style").unwrap_or_default());
            style::declaration_value(&declarations, "text-align")
        });

        match align.as_deref() {
            Some("left") => TableAlignment::Left,
            Some("center") => TableAlignment::Center,
            Some("right") => TableAlignment::Right,
            _ => TableAlignment::Default,
        }
    }

    fn separator(self) -> &'static str {
        match self {
            TableAlignment::Default => "---",
            TableAlignment::Left => ":---",
            TableAlignment::Center => ":---:",
            TableAlignment::Right => "---:",
        }
    }
}

/// First row of a table, looking through `thead`/`tbody`/`tfoot`
fn first_row(table: &Element) -> Option<&Element> {
    table.element_children().find_map(|child| match child.tag.as_str() {
        "tr" => Some(child),
        "thead" | "tbody" | "tfoot" => child.element_children().find(|row| row.tag == "tr"),
        _ => None,
    })
}

fn is_header_row(node: &ConversionContext<'_>) -> bool {
    node.ancestors()
        .find(|ancestor| ancestor.tag() == "table")
        .and_then(|table| first_row(table.element()))
        .is_some_and(|row| std::ptr::eq(row, node.element()))
}

struct TableCell;

impl Rule for TableCell {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.element().is_any(&["th", "td"])
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        let cell = content
            .trim()
            .replace("\\\n", " ")
            .replace("\r\n", " ")
            .replace(['\n', '\r'], " ")
            .replace('|', "\\|");
        let prefix = if node.element_position() == 1 { "| " } else { " " };
        format!("{prefix}{cell} |")
    }
}

struct TableRow;

impl Rule for TableRow {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "tr"
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        if !is_header_row(node) {
            return format!("\n{content}\n");
        }

        let separator = node
            .element()
            .element_children()
            .filter(|cell| cell.is_any(&["th", "td"]))
            .map(|cell| TableAlignment::of(cell).separator())
            .collect::<Vec<_>>();

        if separator.is_empty() {
            return format!("\n{content}\n");
        }
        format!("\n{content}\n| {} |\n", separator.join(" | "))
    }
}

struct TableSection;

impl Rule for TableSection {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.element().is_any(&["thead", "tbody", "tfoot"])
    }

    fn render(&self, content: &str, _node: &ConversionContext<'_>) -> String {
        format!("\n{}\n", content.trim_matches('\n'))
    }
}

/// Captions are emitted by the table rule below the rows
struct TableCaption;

impl Rule for TableCaption {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "caption"
    }

    fn render(&self, _content: &str, _node: &ConversionContext<'_>) -> String {
        String::new()
    }
}

struct Table;

impl Rule for Table {
    fn matches(&self, node: &ConversionContext<'_>) -> bool {
        node.tag() == "table"
    }

    fn render(&self, content: &str, node: &ConversionContext<'_>) -> String {
        let rows = content.trim_matches('\n');
        let caption = node
            .element()
            .element_children()
            .find(|child| child.tag == "caption")
            .map(|caption| caption.text_content().trim().to_string())
            .filter(|caption| !caption.is_empty());

        match caption {
            Some(caption) => format!("\n\n{rows}\n\nTable: {caption}\n\n"),
            None => format!("\n\n{rows}\n\n"),
        }
    }
}
