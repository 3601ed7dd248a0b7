//! Markdown converter - transforms clipboard HTML into Pandoc-flavoured Markdown
//!
//! This module holds the tree walker and the composition of the whole
//! pipeline:
//!
//! ```text
//! raw HTML ─► parse ─► clean ─► collapse whitespace ─► walk rules
//!          ─► repair tables ─► normalize ─► Markdown
//! ```
//!
//! # Tree Walk
//!
//! The walker renders the tree depth-first and bottom-up: an element's
//! children are rendered and joined first, then the matching [`Rule`] turns
//! that content into the element's own fragment.
//!
//! - **Rule lookup**: blank elements render as `"\n\n"` (block) or `""`
//!   (inline); otherwise rules are asked in reverse registration order; an
//!   element no rule matches passes its content through, wrapped in blank
//!   lines when it is a block.
//! - **Joining**: fragments are concatenated keeping at most two newlines at
//!   each seam (the larger of the two newline runs that meet).
//! - **Flanking whitespace**: whitespace at the edges of an inline element is
//!   moved outside the rendered syntax, so `<b>bold </b>` becomes `**bold** `.
//! - **Skipped subtrees**: `script`, `style`, `noscript`, `template` and the
//!   document `head` produce nothing.
//!
//! # Examples
//!
//! ```rust
//! use clipboard_markdown_converter::converter::MarkdownConverter;
//!
//! let converter = MarkdownConverter::new();
//! assert_eq!(converter.convert("<h1>Title</h1>"), "Title\n=====");
//! assert_eq!(converter.convert("<p>Hello <b>world</b></p>"), "Hello **world**");
//! ```
//!
//! # Failure Semantics
//!
//! `convert` never fails. Input that does not look like HTML skips the
//! parser and goes straight to table repair and normalization.

use crate::cleaner::clean_document;
use crate::clipboard::{looks_like_html, normalize_line_endings};
use crate::dom::{Document, Node};
use crate::escape::escape_markdown;
use crate::normalize::normalize;
use crate::parser::{MAX_NESTING_DEPTH, parse_html};
use crate::rules::{ConversionContext, Rule, default_rules};
use crate::tables::repair_tables;
use crate::whitespace::collapse_whitespace;

/// Elements whose subtree never contributes output
const SKIPPED_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head", "title"];

/// Conversion options
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionOptions {
    /// Strip office markup before rendering
    pub clean_source: bool,
    /// Render HTML tables as pipe tables
    pub tables: bool,
    /// Run the text-level table repair pass
    pub repair_tables: bool,
    /// Backslash-escape Markdown syntax found in text
    pub escape_markdown: bool,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self {
            clean_source: true,
            tables: true,
            repair_tables: true,
            escape_markdown: true,
        }
    }
}

/// Main Markdown converter
///
/// Holds the options and the rule registry. The registry is read-only while
/// converting, so one converter can be shared between threads.
///
/// # Usage
///
/// ```rust
/// use clipboard_markdown_converter::converter::{ConversionOptions, MarkdownConverter};
///
/// let options = ConversionOptions {
///     escape_markdown: false,
///     ..Default::default()
/// };
/// let converter = MarkdownConverter::with_options(options);
/// assert_eq!(converter.convert("<p>snake_case</p>"), "snake_case");
/// ```
pub struct MarkdownConverter {
    options: ConversionOptions,
    rules: Vec<Box<dyn Rule>>,
}

impl MarkdownConverter {
    /// Create a new converter with default options and the built-in rules
    pub fn new() -> Self {
        Self::with_options(ConversionOptions::default())
    }

    /// Create a new converter with custom options
    ///
    /// # Arguments
    ///
    /// * `options` - Conversion options; `tables` decides whether the table
    ///   rules are registered
    pub fn with_options(options: ConversionOptions) -> Self {
        let rules = default_rules(options.tables);
        Self { options, rules }
    }

    /// Options this converter was built with
    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    /// Register a rule that takes precedence over every rule added before it
    pub fn add_rule<R>(&mut self, rule: R) -> &mut Self
    where
        R: Rule + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Convert clipboard content to normalized Markdown
    ///
    /// Runs the full pipeline. HTML is parsed, cleaned (when
    /// `clean_source` is set) and rendered; plain text is passed on as is.
    /// Both then go through table repair (when `repair_tables` is set) and
    /// normalization.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use clipboard_markdown_converter::converter::MarkdownConverter;
    ///
    /// let converter = MarkdownConverter::new();
    /// assert_eq!(
    ///     converter.convert(r#"<a href="http://x.com">http://x.com</a>"#),
    ///     "<http://x.com>"
    /// );
    /// assert_eq!(converter.convert("Name  Age\nBob  42"), "| Name | Age |\n| ---- | --- |\n| Bob | 42 |");
    /// ```
    pub fn convert(&self, input: &str) -> String {
        let markdown = if looks_like_html(input) {
            match parse_html(input) {
                Ok(document) if self.options.clean_source => {
                    self.render_document(&clean_document(&document))
                }
                Ok(document) => self.render_document(&document),
                Err(err) => {
                    tracing::debug!(error = %err, "HTML parsing failed, treating input as text");
                    normalize_line_endings(input)
                }
            }
        } else {
            tracing::debug!(bytes = input.len(), "input is plain text, skipping HTML rendering");
            normalize_line_endings(input)
        };

        let markdown = if self.options.repair_tables {
            repair_tables(&markdown)
        } else {
            markdown
        };

        normalize(&markdown)
    }

    /// Render HTML to raw Markdown without cleaning, table repair or
    /// normalization
    ///
    /// Block fragments keep the blank lines their rules produce; only the
    /// leading and trailing newlines of the whole output are removed.
    ///
    /// ```rust
    /// use clipboard_markdown_converter::converter::MarkdownConverter;
    ///
    /// let converter = MarkdownConverter::new();
    /// assert_eq!(converter.render("<p>One</p><p>Two</p>"), "One\n\nTwo");
    /// assert_eq!(converter.render(""), "");
    /// ```
    pub fn render(&self, html: &str) -> String {
        match parse_html(html) {
            Ok(document) => self.render_document(&document),
            Err(err) => {
                tracing::debug!(error = %err, "nothing to render");
                String::new()
            }
        }
    }

    /// Render a parsed document to raw Markdown
    pub fn render_document(&self, document: &Document) -> String {
        let document = collapse_whitespace(document);
        let output = self.process(&document.children, None, false, 0);
        tracing::trace!(bytes = output.len(), "rendered document");
        post_process(&output)
    }

    /// Render and join a list of sibling nodes
    fn process<'a>(
        &self,
        children: &'a [Node],
        parent: Option<&'a ConversionContext<'a>>,
        in_code: bool,
        depth: usize,
    ) -> String {
        let mut output = String::new();

        for (index, child) in children.iter().enumerate() {
            let replacement = match child {
                Node::Text(text) => self.render_text(text, children, index, in_code),
                Node::Element(element) => {
                    let node = ConversionContext::new(element, parent, children, index);
                    self.render_element(&node, in_code, depth)
                }
                Node::Comment(_) => continue,
            };
            join(&mut output, &replacement);
        }

        output
    }

    fn render_element(&self, node: &ConversionContext<'_>, in_code: bool, depth: usize) -> String {
        let element = node.element();
        if element.is_any(SKIPPED_ELEMENTS) {
            return String::new();
        }

        if depth >= MAX_NESTING_DEPTH {
            tracing::debug!(depth, "nesting limit reached, rendering subtree as text");
            return self.escape(&element.text_content());
        }

        let in_code = in_code || element.is_any(&["code", "pre"]);
        let content = self.process(&element.children, Some(node), in_code, depth + 1);

        let (leading, trailing) = flanking_whitespace(node);
        let content = if leading.is_empty() && trailing.is_empty() {
            content.as_str()
        } else {
            content.trim()
        };

        let replacement = if element.is_blank() {
            if element.is_block() {
                "\n\n".to_string()
            } else {
                String::new()
            }
        } else {
            match self.rules.iter().rev().find(|rule| rule.matches(node)) {
                Some(rule) => rule.render(content, node),
                None if element.is_block() => format!("\n\n{content}\n\n"),
                None => content.to_string(),
            }
        };

        format!("{leading}{replacement}{trailing}")
    }

    /// Text nodes: verbatim inside code, escaped elsewhere
    ///
    /// Whitespace-only text is dropped unless it separates two inline
    /// siblings, where it is the only space between their fragments.
    fn render_text(&self, text: &str, siblings: &[Node], index: usize, in_code: bool) -> String {
        if in_code {
            return text.to_string();
        }

        if text.trim().is_empty() {
            return if separates_inline_siblings(siblings, index) {
                text.to_string()
            } else {
                String::new()
            };
        }

        self.escape(text)
    }

    fn escape(&self, text: &str) -> String {
        if self.options.escape_markdown {
            escape_markdown(text)
        } else {
            text.to_string()
        }
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

/// Append `replacement`, keeping at most two newlines at the seam
fn join(output: &mut String, replacement: &str) {
    let kept = output.trim_end_matches('\n').len();
    let trailing = output.len() - kept;
    let stripped = replacement.trim_start_matches('\n');
    let leading = replacement.len() - stripped.len();

    output.truncate(kept);
    output.push_str(&"\n\n"[..trailing.max(leading).min(2)]);
    output.push_str(stripped);
}

fn post_process(output: &str) -> String {
    output
        .trim_start_matches(['\t', '\r', '\n'])
        .trim_end()
        .to_string()
}

fn is_ascii_whitespace(ch: char) -> bool {
    matches!(ch, ' ' | '\t' | '\r' | '\n')
}

/// Edge whitespace of an inline element that belongs outside its syntax
///
/// ASCII whitespace is dropped when the neighbouring sibling already ends
/// (or starts) with a space; other whitespace such as `&nbsp;` is kept.
fn flanking_whitespace(node: &ConversionContext<'_>) -> (String, String) {
    if node.element().is_block() {
        return (String::new(), String::new());
    }

    let text = node.element().text_content();

    let after_ascii = text.trim_start_matches(is_ascii_whitespace);
    let content_start = text.trim_start();
    let leading_ascii = &text[..text.len() - after_ascii.len()];
    let leading_non_ascii = &after_ascii[..after_ascii.len() - content_start.len()];

    let mut leading = format!("{leading_ascii}{leading_non_ascii}");
    let mut trailing = String::new();

    // Whitespace-only content is all leading
    if !content_start.is_empty() {
        let content = text.trim_end();
        let trailing_all = &text[content.len()..];
        let trailing_non_ascii = trailing_all.trim_end_matches(is_ascii_whitespace);
        let trailing_ascii = &trailing_all[trailing_non_ascii.len()..];

        trailing = trailing_all.to_string();
        if !trailing_ascii.is_empty() && flanked_by_space(node.next_sibling(), Side::Right) {
            trailing = trailing_non_ascii.to_string();
        }
    }

    if !leading_ascii.is_empty() && flanked_by_space(node.previous_sibling(), Side::Left) {
        leading = leading_non_ascii.to_string();
    }

    (leading, trailing)
}

#[derive(Debug, Clone, Copy)]
enum Side {
    Left,
    Right,
}

fn flanked_by_space(sibling: Option<&Node>, side: Side) -> bool {
    let text = match sibling {
        Some(Node::Text(text)) => text.clone(),
        Some(Node::Element(element)) if !element.is_block() => element.text_content(),
        _ => return false,
    };

    match side {
        Side::Left => text.ends_with(' '),
        Side::Right => text.starts_with(' '),
    }
}

/// Keeps the space in `<b>a</b> <i>b</i>`; dropping it would fuse the
/// fragments into `**a***b*`.
fn separates_inline_siblings(siblings: &[Node], index: usize) -> bool {
    let is_inline = |node: Option<&Node>| match node {
        Some(Node::Text(_)) => true,
        Some(Node::Element(element)) => !element.is_block(),
        _ => false,
    };

    index > 0 && is_inline(siblings.get(index - 1)) && is_inline(siblings.get(index + 1))
}
