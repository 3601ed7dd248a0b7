//! Clipboard Markdown Converter
//!
//! This library turns rich-text clipboard content (HTML copied from
//! browsers, word processors and office suites) into Pandoc-flavoured
//! Markdown.
//!
//! # Architecture
//!
//! The library is structured into several modules:
//! - `clipboard`: CF_HTML fragment extraction and HTML/plain-text detection
//! - `charset`: Character encoding detection and decoding of raw bytes
//! - `parser`: HTML5 parsing using html5ever into an owned tree (`dom`)
//! - `cleaner`: Removal of office-suite markup before rendering
//! - `whitespace`: Whitespace collapsing ahead of the tree walk
//! - `rules`: The render rule registry and node context
//! - `converter`: Tree walker and pipeline composition
//! - `tables`: Text-level table repair
//! - `normalize`: Final punctuation and whitespace normalization
//!
//! # Examples
//!
//! ```rust
//! use clipboard_markdown_converter::convert;
//!
//! assert_eq!(convert("<h1>Title</h1>"), "Title\n=====");
//! assert_eq!(convert("<p>Hello <b>world</b></p>"), "Hello **world**");
//! ```

// Module declarations
pub mod charset;
pub mod cleaner;
pub mod clipboard;
pub mod converter;
pub mod dom;
pub mod error;
pub mod escape;
pub mod normalize;
pub mod parser;
pub mod rules;
pub mod style;
pub mod tables;
pub mod whitespace;

// Re-export main types for convenience
pub use converter::{ConversionOptions, MarkdownConverter};
pub use error::ConversionError;
pub use parser::parse_html;
pub use rules::{ConversionContext, FnRule, Rule};

/// Convert clipboard HTML or plain text with default options
///
/// Never fails: unparseable input is treated as plain text.
pub fn convert(input: &str) -> String {
    MarkdownConverter::new().convert(input)
}

/// Convert clipboard HTML or plain text with custom options
///
/// # Examples
///
/// ```rust
/// use clipboard_markdown_converter::{ConversionOptions, convert_with_options};
///
/// let options = ConversionOptions {
///     escape_markdown: false,
///     ..Default::default()
/// };
/// assert_eq!(convert_with_options("<p>2 * 3</p>", &options), "2 * 3");
/// ```
pub fn convert_with_options(input: &str, options: &ConversionOptions) -> String {
    MarkdownConverter::with_options(options.clone()).convert(input)
}

/// Convert raw clipboard bytes
///
/// Decodes the bytes (BOM, `<meta charset>`, UTF-8 fallback), reduces
/// Windows `CF_HTML` payloads to their HTML part and converts the result.
///
/// # Examples
///
/// ```rust
/// use clipboard_markdown_converter::convert_bytes;
///
/// assert_eq!(convert_bytes(b"\xEF\xBB\xBF<p>caf\xC3\xA9</p>"), "caf\u{e9}");
/// ```
pub fn convert_bytes(bytes: &[u8]) -> String {
    convert_bytes_with_options(bytes, &ConversionOptions::default())
}

/// Convert raw clipboard bytes with custom options
pub fn convert_bytes_with_options(bytes: &[u8], options: &ConversionOptions) -> String {
    let text = charset::decode_clipboard_bytes(bytes);
    let html = clipboard::extract_fragment(&text);
    convert_with_options(html, options)
}
