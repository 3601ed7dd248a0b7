//! Clipboard payload helpers
//!
//! Two small decisions happen before the HTML pipeline runs:
//!
//! - Windows `CF_HTML` payloads start with an ASCII description header
//!   (`Version:`, `StartHTML:`, `EndHTML:`, `StartFragment:`, `EndFragment:`)
//!   whose byte offsets locate the markup. The header is not HTML and would
//!   otherwise leak into the output as text.
//! - Plain-text clipboard content must bypass HTML parsing, which would
//!   collapse the whitespace that column-aligned text tables depend on.

use regex::Regex;
use std::sync::OnceLock;

/// Offsets parsed from a `CF_HTML` description header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct CfHtmlHeader {
    start_html: Option<usize>,
    end_html: Option<usize>,
    start_fragment: Option<usize>,
    end_fragment: Option<usize>,
    /// Byte offset of the first character after the header
    header_len: usize,
}

/// Reduce a clipboard payload to its HTML markup
///
/// For `CF_HTML` payloads the `StartHTML`..`EndHTML` range is returned (it
/// keeps the context tags such as `<table>` around a partial selection);
/// when those offsets are absent or invalid the `StartFragment`..`EndFragment`
/// range is used, and as a last resort everything after the header. Any
/// other input is returned unchanged.
///
/// ```rust
/// use clipboard_markdown_converter::clipboard::extract_fragment;
///
/// let payload = "Version:0.9\r\nStartHTML:-1\r\nEndHTML:-1\r\n\
///                StartFragment:0000000089\r\nEndFragment:0000000101\r\n\
///                <b>Hello</b>";
/// assert_eq!(extract_fragment(payload), "<b>Hello</b>");
/// assert_eq!(extract_fragment("<p>plain html</p>"), "<p>plain html</p>");
/// ```
pub fn extract_fragment(raw: &str) -> &str {
    let Some(header) = parse_cf_html_header(raw) else {
        return raw;
    };

    let ranges = [
        (header.start_html, header.end_html),
        (header.start_fragment, header.end_fragment),
    ];

    for (start, end) in ranges {
        if let (Some(start), Some(end)) = (start, end)
            && start >= header.header_len
            && start <= end
            && let Some(html) = raw.get(start..end)
        {
            return html;
        }
    }

    tracing::debug!("CF_HTML offsets unusable, dropping header only");
    &raw[header.header_len..]
}

/// Decide whether clipboard text is HTML markup or plain text
///
/// Any tag-like construct (`<p>`, `</div>`, `<br/>`, `<o:p>`, a comment)
/// marks the input as HTML.
///
/// ```rust
/// use clipboard_markdown_converter::clipboard::looks_like_html;
///
/// assert!(looks_like_html("<p>Hello</p>"));
/// assert!(looks_like_html("line<br>break"));
/// assert!(!looks_like_html("Name  Age\nBob  42"));
/// assert!(!looks_like_html("if a < b then"));
/// ```
pub fn looks_like_html(text: &str) -> bool {
    static TAG_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = TAG_REGEX.get_or_init(|| {
        Regex::new(r"(?i)<(?:[a-z][a-z0-9:-]*(?:\s[^<>]*)?/?>|/[a-z][a-z0-9:-]*\s*>|!--)").ok()
    });

    match regex.as_ref() {
        Some(regex) => regex.is_match(text),
        None => text.contains('<'),
    }
}

/// Normalize line endings of plain-text clipboard content
pub fn normalize_line_endings(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

fn parse_cf_html_header(raw: &str) -> Option<CfHtmlHeader> {
    if !raw.starts_with("Version:") {
        return None;
    }

    let mut header = CfHtmlHeader::default();
    let mut offset = 0;

    for line in raw.split_inclusive('\n') {
        let trimmed = line.trim_end_matches(['\r', '\n']);
        let Some((key, value)) = trimmed.split_once(':') else {
            break;
        };
        if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphabetic()) {
            break;
        }

        // Negative offsets (-1) mark an absent range
        let position = value.trim().parse::<usize>().ok();
        match key {
            "StartHTML" => header.start_html = position,
            "EndHTML" => header.end_html = position,
            "StartFragment" => header.start_fragment = position,
            "EndFragment" => header.end_fragment = position,
            _ => {}
        }
        offset += line.len();
    }

    header.header_len = offset;
    Some(header)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_cf_html(fragment: &str) -> String {
        // Offsets are written as fixed-width numbers, so the header length is
        // independent of the values.
        let template = |start_html: usize, end_html: usize, start_frag: usize, end_frag: usize| {
            format!(
                "Version:0.9\r\nStartHTML:{start_html:010}\r\nEndHTML:{end_html:010}\r\n\
                 StartFragment:{start_frag:010}\r\nEndFragment:{end_frag:010}\r\n"
            )
        };
        let header_len = template(0, 0, 0, 0).len();
        let prefix = "<html><body>\r\n<!--StartFragment-->";
        let suffix = "<!--EndFragment-->\r\n</body></html>";
        let start_html = header_len;
        let start_frag = start_html + prefix.len();
        let end_frag = start_frag + fragment.len();
        let end_html = end_frag + suffix.len();

        format!(
            "{}{}{}{}",
            template(start_html, end_html, start_frag, end_frag),
            prefix,
            fragment,
            suffix
        )
    }

    #[test]
    fn test_cf_html_uses_html_range() {
        let payload = build_cf_html("<b>Grüße</b>");
        assert_eq!(
            extract_fragment(&payload),
            "<html><body>\r\n<!--StartFragment--><b>Grüße</b><!--EndFragment-->\r\n</body></html>"
        );
    }

    #[test]
    fn test_cf_html_fragment_range_when_html_range_missing() {
        let payload = "Version:0.9\r\nStartHTML:-1\r\nEndHTML:-1\r\n\
                       StartFragment:0000000089\r\nEndFragment:0000000101\r\n<b>Hello</b>";
        assert_eq!(extract_fragment(payload), "<b>Hello</b>");
    }

    #[test]
    fn test_cf_html_invalid_offsets_drop_header() {
        let payload = "Version:0.9\r\nStartHTML:0000099999\r\nEndHTML:0000099999\r\n<p>x</p>";
        assert_eq!(extract_fragment(payload), "<p>x</p>");
    }

    #[test]
    fn test_non_cf_html_is_unchanged() {
        assert_eq!(extract_fragment("<p>x</p>"), "<p>x</p>");
        assert_eq!(extract_fragment("Versions: 2"), "Versions: 2");
    }

    #[test]
    fn test_looks_like_html() {
        assert!(looks_like_html("<p>Hello</p>"));
        assert!(looks_like_html("<o:p></o:p>"));
        assert!(looks_like_html("<!-- comment -->"));
        assert!(looks_like_html("text</span>"));
        assert!(looks_like_html("<img src=\"a.png\"/>"));
        assert!(!looks_like_html("plain text"));
        assert!(!looks_like_html("3 < 4 and 5 > 2"));
        assert!(!looks_like_html("Name\tAge\nBob\t42"));
    }

    #[test]
    fn test_normalize_line_endings() {
        assert_eq!(normalize_line_endings("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
