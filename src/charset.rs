//! Character encoding detection for raw clipboard payloads
//!
//! Clipboard HTML usually arrives as UTF-8, but platform pasteboards and
//! saved `.html` files also carry UTF-16 (with or without a byte order mark)
//! and legacy single-byte encodings declared through `<meta>` tags.
//!
//! # Detection Cascade
//!
//! 1. **Byte order mark**: UTF-8, UTF-16LE or UTF-16BE
//! 2. **UTF-16 without BOM**: interleaved NUL bytes in the first code units
//! 3. **HTML meta tags**: `<meta charset>` or `<meta http-equiv="Content-Type">`
//! 4. **Default to UTF-8**
//!
//! Decoding never fails: malformed sequences are replaced with U+FFFD, since
//! the converter must always produce output for the user.
//!
//! # Examples
//!
//! ```rust
//! use clipboard_markdown_converter::charset::{decode_clipboard_bytes, detect_charset};
//!
//! let html = b"<meta charset=\"windows-1252\"><p>Caf\xE9</p>";
//! assert_eq!(detect_charset(html), "WINDOWS-1252");
//! assert!(decode_clipboard_bytes(html).contains("Café"));
//!
//! assert_eq!(detect_charset(b"<p>No charset</p>"), "UTF-8");
//! ```

use crate::error::ConversionError;
use encoding_rs::{Encoding, UTF_8, UTF_16BE, UTF_16LE};
use regex::Regex;
use std::sync::OnceLock;

/// Default charset when detection fails
const DEFAULT_CHARSET: &str = "UTF-8";

/// Maximum bytes to scan for meta charset tags (first 1024 bytes)
const META_SCAN_LIMIT: usize = 1024;

/// Detect the character encoding of a clipboard payload
///
/// Returns the charset label in uppercase (`"UTF-8"`, `"UTF-16LE"`,
/// `"ISO-8859-1"`, ...). Always returns a label, defaulting to UTF-8.
pub fn detect_charset(bytes: &[u8]) -> String {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return normalize_charset(encoding.name());
    }

    if let Some(encoding) = sniff_utf16(bytes) {
        return normalize_charset(encoding.name());
    }

    if let Some(charset) = extract_charset_from_html(bytes) {
        return normalize_charset(&charset);
    }

    DEFAULT_CHARSET.to_string()
}

/// Decode a clipboard payload to a UTF-8 string
///
/// Unknown charset labels fall back to UTF-8. Invalid byte sequences are
/// replaced rather than rejected.
pub fn decode_clipboard_bytes(bytes: &[u8]) -> String {
    let charset = detect_charset(bytes);
    let encoding = Encoding::for_label(charset.as_bytes()).unwrap_or_else(|| {
        tracing::debug!(charset = %charset, "unsupported charset label, decoding as UTF-8");
        UTF_8
    });

    // `decode` re-sniffs the BOM and strips it from the output
    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(
            encoding = used.name(),
            "clipboard payload contained invalid byte sequences"
        );
    }

    text.into_owned()
}

/// Decode a clipboard payload with an explicitly chosen encoding
///
/// Used when the caller knows better than the detection cascade. A byte
/// order mark still takes precedence, as in [`decode_clipboard_bytes`].
///
/// # Errors
///
/// Returns `ConversionError::EncodingError` if `label` is not a known
/// encoding label.
///
/// ```rust
/// use clipboard_markdown_converter::charset::decode_with_label;
///
/// assert_eq!(decode_with_label(b"Caf\xE9", "latin1").unwrap(), "Caf\u{e9}");
/// assert!(decode_with_label(b"x", "no-such-charset").is_err());
/// ```
pub fn decode_with_label(bytes: &[u8], label: &str) -> Result<String, ConversionError> {
    let encoding = Encoding::for_label(label.trim().as_bytes()).ok_or_else(|| {
        ConversionError::EncodingError(format!("unsupported charset: {label}"))
    })?;

    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        tracing::warn!(encoding = encoding.name(), "payload contained invalid byte sequences");
    }

    Ok(text.into_owned())
}

/// Extract charset from HTML meta tags
///
/// Scans only the first [`META_SCAN_LIMIT`] bytes; meta tags are expected
/// near the top of the payload.
///
/// ```rust
/// use clipboard_markdown_converter::charset::extract_charset_from_html;
///
/// let html = b"<meta http-equiv=\"Content-Type\" content=\"text/html; charset=ISO-8859-1\">";
/// assert_eq!(extract_charset_from_html(html), Some("ISO-8859-1".to_string()));
/// assert_eq!(extract_charset_from_html(b"<p>plain</p>"), None);
/// ```
pub fn extract_charset_from_html(html: &[u8]) -> Option<String> {
    let scan_limit = std::cmp::min(html.len(), META_SCAN_LIMIT);

    // Lossy conversion is fine for locating an ASCII meta tag
    let prefix = String::from_utf8_lossy(&html[..scan_limit]);

    static META_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let meta_regex = META_REGEX.get_or_init(|| {
        Regex::new(r#"(?i)<meta\b[^>]*?\bcharset\s*=\s*["']?([^"';>\s/]+)"#).ok()
    });
    let meta_regex = meta_regex.as_ref()?;

    meta_regex
        .captures(&prefix)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

/// Normalize charset name to uppercase
pub fn normalize_charset(charset: &str) -> String {
    charset.to_uppercase()
}

/// Recognize BOM-less UTF-16 from NUL bytes in the first two code units
fn sniff_utf16(bytes: &[u8]) -> Option<&'static Encoding> {
    if bytes.len() < 4 {
        return None;
    }

    match (bytes[0], bytes[1], bytes[2], bytes[3]) {
        (a, 0, b, 0) if a != 0 && b != 0 => Some(UTF_16LE),
        (0, a, 0, b) if a != 0 && b != 0 => Some(UTF_16BE),
        _ => None,
    }
}
