//! Inline `style` attribute handling
//!
//! Only the handful of declarations that matter for Markdown are interpreted:
//! weight, slant, vertical alignment and text alignment. Everything else is
//! either presentational noise to be stripped or ignored.

/// One `name: value` declaration from a style attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    /// Lowercase property name
    pub name: String,
    /// Value with `!important` and surrounding whitespace removed
    pub value: String,
}

/// Properties that only affect presentation and never carry meaning
const PRESENTATIONAL_PROPERTIES: &[&str] = &[
    "font",
    "font-family",
    "font-size",
    "font-variant",
    "font-variant-ligatures",
    "font-variant-caps",
    "font-variant-east-asian",
    "font-variant-numeric",
    "font-variant-position",
    "font-kerning",
    "line-height",
    "letter-spacing",
    "word-spacing",
    "white-space",
    "text-indent",
    "text-transform",
    "orphans",
    "widows",
    "layout-grid-mode",
];

/// Colour values that match the default text colour of office documents
const DEFAULT_COLORS: &[&str] = &[
    "black",
    "#000",
    "#000000",
    "windowtext",
    "rgb(0,0,0)",
    "rgba(0,0,0,1)",
    "inherit",
    "initial",
];

/// Values that restate the browser default for their property
const NEUTRAL_VALUES: &[(&str, &[&str])] = &[
    ("font-weight", &["normal", "400"]),
    ("font-style", &["normal"]),
    ("text-decoration", &["none"]),
    ("text-decoration-line", &["none"]),
    ("vertical-align", &["baseline"]),
    ("background", &["transparent", "none"]),
    ("background-color", &["transparent"]),
];

/// Parse a style attribute into its declarations
///
/// ```rust
/// use clipboard_markdown_converter::style::parse_style;
///
/// let declarations = parse_style("font-weight: BOLD !important; ;color:red");
/// assert_eq!(declarations.len(), 2);
/// assert_eq!(declarations[0].name, "font-weight");
/// assert_eq!(declarations[0].value, "BOLD");
/// ```
pub fn parse_style(style: &str) -> Vec<Declaration> {
    style
        .split(';')
        .filter_map(|part| {
            let (name, value) = part.split_once(':')?;
            let name = name.trim().to_ascii_lowercase();
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map(str::trim_end)
                .unwrap_or(value);
            if name.is_empty() {
                return None;
            }
            Some(Declaration {
                name,
                value: value.to_string(),
            })
        })
        .collect()
}

/// Serialize declarations back into a style attribute value
pub fn serialize_style(declarations: &[Declaration]) -> String {
    declarations
        .iter()
        .map(|declaration| format!("{}:{}", declaration.name, declaration.value))
        .collect::<Vec<_>>()
        .join(";")
}

/// Returns true if the declaration only affects presentation
///
/// Covers font family and size, default black text, vendor-prefixed
/// (`mso-*`, `-webkit-*`, ...) properties and declarations restating the
/// browser default.
pub fn is_presentational(declaration: &Declaration) -> bool {
    let name = declaration.name.as_str();
    let value = compact(&declaration.value);

    if name.starts_with("mso-") || name.starts_with('-') {
        return true;
    }
    if PRESENTATIONAL_PROPERTIES.contains(&name) {
        return true;
    }
    if name == "color" {
        return DEFAULT_COLORS.contains(&value.as_str());
    }

    NEUTRAL_VALUES
        .iter()
        .any(|(property, values)| *property == name && values.contains(&value.as_str()))
}

/// Returns true if the style declares an `mso-bookmark` marker
pub fn is_bookmark(declarations: &[Declaration]) -> bool {
    declarations
        .iter()
        .any(|declaration| declaration.name == "mso-bookmark")
}

/// Returns true if the style renders text bold
pub fn implies_bold(declarations: &[Declaration]) -> bool {
    declaration_value(declarations, "font-weight").is_some_and(|value| {
        match value.as_str() {
            "bold" | "bolder" => true,
            numeric => numeric.parse::<u16>().is_ok_and(|weight| weight >= 600),
        }
    })
}

/// Returns true if the style renders text in italics
pub fn implies_italic(declarations: &[Declaration]) -> bool {
    declaration_value(declarations, "font-style")
        .is_some_and(|value| value == "italic" || value.starts_with("oblique"))
}

/// Returns true if the style underlines text
pub fn implies_underline(declarations: &[Declaration]) -> bool {
    ["text-decoration", "text-decoration-line"]
        .iter()
        .filter_map(|name| declaration_value(declarations, name))
        .any(|value| value.contains("underline"))
}

/// Lowercased, whitespace-free value of the last declaration for `name`
pub fn declaration_value(declarations: &[Declaration], name: &str) -> Option<String> {
    declarations
        .iter()
        .rev()
        .find(|declaration| declaration.name == name)
        .map(|declaration| compact(&declaration.value))
}

fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase()
}
