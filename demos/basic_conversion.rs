//! Basic conversion example demonstrating the Markdown converter

use clipboard_markdown_converter::converter::MarkdownConverter;

fn main() {
    println!("=== Clipboard Markdown Converter - Basic Examples ===\n");

    let converter = MarkdownConverter::new();

    show(
        &converter,
        "Example 1: Headings and paragraphs",
        "<h1>Welcome</h1><p>This is a test document.</p><h3>Details</h3><p>More text.</p>",
    );

    show(
        &converter,
        "Example 2: Inline formatting and links",
        r#"<p>Read <a href="https://pandoc.org" title="Pandoc">the manual</a>, press <kbd>Ctrl</kbd>+<kbd>V</kbd>, see <a href="https://x.com">https://x.com</a>. E = mc<sup>2</sup></p>"#,
    );

    show(
        &converter,
        "Example 3: Lists",
        "<ul><li>First<ul><li>Nested</li></ul></li><li>Second</li></ul><ol><li>One</li><li>Two</li></ol>",
    );

    show(
        &converter,
        "Example 4: Smart punctuation",
        "<p>\u{201C}Quotes\u{201D} \u{2014} and dashes\u{2026}</p>",
    );

    show(
        &converter,
        "Example 5: HTML table",
        "<table><tr><th>Item</th><th align=\"right\">Price</th></tr><tr><td>Tea</td><td>3.50</td></tr></table>",
    );

    show(
        &converter,
        "Example 6: Plain-text spreadsheet cells",
        "Item\tPrice\nTea\t3.50\nCake\t4.00",
    );
}

fn show(converter: &MarkdownConverter, title: &str, input: &str) {
    println!("{title}");
    println!("Input:");
    println!("{input}\n");
    println!("Output Markdown:");
    println!("{}", converter.convert(input));
    println!("---\n");
}
