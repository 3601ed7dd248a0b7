//! Text-level table repair
//!
//! Runs on rendered Markdown, line by line, without access to the HTML tree.
//! It fixes two kinds of damage:
//!
//! - **Column-aligned text**: lines separated into columns by tabs or runs of
//!   two or more spaces (pasted spreadsheet cells, `<pre>`-less plain text
//!   tables) are rewritten as pipe rows. The first row of such a block
//!   becomes the header and gets a synthesized separator row.
//! - **Wrapped pipe rows**: a row that starts with `|` but was split across
//!   several lines is merged back into one line.
//!
//! Lone `|` lines left over by the renderer are dropped. Fenced code blocks
//! are passed through untouched.
//!
//! # Heuristic Limits
//!
//! Prose that uses two spaces between sentences can look like a table when
//! two such lines are adjacent; this is accepted behaviour. List items,
//! headings, block quotes, setext underlines and indented continuation lines
//! are never treated as table rows.
//!
//! # Examples
//!
//! ```rust
//! use clipboard_markdown_converter::tables::repair_tables;
//!
//! let text = "Name\tAge\nBob\t42";
//! assert_eq!(repair_tables(text), "| Name | Age |\n| ---- | --- |\n| Bob | 42 |");
//! ```

use regex::Regex;
use std::sync::OnceLock;

/// Maximum lines merged into one wrapped pipe row
const MAX_WRAPPED_LINES: usize = 8;

/// Repair and derive pipe tables in rendered Markdown
pub fn repair_tables(markdown: &str) -> String {
    let lines: Vec<&str> = markdown
        .lines()
        .filter(|line| line.trim() != "|")
        .collect();

    let mut output: Vec<String> = Vec::with_capacity(lines.len());
    let mut in_table = false;
    let mut open_fence: Option<Fence> = None;
    let mut synthesized = 0usize;
    let mut merged = 0usize;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        let trimmed = line.trim();

        if let Some(fence) = open_fence {
            if fence.is_closed_by(trimmed) {
                open_fence = None;
            }
            output.push(line.to_string());
            index += 1;
            continue;
        }

        if let Some(fence) = Fence::opening(trimmed) {
            open_fence = Some(fence);
            in_table = false;
            output.push(line.to_string());
            index += 1;
            continue;
        }

        if trimmed.is_empty() {
            in_table = false;
            output.push(line.to_string());
            index += 1;
            continue;
        }

        if trimmed.contains('|') {
            if trimmed.starts_with('|') {
                in_table = true;
                if let Some((row, consumed)) = merge_wrapped_row(&lines, index) {
                    merged += 1;
                    output.push(row);
                    index += consumed;
                    continue;
                }
            }
            output.push(line.to_string());
            index += 1;
            continue;
        }

        if let Some(cells) = candidate_cells(&lines, index) {
            output.push(pipe_row(&cells));
            if !in_table {
                output.push(separator_row(&cells));
                synthesized += 1;
                in_table = true;
            }
            index += 1;
            continue;
        }

        output.push(line.to_string());
        index += 1;
    }

    if synthesized > 0 || merged > 0 {
        tracing::debug!(synthesized, merged, "repaired tables");
    }

    let mut result = output.join("\n");
    if markdown.ends_with('\n') && !result.is_empty() {
        result.push('\n');
    }
    result
}

/// An open code fence: its marker character and run length
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fence {
    marker: char,
    length: usize,
}

impl Fence {
    fn opening(trimmed: &str) -> Option<Self> {
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~')?;
        let length = trimmed.chars().take_while(|c| *c == marker).count();
        (length >= 3).then_some(Self { marker, length })
    }

    /// A closing fence uses the same marker, at least as many times, and
    /// nothing else
    fn is_closed_by(self, trimmed: &str) -> bool {
        let length = trimmed.chars().take_while(|c| *c == self.marker).count();
        length >= self.length && trimmed.len() == length * self.marker.len_utf8()
    }
}

/// Cells of a column-aligned line, if it qualifies as a table row
///
/// The line must split into at least two cells and every non-blank
/// neighbour must itself look like part of a table, with at least one such
/// neighbour present.
fn candidate_cells(lines: &[&str], index: usize) -> Option<Vec<String>> {
    let line = lines[index];
    if line.starts_with("    ") || line.starts_with('\t') || is_structural(line.trim()) {
        return None;
    }

    let neighbours = [
        index.checked_sub(1).and_then(|i| lines.get(i)),
        lines.get(index + 1),
    ];
    let mut table_like = 0;
    for neighbour in neighbours.into_iter().flatten() {
        if neighbour.trim().is_empty() {
            continue;
        }
        if !is_table_like(neighbour) {
            return None;
        }
        table_like += 1;
    }
    if table_like == 0 {
        return None;
    }

    let cells = split_cells(line.trim());
    (cells.len() >= 2).then_some(cells)
}

/// Lines with a pipe, a tab, or an internal run of two or more spaces
fn is_table_like(line: &str) -> bool {
    let trimmed = line.trim();
    if is_structural(trimmed) {
        return false;
    }
    trimmed.contains('|') || trimmed.contains('\t') || trimmed.contains("  ")
}

/// Markdown block syntax that must never become a table row
fn is_structural(trimmed: &str) -> bool {
    static STRUCTURAL_REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    let regex = STRUCTURAL_REGEX.get_or_init(|| {
        Regex::new(r"^(?:[-+*]\s|\d+\.\s|#{1,6}\s|>|[=-]+$|\* \* \*|```|~~~)").ok()
    });

    match regex.as_ref() {
        Some(regex) => regex.is_match(trimmed),
        None => false,
    }
}

fn split_cells(trimmed: &str) -> Vec<String> {
    static CELL_SEPARATOR: OnceLock<Option<Regex>> = OnceLock::new();
    let separator = CELL_SEPARATOR.get_or_init(|| Regex::new(r"[ ]*\t[ \t]*|[ ]{2,}").ok());

    match separator.as_ref() {
        Some(separator) => separator
            .split(trimmed)
            .map(|cell| cell.trim().to_string())
            .filter(|cell| !cell.is_empty())
            .collect(),
        None => vec![trimmed.to_string()],
    }
}

fn pipe_row(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// Separator sized to the header cells, at least three dashes each
fn separator_row(cells: &[String]) -> String {
    let dashes: Vec<String> = cells
        .iter()
        .map(|cell| "-".repeat(cell.chars().count().max(3)))
        .collect();
    format!("| {} |", dashes.join(" | "))
}

/// Returns true if the line ends a pipe row (an unescaped trailing `|`)
fn closes_row(trimmed: &str) -> bool {
    trimmed.ends_with('|') && !trimmed.ends_with("\\|")
}

/// Merge a pipe row that continues on the following lines
///
/// Returns the merged row and the number of source lines it replaces, or
/// `None` if the row is already complete or no closing line follows before
/// a blank line or the next row.
fn merge_wrapped_row(lines: &[&str], start: usize) -> Option<(String, usize)> {
    let first = lines[start].trim();
    if first.len() > 1 && closes_row(first) {
        return None;
    }

    let mut parts = vec![first];
    for (offset, line) in lines.iter().enumerate().skip(start + 1).take(MAX_WRAPPED_LINES) {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('|') {
            return None;
        }
        parts.push(trimmed);
        if closes_row(trimmed) {
            return Some((parts.join(" "), offset - start + 1));
        }
    }

    None
}
