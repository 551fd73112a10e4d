//! Terminal rendering for research results.
//!
//! Converts the markdown-flavored brief to ANSI-formatted text and lays
//! out the comparison table as an aligned grid with wrapped cells.

use scholar_core::{NA, ResearchResult};
use unicode_width::UnicodeWidthStr;

/// ANSI escape codes for terminal formatting.
mod ansi {
    pub const BOLD_ON: &str = "\x1b[1m";
    pub const BOLD_OFF: &str = "\x1b[22m";
    pub const ITALIC_ON: &str = "\x1b[3m";
    pub const ITALIC_OFF: &str = "\x1b[23m";
    pub const DIM_ON: &str = "\x1b[2m";
    pub const DIM_OFF: &str = "\x1b[22m";
    pub const CYAN: &str = "\x1b[36m";
    pub const RESET: &str = "\x1b[0m";
    pub const UNDERLINE_ON: &str = "\x1b[4m";
}

/// Widest a single table cell is allowed to be before wrapping.
const MAX_CELL_WIDTH: usize = 36;

/// Render the markdown-flavored research brief with ANSI formatting.
pub fn render_brief(text: &str) -> String {
    let mut out = String::new();
    let mut in_code_block = false;

    for line in text.lines() {
        let trimmed = line.trim_start();

        if trimmed.starts_with("```") {
            in_code_block = !in_code_block;
            out.push_str(&format!("{}{}{}\n", ansi::DIM_ON, line, ansi::DIM_OFF));
            continue;
        }
        if in_code_block {
            out.push_str(&format!("{}{}{}\n", ansi::DIM_ON, line, ansi::DIM_OFF));
            continue;
        }

        if let Some(heading) = parse_heading(trimmed) {
            out.push_str(&format!(
                "{}{}{}{}\n",
                ansi::BOLD_ON,
                ansi::UNDERLINE_ON,
                heading,
                ansi::RESET
            ));
            continue;
        }

        if (trimmed.starts_with("- ") || trimmed.starts_with("* ")) && !trimmed.starts_with("**")
        {
            let indent = &line[..line.len() - trimmed.len()];
            out.push_str(&format!(
                "{indent}  \u{2022} {}\n",
                render_inline(&trimmed[2..])
            ));
            continue;
        }

        out.push_str(&render_inline(line));
        out.push('\n');
    }
    out
}

/// Render a code block dimmed, the same way fenced blocks appear in briefs.
pub fn render_code(code: &str) -> String {
    let mut out = String::new();
    for line in code.lines() {
        out.push_str(&format!("{}{}{}\n", ansi::DIM_ON, line, ansi::DIM_OFF));
    }
    out
}

/// Strip ATX heading markers, returning the heading text.
fn parse_heading(line: &str) -> Option<&str> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    if hashes == 0 || hashes > 6 {
        return None;
    }
    line[hashes..].strip_prefix(' ')
}

/// Apply inline formatting for `**bold**`, `*italic*`, and `` `code` ``.
fn render_inline(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let chars: Vec<char> = text.chars().collect();
    let mut i = 0;
    let mut bold = false;
    let mut italic = false;
    let mut code = false;

    while i < chars.len() {
        if !code && i + 1 < chars.len() && chars[i] == '*' && chars[i + 1] == '*' {
            out.push_str(if bold { ansi::BOLD_OFF } else { ansi::BOLD_ON });
            bold = !bold;
            i += 2;
        } else if !code && chars[i] == '*' {
            out.push_str(if italic { ansi::ITALIC_OFF } else { ansi::ITALIC_ON });
            italic = !italic;
            i += 1;
        } else if chars[i] == '`' {
            out.push_str(if code { ansi::RESET } else { ansi::CYAN });
            code = !code;
            i += 1;
        } else {
            out.push(chars[i]);
            i += 1;
        }
    }
    if bold || italic || code {
        out.push_str(ansi::RESET);
    }
    out
}

/// Render the comparison table as an aligned grid.
///
/// Columns are `Aspect` followed by the paper keys in order. Cells wider
/// than `MAX_CELL_WIDTH` wrap onto continuation lines within their column.
pub fn render_table(result: &ResearchResult) -> String {
    if result.comparison_table.is_empty() {
        return String::new();
    }

    let mut headers = vec!["Aspect".to_string()];
    headers.extend(result.paper_keys.iter().cloned());

    let mut grid: Vec<Vec<String>> = vec![headers.clone()];
    for row in &result.comparison_table {
        let mut cells = vec![row.aspect.clone()];
        for key in &result.paper_keys {
            cells.push(row.get(key).unwrap_or(NA).to_string());
        }
        grid.push(cells);
    }

    let columns = headers.len();
    let mut widths = vec![0usize; columns];
    for row in &grid {
        for (col, cell) in row.iter().enumerate() {
            let width = wrapped_lines(cell).iter().map(|l| l.width()).max().unwrap_or(0);
            widths[col] = widths[col].max(width);
        }
    }

    let mut out = String::new();
    for (row_idx, row) in grid.iter().enumerate() {
        let wrapped: Vec<Vec<String>> = row.iter().map(|c| wrapped_lines(c)).collect();
        let height = wrapped.iter().map(Vec::len).max().unwrap_or(1);

        for line_idx in 0..height {
            for (col, lines) in wrapped.iter().enumerate() {
                let text = lines.get(line_idx).map(String::as_str).unwrap_or("");
                out.push_str(text);
                out.push_str(&" ".repeat(widths[col].saturating_sub(text.width())));
                if col + 1 < columns {
                    out.push_str(" \u{2502} ");
                }
            }
            let trimmed_len = out.trim_end_matches(' ').len();
            out.truncate(trimmed_len);
            out.push('\n');
        }

        // Rule under the header row.
        if row_idx == 0 {
            for (col, width) in widths.iter().enumerate() {
                out.push_str(&"\u{2500}".repeat(*width));
                if col + 1 < columns {
                    out.push_str("\u{2500}\u{253c}\u{2500}");
                }
            }
            out.push('\n');
        }
    }
    out
}

fn wrapped_lines(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return vec![String::new()];
    }
    textwrap::wrap(cell, MAX_CELL_WIDTH)
        .into_iter()
        .map(|c| c.into_owned())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use scholar_core::ComparisonRow;

    fn sample() -> ResearchResult {
        let mut methodology = ComparisonRow::new("Methodology");
        methodology.set("GCN", "Spectral");
        methodology.set("GAT", "Attention");
        let mut dataset = ComparisonRow::new("Dataset");
        dataset.set("GCN", "Cora");
        dataset.set("GAT", NA);
        ResearchResult {
            research_brief: "## Brief\n\nSome **bold** text.".into(),
            comparison_table: vec![methodology, dataset],
            paper_keys: vec!["GCN".into(), "GAT".into()],
            notebook_code: "pass".into(),
        }
    }

    #[test]
    fn test_heading_is_bold_underlined() {
        let rendered = render_brief("## Results");
        assert!(rendered.contains(ansi::BOLD_ON));
        assert!(rendered.contains(ansi::UNDERLINE_ON));
        assert!(rendered.contains("Results"));
        assert!(!rendered.contains('#'));
    }

    #[test]
    fn test_inline_bold() {
        let rendered = render_inline("a **b** c");
        assert_eq!(
            rendered,
            format!("a {}b{} c", ansi::BOLD_ON, ansi::BOLD_OFF)
        );
    }

    #[test]
    fn test_inline_code_is_cyan() {
        let rendered = render_inline("run `cargo doc` now");
        assert!(rendered.contains(ansi::CYAN));
        assert!(rendered.contains("cargo doc"));
    }

    #[test]
    fn test_unterminated_formatting_is_reset() {
        let rendered = render_inline("dangling **bold");
        assert!(rendered.ends_with(ansi::RESET));
    }

    #[test]
    fn test_bullets_become_glyphs() {
        let rendered = render_brief("- first\n- second");
        assert_eq!(rendered.matches('\u{2022}').count(), 2);
    }

    #[test]
    fn test_table_has_all_columns_and_rows() {
        let rendered = render_table(&sample());
        let header = rendered.lines().next().unwrap();
        assert!(header.contains("Aspect"));
        assert!(header.contains("GCN"));
        assert!(header.contains("GAT"));
        assert!(rendered.contains("Methodology"));
        assert!(rendered.contains("N/A"));
    }

    #[test]
    fn test_table_columns_align() {
        let rendered = render_table(&sample());
        let positions: Vec<Option<usize>> = rendered
            .lines()
            .filter(|l| l.contains('\u{2502}'))
            .map(|l| l.find('\u{2502}'))
            .collect();
        assert!(positions.len() >= 3);
        assert!(positions.windows(2).all(|w| w[0] == w[1]));
    }

    #[test]
    fn test_long_cells_wrap() {
        let mut row = ComparisonRow::new("Key Finding");
        row.set("GCN", "a".repeat(3).as_str());
        row.set(
            "GAT",
            "this finding is deliberately much longer than the cell width cap so it must wrap",
        );
        let result = ResearchResult {
            research_brief: String::new(),
            comparison_table: vec![row],
            paper_keys: vec!["GCN".into(), "GAT".into()],
            notebook_code: String::new(),
        };
        let rendered = render_table(&result);
        // Header + rule + at least two wrapped body lines.
        assert!(rendered.lines().count() >= 4);
        for line in rendered.lines() {
            assert!(line.width() < 120);
        }
    }

    #[test]
    fn test_code_lines_are_dimmed() {
        let rendered = render_code("import torch\nprint('hi')");
        assert_eq!(rendered.matches(ansi::DIM_ON).count(), 2);
        assert!(rendered.contains("import torch"));
    }

    #[test]
    fn test_empty_table_renders_nothing() {
        let result = ResearchResult {
            research_brief: String::new(),
            comparison_table: Vec::new(),
            paper_keys: Vec::new(),
            notebook_code: String::new(),
        };
        assert_eq!(render_table(&result), "");
    }
}
