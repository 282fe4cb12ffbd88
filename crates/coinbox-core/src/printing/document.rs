//! # Print Documents
//!
//! A small in-memory rich-text model built by print jobs, plus a
//! plain-text renderer used for previews and text-only printers.
//!
//! ## Shape of a Job Document
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ Text      header                         │
//! │ ┌──────────────────────────────────────┐ │
//! │ │ Frame   body (text, markup or table) │ │
//! │ └──────────────────────────────────────┘ │
//! │ Text      footer (centered)              │
//! └──────────────────────────────────────────┘
//! ```

/// Horizontal alignment of a block or cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    #[default]
    Left,
    Center,
    Right,
}

/// Character formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStyle {
    pub bold: bool,
    pub italic: bool,
}

impl TextStyle {
    pub const PLAIN: TextStyle = TextStyle {
        bold: false,
        italic: false,
    };
    pub const BOLD: TextStyle = TextStyle {
        bold: true,
        italic: false,
    };
    pub const ITALIC: TextStyle = TextStyle {
        bold: false,
        italic: true,
    };
}

/// One table cell. Rules are hairlines drawn across the cell width.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Cell {
    pub text: String,
    pub align: Align,
    pub style: TextStyle,
    pub rule_above: bool,
    pub rule_below: bool,
}

impl Cell {
    pub fn text(text: impl Into<String>) -> Self {
        Cell {
            text: text.into(),
            ..Cell::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A borderless grid spanning the full page width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    columns: usize,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Creates a `rows x columns` table of empty cells.
    pub fn new(rows: usize, columns: usize) -> Self {
        Table {
            columns,
            rows: vec![vec![Cell::default(); columns]; rows],
        }
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(column))
    }

    pub fn cell_mut(&mut self, row: usize, column: usize) -> Option<&mut Cell> {
        self.rows.get_mut(row).and_then(|r| r.get_mut(column))
    }
}

/// A block of content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    Text {
        text: String,
        align: Align,
        style: TextStyle,
    },
    /// HTML fragment, shown with tags stripped by the text renderer.
    Markup(String),
    /// Nested region holding the job's body.
    Frame(Vec<Block>),
    Table(Table),
}

impl Block {
    pub fn text(text: impl Into<String>) -> Self {
        Block::Text {
            text: text.into(),
            align: Align::Left,
            style: TextStyle::PLAIN,
        }
    }

    pub fn centered(text: impl Into<String>) -> Self {
        Block::Text {
            text: text.into(),
            align: Align::Center,
            style: TextStyle::PLAIN,
        }
    }
}

/// A document handed to a render target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    blocks: Vec<Block>,
}

impl Document {
    pub fn new() -> Self {
        Document::default()
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// First table in the document, frames included.
    pub fn find_table(&self) -> Option<&Table> {
        fn search(blocks: &[Block]) -> Option<&Table> {
            blocks.iter().find_map(|b| match b {
                Block::Table(t) => Some(t),
                Block::Frame(inner) => search(inner),
                _ => None,
            })
        }
        search(&self.blocks)
    }

    /// Renders the document as plain text, `width` characters wide.
    pub fn render_text(&self, width: usize) -> String {
        let mut out = Vec::new();
        render_blocks(&self.blocks, width.max(1), &mut out);
        let mut text = out.join("\n");
        text.push('\n');
        text
    }
}

// =============================================================================
// Plain-Text Rendering
// =============================================================================

fn render_blocks(blocks: &[Block], width: usize, out: &mut Vec<String>) {
    for block in blocks {
        match block {
            Block::Text { text, align, .. } => {
                for line in text.split('\n') {
                    out.push(pad(line, width, *align));
                }
            }
            Block::Markup(html) => {
                for line in strip_tags(html).split('\n') {
                    out.push(line.trim_end().to_string());
                }
            }
            Block::Frame(inner) => render_blocks(inner, width, out),
            Block::Table(table) => render_table(table, width, out),
        }
    }
}

fn render_table(table: &Table, width: usize, out: &mut Vec<String>) {
    if table.columns == 0 {
        return;
    }
    let cell_width = (width / table.columns).max(1);

    let rule_line = |row: &[Cell], pick: fn(&Cell) -> bool| -> Option<String> {
        if !row.iter().any(pick) {
            return None;
        }
        let line: String = row
            .iter()
            .map(|c| {
                if pick(c) {
                    "-".repeat(cell_width)
                } else {
                    " ".repeat(cell_width)
                }
            })
            .collect();
        Some(line.trim_end().to_string())
    };

    for row in &table.rows {
        if let Some(line) = rule_line(row, |c: &Cell| c.rule_above) {
            out.push(line);
        }
        let line: String = row
            .iter()
            .map(|c| pad(&c.text, cell_width, c.align))
            .collect();
        out.push(line.trim_end().to_string());
        if let Some(line) = rule_line(row, |c: &Cell| c.rule_below) {
            out.push(line);
        }
    }
}

fn pad(text: &str, width: usize, align: Align) -> String {
    let text: String = text.chars().take(width).collect();
    let len = text.chars().count();
    let free = width.saturating_sub(len);
    let (left, right) = match align {
        Align::Left => (0, free),
        Align::Right => (free, 0),
        Align::Center => (free / 2, free - free / 2),
    };
    format!("{}{}{}", " ".repeat(left), text, " ".repeat(right))
}

/// Removes tags and decodes the common entities. `<br>` and block closers
/// become line breaks.
pub fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut tag = String::new();
    let mut in_tag = false;

    for ch in html.chars() {
        match (in_tag, ch) {
            (false, '<') => {
                in_tag = true;
                tag.clear();
            }
            (true, '>') => {
                in_tag = false;
                let name = tag
                    .trim_start_matches('/')
                    .split(|c: char| c.is_whitespace() || c == '/')
                    .next()
                    .unwrap_or_default()
                    .to_ascii_lowercase();
                let closing = tag.starts_with('/');
                if name == "br" || (closing && matches!(name.as_str(), "p" | "div" | "tr" | "h1" | "h2" | "h3" | "li")) {
                    out.push('\n');
                }
            }
            (true, c) => tag.push(c),
            (false, c) => out.push(c),
        }
    }

    out.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_centered_text() {
        let mut doc = Document::new();
        doc.push(Block::centered("THANKS"));
        assert_eq!(doc.render_text(10), "  THANKS  \n");
    }

    #[test]
    fn test_table_rules() {
        let mut table = Table::new(2, 2);
        for c in 0..2 {
            let cell = table.cell_mut(0, c).unwrap();
            cell.text = ["A", "B"][c].to_string();
            cell.rule_below = true;
        }
        table.cell_mut(1, 0).unwrap().text = "1".to_string();

        let mut doc = Document::new();
        doc.push(Block::Table(table));

        let text = doc.render_text(8);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["A   B", "--------", "1"]);
    }

    #[test]
    fn test_strip_tags() {
        assert_eq!(strip_tags("<b>Total</b> &amp; tax<br/>done"), "Total & tax\ndone");
        assert_eq!(strip_tags("<p>a</p><p>b</p>"), "a\nb\n");
    }

    #[test]
    fn test_find_table_inside_frame() {
        let mut doc = Document::new();
        doc.push(Block::text("header"));
        doc.push(Block::Frame(vec![Block::Table(Table::new(1, 3))]));
        assert_eq!(doc.find_table().map(Table::columns), Some(3));
    }
}
