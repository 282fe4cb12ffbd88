//! # Print Jobs
//!
//! A print job knows how to lay out one document. The registry decides
//! *where* it goes (preview or printer); the job only decides *what*.
//!
//! ```text
//! PrinterManager::handle(job, "receipt")
//!       │
//!       ├── resolve printer for "receipt"
//!       │
//!       └── job.handler(&mut target)
//!               │
//!               ├── build a fresh Document
//!               └── target.render(&document)
//! ```
//!
//! Every call to `handler` builds a new document, so a job can be
//! previewed and then printed without leaking state between the two.

use std::fmt;

use super::document::{Align, Block, Cell, Document, Table, TextStyle};
use crate::error::PrintingResult;

/// Anything a document can be rendered onto (printer, preview, file).
pub trait RenderTarget {
    fn render(&mut self, document: &Document) -> PrintingResult<()>;
}

/// A printable job.
pub trait PrintJob: fmt::Debug + Send + Sync {
    /// Builds the job's document.
    fn document(&self) -> Document;

    /// Renders the job onto `target`.
    fn handler(&self, target: &mut dyn RenderTarget) -> PrintingResult<()> {
        target.render(&self.document())
    }
}

/// Job that prints nothing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyPrintJob;

impl PrintJob for EmptyPrintJob {
    fn document(&self) -> Document {
        Document::new()
    }

    fn handler(&self, _target: &mut dyn RenderTarget) -> PrintingResult<()> {
        Ok(())
    }
}

// =============================================================================
// Document Job
// =============================================================================

/// Header, body and centered footer text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DocPrintJob {
    pub header: String,
    pub content: String,
    pub footer: String,
}

impl DocPrintJob {
    pub fn new(
        header: impl Into<String>,
        content: impl Into<String>,
        footer: impl Into<String>,
    ) -> Self {
        DocPrintJob {
            header: header.into(),
            content: content.into(),
            footer: footer.into(),
        }
    }
}

/// Lays out header, framed body and footer.
fn compose(header: Block, body: Vec<Block>, footer: Block) -> Document {
    let mut doc = Document::new();
    doc.push(header);
    doc.push(Block::text(""));
    doc.push(Block::Frame(body));
    doc.push(Block::text(""));
    doc.push(footer);
    doc
}

impl PrintJob for DocPrintJob {
    fn document(&self) -> Document {
        compose(
            Block::text(&self.header),
            vec![Block::text(&self.content)],
            Block::centered(&self.footer),
        )
    }
}

// =============================================================================
// Table Job
// =============================================================================

/// Tabular job: optional header row, data rows, optional footer row.
///
/// ```text
///    Item        Qty     Price       ← bold, centered, rule below
///   ─────────  ───────  ───────
///    Coffee      2       3.00
///    Bagel       1                   ← short rows leave cells empty
///   ─────────  ───────  ───────
///    Total               5.50        ← italic, rule above
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TablePrintJob {
    pub header: String,
    pub footer: String,
    pub data: Option<Vec<Vec<String>>>,
    pub headers: Option<Vec<String>>,
    pub footers: Option<Vec<String>>,
}

impl TablePrintJob {
    pub fn new(
        data: Option<Vec<Vec<String>>>,
        headers: Option<Vec<String>>,
        footers: Option<Vec<String>>,
    ) -> Self {
        TablePrintJob {
            data,
            headers,
            footers,
            ..TablePrintJob::default()
        }
    }

    /// Builds the body table.
    ///
    /// Columns are the longest data row, raised to the header count.
    /// Header and footer rows are added only when present.
    pub fn table(&self) -> Table {
        let data = self.data.as_deref().unwrap_or_default();
        let mut columns = data.iter().map(Vec::len).max().unwrap_or(0);
        if let Some(headers) = &self.headers {
            columns = columns.max(headers.len());
        }

        let extra = usize::from(self.headers.is_some()) + usize::from(self.footers.is_some());
        let mut table = Table::new(data.len() + extra, columns);
        let mut row = 0;

        if let Some(headers) = &self.headers {
            for (c, text) in headers.iter().enumerate() {
                if let Some(cell) = table.cell_mut(row, c) {
                    *cell = Cell {
                        text: text.clone(),
                        align: Align::Center,
                        style: TextStyle::BOLD,
                        rule_above: false,
                        rule_below: true,
                    };
                }
            }
            row += 1;
        }

        for values in data {
            for (c, text) in values.iter().enumerate() {
                if let Some(cell) = table.cell_mut(row, c) {
                    cell.text = text.clone();
                }
            }
            row += 1;
        }

        if let Some(footers) = &self.footers {
            for (c, text) in footers.iter().enumerate() {
                if let Some(cell) = table.cell_mut(row, c) {
                    *cell = Cell {
                        text: text.clone(),
                        align: Align::Left,
                        style: TextStyle::ITALIC,
                        rule_above: true,
                        rule_below: false,
                    };
                }
            }
        }

        table
    }
}

impl PrintJob for TablePrintJob {
    fn document(&self) -> Document {
        compose(
            Block::text(&self.header),
            vec![Block::Table(self.table())],
            Block::centered(&self.footer),
        )
    }
}

// =============================================================================
// HTML Job
// =============================================================================

/// Header and footer as markup, body as plain text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlPrintJob {
    pub header: String,
    pub content: String,
    pub footer: String,
}

impl HtmlPrintJob {
    pub fn new(
        header: impl Into<String>,
        content: impl Into<String>,
        footer: impl Into<String>,
    ) -> Self {
        HtmlPrintJob {
            header: header.into(),
            content: content.into(),
            footer: footer.into(),
        }
    }
}

impl PrintJob for HtmlPrintJob {
    fn document(&self) -> Document {
        compose(
            Block::Markup(self.header.clone()),
            vec![Block::text(&self.content)],
            Block::Markup(self.footer.clone()),
        )
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Capture(Vec<Document>);

    impl RenderTarget for Capture {
        fn render(&mut self, document: &Document) -> PrintingResult<()> {
            self.0.push(document.clone());
            Ok(())
        }
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_table_layout() {
        let job = TablePrintJob::new(
            Some(vec![strings(&["1", "2"]), strings(&["3"])]),
            Some(strings(&["A", "B"])),
            None,
        );
        let table = job.table();

        assert_eq!(table.columns(), 2);
        assert_eq!(table.row_count(), 3);
        assert_eq!(table.cell(0, 0).unwrap().text, "A");
        assert!(table.cell(0, 1).unwrap().style.bold);
        assert!(table.cell(0, 1).unwrap().rule_below);
        assert_eq!(table.cell(1, 1).unwrap().text, "2");
        assert!(table.cell(2, 1).unwrap().is_empty());
    }

    #[test]
    fn test_headers_widen_table() {
        let job = TablePrintJob::new(
            Some(vec![strings(&["x"])]),
            Some(strings(&["A", "B", "C"])),
            Some(strings(&["total"])),
        );
        let table = job.table();

        assert_eq!(table.columns(), 3);
        assert_eq!(table.row_count(), 3);
        let footer = table.cell(2, 0).unwrap();
        assert_eq!(footer.text, "total");
        assert!(footer.style.italic);
        assert!(footer.rule_above);
    }

    #[test]
    fn test_empty_table() {
        let table = TablePrintJob::default().table();
        assert_eq!(table.columns(), 0);
        assert_eq!(table.row_count(), 0);
    }

    #[test]
    fn test_handler_builds_fresh_documents() {
        let job = DocPrintJob::new("Coinbox", "1 x Coffee", "Thank you");
        let mut target = Capture::default();

        job.handler(&mut target).unwrap();
        job.handler(&mut target).unwrap();

        assert_eq!(target.0.len(), 2);
        assert_eq!(target.0[0], target.0[1]);
        let text = target.0[0].render_text(20);
        assert!(text.starts_with("Coinbox"));
        assert!(text.contains("     Thank you"));
    }

    #[test]
    fn test_html_job_strips_markup_in_text() {
        let job = HtmlPrintJob::new("<h1>Shop</h1>", "body", "<i>bye</i>");
        let text = job.document().render_text(20);
        assert!(text.contains("Shop"));
        assert!(text.contains("bye"));
        assert!(!text.contains('<'));
    }

    #[test]
    fn test_empty_job_renders_nothing() {
        let mut target = Capture::default();
        EmptyPrintJob.handler(&mut target).unwrap();
        assert!(target.0.is_empty());
    }
}
