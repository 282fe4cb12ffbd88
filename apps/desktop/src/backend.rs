//! # Headless Print Backend
//!
//! The binary has no print system to talk to: printed documents become
//! text files, previews go to the log, and every dialog answers itself.
//!
//! ```text
//! PrinterManager::handle
//!       │
//!       ├── preview ──► TextFileBackend::preview ──► tracing::info! (text)
//!       │
//!       └── execute ──► TextFileBackend::execute
//!                          └── <dir>/<printer>-<seq>.txt  (or output_filename)
//!                              written `copy_count` times into one file
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use coinbox_core::printing::{
    Document, PrintBackend, PrintDialogs, PrintJob, Printer, PrinterSettings, RenderTarget,
};
use coinbox_core::{PrintingError, PrintingResult};
use tracing::{debug, info};

/// Characters per line of a receipt roll.
pub const DEFAULT_LINE_WIDTH: usize = 42;

/// Collects rendered text.
struct TextTarget {
    width: usize,
    copies: usize,
    text: String,
}

impl RenderTarget for TextTarget {
    fn render(&mut self, document: &Document) -> PrintingResult<()> {
        let page = document.render_text(self.width);
        for _ in 0..self.copies {
            self.text.push_str(&page);
            self.text.push('\u{c}');
            self.text.push('\n');
        }
        Ok(())
    }
}

/// Writes printed documents as plain text.
#[derive(Debug)]
pub struct TextFileBackend {
    dir: PathBuf,
    width: usize,
    sequence: u32,
}

impl TextFileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        TextFileBackend {
            dir: dir.into(),
            width: DEFAULT_LINE_WIDTH,
            sequence: 0,
        }
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn render(&self, printer: &Printer, job: &dyn PrintJob, copies: usize) -> PrintingResult<String> {
        let mut target = TextTarget {
            width: self.width,
            copies,
            text: String::new(),
        };
        job.handler(&mut target)?;
        debug!(printer = %printer.name, bytes = target.text.len(), "Rendered job");
        Ok(target.text)
    }

    fn output_path(&mut self, printer: &Printer) -> PathBuf {
        if !printer.settings.output_filename.is_empty() {
            return PathBuf::from(&printer.settings.output_filename);
        }
        self.sequence += 1;
        let stem: String = printer
            .name
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '_' })
            .collect();
        self.dir.join(format!("{}-{:04}.txt", stem, self.sequence))
    }
}

impl PrintBackend for TextFileBackend {
    fn preview(&mut self, printer: &Printer, job: &dyn PrintJob) -> PrintingResult<()> {
        let text = self.render(printer, job, 1)?;
        info!(printer = %printer.name, "Print preview:\n{}", text);
        Ok(())
    }

    fn execute(&mut self, printer: &Printer, job: &dyn PrintJob) -> PrintingResult<()> {
        let copies = usize::try_from(printer.settings.copy_count()).unwrap_or(1).max(1);
        let text = self.render(printer, job, copies)?;
        if text.is_empty() {
            debug!(printer = %printer.name, "Nothing to print");
            return Ok(());
        }

        let path = self.output_path(printer);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PrintingError::Output(e.to_string()))?;
        }
        fs::write(&path, text).map_err(|e| PrintingError::Output(e.to_string()))?;
        info!(printer = %printer.name, path = %path.display(), copies, "Printed");
        Ok(())
    }
}

/// Dialogs that accept whatever they are shown.
///
/// Print setup returns its input, printer choice takes the first saved
/// profile.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessDialogs;

impl PrintDialogs for HeadlessDialogs {
    fn print_setup(&mut self, settings: PrinterSettings) -> Option<PrinterSettings> {
        Some(settings)
    }

    fn page_setup(&mut self, settings: PrinterSettings) -> PrinterSettings {
        settings
    }

    fn choose_printer(&mut self, names: &[String]) -> Option<String> {
        names.first().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinbox_core::printing::{DocPrintJob, EmptyPrintJob, PrinterMode};

    fn receipt_job() -> DocPrintJob {
        DocPrintJob::new("Coinbox", "Total 4.50", "Thank you")
    }

    #[test]
    fn test_execute_writes_copies() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = TextFileBackend::new(dir.path()).with_width(20);

        let mut settings = PrinterSettings::new(PrinterMode::ScreenResolution);
        settings.set_copy_count(2).unwrap();
        let printer = Printer::new("kitchen", settings);

        backend.execute(&printer, &receipt_job()).unwrap();

        let path = dir.path().join("kitchen-0001.txt");
        let text = fs::read_to_string(path).unwrap();
        assert_eq!(text.matches("Total 4.50").count(), 2);
        assert_eq!(text.matches("Thank you").count(), 2);
    }

    #[test]
    fn test_output_filename_wins() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("out").join("receipt.txt");
        let mut backend = TextFileBackend::new(dir.path());

        let mut settings = PrinterSettings::default();
        settings.output_filename = target.to_string_lossy().into_owned();
        let printer = Printer::new("receipt", settings);

        backend.execute(&printer, &receipt_job()).unwrap();
        assert!(target.is_file());
    }

    #[test]
    fn test_empty_job_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut backend = TextFileBackend::new(dir.path());
        let printer = Printer::new("receipt", PrinterSettings::default());

        backend.execute(&printer, &EmptyPrintJob).unwrap();
        backend.preview(&printer, &receipt_job()).unwrap();
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_headless_dialogs() {
        let mut dialogs = HeadlessDialogs;
        assert!(dialogs.print_setup(PrinterSettings::default()).is_some());
        assert_eq!(
            dialogs.choose_printer(&["office".to_string(), "receipt".to_string()]),
            Some("office".to_string())
        );
        assert_eq!(dialogs.choose_printer(&[]), None);
    }
}
