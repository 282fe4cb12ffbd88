//! # Printing
//!
//! Printer profiles, print functions and print jobs.
//!
//! ```text
//! ┌──────────────┐  handle(job, "receipt")  ┌────────────────┐
//! │ any module   │ ───────────────────────► │ PrinterManager │
//! └──────────────┘                          └───────┬────────┘
//!                                                   │ resolve profile
//!                                      ┌────────────┴────────────┐
//!                                      ▼                         ▼
//!                               PrintBackend::preview    PrintBackend::execute
//!                                      │                         │
//!                                      └──── job.handler() ──────┘
//!                                                   │
//!                                               Document
//! ```

pub mod document;
pub mod form;
pub mod job;
pub mod manager;
pub mod settings;

pub use document::{Align, Block, Cell, Document, Table, TextStyle};
pub use form::PrinterFormController;
pub use job::{DocPrintJob, EmptyPrintJob, HtmlPrintJob, PrintJob, RenderTarget, TablePrintJob};
pub use manager::{
    Dispatch, FunctionBinding, PrintBackend, PrintDialogs, PrinterManager, DEFAULT_PRINTER_NAME,
    NO_PRINTER,
};
pub use settings::{
    ColorMode, DuplexMode, Orientation, OutputFormat, PageOrder, PaperSource, PrintRange, Printer,
    PrinterMode, PrinterRecord, PrinterSettings, Unit,
};
