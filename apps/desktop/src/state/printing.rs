//! # Printing State
//!
//! The printer registry shared between the event bus subscriptions and the
//! printing config page.
//!
//! ## Thread Safety
//! The manager is wrapped in `Arc<Mutex<T>>`: it owns the dialogs, which
//! block while the user answers, so only one caller may drive it at a time.

use std::sync::{Arc, Mutex, MutexGuard};

use coinbox_core::printing::{
    Dispatch, PrintBackend, PrintDialogs, PrintJob, PrinterFormController, PrinterManager,
};
use coinbox_core::{ConfigHandle, PrintingResult};

/// Shared printer registry.
#[derive(Debug, Clone)]
pub struct PrintingState {
    manager: Arc<Mutex<PrinterManager>>,
}

impl PrintingState {
    pub fn new(
        config: ConfigHandle,
        dialogs: Box<dyn PrintDialogs + Send>,
        backend: Box<dyn PrintBackend + Send>,
    ) -> Self {
        PrintingState {
            manager: Arc::new(Mutex::new(PrinterManager::new(config, dialogs, backend))),
        }
    }

    /// Locks the registry.
    pub fn lock(&self) -> MutexGuard<'_, PrinterManager> {
        self.manager.lock().expect("Printer manager mutex poisoned")
    }

    /// Announces a print function.
    pub fn register_function(&self, function: &str) -> PrintingResult<()> {
        self.lock().register_function(function)
    }

    /// Sends a job to the printer configured for `function`.
    pub fn handle(&self, job: &dyn PrintJob, function: Option<&str>) -> Dispatch {
        self.lock().handle(job, function)
    }

    /// Form controller over the saved profiles.
    pub fn form_controller(&self) -> PrinterFormController {
        PrinterFormController::new(Arc::clone(&self.manager))
    }
}
