//! # Printer Registry
//!
//! Maps logical print functions ("receipt", "kitchen") to named printer
//! profiles stored in the config, and dispatches jobs to them.
//!
//! ## Config Layout
//! ```text
//! [printing]
//! p.<name>       = { ...PrinterRecord... }   saved profile
//! f.<function>   = "<name>"                  function bound to a profile
//! f.<function>   = -1                        function asks every time
//! default        = "<name>"                  profile for unnamed jobs
//! force_preview  = true | false              preview instead of printing
//! ```
//!
//! ## Dispatch
//! ```text
//! handle(job, function)
//!   │
//!   ├── function None ──────► default profile (or "[default]" settings)
//!   │
//!   ├── function bound ─────► load profile ── missing? ──► Dropped
//!   │
//!   ├── function "ask" ─────► select_printer ─ cancelled? ► Dropped
//!   │
//!   ├── never registered ───────────────────────────────► Dropped
//!   │
//!   └── force_preview ? backend.preview : backend.execute
//! ```
//!
//! Dropped jobs are never an error for the caller: printing is fire and
//! forget for the module that asked for it. The reason is logged and
//! returned so tests and callers that care can inspect it.

use serde_json::Value;
use tracing::{debug, error, info, warn};

use super::job::PrintJob;
use super::settings::{Printer, PrinterRecord, PrinterSettings, Unit};
use crate::config::{keys, ConfigHandle};
use crate::error::{PrintingError, PrintingResult};
use crate::validation::{validate_function_name, validate_printer_name};

/// Name of the profile used when no default printer is configured.
pub const DEFAULT_PRINTER_NAME: &str = "[default]";

/// Stored value meaning "no printer, ask every time".
pub const NO_PRINTER: i64 = -1;

// =============================================================================
// Collaborator Traits
// =============================================================================

/// The user-facing dialogs the registry needs. All calls block.
pub trait PrintDialogs {
    /// Print dialog seeded with `settings`; `None` when rejected.
    fn print_setup(&mut self, settings: PrinterSettings) -> Option<PrinterSettings>;

    /// Page setup dialog. Always returns settings (possibly unchanged).
    fn page_setup(&mut self, settings: PrinterSettings) -> PrinterSettings;

    /// "Select Printer": choose one of `names`; `None` when dismissed.
    fn choose_printer(&mut self, names: &[String]) -> Option<String>;
}

/// Where documents actually go.
pub trait PrintBackend {
    fn preview(&mut self, printer: &Printer, job: &dyn PrintJob) -> PrintingResult<()>;
    fn execute(&mut self, printer: &Printer, job: &dyn PrintJob) -> PrintingResult<()>;
}

// =============================================================================
// Types
// =============================================================================

/// Binding of a print function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionBinding {
    /// Never registered.
    Unset,
    /// Registered, no printer: ask the user.
    Ask,
    /// Bound to a profile name.
    Printer(String),
}

impl FunctionBinding {
    fn from_value(value: Option<&Value>) -> Self {
        match value {
            Some(Value::String(name)) => FunctionBinding::Printer(name.clone()),
            Some(Value::Number(n)) if n.as_i64() == Some(NO_PRINTER) => FunctionBinding::Ask,
            _ => FunctionBinding::Unset,
        }
    }
}

/// What `handle` did with a job.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Previewed { printer: String },
    Printed { printer: String },
    Dropped(PrintingError),
}

// =============================================================================
// Printer Manager
// =============================================================================

/// The printer registry.
pub struct PrinterManager {
    config: ConfigHandle,
    dialogs: Box<dyn PrintDialogs + Send>,
    backend: Box<dyn PrintBackend + Send>,
}

impl std::fmt::Debug for PrinterManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrinterManager").finish_non_exhaustive()
    }
}

fn printer_key(name: &str) -> String {
    format!("{}{}", keys::PRINTER_PREFIX, name)
}

fn function_key(name: &str) -> String {
    format!("{}{}", keys::FUNCTION_PREFIX, name)
}

impl PrinterManager {
    pub fn new(
        config: ConfigHandle,
        dialogs: Box<dyn PrintDialogs + Send>,
        backend: Box<dyn PrintBackend + Send>,
    ) -> Self {
        PrinterManager {
            config,
            dialogs,
            backend,
        }
    }

    pub fn config(&self) -> &ConfigHandle {
        &self.config
    }

    // -------------------------------------------------------------------------
    // Profiles
    // -------------------------------------------------------------------------

    /// Lets the user configure a printer through the print and page setup
    /// dialogs, starting from `existing` when given.
    ///
    /// Margins are forced to zero: receipts use the full printable width.
    ///
    /// ## Returns
    /// `None` when the print dialog was rejected.
    pub fn prompt_printer(&mut self, name: &str, existing: Option<&Printer>) -> Option<Printer> {
        let seed = existing
            .map(|p| p.settings.clone())
            .unwrap_or_default();

        let settings = self.dialogs.print_setup(seed)?;
        let mut settings = self.dialogs.page_setup(settings);
        settings.set_page_margins([0.0; 4], Unit::Inch);

        Some(Printer::new(name, settings))
    }

    /// Asks the user to pick one of the saved profiles.
    ///
    /// ## Errors
    /// `UserCancelled` when the dialog is dismissed, `NotFound` /
    /// `InvalidRecord` when the chosen profile cannot be loaded.
    pub fn select_printer(&mut self) -> PrintingResult<Printer> {
        let names = self.printer_names();
        match self.dialogs.choose_printer(&names) {
            Some(name) => self.load_printer(&name),
            None => Err(PrintingError::UserCancelled),
        }
    }

    /// Stores a profile under its name, replacing any previous one.
    pub fn save_printer(&self, printer: &Printer) -> PrintingResult<()> {
        let name = validate_printer_name(&printer.name)?;
        let record = serde_json::to_value(printer.settings.to_record())
            .map_err(|e| PrintingError::invalid_record(&name, e.to_string()))?;

        self.config
            .write(|c| c.set(keys::PRINTING, &printer_key(&name), record));
        info!(printer = %name, "Saved printer profile");
        Ok(())
    }

    /// Removes a profile. Functions bound to it keep their binding.
    pub fn remove_printer(&self, name: &str) {
        self.config
            .write(|c| c.remove(keys::PRINTING, &printer_key(name)));
        info!(printer = %name, "Removed printer profile");
    }

    /// Loads a saved profile.
    ///
    /// ## Errors
    /// `NotFound` when no profile has that name, `InvalidRecord` when the
    /// stored record is unreadable.
    pub fn load_printer(&self, name: &str) -> PrintingResult<Printer> {
        let value = self
            .config
            .read(|c| c.get(keys::PRINTING, &printer_key(name)).cloned())
            .ok_or_else(|| PrintingError::NotFound(name.to_string()))?;

        let record: PrinterRecord = serde_json::from_value(value)
            .map_err(|e| PrintingError::invalid_record(name, e.to_string()))?;
        let settings = PrinterSettings::from_record(name, &record)?;

        Ok(Printer::new(name, settings))
    }

    /// Names of all saved profiles, sorted.
    pub fn printer_names(&self) -> Vec<String> {
        self.names_with_prefix(keys::PRINTER_PREFIX)
    }

    /// The profile used for jobs without a function.
    pub fn default_printer(&self) -> PrintingResult<Printer> {
        let name = self
            .config
            .read(|c| c.get_str(keys::PRINTING, keys::DEFAULT_PRINTER).map(str::to_string));

        match name {
            Some(name) => self.load_printer(&name),
            None => Ok(Printer::new(DEFAULT_PRINTER_NAME, PrinterSettings::default())),
        }
    }

    // -------------------------------------------------------------------------
    // Functions
    // -------------------------------------------------------------------------

    /// Announces a print function so it can be configured.
    ///
    /// Idempotent: an existing binding is left alone, a new function
    /// starts out as "ask".
    pub fn register_function(&self, function: &str) -> PrintingResult<()> {
        let function = validate_function_name(function)?;
        let key = function_key(&function);

        self.config.write(|c| {
            if c.get(keys::PRINTING, &key).is_none() {
                c.set(keys::PRINTING, &key, NO_PRINTER);
                debug!(function = %function, "Registered print function");
            }
        });
        Ok(())
    }

    /// Binds a function to a profile, or to "ask" when `printer` is `None`.
    pub fn set_function_printer(&self, function: &str, printer: Option<&str>) -> PrintingResult<()> {
        let function = validate_function_name(function)?;
        let value = match printer {
            Some(name) => Value::from(validate_printer_name(name)?),
            None => Value::from(NO_PRINTER),
        };

        self.config
            .write(|c| c.set(keys::PRINTING, &function_key(&function), value));
        Ok(())
    }

    /// Raw binding of a function.
    pub fn function_binding(&self, function: &str) -> FunctionBinding {
        self.config
            .read(|c| FunctionBinding::from_value(c.get(keys::PRINTING, &function_key(function))))
    }

    /// The profile a function prints to.
    ///
    /// ## Returns
    /// - `Ok(None)`: the function asks the user every time
    /// - `Ok(Some(printer))`: the bound profile
    ///
    /// ## Errors
    /// `NotConfigured` for an unregistered function, `NotFound` when the
    /// bound profile no longer exists.
    pub fn get_function_printer(&self, function: &str) -> PrintingResult<Option<Printer>> {
        match self.function_binding(function) {
            FunctionBinding::Unset => Err(PrintingError::NotConfigured(function.to_string())),
            FunctionBinding::Ask => Ok(None),
            FunctionBinding::Printer(name) => self.load_printer(&name).map(Some),
        }
    }

    /// Names of all registered functions, sorted.
    pub fn function_names(&self) -> Vec<String> {
        self.names_with_prefix(keys::FUNCTION_PREFIX)
    }

    fn names_with_prefix(&self, prefix: &str) -> Vec<String> {
        self.config.read(|c| {
            c.keys(keys::PRINTING)
                .into_iter()
                .filter_map(|k| k.strip_prefix(prefix).map(str::to_string))
                .collect()
        })
    }

    // -------------------------------------------------------------------------
    // Dispatch
    // -------------------------------------------------------------------------

    fn resolve(&mut self, function: Option<&str>) -> PrintingResult<Printer> {
        match function {
            None => self.default_printer(),
            Some(function) => match self.get_function_printer(function)? {
                Some(printer) => Ok(printer),
                None => self.select_printer(),
            },
        }
    }

    /// Sends a job to the printer configured for `function`.
    ///
    /// Never fails: configuration problems and a cancelled selection drop
    /// the job with a warning.
    pub fn handle(&mut self, job: &dyn PrintJob, function: Option<&str>) -> Dispatch {
        let printer = match self.resolve(function) {
            Ok(printer) => printer,
            Err(err) => {
                warn!(function = ?function, error = %err, "Print job dropped");
                return Dispatch::Dropped(err);
            }
        };

        let preview = self.config.read(|c| c.force_preview());
        let result = if preview {
            self.backend.preview(&printer, job)
        } else {
            self.backend.execute(&printer, job)
        };

        match result {
            Ok(()) if preview => Dispatch::Previewed {
                printer: printer.name,
            },
            Ok(()) => Dispatch::Printed {
                printer: printer.name,
            },
            Err(err) => {
                error!(printer = %printer.name, error = %err, "Print output failed");
                Dispatch::Dropped(err)
            }
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::printing::job::DocPrintJob;
    use std::sync::{Arc, Mutex};

    /// Dialogs driven by a script of answers.
    #[derive(Default)]
    struct ScriptedDialogs {
        accept_setup: bool,
        choice: Option<String>,
    }

    impl PrintDialogs for ScriptedDialogs {
        fn print_setup(&mut self, mut settings: PrinterSettings) -> Option<PrinterSettings> {
            if !self.accept_setup {
                return None;
            }
            settings.printer_name = "TM-T88".to_string();
            settings.set_page_margins([5.0; 4], Unit::Millimeter);
            Some(settings)
        }

        fn page_setup(&mut self, settings: PrinterSettings) -> PrinterSettings {
            settings
        }

        fn choose_printer(&mut self, _names: &[String]) -> Option<String> {
            self.choice.clone()
        }
    }

    #[derive(Clone, Default)]
    struct RecordingBackend {
        calls: Arc<Mutex<Vec<(String, String)>>>,
    }

    impl PrintBackend for RecordingBackend {
        fn preview(&mut self, printer: &Printer, _job: &dyn PrintJob) -> PrintingResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(("preview".to_string(), printer.name.clone()));
            Ok(())
        }

        fn execute(&mut self, printer: &Printer, _job: &dyn PrintJob) -> PrintingResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(("execute".to_string(), printer.name.clone()));
            Ok(())
        }
    }

    fn manager(dialogs: ScriptedDialogs) -> (PrinterManager, RecordingBackend) {
        let backend = RecordingBackend::default();
        let manager = PrinterManager::new(
            ConfigHandle::new(Config::new()),
            Box::new(dialogs),
            Box::new(backend.clone()),
        );
        (manager, backend)
    }

    #[test]
    fn test_register_function_is_idempotent() {
        let (pm, _) = manager(ScriptedDialogs::default());
        pm.save_printer(&Printer::new("kitchen", PrinterSettings::default()))
            .unwrap();

        pm.register_function("receipt").unwrap();
        assert_eq!(pm.get_function_printer("receipt").unwrap(), None);

        pm.set_function_printer("receipt", Some("kitchen")).unwrap();
        pm.register_function("receipt").unwrap();
        assert_eq!(
            pm.function_binding("receipt"),
            FunctionBinding::Printer("kitchen".to_string())
        );
    }

    #[test]
    fn test_unregistered_function() {
        let (pm, _) = manager(ScriptedDialogs::default());
        assert_eq!(
            pm.get_function_printer("receipt"),
            Err(PrintingError::NotConfigured("receipt".to_string()))
        );
    }

    #[test]
    fn test_load_missing_printer() {
        let (pm, _) = manager(ScriptedDialogs::default());
        assert_eq!(
            pm.load_printer("nope"),
            Err(PrintingError::NotFound("nope".to_string()))
        );
    }

    #[test]
    fn test_profile_round_trip_through_config() {
        let (pm, _) = manager(ScriptedDialogs::default());
        let mut settings = PrinterSettings::default();
        settings.printer_name = "EPSON".to_string();
        settings.set_copy_count(3).unwrap();

        let printer = Printer::new("front", settings);
        pm.save_printer(&printer).unwrap();

        assert_eq!(pm.load_printer("front").unwrap(), printer);
        assert_eq!(pm.printer_names(), vec!["front"]);

        pm.remove_printer("front");
        assert!(pm.printer_names().is_empty());
    }

    #[test]
    fn test_receipt_kitchen_scenario() {
        let (mut pm, backend) = manager(ScriptedDialogs::default());
        let job = DocPrintJob::new("Order 12", "2 x Soup", "");

        pm.register_function("receipt").unwrap();
        assert_eq!(pm.get_function_printer("receipt").unwrap(), None);

        pm.save_printer(&Printer::new("kitchen", PrinterSettings::default()))
            .unwrap();
        pm.set_function_printer("receipt", Some("kitchen")).unwrap();
        assert_eq!(
            pm.get_function_printer("receipt").unwrap().map(|p| p.name),
            Some("kitchen".to_string())
        );

        assert_eq!(
            pm.handle(&job, Some("receipt")),
            Dispatch::Printed {
                printer: "kitchen".to_string()
            }
        );

        pm.remove_printer("kitchen");
        assert_eq!(
            pm.handle(&job, Some("receipt")),
            Dispatch::Dropped(PrintingError::NotFound("kitchen".to_string()))
        );
        assert_eq!(backend.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_handle_asks_and_respects_cancel() {
        let (mut pm, backend) = manager(ScriptedDialogs::default());
        pm.register_function("receipt").unwrap();

        let dispatch = pm.handle(&DocPrintJob::default(), Some("receipt"));
        assert_eq!(dispatch, Dispatch::Dropped(PrintingError::UserCancelled));
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_handle_asks_and_uses_choice() {
        let dialogs = ScriptedDialogs {
            accept_setup: false,
            choice: Some("bar".to_string()),
        };
        let (mut pm, _) = manager(dialogs);
        pm.save_printer(&Printer::new("bar", PrinterSettings::default()))
            .unwrap();
        pm.register_function("receipt").unwrap();

        assert_eq!(
            pm.handle(&DocPrintJob::default(), Some("receipt")),
            Dispatch::Printed {
                printer: "bar".to_string()
            }
        );
    }

    #[test]
    fn test_default_printer_and_force_preview() {
        let (mut pm, backend) = manager(ScriptedDialogs::default());
        pm.config().write(|c| c.set("printing", "force_preview", true));

        let dispatch = pm.handle(&DocPrintJob::default(), None);
        assert_eq!(
            dispatch,
            Dispatch::Previewed {
                printer: DEFAULT_PRINTER_NAME.to_string()
            }
        );
        assert_eq!(
            backend.calls.lock().unwrap()[0],
            ("preview".to_string(), DEFAULT_PRINTER_NAME.to_string())
        );
    }

    #[test]
    fn test_prompt_printer_zeroes_margins() {
        let dialogs = ScriptedDialogs {
            accept_setup: true,
            choice: None,
        };
        let (mut pm, _) = manager(dialogs);

        let printer = pm.prompt_printer("bar", None).unwrap();
        assert_eq!(printer.name, "bar");
        assert_eq!(printer.settings.printer_name, "TM-T88");
        assert_eq!(printer.settings.page_margins(Unit::Millimeter), [0.0; 4]);
    }

    #[test]
    fn test_prompt_printer_rejected() {
        let (mut pm, _) = manager(ScriptedDialogs::default());
        assert!(pm.prompt_printer("bar", None).is_none());
    }

    #[test]
    fn test_function_names() {
        let (pm, _) = manager(ScriptedDialogs::default());
        pm.register_function("receipt").unwrap();
        pm.register_function("kitchen").unwrap();
        assert_eq!(pm.function_names(), vec!["kitchen", "receipt"]);
    }
}
