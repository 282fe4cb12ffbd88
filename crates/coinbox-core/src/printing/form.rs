//! # Printer Form Controller
//!
//! Lists printer profiles in a [`FormPage`](crate::form::FormPage) and
//! keeps function bindings in step when profiles are created, renamed or
//! edited.
//!
//! ## Fields
//! ```text
//! name       Text        profile name
//! printer    Record      PrinterRecord JSON, filled by "Set up"
//! info       Text        read-only summary of the record
//! functions  Selection   functions printing to this profile
//! ```

use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tracing::{info, warn};

use super::manager::{FunctionBinding, PrinterManager};
use super::settings::{Printer, PrinterRecord, PrinterSettings};
use crate::error::{FormResult, PrintingError, ValidationError};
use crate::form::{FieldDescriptor, FieldValue, FormController, FormData};
use crate::validation::validate_printer_name;

/// Form controller over printer profiles.
#[derive(Debug, Clone)]
pub struct PrinterFormController {
    manager: Arc<Mutex<PrinterManager>>,
}

impl PrinterFormController {
    pub fn new(manager: Arc<Mutex<PrinterManager>>) -> Self {
        PrinterFormController { manager }
    }

    fn manager(&self) -> MutexGuard<'_, PrinterManager> {
        self.manager.lock().expect("Printer manager mutex poisoned")
    }

    fn record_value(settings: &PrinterSettings) -> FieldValue {
        match serde_json::to_value(settings.to_record()) {
            Ok(value) => FieldValue::Record(value),
            Err(_) => FieldValue::Empty,
        }
    }

    fn settings_from(name: &str, value: &Value) -> FormResult<PrinterSettings> {
        let record: PrinterRecord = serde_json::from_value(value.clone())
            .map_err(|e| PrintingError::invalid_record(name, e.to_string()))?;
        Ok(PrinterSettings::from_record(name, &record)?)
    }

    fn info_text(settings: &PrinterSettings) -> String {
        settings
            .describe()
            .into_iter()
            .map(|(label, value)| format!("{label}: {value}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Runs the printer setup dialogs for the form's "Set up" button.
    ///
    /// ## Returns
    /// The new `printer` control value, or `None` when the user cancelled.
    pub fn setup(&self, name: &str, current: Option<&Value>) -> FormResult<Option<FieldValue>> {
        let existing = match current {
            Some(value) => Some(Printer::new(name, Self::settings_from(name, value)?)),
            None => None,
        };

        let prompted = self.manager().prompt_printer(name, existing.as_ref());
        Ok(prompted.map(|p| Self::record_value(&p.settings)))
    }

    /// Summary text for a record control value.
    pub fn describe(&self, value: &FieldValue) -> String {
        value
            .as_record()
            .and_then(|v| Self::settings_from("", v).ok())
            .map(|s| Self::info_text(&s))
            .unwrap_or_default()
    }

    /// Binds every selected function to `name`; functions that pointed at
    /// `previous` and are no longer selected go back to "ask".
    fn bind_functions(
        manager: &PrinterManager,
        name: &str,
        previous: Option<&str>,
        selected: &[String],
    ) -> FormResult<()> {
        for function in manager.function_names() {
            if selected.contains(&function) {
                manager.set_function_printer(&function, Some(name))?;
            } else if let (Some(prev), FunctionBinding::Printer(bound)) =
                (previous, manager.function_binding(&function))
            {
                if bound == prev {
                    manager.set_function_printer(&function, None)?;
                }
            }
        }
        Ok(())
    }
}

fn profile_name(_: &PrinterFormController, p: &Printer) -> FieldValue {
    FieldValue::text(&p.name)
}

fn profile_record(_: &PrinterFormController, p: &Printer) -> FieldValue {
    PrinterFormController::record_value(&p.settings)
}

fn profile_info(_: &PrinterFormController, p: &Printer) -> FieldValue {
    FieldValue::Text(PrinterFormController::info_text(&p.settings))
}

fn profile_functions(c: &PrinterFormController, p: &Printer) -> FieldValue {
    let manager = c.manager();
    let options = manager.function_names();
    let selected = options
        .iter()
        .filter(|f| manager.function_binding(f) == FunctionBinding::Printer(p.name.clone()))
        .cloned()
        .collect();
    FieldValue::Selection { options, selected }
}

impl FormController for PrinterFormController {
    type Item = Printer;

    fn fields(&self) -> Vec<FieldDescriptor<Self>> {
        let options = self.manager().function_names();
        vec![
            FieldDescriptor::<Self>::new("name", "Name", FieldValue::text(""), profile_name),
            FieldDescriptor::<Self>::new("printer", "Setup", FieldValue::Empty, profile_record),
            FieldDescriptor::<Self>::new("info", "Info", FieldValue::text(""), profile_info)
                .read_only(),
            FieldDescriptor::<Self>::new(
                "functions",
                "Use for",
                FieldValue::Selection {
                    options,
                    selected: Vec::new(),
                },
                profile_functions,
            ),
        ]
    }

    /// Saved profiles. An unreadable record is left out of the list.
    fn items(&self) -> FormResult<Vec<Printer>> {
        let manager = self.manager();
        let printers = manager
            .printer_names()
            .iter()
            .filter_map(|name| match manager.load_printer(name) {
                Ok(printer) => Some(printer),
                Err(e) => {
                    warn!(printer = %name, error = %e, "Skipping unreadable printer profile");
                    None
                }
            })
            .collect();
        Ok(printers)
    }

    fn display(&self, item: &Printer) -> String {
        item.name.clone()
    }

    fn new_item(&mut self, data: &FormData) -> FormResult<Printer> {
        let name = validate_printer_name(data.text("name").unwrap_or_default())?;
        let record = data.record("printer").ok_or_else(|| ValidationError::Required {
            field: "printer".to_string(),
        })?;
        let settings = Self::settings_from(&name, record)?;

        let manager = self.manager();
        if manager.printer_names().contains(&name) {
            return Err(ValidationError::Duplicate {
                field: "name".to_string(),
                value: name,
            }
            .into());
        }

        let printer = Printer::new(&name, settings);
        manager.save_printer(&printer)?;
        Self::bind_functions(&manager, &name, None, data.selected("functions"))?;
        Ok(printer)
    }

    fn update_item(&mut self, item: &Printer, data: &FormData) -> FormResult<Printer> {
        let name = match data.text("name") {
            Some(text) => validate_printer_name(text)?,
            None => item.name.clone(),
        };
        let settings = match data.record("printer") {
            Some(record) => Self::settings_from(&name, record)?,
            None => item.settings.clone(),
        };

        let manager = self.manager();
        if name != item.name && manager.printer_names().contains(&name) {
            return Err(ValidationError::Duplicate {
                field: "name".to_string(),
                value: name,
            }
            .into());
        }

        let printer = Printer::new(&name, settings);
        manager.remove_printer(&item.name);
        manager.save_printer(&printer)?;
        Self::bind_functions(&manager, &name, Some(&item.name), data.selected("functions"))?;

        if name != item.name {
            info!(from = %item.name, to = %name, "Renamed printer profile");
        }
        Ok(printer)
    }

    fn delete_item(&mut self, item: &Printer) -> FormResult<()> {
        self.manager().remove_printer(&item.name);
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ConfigHandle};
    use crate::form::{FormMode, FormPage};
    use crate::printing::job::PrintJob;
    use crate::printing::manager::{PrintBackend, PrintDialogs};
    use crate::printing::settings::Unit;
    use crate::error::{FormError, PrintingResult};

    struct AcceptAll;

    impl PrintDialogs for AcceptAll {
        fn print_setup(&mut self, mut settings: PrinterSettings) -> Option<PrinterSettings> {
            settings.printer_name = "Star TSP100".to_string();
            Some(settings)
        }

        fn page_setup(&mut self, mut settings: PrinterSettings) -> PrinterSettings {
            settings.set_paper_size((80.0, 297.0), Unit::Millimeter);
            settings
        }

        fn choose_printer(&mut self, _names: &[String]) -> Option<String> {
            None
        }
    }

    struct NullBackend;

    impl PrintBackend for NullBackend {
        fn preview(&mut self, _: &Printer, _: &dyn PrintJob) -> PrintingResult<()> {
            Ok(())
        }

        fn execute(&mut self, _: &Printer, _: &dyn PrintJob) -> PrintingResult<()> {
            Ok(())
        }
    }

    fn shared_manager() -> Arc<Mutex<PrinterManager>> {
        let manager = PrinterManager::new(
            ConfigHandle::new(Config::new()),
            Box::new(AcceptAll),
            Box::new(NullBackend),
        );
        manager.register_function("receipt").unwrap();
        manager.register_function("kitchen").unwrap();
        Arc::new(Mutex::new(manager))
    }

    fn select(values: &[&str]) -> FieldValue {
        FieldValue::Selection {
            options: vec!["kitchen".to_string(), "receipt".to_string()],
            selected: values.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_create_profile_through_page() {
        let shared = shared_manager();
        let controller = PrinterFormController::new(shared.clone());
        let mut page = FormPage::new(controller).unwrap();

        page.new_item().unwrap();
        let setup = page.controller().setup("bar", None).unwrap().unwrap();
        page.set_control("name", FieldValue::text("bar")).unwrap();
        page.set_control("printer", setup).unwrap();
        page.set_control("functions", select(&["receipt"])).unwrap();
        page.save().unwrap();

        assert_eq!(page.rows(), vec!["bar"]);
        let manager = shared.lock().unwrap();
        let printer = manager.get_function_printer("receipt").unwrap().unwrap();
        assert_eq!(printer.name, "bar");
        assert_eq!(printer.settings.printer_name, "Star TSP100");
        assert_eq!(manager.get_function_printer("kitchen").unwrap(), None);
    }

    #[test]
    fn test_create_without_settings_is_rejected() {
        let mut page = FormPage::new(PrinterFormController::new(shared_manager())).unwrap();

        page.new_item().unwrap();
        page.set_control("name", FieldValue::text("bar")).unwrap();

        assert!(matches!(page.save(), Err(FormError::Validation(_))));
        assert_eq!(page.mode(), FormMode::Editing);
        assert_eq!(page.user_message(), Some("printer is required"));
    }

    #[test]
    fn test_rename_moves_and_resets_bindings() {
        let shared = shared_manager();
        {
            let manager = shared.lock().unwrap();
            manager
                .save_printer(&Printer::new("old", PrinterSettings::default()))
                .unwrap();
            manager.set_function_printer("receipt", Some("old")).unwrap();
            manager.set_function_printer("kitchen", Some("old")).unwrap();
        }

        let mut page = FormPage::new(PrinterFormController::new(shared.clone())).unwrap();
        page.activate(0).unwrap();
        assert_eq!(page.control("functions"), Some(&select(&["kitchen", "receipt"])));

        page.edit().unwrap();
        page.set_control("name", FieldValue::text("new")).unwrap();
        page.set_control("functions", select(&["kitchen"])).unwrap();
        page.save().unwrap();

        assert_eq!(page.rows(), vec!["new"]);
        let manager = shared.lock().unwrap();
        assert_eq!(
            manager.function_binding("kitchen"),
            FunctionBinding::Printer("new".to_string())
        );
        assert_eq!(manager.function_binding("receipt"), FunctionBinding::Ask);
        assert!(manager.load_printer("old").is_err());
    }

    #[test]
    fn test_duplicate_name_is_rejected() {
        let shared = shared_manager();
        {
            let manager = shared.lock().unwrap();
            for name in ["a", "b"] {
                manager
                    .save_printer(&Printer::new(name, PrinterSettings::default()))
                    .unwrap();
            }
        }

        let mut page = FormPage::new(PrinterFormController::new(shared)).unwrap();
        page.activate(0).unwrap();
        page.edit().unwrap();
        page.set_control("name", FieldValue::text("b")).unwrap();

        assert!(matches!(page.save(), Err(FormError::Validation(_))));
        assert_eq!(page.rows(), vec!["a", "b"]);
    }

    #[test]
    fn test_info_is_not_persisted() {
        let page = FormPage::new(PrinterFormController::new(shared_manager())).unwrap();
        assert!(!page.collect().contains("info"));
    }

    #[test]
    fn test_unreadable_profile_is_skipped() {
        let shared = shared_manager();
        {
            let manager = shared.lock().unwrap();
            manager
                .save_printer(&Printer::new("good", PrinterSettings::default()))
                .unwrap();
            manager
                .config()
                .write(|c| c.set("printing", "p.broken", "not a record"));
        }

        let mut page = FormPage::new(PrinterFormController::new(shared)).unwrap();
        page.populate().unwrap();
        assert_eq!(page.rows(), vec!["good"]);
    }

    #[test]
    fn test_delete_profile() {
        let shared = shared_manager();
        shared
            .lock()
            .unwrap()
            .save_printer(&Printer::new("gone", PrinterSettings::default()))
            .unwrap();

        let mut page = FormPage::new(PrinterFormController::new(shared.clone())).unwrap();
        page.activate(0).unwrap();
        page.delete().unwrap();

        assert!(page.rows().is_empty());
        assert!(shared.lock().unwrap().printer_names().is_empty());
    }
}
