//! # Modules
//!
//! Everything a module contributes to the application, and the base module
//! every other module builds on.
//!
//! ## Contributions
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │ Module                                                                  │
//! │   metadata()               name, version, dependencies, config defaults │
//! │   menu()                   roots and items                              │
//! │   actions()                toolbar actions                              │
//! │   config_pages(services)   pages of the configuration dialog            │
//! │   first_run_wizard_pages() pages of the first-time wizard               │
//! │   extend_main_window(ui)   main window extensions                       │
//! │   init(services)           bus subscriptions and other setup            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde_json::Value;
use tracing::{debug, info, warn};

use crate::context::Services;
use crate::error::AppResult;
use crate::events::{Event, SenderFilter, Signal};
use crate::shell::{
    Action, AppConfigPage, ConfigPage, LocaleConfigPage, MenuConfigPage, MenuItem, MenuRoot,
    PrintingConfigPage, UiHandler, WizardPageCollection,
};
use coinbox_core::config::keys;
use coinbox_core::printing::Dispatch;

/// Default values for one config section.
pub type SectionDefaults = (String, Vec<(String, Value)>);

/// Describes a module.
#[derive(Debug, Clone, PartialEq)]
pub struct ModuleMetadata {
    pub base_name: String,
    pub version: String,
    pub display_name: String,
    /// Base names of the modules this one needs.
    pub dependencies: Vec<String>,
    pub config_defaults: Vec<SectionDefaults>,
}

/// A pluggable part of the application.
pub trait Module {
    fn metadata(&self) -> ModuleMetadata;

    fn menu(&self) -> (Vec<MenuRoot>, Vec<MenuItem>) {
        (Vec::new(), Vec::new())
    }

    fn actions(&self) -> Vec<Action> {
        Vec::new()
    }

    fn config_pages(&self, _services: &Services) -> AppResult<Vec<Box<dyn ConfigPage>>> {
        Ok(Vec::new())
    }

    fn first_run_wizard_pages(&self) -> Option<WizardPageCollection> {
        None
    }

    fn extend_main_window(&self, _ui: &mut UiHandler) -> AppResult<()> {
        Ok(())
    }

    fn init(&self, _services: &Services) -> AppResult<()> {
        Ok(())
    }
}

// =============================================================================
// Base Module
// =============================================================================

pub const BASE_MODULE: &str = "base";

/// Menu roots, the quit action, the core config pages and the printing
/// signal handlers.
#[derive(Debug, Default, Clone, Copy)]
pub struct BaseModule;

impl Module for BaseModule {
    fn metadata(&self) -> ModuleMetadata {
        ModuleMetadata {
            base_name: BASE_MODULE.to_string(),
            version: "0.1.0".to_string(),
            display_name: "Base Module".to_string(),
            dependencies: Vec::new(),
            config_defaults: vec![
                (
                    keys::MENU.to_string(),
                    vec![
                        (keys::SHOW_TAB_BAR.to_string(), Value::Bool(false)),
                        (keys::TOOLBAR_STYLE.to_string(), Value::from(0)),
                    ],
                ),
                (
                    keys::PRINTING.to_string(),
                    vec![(keys::FORCE_PREVIEW.to_string(), Value::Bool(false))],
                ),
            ],
        }
    }

    fn menu(&self) -> (Vec<MenuRoot>, Vec<MenuItem>) {
        let roots = vec![
            MenuRoot::new("main", "Main")
                .icon("images/menu-main.png")
                .position(0, 5),
            MenuRoot::new("system", "System")
                .icon("images/menu-system.png")
                .position(-1, 4),
            MenuRoot::new("administration", "Administration")
                .icon("images/menu-administration.png")
                .position(-1, 5),
        ];
        (roots, Vec::new())
    }

    fn actions(&self) -> Vec<Action> {
        vec![Action::new("quit", "Exit", Signal::Exit)
            .icon("images/cancel.png")
            .shortcut("Ctrl+Q")]
    }

    fn config_pages(&self, services: &Services) -> AppResult<Vec<Box<dyn ConfigPage>>> {
        Ok(vec![
            Box::new(AppConfigPage::new(services.config.clone())),
            Box::new(MenuConfigPage::new(services.config.clone())),
            Box::new(LocaleConfigPage::new(services.config.clone())),
            Box::new(PrintingConfigPage::new(
                services.config.clone(),
                &services.printing,
            )?),
        ])
    }

    fn init(&self, services: &Services) -> AppResult<()> {
        let terminate = services.terminate.clone();
        services
            .events
            .connect(Signal::Exit, SenderFilter::Any, move |sender, _| {
                info!(sender, "Exit requested");
                terminate.request();
            });

        let printing = services.printing.clone();
        services.events.connect(
            Signal::PrintingRegisterFunction,
            SenderFilter::Any,
            move |sender, event| {
                if let Event::PrintingRegisterFunction { function } = event {
                    if let Err(e) = printing.register_function(function) {
                        warn!(sender, function = %function, error = %e, "Could not register print function");
                    }
                }
            },
        );

        let printing = services.printing.clone();
        services.events.connect(
            Signal::PrintingHandle,
            SenderFilter::Any,
            move |sender, event| {
                if let Event::PrintingHandle { job, function } = event {
                    match printing.handle(job.as_ref(), function.as_deref()) {
                        Dispatch::Dropped(e) => {
                            warn!(sender, function = ?function, error = %e, "Print job dropped")
                        }
                        dispatch => debug!(sender, ?dispatch, "Print job handled"),
                    }
                }
            },
        );

        debug!("Base module initialized");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinbox_core::printing::{DocPrintJob, FunctionBinding};
    use coinbox_core::Config;
    use std::sync::Arc;

    fn initialized() -> Services {
        let services = Services::in_memory();
        BaseModule.init(&services).unwrap();
        services
    }

    #[test]
    fn test_metadata_defaults() {
        let metadata = BaseModule.metadata();
        assert_eq!(metadata.base_name, "base");
        assert!(metadata.dependencies.is_empty());

        let mut config = Config::new();
        for (section, entries) in metadata.config_defaults {
            config.register_defaults(&section, entries);
        }
        assert!(!config.menu_settings().show_tab_bar);
        assert!(!config.force_preview());
        assert_eq!(config.get_i64(keys::MENU, keys::TOOLBAR_STYLE), Some(0));
    }

    #[test]
    fn test_menu_and_actions() {
        let (roots, items) = BaseModule.menu();
        let names: Vec<&str> = roots.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["main", "system", "administration"]);
        assert!(items.is_empty());

        let actions = BaseModule.actions();
        assert_eq!(actions[0].name, "quit");
        assert_eq!(actions[0].shortcut.as_deref(), Some("Ctrl+Q"));
        assert_eq!(actions[0].signal, Signal::Exit);
    }

    #[test]
    fn test_config_pages() {
        let services = Services::in_memory();
        let pages = BaseModule.config_pages(&services).unwrap();
        let labels: Vec<&str> = pages.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["Application", "Menu", "Locale", "Printing"]);
    }

    #[test]
    fn test_exit_sets_terminate() {
        let services = initialized();
        assert!(!services.terminate.is_requested());
        services.events.send("sales", Event::Exit);
        assert!(services.terminate.is_requested());
    }

    #[test]
    fn test_register_function_signal() {
        let services = initialized();
        services.events.send(
            "sales",
            Event::PrintingRegisterFunction {
                function: "receipt".to_string(),
            },
        );
        assert_eq!(
            services.printing.lock().function_binding("receipt"),
            FunctionBinding::Ask
        );
    }

    #[test]
    fn test_handle_signal_with_missing_printer() {
        let services = initialized();
        services.printing.register_function("kitchen").unwrap();
        services
            .printing
            .lock()
            .set_function_printer("kitchen", Some("gone"))
            .unwrap();

        let delivered = services.events.send(
            "sales",
            Event::PrintingHandle {
                job: Arc::new(DocPrintJob::new("Order 12", "2x Coffee", "")),
                function: Some("kitchen".to_string()),
            },
        );
        assert_eq!(delivered, 1);
    }
}
