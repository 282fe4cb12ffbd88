//! # Application Context
//!
//! Owns everything the modules share. Built once per process (or per test)
//! from an explicit module list.
//!
//! ## Bootstrap
//! ```text
//! AppContext::bootstrap(modules, config, dialogs, backend)
//!   1. register each module's config defaults
//!   2. check dependencies                    → ModuleError
//!   3. merge menus and toolbar actions       → Arc<Menu>
//!   4. printer registry + event bus          → Services
//!   5. module init, in module order          (bus subscriptions)
//!   6. UI handler: init, main window extensions, wizard pages
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use coinbox_core::printing::{PrintBackend, PrintDialogs};
use coinbox_core::Config;
use tracing::{debug, info};

use crate::error::{AppError, AppResult, ErrorCode};
use crate::events::{Event, EventBus};
use crate::module::Module;
use crate::shell::{ConfigPage, FirstTimeWizard, Menu, UiHandler};
use crate::state::{ConfigState, PrintingState};

/// Sender name used by the wizard.
pub const WIZARD_SENDER: &str = "wizard";

/// Set once exit was requested.
#[derive(Debug, Clone, Default)]
pub struct TerminateFlag(Arc<AtomicBool>);

impl TerminateFlag {
    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Shared handles given to modules, pages and windows.
#[derive(Debug, Clone)]
pub struct Services {
    pub config: ConfigState,
    pub printing: PrintingState,
    pub events: EventBus,
    pub terminate: TerminateFlag,
}

impl Services {
    pub fn new(
        config: ConfigState,
        dialogs: Box<dyn PrintDialogs + Send>,
        backend: Box<dyn PrintBackend + Send>,
    ) -> Self {
        let printing = PrintingState::new(config.handle().clone(), dialogs, backend);
        Services {
            config,
            printing,
            events: EventBus::new(),
            terminate: TerminateFlag::default(),
        }
    }

    /// Config saved nowhere, headless dialogs, text output to the temp dir.
    #[cfg(test)]
    pub(crate) fn in_memory() -> Self {
        use crate::backend::{HeadlessDialogs, TextFileBackend};

        Services::new(
            ConfigState::in_memory(),
            Box::new(HeadlessDialogs),
            Box::new(TextFileBackend::new(std::env::temp_dir())),
        )
    }
}

/// The running application.
pub struct AppContext {
    services: Services,
    modules: Vec<Box<dyn Module>>,
    menu: Arc<Menu>,
    ui: UiHandler,
}

impl std::fmt::Debug for AppContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let modules: Vec<String> = self.modules.iter().map(|m| m.metadata().base_name).collect();
        f.debug_struct("AppContext")
            .field("modules", &modules)
            .field("ui", &self.ui)
            .finish_non_exhaustive()
    }
}

impl AppContext {
    /// Wires the modules together.
    ///
    /// ## Errors
    /// `ModuleError` when a dependency is missing; anything a module's
    /// init or extension hook returns.
    pub fn bootstrap(
        modules: Vec<Box<dyn Module>>,
        config: ConfigState,
        dialogs: Box<dyn PrintDialogs + Send>,
        backend: Box<dyn PrintBackend + Send>,
    ) -> AppResult<Self> {
        let metadata: Vec<_> = modules.iter().map(|m| m.metadata()).collect();

        config.write(|c| {
            for meta in &metadata {
                for (section, entries) in &meta.config_defaults {
                    c.register_defaults(section, entries.iter().cloned());
                }
            }
        });

        for meta in &metadata {
            for dependency in &meta.dependencies {
                if !metadata.iter().any(|m| &m.base_name == dependency) {
                    return Err(AppError::new(
                        ErrorCode::ModuleError,
                        format!("Module '{}' requires '{}'", meta.base_name, dependency),
                    ));
                }
            }
        }

        let actions = modules.iter().flat_map(|m| m.actions()).collect();
        let menu = Arc::new(Menu::build(modules.iter().map(|m| m.menu()), actions));

        let services = Services::new(config, dialogs, backend);
        for (module, meta) in modules.iter().zip(&metadata) {
            debug!(module = %meta.base_name, version = %meta.version, "Initializing module");
            module.init(&services)?;
        }

        let mut ui = UiHandler::new(services.clone(), Arc::clone(&menu));
        ui.init();
        for module in &modules {
            module.extend_main_window(&mut ui)?;
        }
        ui.set_wizard_pages(
            modules
                .iter()
                .filter_map(|m| m.first_run_wizard_pages())
                .collect(),
        );

        info!(modules = modules.len(), "Application bootstrapped");
        Ok(AppContext {
            services,
            modules,
            menu,
            ui,
        })
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn menu(&self) -> &Menu {
        &self.menu
    }

    pub fn ui(&self) -> &UiHandler {
        &self.ui
    }

    pub fn ui_mut(&mut self) -> &mut UiHandler {
        &mut self.ui
    }

    /// Base names of the loaded modules, in load order.
    pub fn module_names(&self) -> Vec<String> {
        self.modules.iter().map(|m| m.metadata().base_name).collect()
    }

    /// Starts the UI. See [`UiHandler::start`].
    pub fn start(&mut self) -> AppResult<bool> {
        self.ui.start()
    }

    /// Closes the first-time wizard.
    ///
    /// Accepted: first run is marked complete, the config saved and the
    /// next window shown. Rejected: exit is requested.
    pub fn finish_wizard(&mut self, accepted: bool) -> AppResult<()> {
        let wizard = self
            .ui
            .current_mut::<FirstTimeWizard>()
            .ok_or_else(|| AppError::internal("First-time wizard is not showing"))?;

        if !accepted {
            wizard.reject();
            self.services.events.send(WIZARD_SENDER, Event::Exit);
            return Ok(());
        }

        wizard.accept();
        self.services.config.write(Config::complete_first_run);
        self.services.config.save()?;
        self.ui.show_next()
    }

    pub fn should_terminate(&self) -> bool {
        self.services.terminate.is_requested()
    }

    /// Config pages of every module, in module order.
    pub fn config_pages(&self) -> AppResult<Vec<Box<dyn ConfigPage>>> {
        let mut pages = Vec::new();
        for module in &self.modules {
            pages.extend(module.config_pages(&self.services)?);
        }
        Ok(pages)
    }

    /// Writes every page back and saves the config.
    pub fn apply_config_pages(&self, pages: &mut [Box<dyn ConfigPage>]) -> AppResult<()> {
        for page in pages.iter_mut() {
            page.update()?;
        }
        self.services.config.save()
    }

    /// Closes the window in front and saves the config.
    ///
    /// Nothing is saved while the first run is unfinished, so a rejected
    /// wizard leaves the store empty and shows again on the next launch.
    pub fn shutdown(&mut self) -> AppResult<()> {
        self.ui.close()?;
        if self.services.config.read(Config::is_first_run) {
            info!("First run not completed, configuration not saved");
        } else {
            self.services.config.save()?;
        }
        info!("Application shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{HeadlessDialogs, TextFileBackend};
    use crate::events::Signal;
    use crate::module::{BaseModule, ModuleMetadata};
    use crate::shell::{
        Action, AppConfigPage, MainWindow, MainWindowExtension, MenuItem, MenuRoot, Page, ToolbarItem,
        Window, WizardPage, WizardPageCollection, WIZARD_TITLE,
    };
    use crate::state::{DbState, MemoryConfigStore};
    use coinbox_core::config::keys;
    use coinbox_core::ConfigHandle;
    use coinbox_db::{Database, DbConfig};
    use std::any::Any;
    use std::path::Path;
    use std::sync::Mutex;
    use tokio::runtime::Runtime;

    struct SalesPage;

    impl Page for SalesPage {
        fn name(&self) -> &str {
            "sales"
        }

        fn label(&self) -> &str {
            "Sales"
        }

        fn populate(&mut self) -> AppResult<()> {
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    type Log = Arc<Mutex<Vec<String>>>;

    fn record(log: &Log, name: &str, window: &MainWindow) {
        log.lock()
            .unwrap()
            .push(format!("{}:{}", name, window.tabs().len()));
    }

    struct X(Log);
    struct Y(Log);

    impl MainWindowExtension for X {
        fn name(&self) -> &str {
            "X"
        }

        fn attach(&mut self, window: &mut MainWindow) {
            record(&self.0, "X", window);
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    impl MainWindowExtension for Y {
        fn name(&self) -> &str {
            "Y"
        }

        fn attach(&mut self, window: &mut MainWindow) {
            record(&self.0, "Y", window);
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    /// A module with a page, a wizard collection and two extensions.
    struct SalesModule {
        log: Log,
        dependencies: Vec<String>,
    }

    impl SalesModule {
        fn new() -> Self {
            SalesModule {
                log: Arc::new(Mutex::new(Vec::new())),
                dependencies: vec!["base".to_string()],
            }
        }
    }

    impl Module for SalesModule {
        fn metadata(&self) -> ModuleMetadata {
            ModuleMetadata {
                base_name: "sales".to_string(),
                version: "0.1.0".to_string(),
                display_name: "Sales".to_string(),
                dependencies: self.dependencies.clone(),
                config_defaults: vec![],
            }
        }

        fn menu(&self) -> (Vec<MenuRoot>, Vec<MenuItem>) {
            let item = MenuItem::new("sales", "main", "Sales", |_| Box::new(SalesPage));
            (vec![], vec![item])
        }

        fn first_run_wizard_pages(&self) -> Option<WizardPageCollection> {
            Some(WizardPageCollection::new(vec![WizardPage::new("Currency")]))
        }

        fn extend_main_window(&self, ui: &mut UiHandler) -> AppResult<()> {
            ui.extend_default_main_window(Box::new(X(Arc::clone(&self.log))))?;
            ui.extend_default_main_window(Box::new(Y(Arc::clone(&self.log))))?;
            Ok(())
        }

        fn init(&self, services: &Services) -> AppResult<()> {
            services.events.send(
                "sales",
                Event::PrintingRegisterFunction {
                    function: "receipt".to_string(),
                },
            );
            Ok(())
        }
    }

    fn first_run_config() -> (ConfigState, Arc<MemoryConfigStore>) {
        let handle = ConfigHandle::default();
        handle.write(|c| c.load_entries(Vec::new()));
        let store = Arc::new(MemoryConfigStore::default());
        (ConfigState::new(handle, store.clone()), store)
    }

    fn bootstrap(modules: Vec<Box<dyn Module>>, config: ConfigState) -> AppResult<AppContext> {
        AppContext::bootstrap(
            modules,
            config,
            Box::new(HeadlessDialogs),
            Box::new(TextFileBackend::new(std::env::temp_dir())),
        )
    }

    #[test]
    fn test_missing_dependency() {
        let (config, _) = first_run_config();
        let err = bootstrap(vec![Box::new(SalesModule::new())], config).unwrap_err();
        assert_eq!(err.code, ErrorCode::ModuleError);
        assert!(err.message.contains("'base'"));
    }

    #[test]
    fn test_bootstrap_registers_defaults_and_runs_init() {
        let (config, _) = first_run_config();
        let ctx = bootstrap(
            vec![Box::new(BaseModule), Box::new(SalesModule::new())],
            config,
        )
        .unwrap();

        assert_eq!(ctx.module_names(), vec!["base", "sales"]);
        assert_eq!(
            ctx.services().config.read(|c| c.get_i64(keys::MENU, keys::TOOLBAR_STYLE)),
            Some(0)
        );
        // init of "sales" ran after base subscribed
        assert_eq!(
            ctx.services().printing.lock().function_names(),
            vec!["receipt"]
        );
        assert_eq!(ctx.menu().root("main").unwrap().children.len(), 1);
        assert_eq!(ctx.menu().actions().len(), 1);
    }

    #[test]
    fn test_first_run_wizard_then_main_window() {
        let (config, store) = first_run_config();
        let sales = SalesModule::new();
        let log = Arc::clone(&sales.log);
        let mut ctx = bootstrap(vec![Box::new(BaseModule), Box::new(sales)], config).unwrap();

        assert!(ctx.start().unwrap());
        let wizard = ctx.ui().current::<FirstTimeWizard>().unwrap();
        assert_eq!(wizard.title(), WIZARD_TITLE);
        assert_eq!(wizard.pages().len(), 2);
        assert!(log.lock().unwrap().is_empty());

        ctx.finish_wizard(true).unwrap();
        assert!(!ctx.services().config.read(Config::is_first_run));
        assert!(store.saves() >= 1);

        let main = ctx.ui().current::<MainWindow>().unwrap();
        assert_eq!(*log.lock().unwrap(), vec!["X:0", "Y:0"]);
        assert!(main.has_extension::<X>());
        assert!(main.has_extension::<Y>());
        assert_eq!(main.extension::<Y>().map(|y| y.name()), Some("Y"));
        assert_eq!(main.tabs()[0].name, "main");
    }

    #[test]
    fn test_rejected_wizard_requests_exit() {
        let (config, store) = first_run_config();
        let mut ctx = bootstrap(
            vec![Box::new(BaseModule), Box::new(SalesModule::new())],
            config,
        )
        .unwrap();
        ctx.start().unwrap();

        ctx.finish_wizard(false).unwrap();
        assert!(ctx.should_terminate());
        assert!(ctx.services().config.read(Config::is_first_run));

        ctx.shutdown().unwrap();
        assert_eq!(store.saves(), 0);
    }

    /// Opens the database at `path` and loads its config, as the binary does.
    fn launch(runtime: &Runtime, path: &Path) -> (DbState, ConfigState) {
        let db = runtime.block_on(Database::new(DbConfig::new(path))).unwrap();
        let state = DbState::new(db, runtime.handle().clone());
        let handle = ConfigHandle::default();
        state
            .block_on(state.inner().config().load_into(&handle))
            .unwrap();
        let config = ConfigState::new(handle, Arc::new(state.clone()));
        (state, config)
    }

    fn modules() -> Vec<Box<dyn Module>> {
        vec![Box::new(BaseModule), Box::new(SalesModule::new())]
    }

    #[test]
    fn test_rejected_wizard_shows_again_after_restart() {
        let runtime = Runtime::new().unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("coinbox.db");

        // first launch: rejected
        let (state, config) = launch(&runtime, &path);
        assert!(config.read(Config::is_first_run));
        let mut ctx = bootstrap(modules(), config).unwrap();
        ctx.start().unwrap();
        ctx.finish_wizard(false).unwrap();
        ctx.shutdown().unwrap();
        let rows = state.block_on(state.inner().config().load()).unwrap();
        assert!(rows.is_empty());
        state.block_on(state.inner().close());

        // second launch: wizard again, accepted
        let (state, config) = launch(&runtime, &path);
        assert!(config.read(Config::is_first_run));
        let mut ctx = bootstrap(modules(), config).unwrap();
        ctx.start().unwrap();
        assert!(ctx.ui().current::<FirstTimeWizard>().is_some());
        ctx.finish_wizard(true).unwrap();
        ctx.shutdown().unwrap();
        state.block_on(state.inner().close());

        // third launch: straight to the main window
        let (_state, config) = launch(&runtime, &path);
        assert!(!config.read(Config::is_first_run));
        assert_eq!(
            config.read(|c| c.get_i64(keys::PRINTING, "f.receipt")),
            Some(-1)
        );
        let mut ctx = bootstrap(modules(), config).unwrap();
        ctx.start().unwrap();
        assert!(ctx.ui().current::<MainWindow>().is_some());
    }

    #[test]
    fn test_quit_toolbar_action_terminates() {
        let (config, _) = first_run_config();
        config.write(Config::complete_first_run);
        let mut ctx = bootstrap(vec![Box::new(BaseModule)], config).unwrap();
        ctx.start().unwrap();

        let main = ctx.ui_mut().main_window_mut().unwrap();
        assert_eq!(
            main.toolbar().items[0],
            ToolbarItem::Action(
                Action::new("quit", "Exit", Signal::Exit)
                    .icon("images/cancel.png")
                    .shortcut("Ctrl+Q")
            )
        );
        main.trigger_toolbar(0).unwrap();
        assert!(ctx.should_terminate());
    }

    #[test]
    fn test_config_pages_apply_and_save() {
        let (config, store) = first_run_config();
        let ctx = bootstrap(vec![Box::new(BaseModule)], config).unwrap();

        let mut pages = ctx.config_pages().unwrap();
        for page in pages.iter_mut() {
            page.populate().unwrap();
        }
        pages[0]
            .as_any_mut()
            .downcast_mut::<AppConfigPage>()
            .unwrap()
            .fullscreen = true;
        ctx.apply_config_pages(&mut pages).unwrap();

        assert!(ctx.services().config.read(Config::fullscreen));
        assert!(store.saves() >= 1);
        assert!(!ctx.services().config.read(Config::has_pending_changes));
    }
}
