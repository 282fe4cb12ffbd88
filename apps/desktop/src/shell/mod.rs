//! # Shell
//!
//! View models of the application's windows. No toolkit is involved: each
//! type holds the state a renderer would draw and exposes the user's
//! actions as methods.
//!
//! ```text
//! UiHandler ─┬─ chained windows (FirstTimeWizard, ...)
//!            └─ MainWindow ─┬─ Toolbar (actions, tab buttons)
//!                           ├─ Tab ── BasePage ── dyn Page
//!                           └─ extensions
//! ```

mod config_pages;
mod menu;
mod page;
mod ui;
mod window;
mod wizard;

pub use config_pages::{
    AppConfigPage, ConfigPage, LocaleConfigPage, MenuConfigPage, PrintingConfigPage,
};
pub use menu::{Action, Menu, MenuItem, MenuRoot, PageFactory};
pub use page::{BasePage, Page};
pub use ui::{
    Presentation, UiHandler, UiState, Window, PRIORITY_FIRST, PRIORITY_FIRST_HIGH,
    PRIORITY_FIRST_HIGHEST, PRIORITY_FIRST_LOW, PRIORITY_FIRST_MEDIUM, PRIORITY_LAST,
    PRIORITY_LAST_HIGH, PRIORITY_LAST_HIGHEST, PRIORITY_LAST_LOW, PRIORITY_LAST_MEDIUM,
    PRIORITY_MAX, PRIORITY_MIN, PRIORITY_NONE,
};
pub use window::{
    Geometry, MainWindow, MainWindowExtension, Tab, TabContent, Toolbar, ToolbarItem,
    MAIN_WINDOW_SENDER, TOOLBAR_ICON_SIZE,
};
pub use wizard::{
    FirstTimeWizard, WizardPage, WizardPageCollection, WizardResult, WELCOME_TITLE, WIZARD_TITLE,
};
