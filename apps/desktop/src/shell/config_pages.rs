//! # Config Pages
//!
//! Pages of the configuration dialog contributed by the base module.
//!
//! ```text
//! ┌──────────────┬───────────────────────────────────────────────┐
//! │ Application  │ app.fullscreen                                │
//! │ Menu         │ menu.show_disabled_items, show_empty_root_    │
//! │              │ items, show_tab_bar, toolbar_style            │
//! │ Locale       │ locale.localedir, languages, fallback, codeset│
//! │ Printing     │ printer profiles (FormPage) and function      │
//! │              │ bindings under printing.*                     │
//! └──────────────┴───────────────────────────────────────────────┘
//! ```
//!
//! `populate` copies config values into the controls, `update` writes them
//! back. The dialog saves the config once every page was updated.

use std::any::Any;
use std::fmt;

use coinbox_core::config::{LocaleSettings, MenuSettings, ToolbarStyle};
use coinbox_core::form::{FieldValue, FormPage};
use coinbox_core::printing::PrinterFormController;
use tracing::debug;

use crate::error::AppResult;
use crate::state::{ConfigState, PrintingState};

/// A page of the configuration dialog.
pub trait ConfigPage {
    fn label(&self) -> &str;

    fn populate(&mut self) -> AppResult<()>;

    fn update(&mut self) -> AppResult<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// =============================================================================
// Application
// =============================================================================

#[derive(Debug)]
pub struct AppConfigPage {
    config: ConfigState,
    /// "Open in fullscreen"
    pub fullscreen: bool,
}

impl AppConfigPage {
    pub fn new(config: ConfigState) -> Self {
        AppConfigPage {
            config,
            fullscreen: false,
        }
    }
}

impl ConfigPage for AppConfigPage {
    fn label(&self) -> &str {
        "Application"
    }

    fn populate(&mut self) -> AppResult<()> {
        self.fullscreen = self.config.read(|c| c.fullscreen());
        Ok(())
    }

    fn update(&mut self) -> AppResult<()> {
        let fullscreen = self.fullscreen;
        self.config.write(|c| c.set_fullscreen(fullscreen));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// Menu
// =============================================================================

#[derive(Debug)]
pub struct MenuConfigPage {
    config: ConfigState,
    pub show_disabled_items: bool,
    pub show_empty_root_items: bool,
    pub show_tab_bar: bool,
    /// Index into [`ToolbarStyle::ALL`].
    pub toolbar_style: usize,
}

impl MenuConfigPage {
    pub fn new(config: ConfigState) -> Self {
        MenuConfigPage {
            config,
            show_disabled_items: false,
            show_empty_root_items: false,
            show_tab_bar: false,
            toolbar_style: 0,
        }
    }

    /// Choices of the toolbar style combo box.
    pub fn toolbar_styles(&self) -> Vec<&'static str> {
        ToolbarStyle::ALL.iter().map(|s| s.label()).collect()
    }
}

impl ConfigPage for MenuConfigPage {
    fn label(&self) -> &str {
        "Menu"
    }

    fn populate(&mut self) -> AppResult<()> {
        let settings = self.config.read(|c| c.menu_settings());
        self.show_disabled_items = settings.show_disabled_items;
        self.show_empty_root_items = settings.show_empty_root_items;
        self.show_tab_bar = settings.show_tab_bar;
        self.toolbar_style = ToolbarStyle::ALL
            .iter()
            .position(|s| *s == settings.toolbar_style)
            .unwrap_or(0);
        Ok(())
    }

    fn update(&mut self) -> AppResult<()> {
        let settings = MenuSettings {
            show_tab_bar: self.show_tab_bar,
            show_disabled_items: self.show_disabled_items,
            show_empty_root_items: self.show_empty_root_items,
            toolbar_style: ToolbarStyle::ALL
                .get(self.toolbar_style)
                .copied()
                .unwrap_or_default(),
        };
        self.config.write(|c| c.set_menu_settings(settings));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// Locale
// =============================================================================

#[derive(Debug)]
pub struct LocaleConfigPage {
    config: ConfigState,
    pub localedir: String,
    /// Comma-separated, by order of preference (e.g. `en-US,en-UK`).
    pub languages: String,
    pub fallback: bool,
    pub codeset: String,
}

impl LocaleConfigPage {
    pub fn new(config: ConfigState) -> Self {
        LocaleConfigPage {
            config,
            localedir: String::new(),
            languages: String::new(),
            fallback: false,
            codeset: String::new(),
        }
    }
}

impl ConfigPage for LocaleConfigPage {
    fn label(&self) -> &str {
        "Locale"
    }

    fn populate(&mut self) -> AppResult<()> {
        let settings = self.config.read(|c| c.locale_settings());
        self.localedir = settings.localedir;
        self.languages = settings.languages.join(",");
        self.fallback = settings.fallback;
        self.codeset = settings.codeset;
        Ok(())
    }

    fn update(&mut self) -> AppResult<()> {
        let settings = LocaleSettings {
            localedir: self.localedir.trim().to_string(),
            languages: self
                .languages
                .split(',')
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect(),
            fallback: self.fallback,
            codeset: self.codeset.trim().to_string(),
        };
        self.config.write(|c| c.set_locale_settings(&settings));
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

// =============================================================================
// Printing
// =============================================================================

/// Printer profiles as a master-detail form.
///
/// Profile edits go to the config as soon as the form saves; `update`
/// persists them.
pub struct PrintingConfigPage {
    config: ConfigState,
    form: FormPage<PrinterFormController>,
}

impl fmt::Debug for PrintingConfigPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrintingConfigPage")
            .field("rows", &self.form.rows())
            .field("mode", &self.form.mode())
            .finish_non_exhaustive()
    }
}

impl PrintingConfigPage {
    pub fn new(config: ConfigState, printing: &PrintingState) -> AppResult<Self> {
        let form = FormPage::new(printing.form_controller())?;
        Ok(PrintingConfigPage { config, form })
    }

    pub fn form(&self) -> &FormPage<PrinterFormController> {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut FormPage<PrinterFormController> {
        &mut self.form
    }

    /// The "Set up" button: runs the printer dialogs and fills the
    /// `printer` and `info` controls.
    ///
    /// ## Returns
    /// `false` when the user cancelled the dialogs.
    pub fn set_up_printer(&mut self) -> AppResult<bool> {
        let name = self
            .form
            .control("name")
            .and_then(FieldValue::as_text)
            .filter(|n| !n.is_empty())
            .unwrap_or("printer")
            .to_string();
        let current = self.form.control("printer").and_then(FieldValue::as_record).cloned();

        let Some(value) = self.form.controller().setup(&name, current.as_ref())? else {
            debug!(printer = %name, "Printer setup cancelled");
            return Ok(false);
        };

        let info = self.form.controller().describe(&value);
        self.form.set_control("printer", value)?;
        self.form.set_control("info", FieldValue::Text(info))?;
        Ok(true)
    }
}

impl ConfigPage for PrintingConfigPage {
    fn label(&self) -> &str {
        "Printing"
    }

    fn populate(&mut self) -> AppResult<()> {
        self.form.populate()?;
        Ok(())
    }

    fn update(&mut self) -> AppResult<()> {
        self.config.save()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Services;
    use coinbox_core::config::keys;
    use coinbox_core::Config;

    #[test]
    fn test_app_page_round_trip() {
        let services = Services::in_memory();
        let mut page = AppConfigPage::new(services.config.clone());

        page.populate().unwrap();
        assert!(!page.fullscreen);
        page.fullscreen = true;
        page.update().unwrap();
        assert!(services.config.read(Config::fullscreen));
    }

    #[test]
    fn test_menu_page_invalid_style_falls_back() {
        let services = Services::in_memory();
        services.config.write(|c| {
            c.set(keys::MENU, keys::TOOLBAR_STYLE, "sideways");
            c.set(keys::MENU, keys::SHOW_TAB_BAR, true);
        });
        let mut page = MenuConfigPage::new(services.config.clone());

        page.populate().unwrap();
        assert_eq!(page.toolbar_style, 0);
        assert!(page.show_tab_bar);
        assert_eq!(page.toolbar_styles().len(), 5);

        page.toolbar_style = 3;
        page.show_disabled_items = true;
        page.update().unwrap();

        let settings = services.config.read(|c| c.menu_settings());
        assert_eq!(settings.toolbar_style, ToolbarStyle::TextBesideIcon);
        assert!(settings.show_disabled_items);
    }

    #[test]
    fn test_locale_page_splits_languages() {
        let services = Services::in_memory();
        let mut page = LocaleConfigPage::new(services.config.clone());

        page.populate().unwrap();
        page.localedir = "/usr/share/locale".to_string();
        page.languages = "en-US, en-UK,,fr".to_string();
        page.fallback = true;
        page.codeset = "UTF-8".to_string();
        page.update().unwrap();

        let settings = services.config.read(|c| c.locale_settings());
        assert_eq!(settings.languages, vec!["en-US", "en-UK", "fr"]);

        let mut reloaded = LocaleConfigPage::new(services.config.clone());
        reloaded.populate().unwrap();
        assert_eq!(reloaded.languages, "en-US,en-UK,fr");
        assert_eq!(reloaded.codeset, "UTF-8");
        assert!(reloaded.fallback);
    }

    #[test]
    fn test_printing_page_creates_profile() {
        let services = Services::in_memory();
        services.printing.register_function("receipt").unwrap();
        let mut page = PrintingConfigPage::new(services.config.clone(), &services.printing).unwrap();

        page.form_mut().new_item().unwrap();
        page.form_mut()
            .set_control("name", FieldValue::text("kitchen"))
            .unwrap();
        assert!(page.set_up_printer().unwrap());
        assert!(!page
            .form()
            .control("info")
            .and_then(FieldValue::as_text)
            .unwrap_or_default()
            .is_empty());
        page.form_mut()
            .set_control(
                "functions",
                FieldValue::Selection {
                    options: vec!["receipt".to_string()],
                    selected: vec!["receipt".to_string()],
                },
            )
            .unwrap();
        page.form_mut().save().unwrap();
        page.update().unwrap();

        assert_eq!(page.form().rows(), vec!["kitchen"]);
        let printer = services
            .printing
            .lock()
            .get_function_printer("receipt")
            .unwrap()
            .unwrap();
        assert_eq!(printer.name, "kitchen");
        assert!(!services.config.read(Config::has_pending_changes));
    }
}
