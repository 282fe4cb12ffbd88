//! # Main Window
//!
//! View model of the application window: toolbar, one tab per menu root,
//! and the extensions other modules attached to it.
//!
//! ## Construction
//! ```text
//! MainWindow::build
//!   1. title "Coinbox", status "Coinbox POS is ready."
//!   2. toolbar: icon size 48, style from menu.toolbar_style
//!   3. extensions: attach hooks in registration order
//!   4. toolbar actions from every module
//!   5. restore mainwindow.state / mainwindow.geometry
//!   6. tabs from the menu
//!        root disabled            → skipped unless show_disabled_items
//!        children                 → disabled ones dropped unless show_disabled_items
//!        no children              → skipped unless show_empty_root_items,
//!                                   else a disabled empty tab
//!        one child                → the page itself
//!        many children            → nested tab group
//!      menu.show_tab_bar = false  → separator + one toolbar button per tab
//!   7. show the restored tab, or the first one (populates its page)
//! ```
//!
//! Steps 1-6 are `MainWindow::compose` and cannot fail; step 7 is
//! `show_initial_tab` and can be retried.

use std::any::Any;
use std::fmt;

use coinbox_core::config::ToolbarStyle;
use coinbox_core::{APP_NAME, READY_MESSAGE};
use tracing::{debug, info, warn};

use super::menu::{Action, Menu, MenuItem, MenuRoot};
use super::page::BasePage;
use super::ui::{Presentation, Window};
use crate::context::Services;
use crate::error::{AppResult, ShellError};
use crate::events::Event;

pub const TOOLBAR_ICON_SIZE: u32 = 48;

/// Sender name used for toolbar actions.
pub const MAIN_WINDOW_SENDER: &str = "mainwindow";

// =============================================================================
// Extensions
// =============================================================================

/// Behaviour or state another module adds to the main window.
pub trait MainWindowExtension: Any {
    fn name(&self) -> &str;

    /// Runs while the window is being built.
    fn attach(&mut self, _window: &mut MainWindow) {}

    fn as_any(&self) -> &dyn Any;
}

// =============================================================================
// Geometry
// =============================================================================

/// Window position and size, stored as `"x,y,width,height"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Geometry {
            x: 0,
            y: 0,
            width: 800,
            height: 600,
        }
    }
}

impl Geometry {
    pub fn parse(value: &str) -> Option<Self> {
        let parts: Vec<&str> = value.split(',').map(str::trim).collect();
        if parts.len() != 4 {
            return None;
        }
        Some(Geometry {
            x: parts[0].parse().ok()?,
            y: parts[1].parse().ok()?,
            width: parts[2].parse().ok()?,
            height: parts[3].parse().ok()?,
        })
    }
}

impl fmt::Display for Geometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{},{},{}", self.x, self.y, self.width, self.height)
    }
}

// =============================================================================
// Toolbar and Tabs
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolbarItem {
    Action(Action),
    Separator,
    /// Switches to a tab when the tab bar is hidden.
    TabButton {
        label: String,
        icon: Option<String>,
        tab: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolbar {
    pub icon_size: u32,
    pub style: ToolbarStyle,
    pub items: Vec<ToolbarItem>,
}

#[derive(Debug)]
pub enum TabContent {
    /// Root without pages.
    Empty,
    Page(BasePage),
    Group { pages: Vec<BasePage>, current: usize },
}

/// One tab per menu root.
#[derive(Debug)]
pub struct Tab {
    pub name: String,
    pub label: String,
    pub icon: Option<String>,
    pub enabled: bool,
    pub content: TabContent,
}

impl Tab {
    fn from_root(services: &Services, root: &MenuRoot, children: Vec<&MenuItem>) -> Self {
        let mut pages: Vec<BasePage> = children
            .into_iter()
            .map(|item| BasePage::new((item.page)(services)))
            .collect();

        let (enabled, content) = match pages.len() {
            0 => (false, TabContent::Empty),
            1 => (root.enabled, TabContent::Page(pages.remove(0))),
            _ => (root.enabled, TabContent::Group { pages, current: 0 }),
        };

        Tab {
            name: root.name.clone(),
            label: root.label.clone(),
            icon: root.icon.clone(),
            enabled,
            content,
        }
    }

    /// The page currently visible in this tab.
    pub fn visible_page(&self) -> Option<&BasePage> {
        match &self.content {
            TabContent::Empty => None,
            TabContent::Page(page) => Some(page),
            TabContent::Group { pages, current } => pages.get(*current),
        }
    }

    fn shown(&mut self) -> AppResult<()> {
        match &mut self.content {
            TabContent::Empty => Ok(()),
            TabContent::Page(page) => page.shown(),
            TabContent::Group { pages, current } => match pages.get_mut(*current) {
                Some(page) => page.shown(),
                None => Ok(()),
            },
        }
    }
}

// =============================================================================
// Main Window
// =============================================================================

pub struct MainWindow {
    title: String,
    status: String,
    toolbar: Toolbar,
    tabs: Vec<Tab>,
    tab_bar_visible: bool,
    current_tab: Option<usize>,
    geometry: Geometry,
    state: Option<String>,
    extensions: Vec<Box<dyn MainWindowExtension>>,
    presentation: Option<Presentation>,
    services: Services,
}

impl fmt::Debug for MainWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let extensions: Vec<&str> = self.extensions.iter().map(|e| e.name()).collect();
        f.debug_struct("MainWindow")
            .field("title", &self.title)
            .field("tabs", &self.tabs.len())
            .field("current_tab", &self.current_tab)
            .field("geometry", &self.geometry)
            .field("extensions", &extensions)
            .finish_non_exhaustive()
    }
}

impl MainWindow {
    /// Builds the window with its extensions and shows the initial tab.
    ///
    /// ## Errors
    /// Propagates the first tab's populate failure.
    pub fn build(
        services: &Services,
        menu: &Menu,
        extensions: Vec<Box<dyn MainWindowExtension>>,
    ) -> AppResult<Self> {
        let mut window = Self::compose(services, menu, extensions);
        window.show_initial_tab()?;
        Ok(window)
    }

    /// Attaches the extensions, fills the toolbar, restores the saved state
    /// and lays out the tabs. No tab is shown yet.
    pub fn compose(
        services: &Services,
        menu: &Menu,
        extensions: Vec<Box<dyn MainWindowExtension>>,
    ) -> Self {
        let settings = services.config.read(|c| c.menu_settings());

        let mut window = MainWindow {
            title: APP_NAME.to_string(),
            status: READY_MESSAGE.to_string(),
            toolbar: Toolbar {
                icon_size: TOOLBAR_ICON_SIZE,
                style: settings.toolbar_style,
                items: Vec::new(),
            },
            tabs: Vec::new(),
            tab_bar_visible: true,
            current_tab: None,
            geometry: Geometry::default(),
            state: None,
            extensions: Vec::with_capacity(extensions.len()),
            presentation: None,
            services: services.clone(),
        };

        for mut extension in extensions {
            debug!(extension = %extension.name(), "Attaching main window extension");
            extension.attach(&mut window);
            window.extensions.push(extension);
        }

        window.toolbar.items.extend(
            menu.actions()
                .iter()
                .cloned()
                .map(ToolbarItem::Action),
        );

        let (state, geometry) = services.config.read(|c| c.window_state());
        window.geometry = geometry
            .as_deref()
            .and_then(Geometry::parse)
            .unwrap_or_default();
        window.state = state;

        window.load_menu(menu);

        info!(tabs = window.tabs.len(), extensions = window.extensions.len(), "Main window built");
        window
    }

    /// Shows the restored tab, or the first one.
    ///
    /// A failed populate leaves no tab current, so this can be called again.
    pub fn show_initial_tab(&mut self) -> AppResult<()> {
        let restored = self
            .state
            .as_deref()
            .and_then(parse_state)
            .filter(|i| *i < self.tabs.len());
        let initial = restored.or_else(|| (!self.tabs.is_empty()).then_some(0));
        match initial {
            Some(index) => self.set_current_tab(index),
            None => Ok(()),
        }
    }

    fn load_menu(&mut self, menu: &Menu) {
        let settings = self.services.config.read(|c| c.menu_settings());

        for root in menu.roots() {
            if !root.enabled && !settings.show_disabled_items {
                continue;
            }

            let children: Vec<&MenuItem> = root
                .children
                .iter()
                .filter(|item| item.enabled || settings.show_disabled_items)
                .collect();
            if children.is_empty() && !settings.show_empty_root_items {
                continue;
            }

            let tab = Tab::from_root(&self.services, root, children);
            self.tabs.push(tab);
        }

        self.tab_bar_visible = settings.show_tab_bar;
        if !self.tab_bar_visible {
            self.toolbar.items.push(ToolbarItem::Separator);
            for (index, tab) in self.tabs.iter().enumerate() {
                self.toolbar.items.push(ToolbarItem::TabButton {
                    label: tab.label.clone(),
                    icon: tab.icon.clone(),
                    tab: index,
                });
            }
        }
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab_bar_visible(&self) -> bool {
        self.tab_bar_visible
    }

    pub fn current_tab(&self) -> Option<usize> {
        self.current_tab
    }

    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    pub fn set_geometry(&mut self, geometry: Geometry) {
        self.geometry = geometry;
    }

    // -------------------------------------------------------------------------
    // Extensions
    // -------------------------------------------------------------------------

    /// The attached extension of type `T`.
    pub fn extension<T: MainWindowExtension>(&self) -> Option<&T> {
        self.extensions
            .iter()
            .find_map(|e| e.as_any().downcast_ref::<T>())
    }

    pub fn has_extension<T: MainWindowExtension>(&self) -> bool {
        self.extensions
            .iter()
            .any(|e| e.as_any().is::<T>())
    }

    pub fn extension_names(&self) -> Vec<&str> {
        self.extensions.iter().map(|e| e.name()).collect()
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Switches tabs; the tab's visible page receives "shown".
    pub fn set_current_tab(&mut self, index: usize) -> AppResult<()> {
        let tab = self
            .tabs
            .get_mut(index)
            .ok_or(ShellError::UnknownTab(index))?;
        tab.shown()?;
        self.current_tab = Some(index);
        Ok(())
    }

    /// Switches the nested tab of the current tab group.
    pub fn set_current_subtab(&mut self, index: usize) -> AppResult<()> {
        let tab_index = self.current_tab.ok_or(ShellError::UnknownTab(index))?;
        let tab = &mut self.tabs[tab_index];
        match &mut tab.content {
            TabContent::Group { pages, current } if index < pages.len() => {
                pages[index].shown()?;
                *current = index;
                Ok(())
            }
            _ => Err(ShellError::UnknownTab(index).into()),
        }
    }

    /// Activates a toolbar item.
    pub fn trigger_toolbar(&mut self, index: usize) -> AppResult<()> {
        match self.toolbar.items.get(index).cloned() {
            Some(ToolbarItem::Action(action)) => {
                match Event::bare(action.signal) {
                    Some(event) => {
                        debug!(action = %action.name, signal = %action.signal, "Toolbar action");
                        self.services.events.send(MAIN_WINDOW_SENDER, event);
                    }
                    None => warn!(action = %action.name, signal = %action.signal, "Signal needs arguments"),
                }
                Ok(())
            }
            Some(ToolbarItem::TabButton { tab, .. }) => self.set_current_tab(tab),
            Some(ToolbarItem::Separator) | None => Ok(()),
        }
    }

    fn state_blob(&self) -> String {
        match self.current_tab {
            Some(index) => format!("tab={}", index),
            None => String::new(),
        }
    }
}

fn parse_state(state: &str) -> Option<usize> {
    state.strip_prefix("tab=")?.parse().ok()
}

impl Window for MainWindow {
    fn title(&self) -> String {
        self.title.clone()
    }

    fn show(&mut self, presentation: Presentation) -> AppResult<()> {
        self.presentation = Some(presentation);
        Ok(())
    }

    /// Saves state and geometry to the config and persists it.
    fn close(&mut self) -> AppResult<()> {
        let state = self.state_blob();
        let geometry = self.geometry.to_string();
        self.services
            .config
            .write(|c| c.set_window_state(&state, &geometry));
        self.services.config.save()?;
        self.presentation = None;
        debug!(%geometry, "Main window closed");
        Ok(())
    }

    fn presentation(&self) -> Option<Presentation> {
        self.presentation
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
