//! # UI Handler
//!
//! Owns the window lifecycle: a chain of windows to show before the main
//! window, and the main window itself, composed once with the extensions
//! other modules registered.
//!
//! ## States
//! ```text
//!   Uninitialized ──init()──► Initialized ──start()──► Started
//!                                  │                      │
//!                        chain_window() allowed   replace_window() allowed
//!                        extend_default_main_window() allowed until the
//!                        main window is first shown
//! ```
//!
//! ## Window Chain
//! ```text
//!   BTreeMap<priority, VecDeque<window>>
//!     0x0F  [wizard]
//!     0x70  [login, notice]        FIFO inside a priority
//!   show_next(): pop lowest ─► ... ─► main window (every later call)
//! ```

use std::any::Any;
use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;

use coinbox_core::Config;
use tracing::{debug, info, warn};

use super::menu::Menu;
use super::window::{MainWindow, MainWindowExtension};
use super::wizard::{FirstTimeWizard, WizardPageCollection};
use crate::context::Services;
use crate::error::{AppResult, ShellError};

// =============================================================================
// Windows
// =============================================================================

/// How a window is presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presentation {
    Normal,
    FullScreen,
}

impl Presentation {
    /// Presentation from `app.fullscreen`.
    pub fn from_config(config: &Config) -> Self {
        if config.fullscreen() {
            Presentation::FullScreen
        } else {
            Presentation::Normal
        }
    }
}

/// A top-level window.
pub trait Window: Any {
    fn title(&self) -> String;

    fn show(&mut self, presentation: Presentation) -> AppResult<()>;

    fn close(&mut self) -> AppResult<()>;

    /// `None` while hidden.
    fn presentation(&self) -> Option<Presentation>;

    fn is_visible(&self) -> bool {
        self.presentation().is_some()
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

// =============================================================================
// Priorities
// =============================================================================

pub const PRIORITY_MIN: u8 = 0x00;
pub const PRIORITY_FIRST_HIGHEST: u8 = 0x0F;
pub const PRIORITY_FIRST_HIGH: u8 = 0x60;
pub const PRIORITY_FIRST_MEDIUM: u8 = 0x67;
pub const PRIORITY_FIRST_LOW: u8 = 0x6F;
pub const PRIORITY_FIRST: u8 = PRIORITY_FIRST_LOW;
pub const PRIORITY_NONE: u8 = 0x70;
pub const PRIORITY_LAST: u8 = 0x80;
pub const PRIORITY_LAST_LOW: u8 = PRIORITY_LAST;
pub const PRIORITY_LAST_MEDIUM: u8 = 0x87;
pub const PRIORITY_LAST_HIGH: u8 = 0x8F;
pub const PRIORITY_LAST_HIGHEST: u8 = 0xF0;
pub const PRIORITY_MAX: u8 = 0xFF;

// =============================================================================
// UI Handler
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiState {
    Uninitialized,
    Initialized,
    Started,
}

/// Which window is in front.
enum Active {
    None,
    Chained(Box<dyn Window>),
    Main,
}

pub struct UiHandler {
    state: UiState,
    load: bool,
    services: Services,
    menu: Arc<Menu>,
    chain: BTreeMap<u8, VecDeque<Box<dyn Window>>>,
    active: Active,
    extensions: Vec<Box<dyn MainWindowExtension>>,
    main_window: Option<MainWindow>,
    wizard_pages: Vec<WizardPageCollection>,
}

impl fmt::Debug for UiHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UiHandler")
            .field("state", &self.state)
            .field("load", &self.load)
            .field("chained", &self.chained_count())
            .field("composed", &self.main_window.is_some())
            .finish_non_exhaustive()
    }
}

impl UiHandler {
    pub fn new(services: Services, menu: Arc<Menu>) -> Self {
        UiHandler {
            state: UiState::Uninitialized,
            load: true,
            services,
            menu,
            chain: BTreeMap::new(),
            active: Active::None,
            extensions: Vec::new(),
            main_window: None,
            wizard_pages: Vec::new(),
        }
    }

    pub fn state(&self) -> UiState {
        self.state
    }

    pub fn init(&mut self) {
        if self.state != UiState::Uninitialized {
            warn!(state = ?self.state, "UI handler already initialized");
            return;
        }
        self.state = UiState::Initialized;
        debug!("UI handler initialized");
    }

    /// Disables (or re-enables) showing any window on `start`.
    pub fn set_load(&mut self, load: bool) {
        self.load = load;
    }

    pub fn set_wizard_pages(&mut self, pages: Vec<WizardPageCollection>) {
        self.wizard_pages = pages;
    }

    /// Shows the first window.
    ///
    /// On first run the wizard is chained ahead of everything else.
    ///
    /// ## Returns
    /// `false` without showing anything when not initialized or when
    /// loading was disabled.
    pub fn start(&mut self) -> AppResult<bool> {
        if self.state != UiState::Initialized || !self.load {
            info!(state = ?self.state, load = self.load, "Not starting UI");
            return Ok(false);
        }

        if self.services.config.read(Config::is_first_run) {
            let wizard = FirstTimeWizard::new(std::mem::take(&mut self.wizard_pages));
            self.chain_window(Box::new(wizard), PRIORITY_FIRST_HIGHEST)?;
        }

        self.state = UiState::Started;
        info!(chained = self.chained_count(), "Starting UI");
        self.show_next()?;
        Ok(true)
    }

    /// Queues a window to show before the main window.
    ///
    /// ## Errors
    /// `AlreadyStarted` after `start`.
    pub fn chain_window(&mut self, window: Box<dyn Window>, priority: u8) -> Result<(), ShellError> {
        if self.state == UiState::Started {
            return Err(ShellError::AlreadyStarted);
        }
        debug!(window = %window.title(), priority, "Chained window");
        self.chain.entry(priority).or_default().push_back(window);
        Ok(())
    }

    pub fn chained_count(&self) -> usize {
        self.chain.values().map(VecDeque::len).sum()
    }

    /// Shows the next chained window, or the main window once the chain is
    /// empty. Calling again after that keeps showing the main window.
    pub fn show_next(&mut self) -> AppResult<()> {
        let presentation = self.services.config.read(Presentation::from_config);

        // The next window stays queued until the one in front is closed.
        if !self.chain.is_empty() || !matches!(self.active, Active::Main) {
            self.close_active()?;
        }

        let next = self.chain.first_entry().and_then(|mut entry| {
            let window = entry.get_mut().pop_front();
            if entry.get().is_empty() {
                entry.remove();
            }
            window
        });

        match next {
            Some(mut window) => {
                debug!(window = %window.title(), "Showing chained window");
                window.show(presentation)?;
                self.active = Active::Chained(window);
            }
            None => {
                let main = self.compose_main_window()?;
                main.show(presentation)?;
                self.active = Active::Main;
            }
        }
        Ok(())
    }

    /// Replaces the window in front.
    ///
    /// ## Errors
    /// `NotStarted` before `start`.
    pub fn replace_window(&mut self, mut window: Box<dyn Window>) -> AppResult<()> {
        if self.state != UiState::Started {
            return Err(ShellError::NotStarted.into());
        }
        let presentation = self.services.config.read(Presentation::from_config);

        self.close_active()?;
        window.show(presentation)?;
        self.active = Active::Chained(window);
        Ok(())
    }

    /// Registers an extension for the main window.
    ///
    /// ## Errors
    /// `ExtensionsComposed` once the main window was built.
    pub fn extend_default_main_window(
        &mut self,
        extension: Box<dyn MainWindowExtension>,
    ) -> Result<(), ShellError> {
        if self.main_window.is_some() {
            return Err(ShellError::ExtensionsComposed(extension.name().to_string()));
        }
        debug!(extension = %extension.name(), "Registered main window extension");
        self.extensions.push(extension);
        Ok(())
    }

    /// Composes the main window on first use. The extensions are attached
    /// before any page is populated, so a failing page keeps them.
    fn compose_main_window(&mut self) -> AppResult<&mut MainWindow> {
        let (services, menu, extensions) = (&self.services, &self.menu, &mut self.extensions);
        let window = self
            .main_window
            .get_or_insert_with(|| MainWindow::compose(services, menu, std::mem::take(extensions)));
        if window.current_tab().is_none() {
            window.show_initial_tab()?;
        }
        Ok(window)
    }

    /// Closes the window in front. On failure it stays in front.
    fn close_active(&mut self) -> AppResult<()> {
        match &mut self.active {
            Active::None => {}
            Active::Chained(window) => window.close()?,
            Active::Main => {
                if let Some(main) = self.main_window.as_mut() {
                    main.close()?;
                }
            }
        }
        self.active = Active::None;
        Ok(())
    }

    /// The main window, once composed.
    pub fn main_window(&self) -> Option<&MainWindow> {
        self.main_window.as_ref()
    }

    pub fn main_window_mut(&mut self) -> Option<&mut MainWindow> {
        self.main_window.as_mut()
    }

    /// The window in front.
    pub fn current_window(&self) -> Option<&dyn Window> {
        match &self.active {
            Active::None => None,
            Active::Chained(window) => Some(window.as_ref()),
            Active::Main => self.main_window.as_ref().map(|w| w as &dyn Window),
        }
    }

    pub fn current_window_mut(&mut self) -> Option<&mut dyn Window> {
        match &mut self.active {
            Active::None => None,
            Active::Chained(window) => Some(window.as_mut()),
            Active::Main => self.main_window.as_mut().map(|w| w as &mut dyn Window),
        }
    }

    /// The window in front, as its concrete type.
    pub fn current<T: Window>(&self) -> Option<&T> {
        self.current_window()?.as_any().downcast_ref::<T>()
    }

    pub fn current_mut<T: Window>(&mut self) -> Option<&mut T> {
        self.current_window_mut()?.as_any_mut().downcast_mut::<T>()
    }

    /// Closes the window in front.
    pub fn close(&mut self) -> AppResult<()> {
        self.close_active()
    }
}
