//! # First-Time Wizard
//!
//! One onboarding window built from every module's wizard pages.
//!
//! ```text
//!   page 0      welcome ("Say hi to the wizard")
//!   page 1..    collections by priority (0x00 first, ties in module order),
//!               pages of a collection in their given order
//! ```
//!
//! The wizard only records how it ended; the application context marks the
//! first run complete (accepted) or requests exit (rejected).

use std::any::Any;

use tracing::{debug, info};

use super::ui::{Presentation, Window};
use crate::error::AppResult;

pub const WIZARD_TITLE: &str = "Coinbox First-Time Setup Wizard";
pub const WELCOME_TITLE: &str = "Say hi to the wizard";

/// One wizard page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardPage {
    pub title: String,
    pub subtitle: String,
    id: Option<usize>,
}

impl WizardPage {
    pub fn new(title: impl Into<String>) -> Self {
        WizardPage {
            title: title.into(),
            subtitle: String::new(),
            id: None,
        }
    }

    pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = subtitle.into();
        self
    }

    /// Position in the wizard, once added.
    pub fn id(&self) -> Option<usize> {
        self.id
    }
}

/// Pages one module adds to the wizard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WizardPageCollection {
    pub priority: u8,
    pub pages: Vec<WizardPage>,
}

impl WizardPageCollection {
    pub const PRIORITY_FIRST_HIGH: u8 = 0x00;
    pub const PRIORITY_FIRST_LOW: u8 = 0x0F;
    pub const PRIORITY_NONE: u8 = 0x88;
    pub const PRIORITY_LAST_LOW: u8 = 0xF0;
    pub const PRIORITY_LAST_HIGH: u8 = 0xFF;

    pub fn new(pages: Vec<WizardPage>) -> Self {
        WizardPageCollection {
            priority: Self::PRIORITY_NONE,
            pages,
        }
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }
}

/// How the wizard was closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardResult {
    Accepted,
    Rejected,
}

/// The first-run wizard window.
#[derive(Debug)]
pub struct FirstTimeWizard {
    pages: Vec<WizardPage>,
    current: usize,
    result: Option<WizardResult>,
    presentation: Option<Presentation>,
}

impl FirstTimeWizard {
    pub fn new(mut collections: Vec<WizardPageCollection>) -> Self {
        let mut pages = vec![WizardPage::new(WELCOME_TITLE)];

        // stable: equal priorities keep module order
        collections.sort_by_key(|c| c.priority);
        for collection in collections {
            pages.extend(collection.pages);
        }
        for (id, page) in pages.iter_mut().enumerate() {
            page.id = Some(id);
        }

        debug!(pages = pages.len(), "Wizard assembled");
        FirstTimeWizard {
            pages,
            current: 0,
            result: None,
            presentation: None,
        }
    }

    pub fn pages(&self) -> &[WizardPage] {
        &self.pages
    }

    pub fn current_page(&self) -> &WizardPage {
        &self.pages[self.current]
    }

    pub fn is_last_page(&self) -> bool {
        self.current + 1 == self.pages.len()
    }

    /// Moves forward. Returns false on the last page.
    pub fn next(&mut self) -> bool {
        if self.is_last_page() {
            return false;
        }
        self.current += 1;
        true
    }

    /// Moves back. Returns false on the first page.
    pub fn back(&mut self) -> bool {
        if self.current == 0 {
            return false;
        }
        self.current -= 1;
        true
    }

    pub fn accept(&mut self) {
        info!("First-time wizard accepted");
        self.finish(WizardResult::Accepted);
    }

    pub fn reject(&mut self) {
        info!("First-time wizard rejected");
        self.finish(WizardResult::Rejected);
    }

    fn finish(&mut self, result: WizardResult) {
        self.result = Some(result);
        self.presentation = None;
    }

    pub fn result(&self) -> Option<WizardResult> {
        self.result
    }
}

impl Window for FirstTimeWizard {
    fn title(&self) -> String {
        WIZARD_TITLE.to_string()
    }

    fn show(&mut self, presentation: Presentation) -> AppResult<()> {
        self.presentation = Some(presentation);
        Ok(())
    }

    fn close(&mut self) -> AppResult<()> {
        self.presentation = None;
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

#[cfg(test)]
mod tests {
    use super::*;

    fn collection(priority: u8, titles: &[&str]) -> WizardPageCollection {
        WizardPageCollection::new(titles.iter().map(|t| WizardPage::new(*t)).collect())
            .with_priority(priority)
    }

    fn titles(wizard: &FirstTimeWizard) -> Vec<&str> {
        wizard.pages().iter().map(|p| p.title.as_str()).collect()
    }

    #[test]
    fn test_welcome_only() {
        let wizard = FirstTimeWizard::new(vec![]);
        assert_eq!(titles(&wizard), vec![WELCOME_TITLE]);
        assert!(wizard.is_last_page());
        assert_eq!(wizard.title(), WIZARD_TITLE);
    }

    #[test]
    fn test_collection_order() {
        let wizard = FirstTimeWizard::new(vec![
            collection(WizardPageCollection::PRIORITY_NONE, &["sales 1", "sales 2"]),
            collection(WizardPageCollection::PRIORITY_FIRST_HIGH, &["users"]),
            collection(WizardPageCollection::PRIORITY_NONE, &["stock"]),
            collection(WizardPageCollection::PRIORITY_LAST_HIGH, &["done"]),
        ]);

        assert_eq!(
            titles(&wizard),
            vec![WELCOME_TITLE, "users", "sales 1", "sales 2", "stock", "done"]
        );
        let ids: Vec<Option<usize>> = wizard.pages().iter().map(WizardPage::id).collect();
        assert_eq!(ids, (0..6).map(Some).collect::<Vec<_>>());
    }

    #[test]
    fn test_navigation_and_result() {
        let mut wizard = FirstTimeWizard::new(vec![collection(0, &["users"])]);

        assert!(!wizard.back());
        assert!(wizard.next());
        assert_eq!(wizard.current_page().title, "users");
        assert!(!wizard.next());

        wizard.show(Presentation::Normal).unwrap();
        assert!(wizard.is_visible());
        wizard.accept();
        assert_eq!(wizard.result(), Some(WizardResult::Accepted));
        assert!(!wizard.is_visible());
    }
}
