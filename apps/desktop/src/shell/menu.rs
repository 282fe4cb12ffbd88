//! # Menu Model
//!
//! Roots, items and toolbar actions contributed by the modules, merged once
//! at startup into a read-only [`Menu`].
//!
//! ## Ordering
//! ```text
//!   rel >= 0 group            rel < 0 group
//!   ┌──────────────────┐      ┌──────────────────────────┐
//!   │ main (0, 5)      │  ──► │ administration (-1, 5)   │
//!   │ sales (0, 3)     │      │ system (-1, 4)           │
//!   └──────────────────┘      └──────────────────────────┘
//!   ascending rel, then descending priority, then registration order
//! ```
//!
//! Items are ordered the same way inside their root.

use std::cmp::Reverse;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use super::page::Page;
use crate::context::Services;
use crate::events::Signal;

/// Builds a page for a menu item.
pub type PageFactory = Arc<dyn Fn(&Services) -> Box<dyn Page> + Send + Sync>;

fn order_key(rel: i32, priority: i32) -> (bool, i32, Reverse<i32>) {
    (rel < 0, rel, Reverse(priority))
}

/// Top-level navigation group.
#[derive(Debug, Clone)]
pub struct MenuRoot {
    pub name: String,
    pub label: String,
    pub icon: Option<String>,
    pub rel: i32,
    pub priority: i32,
    pub enabled: bool,
    pub children: Vec<MenuItem>,
}

impl MenuRoot {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        MenuRoot {
            name: name.into(),
            label: label.into(),
            icon: None,
            rel: 0,
            priority: 0,
            enabled: true,
            children: Vec::new(),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn position(mut self, rel: i32, priority: i32) -> Self {
        self.rel = rel;
        self.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// A page entry under a root.
#[derive(Clone)]
pub struct MenuItem {
    pub name: String,
    pub parent: String,
    pub label: String,
    pub icon: Option<String>,
    pub rel: i32,
    pub priority: i32,
    pub enabled: bool,
    pub page: PageFactory,
}

impl fmt::Debug for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuItem")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("rel", &self.rel)
            .field("priority", &self.priority)
            .field("enabled", &self.enabled)
            .finish_non_exhaustive()
    }
}

impl MenuItem {
    pub fn new<F>(
        name: impl Into<String>,
        parent: impl Into<String>,
        label: impl Into<String>,
        page: F,
    ) -> Self
    where
        F: Fn(&Services) -> Box<dyn Page> + Send + Sync + 'static,
    {
        MenuItem {
            name: name.into(),
            parent: parent.into(),
            label: label.into(),
            icon: None,
            rel: 0,
            priority: 0,
            enabled: true,
            page: Arc::new(page),
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn position(mut self, rel: i32, priority: i32) -> Self {
        self.rel = rel;
        self.priority = priority;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Toolbar action bound to a bus signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Action {
    pub name: String,
    pub label: String,
    pub icon: Option<String>,
    pub shortcut: Option<String>,
    pub signal: Signal,
}

impl Action {
    pub fn new(name: impl Into<String>, label: impl Into<String>, signal: Signal) -> Self {
        Action {
            name: name.into(),
            label: label.into(),
            icon: None,
            shortcut: None,
            signal,
        }
    }

    pub fn icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn shortcut(mut self, shortcut: impl Into<String>) -> Self {
        self.shortcut = Some(shortcut.into());
        self
    }
}

/// The merged menu of all modules.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    roots: Vec<MenuRoot>,
    actions: Vec<Action>,
}

impl Menu {
    /// Merges module contributions, in module order.
    ///
    /// Duplicate root names keep the first root; items naming an unknown
    /// root are skipped.
    pub fn build<I>(contributions: I, actions: Vec<Action>) -> Self
    where
        I: IntoIterator<Item = (Vec<MenuRoot>, Vec<MenuItem>)>,
    {
        let mut roots: Vec<MenuRoot> = Vec::new();
        let mut items: Vec<MenuItem> = Vec::new();

        for (module_roots, module_items) in contributions {
            for root in module_roots {
                if roots.iter().any(|r| r.name == root.name) {
                    warn!(root = %root.name, "Duplicate menu root, skipping");
                    continue;
                }
                roots.push(root);
            }
            items.extend(module_items);
        }

        for item in items {
            match roots.iter_mut().find(|r| r.name == item.parent) {
                Some(root) => root.children.push(item),
                None => warn!(item = %item.name, parent = %item.parent, "Unknown menu root, skipping item"),
            }
        }

        // stable sorts: ties keep registration order
        roots.sort_by_key(|r| order_key(r.rel, r.priority));
        for root in &mut roots {
            root.children.sort_by_key(|i| order_key(i.rel, i.priority));
        }

        debug!(roots = roots.len(), actions = actions.len(), "Menu built");
        Menu { roots, actions }
    }

    pub fn roots(&self) -> &[MenuRoot] {
        &self.roots
    }

    pub fn root(&self, name: &str) -> Option<&MenuRoot> {
        self.roots.iter().find(|r| r.name == name)
    }

    pub fn actions(&self) -> &[Action] {
        &self.actions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::page::tests::CountingPage;

    fn item(name: &str, parent: &str) -> MenuItem {
        MenuItem::new(name, parent, name, |_| Box::new(CountingPage::new("page")))
    }

    fn names(menu: &Menu) -> Vec<&str> {
        menu.roots().iter().map(|r| r.name.as_str()).collect()
    }

    #[test]
    fn test_root_order() {
        let base = vec![
            MenuRoot::new("main", "Main").position(0, 5),
            MenuRoot::new("system", "System").position(-1, 4),
            MenuRoot::new("administration", "Administration").position(-1, 5),
        ];
        let sales = vec![
            MenuRoot::new("sales", "Sales").position(0, 3),
            MenuRoot::new("reports", "Reports").position(1, 9),
            MenuRoot::new("tools", "Tools").position(-2, 0),
        ];

        let menu = Menu::build([(base, vec![]), (sales, vec![])], vec![]);
        assert_eq!(
            names(&menu),
            vec!["main", "sales", "reports", "tools", "administration", "system"]
        );
    }

    #[test]
    fn test_equal_keys_keep_registration_order() {
        let roots = vec![
            MenuRoot::new("b", "B"),
            MenuRoot::new("a", "A"),
            MenuRoot::new("c", "C"),
        ];
        let menu = Menu::build([(roots, vec![])], vec![]);
        assert_eq!(names(&menu), vec!["b", "a", "c"]);
    }

    #[test]
    fn test_items_attach_to_roots() {
        let roots = vec![MenuRoot::new("main", "Main")];
        let items = vec![
            item("low", "main").position(0, 1),
            item("high", "main").position(0, 7),
            item("orphan", "nowhere"),
        ];

        let menu = Menu::build([(roots, items)], vec![]);
        let main = menu.root("main").unwrap();
        let children: Vec<&str> = main.children.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(children, vec!["high", "low"]);
    }

    #[test]
    fn test_items_from_later_modules() {
        let base = (vec![MenuRoot::new("main", "Main")], vec![]);
        let sales = (vec![], vec![item("sales", "main")]);

        let menu = Menu::build([base, sales], vec![]);
        assert_eq!(menu.root("main").unwrap().children.len(), 1);
    }

    #[test]
    fn test_duplicate_root_keeps_first() {
        let first = vec![MenuRoot::new("main", "Main").position(0, 5)];
        let second = vec![MenuRoot::new("main", "Other").position(0, 9)];

        let menu = Menu::build([(first, vec![]), (second, vec![])], vec![]);
        assert_eq!(menu.roots().len(), 1);
        assert_eq!(menu.roots()[0].label, "Main");
    }
}
