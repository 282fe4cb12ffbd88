//! # Catalog
//!
//! Browse-and-search view model over a tree of parents (categories) and
//! children (products, customers, ...).
//!
//! ## Entries
//! ```text
//! no search, at root         [All]    then parents, then children
//! no search, inside parent   [Up]     then parents, then children
//! "all" mode                 [Up]     then every child
//! searching                           matches only (no [Up]/[All])
//! ```
//!
//! ## Search-as-you-type
//! ```text
//! set_search_text("co", t0) ──┐
//! set_search_text("cof", t1) ─┼── pending = ("cof", t1 + 200ms)
//!                             │
//! poll(t1 + 200ms) ───────────┴── text still "cof"? ─► search
//! ```
//! Time is passed in explicitly so the debounce is deterministic.

use std::time::{Duration, Instant};

use tracing::debug;

use crate::validation::validate_search_query;

/// Delay between the last keystroke and the search.
pub const SEARCH_DEBOUNCE: Duration = Duration::from_millis(200);

/// Where catalog entries come from.
pub trait CatalogSource {
    type Item: Clone;

    /// Label of an item.
    fn display(&self, item: &Self::Item) -> String;

    /// Optional image path shown instead of the generic icon.
    fn image(&self, _item: &Self::Item) -> Option<String> {
        None
    }

    /// Every child, across all parents, matching `search`.
    fn all(&self, search: Option<&str>) -> Vec<Self::Item>;

    /// Parents and children directly below `parent` (root when `None`).
    fn children(
        &self,
        parent: Option<&Self::Item>,
        search: Option<&str>,
    ) -> (Vec<Self::Item>, Vec<Self::Item>);
}

/// Kind of a list entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Parent,
    Child,
    Up,
    All,
}

impl EntryKind {
    /// Theme icon used when the entry has no image.
    pub fn icon(self) -> &'static str {
        match self {
            EntryKind::Parent => "folder",
            EntryKind::Child => "text-x-generic",
            EntryKind::Up => "go-up",
            EntryKind::All => "package-x-generic",
        }
    }
}

/// One entry of the catalog list.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogEntry<T> {
    pub label: String,
    pub kind: EntryKind,
    pub item: Option<T>,
    pub image: Option<String>,
}

/// What the catalog tells its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogEvent<T> {
    ChildSelected(T),
    ParentSelected(T),
    SearchChanged(Option<String>),
}

/// The catalog view model.
pub struct Catalog<S: CatalogSource> {
    source: S,
    show_all: bool,
    in_all: bool,
    current: Option<S::Item>,
    search: Option<String>,
    tree: Vec<Option<S::Item>>,
    entries: Vec<CatalogEntry<S::Item>>,
    shown: (usize, usize),
    search_text: String,
    pending: Option<(String, Instant)>,
}

impl<S: CatalogSource> Catalog<S> {
    /// Creates a catalog showing the root level.
    pub fn new(source: S) -> Self {
        let mut catalog = Catalog {
            source,
            show_all: true,
            in_all: false,
            current: None,
            search: None,
            tree: Vec::new(),
            entries: Vec::new(),
            shown: (0, 0),
            search_text: String::new(),
            pending: None,
        };
        catalog.populate(None, None, false);
        catalog
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn entries(&self) -> &[CatalogEntry<S::Item>] {
        &self.entries
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.label.as_str()).collect()
    }

    /// Whether the root level offers the "[All]" entry.
    pub fn set_show_all(&mut self, show_all: bool) {
        self.show_all = show_all;
        self.refresh();
    }

    pub fn in_all(&self) -> bool {
        self.in_all
    }

    pub fn current(&self) -> Option<&S::Item> {
        self.current.as_ref()
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn search_text(&self) -> &str {
        &self.search_text
    }

    /// Rebuilds the entries for the current position.
    pub fn refresh(&mut self) {
        let parent = self.current.clone();
        let search = self.search.clone();
        self.populate(parent, search, self.in_all);
    }

    fn populate(&mut self, parent: Option<S::Item>, search: Option<String>, show_all: bool) {
        self.in_all = show_all;

        let (parents, children) = if self.in_all || (parent.is_none() && search.is_some()) {
            (Vec::new(), self.source.all(search.as_deref()))
        } else {
            self.source.children(parent.as_ref(), search.as_deref())
        };

        let mut entries = Vec::with_capacity(parents.len() + children.len() + 1);
        if search.is_none() {
            if parent.is_some() || self.in_all {
                entries.push(self.marker("[Up]", EntryKind::Up));
            } else if self.show_all {
                entries.push(self.marker("[All]", EntryKind::All));
            }
        }

        self.shown = (parents.len(), children.len());
        for (kind, items) in [(EntryKind::Parent, parents), (EntryKind::Child, children)] {
            for item in items {
                entries.push(CatalogEntry {
                    label: self.source.display(&item),
                    image: self.source.image(&item),
                    kind,
                    item: Some(item),
                });
            }
        }

        self.entries = entries;
        self.current = parent;
        self.search = search;
    }

    fn marker(&self, label: &str, kind: EntryKind) -> CatalogEntry<S::Item> {
        CatalogEntry {
            label: label.to_string(),
            kind,
            item: None,
            image: None,
        }
    }

    // -------------------------------------------------------------------------
    // Search
    // -------------------------------------------------------------------------

    /// Records a keystroke; the search runs once the text stays unchanged
    /// for [`SEARCH_DEBOUNCE`].
    pub fn set_search_text(&mut self, text: impl Into<String>, now: Instant) {
        self.search_text = text.into();
        self.pending = Some((self.search_text.clone(), now + SEARCH_DEBOUNCE));
    }

    /// Runs a due debounced search.
    pub fn poll(&mut self, now: Instant) -> Vec<CatalogEvent<S::Item>> {
        match &self.pending {
            Some((_, due)) if *due > now => Vec::new(),
            Some((text, _)) => {
                let current = *text == self.search_text;
                self.pending = None;
                if current {
                    vec![self.do_search()]
                } else {
                    Vec::new()
                }
            }
            None => Vec::new(),
        }
    }

    fn do_search(&mut self) -> CatalogEvent<S::Item> {
        let query = match validate_search_query(&self.search_text) {
            Ok(q) if q.is_empty() => None,
            Ok(_) => Some(self.search_text.clone()),
            Err(err) => {
                debug!(error = %err, "Ignoring search text");
                self.search.clone()
            }
        };
        let parent = self.current.clone();
        self.populate(parent, query, false);
        CatalogEvent::SearchChanged(self.search.clone())
    }

    /// Enter in the search box: search now, and select the only result if
    /// there is exactly one.
    pub fn submit_search(&mut self) -> Vec<CatalogEvent<S::Item>> {
        self.pending = None;
        let mut events = vec![self.do_search()];

        let only = match self.shown {
            (0, 1) => self
                .entries
                .iter()
                .find(|e| e.kind == EntryKind::Child)
                .and_then(|e| e.item.clone())
                .map(CatalogEvent::ChildSelected),
            (1, 0) => self
                .entries
                .iter()
                .find(|e| e.kind == EntryKind::Parent)
                .and_then(|e| e.item.clone())
                .map(CatalogEvent::ParentSelected),
            _ => None,
        };
        events.extend(only);
        events
    }

    /// Clear button: empties the search box and searches immediately.
    pub fn clear_search(&mut self) -> Vec<CatalogEvent<S::Item>> {
        self.search_text.clear();
        self.pending = None;
        vec![self.do_search()]
    }

    // -------------------------------------------------------------------------
    // Navigation
    // -------------------------------------------------------------------------

    /// Activates the entry at `index`.
    pub fn activate(&mut self, index: usize) -> Vec<CatalogEvent<S::Item>> {
        let Some(entry) = self.entries.get(index).cloned() else {
            return Vec::new();
        };

        match (entry.kind, entry.item) {
            (EntryKind::Parent, Some(item)) => {
                self.tree.push(self.current.clone());
                let search = self.search.clone();
                self.populate(Some(item.clone()), search, false);
                vec![CatalogEvent::ParentSelected(item)]
            }
            (EntryKind::Child, Some(item)) => vec![CatalogEvent::ChildSelected(item)],
            (EntryKind::Up, _) => {
                let parent = if self.in_all {
                    None
                } else {
                    self.tree.pop().flatten()
                };
                let search = self.search.clone();
                self.populate(parent, search, false);
                Vec::new()
            }
            (EntryKind::All, _) => {
                self.populate(None, None, true);
                Vec::new()
            }
            _ => Vec::new(),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
