//! Tab pages.

use std::any::Any;
use std::fmt;

use tracing::debug;

use crate::error::AppResult;

/// A page hosted in a main window tab.
pub trait Page {
    fn name(&self) -> &str;

    fn label(&self) -> &str;

    /// Loads the page's data.
    fn populate(&mut self) -> AppResult<()>;

    fn as_any(&self) -> &dyn Any;
}

/// Page wrapper that populates on the first "shown" only.
pub struct BasePage {
    inner: Box<dyn Page>,
    populated: bool,
}

impl fmt::Debug for BasePage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BasePage")
            .field("name", &self.inner.name())
            .field("populated", &self.populated)
            .finish()
    }
}

impl BasePage {
    pub fn new(inner: Box<dyn Page>) -> Self {
        BasePage {
            inner,
            populated: false,
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn label(&self) -> &str {
        self.inner.label()
    }

    pub fn is_populated(&self) -> bool {
        self.populated
    }

    pub fn page(&self) -> &dyn Page {
        self.inner.as_ref()
    }

    /// The wrapped page as its concrete type.
    pub fn downcast<T: 'static>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref::<T>()
    }

    /// Called every time the page becomes visible.
    pub fn shown(&mut self) -> AppResult<()> {
        if self.populated {
            return Ok(());
        }
        debug!(page = %self.inner.name(), "Populating page");
        self.inner.populate()?;
        self.populated = true;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    /// Page counting its populate calls.
    pub(crate) struct CountingPage {
        pub name: String,
        pub populates: Arc<AtomicUsize>,
    }

    impl CountingPage {
        pub(crate) fn new(name: &str) -> Self {
            CountingPage {
                name: name.to_string(),
                populates: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl Page for CountingPage {
        fn name(&self) -> &str {
            &self.name
        }

        fn label(&self) -> &str {
            &self.name
        }

        fn populate(&mut self) -> AppResult<()> {
            self.populates.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn as_any(&self) -> &dyn Any {
            self
        }
    }

    #[test]
    fn test_populates_once() {
        let page = CountingPage::new("sales");
        let count = Arc::clone(&page.populates);
        let mut base = BasePage::new(Box::new(page));

        assert!(!base.is_populated());
        base.shown().unwrap();
        base.shown().unwrap();
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert!(base.downcast::<CountingPage>().is_some());
    }
}
