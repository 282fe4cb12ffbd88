//! # Configuration State
//!
//! The process-wide [`ConfigHandle`] together with the store it is saved to.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Values loaded from the `config` table
//! 2. Defaults registered by the modules' metadata
//!
//! Saving writes only the keys changed since the last load or save.

use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use coinbox_core::{Config, ConfigHandle};
use tracing::debug;

use crate::error::AppResult;

/// Where the configuration is persisted.
pub trait ConfigStore: Send + Sync {
    /// Writes the pending changes of `config` and marks them saved.
    fn save(&self, config: &ConfigHandle) -> AppResult<()>;
}

/// Keeps nothing; counts saves. Used when running without a database.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    saves: AtomicUsize,
}

impl MemoryConfigStore {
    pub fn saves(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl ConfigStore for MemoryConfigStore {
    fn save(&self, config: &ConfigHandle) -> AppResult<()> {
        config.write(Config::mark_saved);
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Config handle plus its store.
#[derive(Clone)]
pub struct ConfigState {
    handle: ConfigHandle,
    store: Arc<dyn ConfigStore>,
}

impl fmt::Debug for ConfigState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigState")
            .field("handle", &self.handle)
            .finish_non_exhaustive()
    }
}

impl ConfigState {
    pub fn new(handle: ConfigHandle, store: Arc<dyn ConfigStore>) -> Self {
        ConfigState { handle, store }
    }

    /// An empty config saved nowhere.
    pub fn in_memory() -> Self {
        ConfigState::new(ConfigHandle::default(), Arc::new(MemoryConfigStore::default()))
    }

    pub fn handle(&self) -> &ConfigHandle {
        &self.handle
    }

    /// Executes a function with read access to the config.
    pub fn read<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Config) -> R,
    {
        self.handle.read(f)
    }

    /// Executes a function with write access to the config.
    pub fn write<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&mut Config) -> R,
    {
        self.handle.write(f)
    }

    /// Persists pending changes.
    pub fn save(&self) -> AppResult<()> {
        if !self.handle.read(Config::has_pending_changes) {
            debug!("No config changes to save");
            return Ok(());
        }
        self.store.save(&self.handle)
    }
}
