//! # Database State
//!
//! Wraps the `Database` for the synchronous shell.
//!
//! The shell runs on one thread outside the async runtime; every database
//! call goes through [`DbState::block_on`] on the runtime handle the binary
//! created.
//!
//! ## Usage
//! ```rust,ignore
//! let files = db_state.block_on(db_state.inner().stored_files().list())?;
//! ```

use std::future::Future;

use coinbox_core::ConfigHandle;
use coinbox_db::Database;
use tokio::runtime::Handle;

use super::config::ConfigStore;
use crate::error::AppResult;

/// Wrapper around `Database` plus the runtime that drives it.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
    runtime: Handle,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database, runtime: Handle) -> Self {
        DbState { db, runtime }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    /// Runs a database future to completion.
    ///
    /// Must not be called from inside the runtime.
    pub fn block_on<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }
}

impl ConfigStore for DbState {
    fn save(&self, config: &ConfigHandle) -> AppResult<()> {
        self.block_on(self.db.config().save_from(config))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use coinbox_core::Config;
    use coinbox_db::DbConfig;

    #[test]
    fn test_save_through_store() {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let db = runtime
            .block_on(Database::new(DbConfig::in_memory()))
            .unwrap();
        let state = DbState::new(db, runtime.handle().clone());

        let config = ConfigHandle::default();
        config.write(|c| c.set("app", "fullscreen", true));
        state.save(&config).unwrap();
        assert!(!config.read(Config::has_pending_changes));

        let reloaded = ConfigHandle::default();
        state
            .block_on(state.inner().config().load_into(&reloaded))
            .unwrap();
        assert!(reloaded.read(Config::fullscreen));
    }
}
