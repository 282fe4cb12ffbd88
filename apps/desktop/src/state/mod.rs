//! # State Module
//!
//! Shared state wrappers handed to modules, pages and windows.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐  ┌──────────────────┐  ┌──────────────────────┐      │
//! │  │   DbState    │  │   ConfigState    │  │    PrintingState     │      │
//! │  │              │  │                  │  │                      │      │
//! │  │  Database    │  │  ConfigHandle    │  │  Arc<Mutex<          │      │
//! │  │  + runtime   │◄─│  + ConfigStore   │  │    PrinterManager    │      │
//! │  │    handle    │  │    (save)        │  │  >>                  │      │
//! │  └──────────────┘  └──────────────────┘  └──────────────────────┘      │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • ConfigState: Arc<RwLock<Config>> inside the handle                  │
//! │  • PrintingState: Protected by Arc<Mutex<T>> (dialogs block)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;
mod printing;

pub use config::{ConfigState, ConfigStore, MemoryConfigStore};
pub use db::DbState;
pub use printing::PrintingState;
