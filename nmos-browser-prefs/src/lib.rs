//! User preference storage for the NMOS registry browser.
//!
//! Preferences are a handful of named strings: which API base URLs to use,
//! whether list filters are sent as RQL, the page size, and whether the last
//! listing advertised full or partial pagination. Values are read on every
//! request; a missing value always has a defined default.
//!
//! # Components
//!
//! - [`PreferenceStore`]: the raw key/value contract, with an in-memory and a
//!   SQLite-backed implementation
//! - [`Preferences`]: typed accessor with default fallback
//! - [`AdapterConfig`]: immutable per-request snapshot handed to the adapter
//!
//! # Example
//!
//! ```
//! use nmos_browser_prefs::{MemoryPreferenceStore, Preferences};
//! use std::sync::Arc;
//!
//! let prefs = Preferences::new(Arc::new(MemoryPreferenceStore::new()));
//! prefs.set_rql_mode(false).unwrap();
//! let config = prefs.snapshot("http://registry.local").unwrap();
//! assert!(!config.rql);
//! ```

mod config;
mod error;
mod keys;
mod preferences;
mod sqlite;
mod store;

pub use config::AdapterConfig;
pub use error::{PrefsError, PrefsResult};
pub use keys::{PaginationMode, PreferenceKey};
pub use preferences::{ApiUrlChange, Preferences, DEFAULT_PAGING_LABEL};
pub use sqlite::SqlitePreferenceStore;
pub use store::{MemoryPreferenceStore, PreferenceStore};
