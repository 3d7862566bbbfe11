//! Core library for tallybook, a personal ledger that works offline.
//!
//! - `ledger`: the persisted list of entries and its storage backends
//! - `models`: entry types and input validation
//! - `export`: CSV export and read-back
//! - `view`: display-ready rows and running total
//! - `assets`: pre-fetching asset cache that serves requests offline
//! - `config`: configuration file and environment overrides

pub mod assets;
pub mod config;
pub mod export;
pub mod ledger;
pub mod models;
pub mod utils;
pub mod view;

pub use config::Config;
pub use ledger::{FileStorage, LedgerError, LedgerStore, MemoryStorage, Storage};
pub use models::{Entry, EntryId, EntryInput, ValidationError};
pub use view::LedgerView;
