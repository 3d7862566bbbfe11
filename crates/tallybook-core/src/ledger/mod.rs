//! Persistent ledger storage.
//!
//! This module provides the `LedgerStore`, which keeps the ordered list of
//! entries in a key-value `Storage` backend. Every mutation reads the whole
//! list, changes it, and writes the whole list back.
//!
//! Backends:
//! - `FileStorage`: one JSON file per key in a data directory
//! - `MemoryStorage`: in-process map, used by tests and dry runs

pub mod error;
pub mod storage;
pub mod store;

pub use error::LedgerError;
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{LedgerStore, LEDGER_KEY};
