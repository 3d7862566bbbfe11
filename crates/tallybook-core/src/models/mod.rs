//! Data models for ledger entries.
//!
//! - `Entry`: one recorded ledger line (description, amount, date)
//! - `EntryId`: stable identifier assigned when an entry is created
//! - `EntryInput`: validated user input, the only way to create an entry

pub mod entry;

pub use entry::{Entry, EntryId, EntryInput, ValidationError};
