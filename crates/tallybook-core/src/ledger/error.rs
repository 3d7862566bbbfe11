use thiserror::Error;

use crate::models::EntryId;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Stored ledger is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),

    #[error("Failed to serialize ledger: {0}")]
    Serialize(#[source] serde_json::Error),

    #[error("No entry at position {index} (ledger has {len})")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("No entry with id {0}")]
    NotFound(EntryId),

    #[error("Stored ledger has no entry ids left to assign")]
    IdsExhausted,
}
