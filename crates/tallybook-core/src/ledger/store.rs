use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use crate::export::{self, ExportError};
use crate::models::{Entry, EntryId, EntryInput};

use super::{LedgerError, Storage};

/// Storage key holding the whole ledger as a JSON array
pub const LEDGER_KEY: &str = "accounts";

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// The ordered list of ledger entries, persisted as one snapshot.
///
/// Construct one store and hand it to whatever needs it; all mutation goes
/// through `&mut self`, so there is a single writer.
pub struct LedgerStore<S> {
    storage: S,
    today: fn() -> NaiveDate,
}

impl<S: Storage> LedgerStore<S> {
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            today: local_today,
        }
    }

    /// Replace the clock used to stamp new entries
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn today(&self) -> NaiveDate {
        (self.today)()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// All entries in insertion order.
    ///
    /// A missing key (or a stored `null`) is an empty ledger. Anything that
    /// does not parse is reported as `LedgerError::Corrupt`.
    pub fn list_all(&self) -> Result<Vec<Entry>, LedgerError> {
        let raw = match self.storage.get(LEDGER_KEY)? {
            Some(raw) => raw,
            None => return Ok(Vec::new()),
        };

        let parsed: Option<Vec<Entry>> =
            serde_json::from_str(&raw).map_err(LedgerError::Corrupt)?;
        let mut entries = parsed.unwrap_or_default();
        assign_missing_ids(&mut entries)?;

        debug!(count = entries.len(), "Ledger loaded");
        Ok(entries)
    }

    /// Append a new entry stamped with today's date
    pub fn add(&mut self, input: EntryInput) -> Result<Entry, LedgerError> {
        let mut entries = self.list_all()?;
        let id = next_id(&entries)?;
        let entry = input.into_entry(id, self.today());

        entries.push(entry.clone());
        self.persist(&entries)?;

        info!(id = %entry.id, amount = entry.amount, "Entry added");
        Ok(entry)
    }

    /// Remove the entry with the given id
    pub fn delete(&mut self, id: EntryId) -> Result<Entry, LedgerError> {
        let mut entries = self.list_all()?;
        let index = entries
            .iter()
            .position(|e| e.id == id)
            .ok_or(LedgerError::NotFound(id))?;

        let removed = entries.remove(index);
        self.persist(&entries)?;

        info!(id = %removed.id, index, "Entry deleted");
        Ok(removed)
    }

    /// Remove the entry at a zero-based position
    pub fn delete_at(&mut self, index: usize) -> Result<Entry, LedgerError> {
        let mut entries = self.list_all()?;
        if index >= entries.len() {
            return Err(LedgerError::IndexOutOfRange {
                index,
                len: entries.len(),
            });
        }

        let removed = entries.remove(index);
        self.persist(&entries)?;

        info!(id = %removed.id, index, "Entry deleted");
        Ok(removed)
    }

    /// Serialize entries as a CSV document
    pub fn to_csv(&self, entries: &[Entry]) -> Result<String, ExportError> {
        export::to_csv(entries)
    }

    fn persist(&mut self, entries: &[Entry]) -> Result<(), LedgerError> {
        let json = serde_json::to_string(entries).map_err(LedgerError::Serialize)?;
        self.storage.set(LEDGER_KEY, &json)?;
        Ok(())
    }
}

fn max_id(entries: &[Entry]) -> EntryId {
    entries.iter().map(|e| e.id).max().unwrap_or_default()
}

fn next_id(entries: &[Entry]) -> Result<EntryId, LedgerError> {
    max_id(entries).next().ok_or(LedgerError::IdsExhausted)
}

/// Give records written before ids existed an id after the current maximum,
/// in list order. Deterministic, so repeated loads agree.
fn assign_missing_ids(entries: &mut [Entry]) -> Result<(), LedgerError> {
    let mut last = max_id(entries);
    for entry in entries.iter_mut().filter(|e| !e.id.is_assigned()) {
        last = last.next().ok_or(LedgerError::IdsExhausted)?;
        entry.id = last;
    }
    Ok(())
}
