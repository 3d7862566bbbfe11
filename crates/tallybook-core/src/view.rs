//! View model for the ledger list.
//!
//! `render` reads the store and builds a fresh `LedgerView`: one row per
//! entry plus the running total, both formatted for display. The terminal
//! UI draws whatever the latest view holds.

use crate::ledger::{LedgerError, LedgerStore, Storage};
use crate::models::{Entry, EntryId};
use crate::utils::format_amount;

/// Shown in place of the list when there are no entries
pub const EMPTY_PLACEHOLDER: &str = "No records yet";

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    /// Target of this row's delete action
    pub id: EntryId,
    pub position: usize,
    pub date: String,
    pub description: String,
    pub amount: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerView {
    pub rows: Vec<RowView>,
    pub total: f64,
    pub total_display: String,
}

impl Default for LedgerView {
    fn default() -> Self {
        Self::build(&[])
    }
}

impl LedgerView {
    pub fn build(entries: &[Entry]) -> Self {
        let rows: Vec<RowView> = entries
            .iter()
            .enumerate()
            .map(|(position, entry)| RowView {
                id: entry.id,
                position,
                date: entry.date_display(),
                description: entry.description.clone(),
                amount: format_amount(entry.amount),
            })
            .collect();

        let total: f64 = entries.iter().map(|e| e.amount).sum();

        Self {
            rows,
            total,
            total_display: format_amount(total),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Placeholder text when there is nothing to list
    pub fn placeholder(&self) -> Option<&'static str> {
        self.is_empty().then_some(EMPTY_PLACEHOLDER)
    }

    pub fn row(&self, position: usize) -> Option<&RowView> {
        self.rows.get(position)
    }
}

/// Rebuild the view from the current contents of the store
pub fn render<S: Storage>(store: &LedgerStore<S>) -> Result<LedgerView, LedgerError> {
    let entries = store.list_all()?;
    Ok(LedgerView::build(&entries))
}
