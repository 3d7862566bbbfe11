//! Application state management for Tallybook.
//!
//! The `App` owns the ledger store (constructed once, in `App::new`) and the
//! latest `LedgerView`. Every mutation goes through the store and is followed
//! by a full rebuild of the view.

use anyhow::Result;
use tracing::{error, info, warn};

use tallybook_core::export::{self, ExportError};
use tallybook_core::view;
use tallybook_core::{
    Config, EntryId, EntryInput, FileStorage, LedgerStore, LedgerView, Storage,
};

// ============================================================================
// Constants
// ============================================================================

/// Maximum length for the description input.
const MAX_DESCRIPTION_LENGTH: usize = 100;

/// Maximum length for the amount input.
const MAX_AMOUNT_LENGTH: usize = 20;

/// Number of rows to scroll on page up/down.
pub const PAGE_SCROLL_SIZE: usize = 10;

// ============================================================================
// UI State Types
// ============================================================================

/// Which part of the screen receives typed keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Description,
    Amount,
    List,
}

impl Focus {
    pub fn next(&self) -> Self {
        match self {
            Focus::Description => Focus::Amount,
            Focus::Amount => Focus::List,
            Focus::List => Focus::Description,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            Focus::Description => Focus::List,
            Focus::Amount => Focus::Description,
            Focus::List => Focus::Amount,
        }
    }

    pub fn is_input(&self) -> bool {
        !matches!(self, Focus::List)
    }
}

/// Overall application state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Normal,
    ShowingHelp,
    /// Blocking message, dismissed with any key
    ShowingAlert,
    ConfirmingDelete,
    ConfirmingQuit,
    Quitting,
}

/// Main application state container
pub struct App {
    pub config: Config,
    store: LedgerStore<Box<dyn Storage>>,

    pub view: LedgerView,

    // UI State
    pub state: AppState,
    pub focus: Focus,
    pub selection: usize,

    // Entry form
    pub description_input: String,
    pub amount_input: String,

    /// Entry awaiting delete confirmation
    pub pending_delete: Option<EntryId>,
    pub alert: Option<String>,
    pub status_message: Option<String>,
}

impl App {
    /// Create the application over the on-disk ledger
    pub fn new(config: Config) -> Result<Self> {
        let data_dir = config.data_dir()?;
        info!(?data_dir, "Opening ledger");
        let storage: Box<dyn Storage> = Box::new(FileStorage::new(data_dir)?);
        Ok(Self::with_store(config, LedgerStore::new(storage)))
    }

    pub fn with_store(config: Config, store: LedgerStore<Box<dyn Storage>>) -> Self {
        let mut app = Self {
            config,
            store,
            view: LedgerView::default(),
            state: AppState::Normal,
            focus: Focus::Description,
            selection: 0,
            description_input: String::new(),
            amount_input: String::new(),
            pending_delete: None,
            alert: None,
            status_message: None,
        };
        app.refresh();
        app
    }

    pub fn store(&self) -> &LedgerStore<Box<dyn Storage>> {
        &self.store
    }

    /// Rebuild the view from the store
    pub fn refresh(&mut self) {
        match view::render(&self.store) {
            Ok(view) => {
                self.view = view;
                self.selection = self.selection.min(self.view.len().saturating_sub(1));
            }
            Err(e) => {
                error!(error = %e, "Failed to load ledger");
                self.view = LedgerView::default();
                self.selection = 0;
                self.show_alert(format!("Could not load the ledger: {}", e));
            }
        }
    }

    pub fn show_alert(&mut self, message: impl Into<String>) {
        self.alert = Some(message.into());
        self.state = AppState::ShowingAlert;
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
        self.state = AppState::Normal;
    }

    // =========================================================================
    // Ledger actions
    // =========================================================================

    /// Validate the form and add the entry. Invalid input only raises an alert.
    pub fn submit_entry(&mut self) {
        let input = match EntryInput::parse(&self.description_input, &self.amount_input) {
            Ok(input) => input,
            Err(e) => {
                self.show_alert(e.to_string());
                return;
            }
        };

        match self.store.add(input) {
            Ok(entry) => {
                self.description_input.clear();
                self.amount_input.clear();
                self.focus = Focus::Description;
                self.status_message = Some(format!("Added \"{}\"", entry.description));
                self.refresh();
                self.selection = self.view.len().saturating_sub(1);
            }
            Err(e) => {
                warn!(error = %e, "Failed to add entry");
                self.show_alert(format!("Could not save the entry: {}", e));
            }
        }
    }

    /// Ask for confirmation before deleting the selected row
    pub fn request_delete(&mut self) {
        if let Some(row) = self.view.row(self.selection) {
            self.pending_delete = Some(row.id);
            self.state = AppState::ConfirmingDelete;
        }
    }

    pub fn confirm_delete(&mut self) {
        self.state = AppState::Normal;
        let Some(id) = self.pending_delete.take() else {
            return;
        };

        match self.store.delete(id) {
            Ok(entry) => {
                self.status_message = Some(format!("Deleted \"{}\"", entry.description));
                self.refresh();
            }
            Err(e) => {
                warn!(error = %e, %id, "Failed to delete entry");
                self.show_alert(format!("Could not delete the entry: {}", e));
            }
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
        self.state = AppState::Normal;
    }

    /// Write the whole ledger to a CSV file in the export directory
    pub fn export(&mut self) {
        let entries = match self.store.list_all() {
            Ok(entries) => entries,
            Err(e) => {
                self.show_alert(format!("Could not load the ledger: {}", e));
                return;
            }
        };

        match export::write_csv(&self.config.export_dir(), &entries, self.store.today()) {
            Ok(path) => {
                self.status_message = Some(format!("Exported to {}", path.display()));
            }
            Err(ExportError::Empty) => {
                self.show_alert("There are no records to export yet");
            }
            Err(e) => {
                warn!(error = %e, "Export failed");
                self.show_alert(e.to_string());
            }
        }
    }

    // =========================================================================
    // Form editing
    // =========================================================================

    pub fn push_char(&mut self, c: char) {
        match self.focus {
            Focus::Description => {
                if can_add_char(self.description_input.chars().count(), MAX_DESCRIPTION_LENGTH, c) {
                    self.description_input.push(c);
                }
            }
            Focus::Amount => {
                if can_add_char(self.amount_input.chars().count(), MAX_AMOUNT_LENGTH, c) {
                    self.amount_input.push(c);
                }
            }
            Focus::List => {}
        }
    }

    pub fn backspace(&mut self) {
        match self.focus {
            Focus::Description => {
                self.description_input.pop();
            }
            Focus::Amount => {
                self.amount_input.pop();
            }
            Focus::List => {}
        }
    }

    // =========================================================================
    // List navigation
    // =========================================================================

    fn max_selection(&self) -> usize {
        self.view.len().saturating_sub(1)
    }

    pub fn select_next(&mut self, step: usize) {
        self.selection = (self.selection + step).min(self.max_selection());
    }

    pub fn select_prev(&mut self, step: usize) {
        self.selection = self.selection.saturating_sub(step);
    }

    pub fn select_first(&mut self) {
        self.selection = 0;
    }

    pub fn select_last(&mut self) {
        self.selection = self.max_selection();
    }
}

// ============================================================================
// Input validation helpers
// ============================================================================

/// Check if a character should be accepted into a field of the given limit
fn can_add_char(current_len: usize, max_len: usize, c: char) -> bool {
    current_len < max_len && !c.is_control()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tallybook_core::MemoryStorage;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
    }

    fn app_with_config(config: Config) -> App {
        let storage: Box<dyn Storage> = Box::new(MemoryStorage::new());
        App::with_store(config, LedgerStore::new(storage).with_clock(today))
    }

    fn app() -> App {
        app_with_config(Config::default())
    }

    fn type_entry(app: &mut App, description: &str, amount: &str) {
        app.description_input = description.to_string();
        app.amount_input = amount.to_string();
        app.submit_entry();
    }

    #[test]
    fn test_focus_cycle() {
        assert_eq!(Focus::Description.next(), Focus::Amount);
        assert_eq!(Focus::Amount.next(), Focus::List);
        assert_eq!(Focus::List.next(), Focus::Description);
        assert_eq!(Focus::Description.prev(), Focus::List);
    }

    #[test]
    fn test_starts_empty() {
        let app = app();
        assert!(app.view.placeholder().is_some());
        assert_eq!(app.view.total_display, "0");
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_submit_adds_and_clears_form() {
        let mut app = app();
        type_entry(&mut app, "Coffee", "3.5");
        type_entry(&mut app, "Coffee, Large", "4");

        assert_eq!(app.view.len(), 2);
        assert_eq!(app.view.total_display, "7.5");
        assert!(app.description_input.is_empty());
        assert!(app.amount_input.is_empty());
        assert_eq!(app.selection, 1);
        assert_eq!(app.state, AppState::Normal);
    }

    #[test]
    fn test_invalid_submit_only_alerts() {
        let mut app = app();
        type_entry(&mut app, "Rent", "900");
        let view_before = app.view.clone();

        for (description, amount) in [("", "5"), ("Tea", "-1"), ("Tea", "abc")] {
            type_entry(&mut app, description, amount);
            assert_eq!(app.state, AppState::ShowingAlert);
            assert!(app.alert.is_some());
            assert_eq!(app.view, view_before);
            assert_eq!(app.store().list_all().unwrap().len(), 1);
            app.dismiss_alert();
        }

        // Form is kept so the user can correct it
        assert_eq!(app.description_input, "Tea");
    }

    #[test]
    fn test_delete_requires_confirmation() {
        let mut app = app();
        type_entry(&mut app, "a", "1");
        type_entry(&mut app, "b", "2");
        app.select_first();

        app.request_delete();
        assert_eq!(app.state, AppState::ConfirmingDelete);
        app.cancel_delete();
        assert_eq!(app.view.len(), 2);

        app.request_delete();
        app.confirm_delete();
        assert_eq!(app.state, AppState::Normal);
        assert_eq!(app.view.len(), 1);
        assert_eq!(app.view.row(0).unwrap().description, "b");
    }

    #[test]
    fn test_delete_on_empty_list_does_nothing() {
        let mut app = app();
        app.request_delete();
        assert_eq!(app.state, AppState::Normal);
        assert!(app.pending_delete.is_none());
    }

    #[test]
    fn test_selection_clamped_after_delete() {
        let mut app = app();
        type_entry(&mut app, "a", "1");
        type_entry(&mut app, "b", "2");
        app.select_last();
        app.request_delete();
        app.confirm_delete();
        assert_eq!(app.selection, 0);
    }

    #[test]
    fn test_export_empty_alerts() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_config(Config {
            export_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });

        app.export();
        assert_eq!(app.state, AppState::ShowingAlert);
        assert!(std::fs::read_dir(dir.path()).unwrap().next().is_none());
    }

    #[test]
    fn test_export_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app_with_config(Config {
            export_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        });
        type_entry(&mut app, "Coffee", "3.5");

        app.export();
        assert_eq!(app.state, AppState::Normal);
        let path = dir.path().join("ledger_20261018.csv");
        let contents = std::fs::read_to_string(path).unwrap();
        assert!(contents.contains("2026/10/18,\"Coffee\",3.5"));
    }

    #[test]
    fn test_push_char_limits() {
        let mut app = app();
        app.focus = Focus::Amount;
        for _ in 0..30 {
            app.push_char('9');
        }
        assert_eq!(app.amount_input.len(), MAX_AMOUNT_LENGTH);

        app.push_char('\n');
        app.backspace();
        assert_eq!(app.amount_input.len(), MAX_AMOUNT_LENGTH - 1);

        app.focus = Focus::List;
        app.push_char('x');
        assert!(app.description_input.is_empty());
    }

    #[test]
    fn test_can_add_char() {
        assert!(can_add_char(0, 5, 'a'));
        assert!(can_add_char(4, 5, '咖'));
        assert!(!can_add_char(5, 5, 'a'));
        assert!(!can_add_char(0, 5, '\t'));
    }
}
