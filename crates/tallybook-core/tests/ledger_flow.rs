//! End-to-end ledger flows against on-disk storage.

use chrono::{Local, NaiveDate};
use tallybook_core::export::{self, ExportError};
use tallybook_core::ledger::LEDGER_KEY;
use tallybook_core::view::{self, EMPTY_PLACEHOLDER};
use tallybook_core::{EntryInput, FileStorage, LedgerError, LedgerStore, Storage, ValidationError};

fn file_store(dir: &std::path::Path) -> LedgerStore<FileStorage> {
    LedgerStore::new(FileStorage::new(dir.to_path_buf()).unwrap())
}

fn add(store: &mut LedgerStore<FileStorage>, description: &str, amount: &str) {
    store.add(EntryInput::parse(description, amount).unwrap()).unwrap();
}

#[test]
fn test_add_is_stamped_with_today_and_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let mut store = file_store(dir.path());
        add(&mut store, "Groceries", "42.10");
    }

    let store = file_store(dir.path());
    let entries = store.list_all().unwrap();
    let last = entries.last().unwrap();
    assert_eq!(last.description, "Groceries");
    assert_eq!(last.amount, 42.10);
    // Same clock the store uses; a run straddling midnight could see a mismatch
    assert_eq!(last.date, Local::now().date_naive());
}

#[test]
fn test_coffee_scenario_export() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = file_store(dir.path())
        .with_clock(|| NaiveDate::from_ymd_opt(2026, 10, 18).unwrap());

    add(&mut store, "Coffee", "3.5");
    add(&mut store, "Coffee, Large", "4");

    let entries = store.list_all().unwrap();
    let csv = store.to_csv(&entries).unwrap();
    let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
    assert_eq!(
        lines,
        [
            "date,description,amount",
            "2026/10/18,\"Coffee\",3.5",
            "2026/10/18,\"Coffee, Large\",4",
        ]
    );

    let path = export::write_csv(&dir.path().join("exports"), &entries, store.today()).unwrap();
    assert_eq!(path.file_name().unwrap(), "ledger_20261018.csv");

    let rows = export::parse_csv(&std::fs::read_to_string(path).unwrap()).unwrap();
    let tuples: Vec<(String, String, f64)> = rows
        .into_iter()
        .map(|r| (r.date, r.description, r.amount))
        .collect();
    let expected: Vec<(String, String, f64)> = entries
        .iter()
        .map(|e| (e.date_display(), e.description.clone(), e.amount))
        .collect();
    assert_eq!(tuples, expected);
}

#[test]
fn test_invalid_input_leaves_ledger_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = file_store(dir.path());
    add(&mut store, "Rent", "900");
    let before = store.storage().get(LEDGER_KEY).unwrap();

    assert_eq!(EntryInput::parse("", "5"), Err(ValidationError::MissingField));
    assert_eq!(EntryInput::parse("Tea", "-1"), Err(ValidationError::NotPositive));
    assert!(matches!(EntryInput::parse("Tea", "abc"), Err(ValidationError::NotANumber(_))));

    assert_eq!(store.storage().get(LEDGER_KEY).unwrap(), before);
}

#[test]
fn test_delete_then_render() {
    let dir = tempfile::tempdir().unwrap();
    let mut store = file_store(dir.path());
    for (d, a) in [("a", "1"), ("b", "2"), ("c", "3")] {
        add(&mut store, d, a);
    }

    store.delete_at(0).unwrap();
    let view = view::render(&store).unwrap();
    assert_eq!(view.len(), 2);
    assert_eq!(view.total_display, "5");
    assert_eq!(view.row(0).unwrap().description, "b");

    assert!(matches!(
        store.delete_at(5),
        Err(LedgerError::IndexOutOfRange { index: 5, len: 2 })
    ));
}

#[test]
fn test_empty_ledger_renders_placeholder_and_refuses_export() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(dir.path());

    let entries = store.list_all().unwrap();
    assert!(entries.is_empty());

    let view = view::render(&store).unwrap();
    assert_eq!(view.placeholder(), Some(EMPTY_PLACEHOLDER));
    assert_eq!(view.total_display, "0");

    assert!(matches!(store.to_csv(&entries), Err(ExportError::Empty)));
}

#[test]
fn test_reads_ledger_written_by_older_versions() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(format!("{}.json", LEDGER_KEY)),
        r#"[{"desc":"早餐","amount":65,"date":"2025/11/02"}]"#,
    )
    .unwrap();

    let mut store = file_store(dir.path());
    let view = view::render(&store).unwrap();
    assert_eq!(view.row(0).unwrap().description, "早餐");
    assert_eq!(view.total_display, "65");

    let id = view.row(0).unwrap().id;
    store.delete(id).unwrap();
    assert!(store.list_all().unwrap().is_empty());
}
