// Crash Recovery Tests for recordbook
// These tests verify the slot file stays consistent after simulated crashes

use chrono::NaiveDate;
use recordbook::slot::{SlotStore, SLOT_SIZE};
use recordbook::swap;
use recordbook::{FileRecordStore, Options, RecordParams, RecordStore, StoreStat};
use rust_decimal::Decimal;
use std::fs;
use tempfile::TempDir;

fn params(first_name: &str) -> RecordParams {
    RecordParams {
        first_name: first_name.to_string(),
        last_name: "Smith".to_string(),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
        prop_short: 1,
        prop_decimal: Decimal::new(15, 1),
        prop_char: 'A',
    }
}

/// Helper function to simulate a crash by dropping the store without running Drop
fn simulate_crash(store: FileRecordStore) {
    std::mem::forget(store);
}

/// Test that in-place writes survive a crash
#[test]
fn test_recovery_after_in_place_writes() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.bin");

    {
        let mut store = FileRecordStore::open(&path, Options::default()).unwrap();
        for i in 0..20 {
            store.create(params(&format!("Person{}", i))).unwrap();
        }
        store.update(3, params("Updated")).unwrap();
        store.remove(7).unwrap();
        simulate_crash(store);
    }

    let store = FileRecordStore::open(&path, Options::default()).unwrap();
    assert_eq!(store.stat().unwrap(), StoreStat { total: 20, live: 19 });
    assert_eq!(store.get(3).unwrap().unwrap().first_name, "Updated");
    assert_eq!(store.get(7).unwrap(), None);
}

/// Test a crash after the staging file was written but before it was promoted
#[test]
fn test_recovery_from_unpromoted_staging_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.bin");

    {
        let mut store = FileRecordStore::open(&path, Options::default()).unwrap();
        store.create(params("Alice")).unwrap();
        store.create(params("Bob")).unwrap();
        simulate_crash(store);
    }
    let before = fs::read(&path).unwrap();

    // A rewrite that got as far as the staging file
    {
        let slots = SlotStore::open(&path, &Options::default()).unwrap();
        let staging = slots.replace_with(&[]).unwrap();
        assert!(staging.exists());
    }

    let store = FileRecordStore::open(&path, Options::default()).unwrap();
    assert!(!swap::staging_path(&path).exists());
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(store.stat().unwrap(), StoreStat { total: 2, live: 2 });
}

/// Test that garbage in a leftover staging file is ignored
#[test]
fn test_recovery_ignores_corrupt_staging_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.bin");

    {
        let mut store = FileRecordStore::open(&path, Options::default()).unwrap();
        store.create(params("Alice")).unwrap();
    }
    fs::write(swap::staging_path(&path), b"half written").unwrap();

    let mut store = FileRecordStore::open(&path, Options::default()).unwrap();
    assert_eq!(store.records().unwrap().len(), 1);

    // The next rewrite starts from a clean staging path
    store.insert(5, params("Eve")).unwrap();
    assert_eq!(store.stat().unwrap(), StoreStat { total: 2, live: 2 });
}

/// Test that the backup holds the file as it was before an insert
#[test]
fn test_backup_after_insert() {
    let dir = TempDir::new().unwrap();
    let mut store =
        FileRecordStore::open(dir.path().join("records.bin"), Options::default()).unwrap();
    store.insert(1, params("Alice")).unwrap();
    store.insert(3, params("Carol")).unwrap();
    let before = fs::read(store.path()).unwrap();

    store.insert(2, params("Bob")).unwrap();

    assert_eq!(fs::read(store.backup_path()).unwrap(), before);
    assert_eq!(fs::metadata(store.path()).unwrap().len(), (before.len() + SLOT_SIZE) as u64);
}

/// Test that the backup of a defragmentation can be opened as a store
#[test]
fn test_backup_after_defragment_is_usable() {
    let dir = TempDir::new().unwrap();
    let mut store =
        FileRecordStore::open(dir.path().join("records.bin"), Options::default()).unwrap();
    for name in ["Alice", "Bob", "Carol"] {
        store.create(params(name)).unwrap();
    }
    store.remove(2).unwrap();

    store.defragment().unwrap();

    let backup = FileRecordStore::open(
        store.backup_path(),
        Options::default().create_if_missing(false),
    )
    .unwrap();
    assert_eq!(backup.stat().unwrap(), StoreStat { total: 3, live: 2 });
    assert_eq!(backup.records().unwrap(), store.records().unwrap());
}

/// Test that no backup is written when backups are disabled
#[test]
fn test_no_backup_when_disabled() {
    let dir = TempDir::new().unwrap();
    let options = Options::default().keep_backup(false);
    let mut store = FileRecordStore::open(dir.path().join("records.bin"), options).unwrap();

    store.insert(1, params("Alice")).unwrap();
    store.insert(2, params("Bob")).unwrap();
    store.remove(1).unwrap();
    store.defragment().unwrap();

    assert!(!store.backup_path().exists());
    assert!(!swap::staging_path(store.path()).exists());
}

/// Test that writes keep working after a rewrite swapped the file
#[test]
fn test_writes_after_swap_reach_new_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("records.bin");

    {
        let mut store = FileRecordStore::open(&path, Options::default()).unwrap();
        store.insert(2, params("Bob")).unwrap();
        store.insert(1, params("Alice")).unwrap();

        // These go through the handle reopened after the swap
        store.create(params("Carol")).unwrap();
        store.update(1, params("Alicia")).unwrap();
        store.remove(2).unwrap();
        simulate_crash(store);
    }

    let store = FileRecordStore::open(&path, Options::default()).unwrap();
    let names: Vec<String> = store.records().unwrap().into_iter().map(|r| r.first_name).collect();
    assert_eq!(names, vec!["Alicia", "Carol"]);
    assert_eq!(store.stat().unwrap(), StoreStat { total: 3, live: 2 });
}
