#![cfg(feature = "sqlite")]

use business_days::{
    AppendImporter, EntityStore, EventDraft, NonWorkingDay, NonWorkingDayDraft, PersistenceError,
    SqliteStore, Tracker, open_store,
};
use chrono::NaiveDate;
use tempfile::NamedTempFile;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn sqlite_store_persists_across_reopen() {
    let file = NamedTempFile::new().unwrap();
    {
        let mut store = SqliteStore::open(file.path()).unwrap();
        store
            .insert_event(EventDraft::new("Launch", d(2025, 3, 14)))
            .unwrap();
        store
            .insert_day(NonWorkingDayDraft::new("Holiday", d(2025, 3, 10)))
            .unwrap();
    }

    let store = SqliteStore::open(file.path()).unwrap();
    let events = store.list_events().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, 1);
    assert_eq!(events[0].name, "Launch");
    assert_eq!(events[0].date, d(2025, 3, 14));
    assert_eq!(
        store.list_days().unwrap(),
        vec![NonWorkingDay::new(1, "Holiday", d(2025, 3, 10))]
    );
}

#[test]
fn sqlite_store_does_not_reuse_removed_ids() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let first = store
        .insert_event(EventDraft::new("a", d(2025, 1, 2)))
        .unwrap();
    let second = store
        .insert_event(EventDraft::new("b", d(2025, 1, 3)))
        .unwrap();
    assert!(store.remove_event(second.id).unwrap());
    let third = store
        .insert_event(EventDraft::new("c", d(2025, 1, 4)))
        .unwrap();
    assert_eq!((first.id, second.id, third.id), (1, 2, 3));
    assert!(!store.remove_event(99).unwrap());
}

#[test]
fn sqlite_store_update_and_not_found() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let mut day = store
        .insert_day(NonWorkingDayDraft::new("Bridge", d(2025, 5, 2)))
        .unwrap();
    day.name = "Bridge day".into();
    store.update_day(&day).unwrap();
    assert_eq!(store.list_days().unwrap(), vec![day]);

    let mut event = store
        .insert_event(EventDraft::new("x", d(2025, 5, 5)))
        .unwrap();
    event.id = 7;
    assert!(matches!(
        store.update_event(&event),
        Err(PersistenceError::NotFound { id: 7, .. })
    ));
}

#[test]
fn sqlite_store_rejects_empty_event_name() {
    let mut store = SqliteStore::open_in_memory().unwrap();
    assert!(matches!(
        store.insert_event(EventDraft::new("", d(2025, 1, 2))),
        Err(PersistenceError::Entity(_))
    ));
    assert!(store.list_events().unwrap().is_empty());
}

#[test]
fn open_store_with_path_uses_sqlite_and_accepts_imports() {
    let file = NamedTempFile::new().unwrap();
    let text = r#"{"events":[{"id":5,"name":"Audit","date":"2025-06-02"}],"days":[{"id":5,"name":"","date":"2025-06-09"}]}"#;
    {
        let mut tracker = Tracker::new(open_store(Some(file.path())).unwrap());
        let report = tracker.import_text(text, &AppendImporter).unwrap();
        assert_eq!((report.events_inserted, report.days_inserted), (1, 1));
    }
    let tracker = Tracker::new(open_store(Some(file.path())).unwrap());
    let events = tracker.events().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].id, 1);
    assert_eq!(tracker.days().unwrap()[0].date, d(2025, 6, 9));
}

#[test]
fn sqlite_import_rolls_back_when_a_write_fails() {
    let file = NamedTempFile::new().unwrap();
    let mut store = SqliteStore::open(file.path()).unwrap();
    store
        .insert_event(EventDraft::new("Existing", d(2025, 3, 3)))
        .unwrap();
    {
        let side = rusqlite::Connection::open(file.path()).unwrap();
        side.execute_batch(
            "CREATE TRIGGER reject_days BEFORE INSERT ON days \
             BEGIN SELECT RAISE(ABORT, 'disk full'); END;",
        )
        .unwrap();
    }

    let text = r#"{"events":[{"id":1,"name":"A","date":"2025-03-04"},{"id":2,"name":"B","date":"2025-03-05"}],"days":[{"id":1,"name":"","date":"2025-03-06"}]}"#;
    let mut tracker = Tracker::new(store);
    let err = tracker.import_text(text, &AppendImporter).unwrap_err();
    assert!(matches!(err, PersistenceError::Sqlite(_)), "{err:?}");
    assert_eq!(tracker.events().unwrap().len(), 1);
    assert!(tracker.days().unwrap().is_empty());

    // The connection is back in autocommit mode after the rollback.
    let added = tracker
        .add_event(EventDraft::new("Later", d(2025, 3, 7)))
        .unwrap();
    assert_eq!(tracker.events().unwrap().len(), 2);
    assert!(added.id > 1);
}
