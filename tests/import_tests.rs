use business_days::{
    AppendImporter, Batch, EntityStore, Event, EventDraft, ExchangeData, ImportStrategy, Importer,
    MemoryStore, NonWorkingDay, NonWorkingDayDraft, PersistenceError, PersistenceResult,
    ReplaceByIdImporter, SkipDuplicateDatesImporter, Tracker, apply_to_snapshot,
};
use chrono::NaiveDate;

fn d(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn seeded_store() -> MemoryStore {
    let mut store = MemoryStore::new();
    store
        .insert_event(EventDraft::new("Existing", d(2025, 3, 3)))
        .unwrap();
    store
        .insert_event(EventDraft::new("Other", d(2025, 3, 7)))
        .unwrap();
    store
        .insert_day(NonWorkingDayDraft::new("Holiday", d(2025, 3, 5)))
        .unwrap();
    store
}

fn incoming() -> ExchangeData {
    ExchangeData::new(
        vec![
            // Same id and date as existing records on purpose.
            Event::new(1, "Imported", d(2025, 3, 3)),
            Event::new(9, "Brand new", d(2025, 4, 1)),
            Event::new(10, "Also new", d(2025, 4, 1)),
        ],
        vec![
            NonWorkingDay::new(1, "Holiday again", d(2025, 3, 5)),
            NonWorkingDay::new(4, "Bridge day", d(2025, 4, 2)),
        ],
    )
}

/// Memory store whose day inserts fail once `day_inserts_left` runs out.
#[derive(Clone)]
struct FullDiskStore {
    inner: MemoryStore,
    day_inserts_left: usize,
}

impl EntityStore for FullDiskStore {
    fn list_events(&self) -> PersistenceResult<Vec<Event>> {
        self.inner.list_events()
    }

    fn insert_event(&mut self, draft: EventDraft) -> PersistenceResult<Event> {
        self.inner.insert_event(draft)
    }

    fn update_event(&mut self, event: &Event) -> PersistenceResult<()> {
        self.inner.update_event(event)
    }

    fn remove_event(&mut self, id: i64) -> PersistenceResult<bool> {
        self.inner.remove_event(id)
    }

    fn list_days(&self) -> PersistenceResult<Vec<NonWorkingDay>> {
        self.inner.list_days()
    }

    fn insert_day(&mut self, draft: NonWorkingDayDraft) -> PersistenceResult<NonWorkingDay> {
        if self.day_inserts_left == 0 {
            return Err(PersistenceError::InvalidData("disk full".into()));
        }
        self.day_inserts_left -= 1;
        self.inner.insert_day(draft)
    }

    fn update_day(&mut self, day: &NonWorkingDay) -> PersistenceResult<()> {
        self.inner.update_day(day)
    }

    fn remove_day(&mut self, id: i64) -> PersistenceResult<bool> {
        self.inner.remove_day(id)
    }

    fn in_transaction(&mut self, batch: &mut Batch<'_>) -> PersistenceResult<()> {
        apply_to_snapshot(self, batch)
    }
}

#[test]
fn append_grows_collections_by_exactly_n_and_m() {
    let mut store = seeded_store();
    let events_before = store.list_events().unwrap();
    let days_before = store.list_days().unwrap();

    let report = AppendImporter.apply(&mut store, incoming()).unwrap();
    assert_eq!(report.events_inserted, 3);
    assert_eq!(report.days_inserted, 2);
    assert_eq!(report.events_updated + report.events_skipped, 0);

    let events_after = store.list_events().unwrap();
    let days_after = store.list_days().unwrap();
    assert_eq!(events_after.len(), events_before.len() + 3);
    assert_eq!(days_after.len(), days_before.len() + 2);

    // Existing records are untouched and come first.
    assert_eq!(&events_after[..events_before.len()], events_before.as_slice());
    assert_eq!(&days_after[..days_before.len()], days_before.as_slice());

    // Imported records get fresh ids; content is kept.
    let imported: Vec<(i64, &str)> = events_after[events_before.len()..]
        .iter()
        .map(|e| (e.id, e.name.as_str()))
        .collect();
    assert_eq!(imported, vec![(3, "Imported"), (4, "Brand new"), (5, "Also new")]);
}

#[test]
fn replace_updates_matching_ids_and_inserts_the_rest() {
    let mut store = seeded_store();
    let report = ReplaceByIdImporter.apply(&mut store, incoming()).unwrap();
    assert_eq!(report.events_updated, 1);
    assert_eq!(report.events_inserted, 2);
    assert_eq!(report.days_updated, 1);
    assert_eq!(report.days_inserted, 1);

    let events = store.list_events().unwrap();
    assert_eq!(events.len(), 4);
    assert_eq!(events[0], Event::new(1, "Imported", d(2025, 3, 3)));
    assert_eq!(events[1].name, "Other");
    assert_eq!(store.list_days().unwrap()[0].name, "Holiday again");
}

#[test]
fn skip_duplicates_ignores_known_dates_including_within_batch() {
    let mut store = seeded_store();
    let report = SkipDuplicateDatesImporter
        .apply(&mut store, incoming())
        .unwrap();
    assert_eq!(report.events_inserted, 1);
    assert_eq!(report.events_skipped, 2);
    assert_eq!(report.days_inserted, 1);
    assert_eq!(report.days_skipped, 1);
    assert_eq!(store.list_events().unwrap().len(), 3);
    assert_eq!(store.list_days().unwrap().len(), 2);
}

#[test]
fn invalid_text_applies_nothing() {
    let mut tracker = Tracker::new(seeded_store());
    let text = r#"{"events":[{"id":1,"name":"ok","date":"2025-01-02"}],"days":[{"id":-1,"name":"x","date":"2025-01-03"}]}"#;
    let err = tracker.import_text(text, &AppendImporter).unwrap_err();
    assert!(matches!(err, PersistenceError::Validation(_)), "{err:?}");
    assert!(err.to_string().contains("days[0].id"), "{err}");
    assert_eq!(tracker.events().unwrap().len(), 2);
    assert_eq!(tracker.days().unwrap().len(), 1);
}

#[test]
fn empty_event_name_rejects_the_whole_import() {
    let mut store = seeded_store();
    let data = ExchangeData::new(
        vec![
            Event::new(1, "fine", d(2025, 1, 2)),
            Event::new(2, "   ", d(2025, 1, 3)),
        ],
        vec![NonWorkingDay::new(1, "x", d(2025, 1, 6))],
    );
    for strategy in [
        ImportStrategy::Append,
        ImportStrategy::Replace,
        ImportStrategy::SkipDuplicates,
    ] {
        let err = strategy
            .importer()
            .apply(&mut store, data.clone())
            .unwrap_err();
        assert!(matches!(err, PersistenceError::Entity(_)), "{err:?}");
    }
    assert_eq!(store.list_events().unwrap().len(), 2);
    assert_eq!(store.list_days().unwrap().len(), 1);
}

#[test]
fn strategy_parsing() {
    assert_eq!("append".parse::<ImportStrategy>(), Ok(ImportStrategy::Append));
    assert_eq!(" Replace ".parse::<ImportStrategy>(), Ok(ImportStrategy::Replace));
    assert_eq!(
        "skip-duplicates".parse::<ImportStrategy>(),
        Ok(ImportStrategy::SkipDuplicates)
    );
    assert!("merge".parse::<ImportStrategy>().is_err());
    assert_eq!(ImportStrategy::default(), ImportStrategy::Append);
    assert_eq!(ImportStrategy::SkipDuplicates.importer().name(), "skip_duplicates");
}

#[test]
fn report_summary_line() {
    let mut store = seeded_store();
    let report = AppendImporter.apply(&mut store, incoming()).unwrap();
    assert_eq!(
        report.to_cli_summary(),
        "events: +3 ~0 =0, days: +2 ~0 =0"
    );
}

#[test]
fn store_failure_midway_leaves_store_untouched() {
    for strategy in [
        ImportStrategy::Append,
        ImportStrategy::Replace,
        ImportStrategy::SkipDuplicates,
    ] {
        let mut store = FullDiskStore {
            inner: seeded_store(),
            day_inserts_left: 0,
        };
        let events_before = store.list_events().unwrap();
        let days_before = store.list_days().unwrap();

        let err = strategy
            .importer()
            .apply(&mut store, incoming())
            .unwrap_err();
        assert!(
            matches!(&err, PersistenceError::InvalidData(message) if message == "disk full"),
            "{strategy}: {err:?}"
        );
        assert_eq!(store.list_events().unwrap(), events_before, "{strategy}");
        assert_eq!(store.list_days().unwrap(), days_before, "{strategy}");
    }
}

#[test]
fn failed_batch_does_not_consume_ids() {
    let mut store = FullDiskStore {
        inner: seeded_store(),
        day_inserts_left: 1,
    };
    assert!(AppendImporter.apply(&mut store, incoming()).is_err());

    // The rolled back batch handed out ids 3..=5 on a discarded copy.
    let next = store
        .insert_event(EventDraft::new("After", d(2025, 5, 1)))
        .unwrap();
    assert_eq!(next.id, 3);
    assert_eq!(store.list_days().unwrap().len(), 1);
}
