use crate::calendar::is_weekend;
use crate::event::{Event, EventDraft, NonWorkingDay, NonWorkingDayDraft};
use crate::exchange::{self, ExchangeData};
use crate::import::{ImportReport, Importer};
use crate::persistence::{EntityStore, PersistenceResult};
use crate::results::{self, ComputedResult, ResultQuery, ResultRow, ResultSummary};
use chrono::NaiveDate;
use log::{info, warn};

/// Entry point for presentations: record edits, result queries and data exchange
/// over one store. Results are recomputed from the store on every call.
pub struct Tracker<S: EntityStore> {
    store: S,
}

impl<S: EntityStore> Tracker<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn events(&self) -> PersistenceResult<Vec<Event>> {
        self.store.list_events()
    }

    pub fn days(&self) -> PersistenceResult<Vec<NonWorkingDay>> {
        self.store.list_days()
    }

    pub fn add_event(&mut self, draft: EventDraft) -> PersistenceResult<Event> {
        let event = self.store.insert_event(draft)?;
        info!("event=event_add module=tracker id={} date={}", event.id, event.date);
        Ok(event)
    }

    pub fn update_event(&mut self, event: &Event) -> PersistenceResult<()> {
        self.store.update_event(event)?;
        info!("event=event_update module=tracker id={} date={}", event.id, event.date);
        Ok(())
    }

    pub fn delete_event(&mut self, id: i64) -> PersistenceResult<bool> {
        let removed = self.store.remove_event(id)?;
        info!("event=event_delete module=tracker id={id} removed={removed}");
        Ok(removed)
    }

    pub fn add_day(&mut self, draft: NonWorkingDayDraft) -> PersistenceResult<NonWorkingDay> {
        let day = self.store.insert_day(draft)?;
        warn_weekend_day(&day);
        info!("event=day_add module=tracker id={} date={}", day.id, day.date);
        Ok(day)
    }

    pub fn update_day(&mut self, day: &NonWorkingDay) -> PersistenceResult<()> {
        self.store.update_day(day)?;
        warn_weekend_day(day);
        info!("event=day_update module=tracker id={} date={}", day.id, day.date);
        Ok(())
    }

    pub fn delete_day(&mut self, id: i64) -> PersistenceResult<bool> {
        let removed = self.store.remove_day(id)?;
        info!("event=day_delete module=tracker id={id} removed={removed}");
        Ok(removed)
    }

    pub fn results(&self, today: NaiveDate) -> PersistenceResult<Vec<ComputedResult>> {
        let events = self.store.list_events()?;
        let days = self.store.list_days()?;
        Ok(results::compute_results(&events, &days, today))
    }

    pub fn view(&self, today: NaiveDate, query: &ResultQuery) -> PersistenceResult<Vec<ResultRow>> {
        Ok(results::query_results(&self.results(today)?, query))
    }

    pub fn summary(
        &self,
        today: NaiveDate,
        minimum_business_days: i64,
    ) -> PersistenceResult<ResultSummary> {
        let rows = results::flag_at_risk(&self.results(today)?, minimum_business_days);
        Ok(ResultSummary::from_rows(&rows))
    }

    /// Validate `text` and hand it to `importer`. Nothing is written when validation fails.
    pub fn import_text(
        &mut self,
        text: &str,
        importer: &dyn Importer,
    ) -> PersistenceResult<ImportReport> {
        let data = exchange::parse_import(text).inspect_err(|err| {
            warn!("event=import module=tracker status=rejected strategy={} error={err}", importer.name());
        })?;
        self.import_data(data, importer)
    }

    pub fn import_data(
        &mut self,
        data: ExchangeData,
        importer: &dyn Importer,
    ) -> PersistenceResult<ImportReport> {
        let report = importer.apply(&mut self.store, data)?;
        info!(
            "event=import module=tracker status=ok strategy={} events_inserted={} days_inserted={}",
            importer.name(),
            report.events_inserted,
            report.days_inserted
        );
        Ok(report)
    }

    pub fn export_data(&self) -> PersistenceResult<ExchangeData> {
        Ok(ExchangeData::new(
            self.store.list_events()?,
            self.store.list_days()?,
        ))
    }

    pub fn export_text(&self) -> PersistenceResult<String> {
        Ok(exchange::serialize_export(&self.export_data()?)?)
    }
}

fn warn_weekend_day(day: &NonWorkingDay) {
    if is_weekend(day.date) {
        warn!(
            "event=weekend_exclusion module=tracker id={} date={} note=counted_in_addition_to_weekend",
            day.id, day.date
        );
    }
}
