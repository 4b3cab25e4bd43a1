//! Merge policies for applying validated exchange data to a store.
//!
//! [`AppendImporter`] is the default: every imported record is inserted as a
//! new record, with a fresh id, regardless of what already exists.
//!
//! Every importer writes inside [`EntityStore::in_transaction`], so a store
//! error partway through a batch leaves the store as it was.

use crate::entity_validation::{EntityValidationError, validate_event_draft};
use crate::event::Event;
use crate::exchange::ExchangeData;
use crate::persistence::{EntityStore, PersistenceResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    pub events_inserted: usize,
    pub events_updated: usize,
    pub events_skipped: usize,
    pub days_inserted: usize,
    pub days_updated: usize,
    pub days_skipped: usize,
}

impl ImportReport {
    pub fn to_cli_summary(&self) -> String {
        format!(
            "events: +{} ~{} ={}, days: +{} ~{} ={}",
            self.events_inserted,
            self.events_updated,
            self.events_skipped,
            self.days_inserted,
            self.days_updated,
            self.days_skipped
        )
    }
}

pub trait Importer {
    fn name(&self) -> &'static str;

    fn apply(
        &self,
        store: &mut dyn EntityStore,
        data: ExchangeData,
    ) -> PersistenceResult<ImportReport>;
}

/// Every event must be insertable before anything is written.
fn check_events(events: &[Event]) -> Result<(), EntityValidationError> {
    events
        .iter()
        .try_for_each(|event| validate_event_draft(&event.draft()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AppendImporter;

impl Importer for AppendImporter {
    fn name(&self) -> &'static str {
        "append"
    }

    fn apply(
        &self,
        store: &mut dyn EntityStore,
        data: ExchangeData,
    ) -> PersistenceResult<ImportReport> {
        check_events(&data.events)?;
        let mut report = ImportReport::default();
        store.in_transaction(&mut |store: &mut dyn EntityStore| {
            for event in &data.events {
                store.insert_event(event.draft())?;
                report.events_inserted += 1;
            }
            for day in &data.days {
                store.insert_day(day.draft())?;
                report.days_inserted += 1;
            }
            Ok(())
        })?;
        Ok(report)
    }
}

/// Overwrites records whose id already exists and inserts the others.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReplaceByIdImporter;

impl Importer for ReplaceByIdImporter {
    fn name(&self) -> &'static str {
        "replace"
    }

    fn apply(
        &self,
        store: &mut dyn EntityStore,
        data: ExchangeData,
    ) -> PersistenceResult<ImportReport> {
        check_events(&data.events)?;
        let event_ids: HashSet<i64> = store.list_events()?.iter().map(|e| e.id).collect();
        let day_ids: HashSet<i64> = store.list_days()?.iter().map(|d| d.id).collect();

        let mut report = ImportReport::default();
        store.in_transaction(&mut |store: &mut dyn EntityStore| {
            for event in &data.events {
                if event_ids.contains(&event.id) {
                    store.update_event(event)?;
                    report.events_updated += 1;
                } else {
                    store.insert_event(event.draft())?;
                    report.events_inserted += 1;
                }
            }
            for day in &data.days {
                if day_ids.contains(&day.id) {
                    store.update_day(day)?;
                    report.days_updated += 1;
                } else {
                    store.insert_day(day.draft())?;
                    report.days_inserted += 1;
                }
            }
            Ok(())
        })?;
        Ok(report)
    }
}

/// Skips records whose date is already present in the target collection,
/// including dates introduced earlier in the same batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct SkipDuplicateDatesImporter;

impl Importer for SkipDuplicateDatesImporter {
    fn name(&self) -> &'static str {
        "skip_duplicates"
    }

    fn apply(
        &self,
        store: &mut dyn EntityStore,
        data: ExchangeData,
    ) -> PersistenceResult<ImportReport> {
        check_events(&data.events)?;
        let mut report = ImportReport::default();
        store.in_transaction(&mut |store: &mut dyn EntityStore| {
            let mut event_dates: HashSet<NaiveDate> =
                store.list_events()?.iter().map(|e| e.date).collect();
            let mut day_dates: HashSet<NaiveDate> =
                store.list_days()?.iter().map(|d| d.date).collect();

            for event in &data.events {
                if event_dates.insert(event.date) {
                    store.insert_event(event.draft())?;
                    report.events_inserted += 1;
                } else {
                    report.events_skipped += 1;
                }
            }
            for day in &data.days {
                if day_dates.insert(day.date) {
                    store.insert_day(day.draft())?;
                    report.days_inserted += 1;
                } else {
                    report.days_skipped += 1;
                }
            }
            Ok(())
        })?;
        Ok(report)
    }
}

/// Selectable merge policy, e.g. from a CLI argument or query string.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStrategy {
    #[default]
    Append,
    Replace,
    SkipDuplicates,
}

impl ImportStrategy {
    pub fn importer(&self) -> Box<dyn Importer + Send + Sync> {
        match self {
            ImportStrategy::Append => Box::new(AppendImporter),
            ImportStrategy::Replace => Box::new(ReplaceByIdImporter),
            ImportStrategy::SkipDuplicates => Box::new(SkipDuplicateDatesImporter),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ImportStrategy::Append => "append",
            ImportStrategy::Replace => "replace",
            ImportStrategy::SkipDuplicates => "skip_duplicates",
        }
    }
}

impl fmt::Display for ImportStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ImportStrategy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "append" => Ok(ImportStrategy::Append),
            "replace" => Ok(ImportStrategy::Replace),
            "skip_duplicates" | "skip-duplicates" => Ok(ImportStrategy::SkipDuplicates),
            other => Err(format!(
                "unknown import strategy '{other}' (expected append|replace|skip_duplicates)"
            )),
        }
    }
}
