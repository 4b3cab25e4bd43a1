use super::{Batch, EntityKind, EntityStore, PersistenceError, PersistenceResult, apply_to_snapshot};
use crate::entity_validation::{self, validate_day, validate_event};
use crate::event::{Event, EventDraft, NonWorkingDay, NonWorkingDayDraft};
use std::collections::BTreeMap;

/// Volatile store with auto-incrementing ids. Removed ids are never reused.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    events: BTreeMap<i64, Event>,
    days: BTreeMap<i64, NonWorkingDay>,
    next_event_id: i64,
    next_day_id: i64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self {
            events: BTreeMap::new(),
            days: BTreeMap::new(),
            next_event_id: 1,
            next_day_id: 1,
        }
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EntityStore for MemoryStore {
    fn list_events(&self) -> PersistenceResult<Vec<Event>> {
        Ok(self.events.values().cloned().collect())
    }

    fn insert_event(&mut self, draft: EventDraft) -> PersistenceResult<Event> {
        entity_validation::validate_event_draft(&draft)?;
        let event = draft.with_id(self.next_event_id);
        self.next_event_id += 1;
        self.events.insert(event.id, event.clone());
        Ok(event)
    }

    fn update_event(&mut self, event: &Event) -> PersistenceResult<()> {
        validate_event(event)?;
        match self.events.get_mut(&event.id) {
            Some(stored) => {
                *stored = event.clone();
                Ok(())
            }
            None => Err(PersistenceError::NotFound {
                kind: EntityKind::Event,
                id: event.id,
            }),
        }
    }

    fn remove_event(&mut self, id: i64) -> PersistenceResult<bool> {
        Ok(self.events.remove(&id).is_some())
    }

    fn list_days(&self) -> PersistenceResult<Vec<NonWorkingDay>> {
        Ok(self.days.values().cloned().collect())
    }

    fn insert_day(&mut self, draft: NonWorkingDayDraft) -> PersistenceResult<NonWorkingDay> {
        let day = draft.with_id(self.next_day_id);
        self.next_day_id += 1;
        self.days.insert(day.id, day.clone());
        Ok(day)
    }

    fn update_day(&mut self, day: &NonWorkingDay) -> PersistenceResult<()> {
        validate_day(day)?;
        match self.days.get_mut(&day.id) {
            Some(stored) => {
                *stored = day.clone();
                Ok(())
            }
            None => Err(PersistenceError::NotFound {
                kind: EntityKind::NonWorkingDay,
                id: day.id,
            }),
        }
    }

    fn remove_day(&mut self, id: i64) -> PersistenceResult<bool> {
        Ok(self.days.remove(&id).is_some())
    }

    fn in_transaction(&mut self, batch: &mut Batch<'_>) -> PersistenceResult<()> {
        apply_to_snapshot(self, batch)
    }
}
