use crate::event::{Event, EventDraft, NonWorkingDay};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EntityValidationError {
    #[error("{kind} id must be a positive integer (got {id})")]
    NonPositiveId { kind: &'static str, id: i64 },
    #[error("event name must not be empty")]
    EmptyEventName,
}

fn validate_id(kind: &'static str, id: i64) -> Result<(), EntityValidationError> {
    if id <= 0 {
        return Err(EntityValidationError::NonPositiveId { kind, id });
    }
    Ok(())
}

fn validate_event_name(name: &str) -> Result<(), EntityValidationError> {
    if name.trim().is_empty() {
        return Err(EntityValidationError::EmptyEventName);
    }
    Ok(())
}

pub fn validate_event_draft(draft: &EventDraft) -> Result<(), EntityValidationError> {
    validate_event_name(&draft.name)
}

pub fn validate_event(event: &Event) -> Result<(), EntityValidationError> {
    validate_id("event", event.id)?;
    validate_event_name(&event.name)
}

pub fn validate_day(day: &NonWorkingDay) -> Result<(), EntityValidationError> {
    validate_id("non-working day", day.id)
}
