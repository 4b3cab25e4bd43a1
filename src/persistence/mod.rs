use crate::entity_validation::EntityValidationError;
use crate::event::{Event, EventDraft, NonWorkingDay, NonWorkingDayDraft};
use crate::exchange::ValidationError;
use std::fmt;
use std::io;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Event,
    NonWorkingDay,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Event => "event",
            EntityKind::NonWorkingDay => "non-working day",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[cfg(feature = "sqlite")]
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("invalid record: {0}")]
    Entity(#[from] EntityValidationError),
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: i64 },
    #[error("invalid data: {0}")]
    InvalidData(String),
}

pub type PersistenceResult<T> = Result<T, PersistenceError>;

/// Record storage for the two entity collections.
///
/// Ids are positive, unique within their collection and assigned on insert.
/// Listings come back in ascending id order.
pub trait EntityStore {
    fn list_events(&self) -> PersistenceResult<Vec<Event>>;
    fn insert_event(&mut self, draft: EventDraft) -> PersistenceResult<Event>;
    fn update_event(&mut self, event: &Event) -> PersistenceResult<()>;
    fn remove_event(&mut self, id: i64) -> PersistenceResult<bool>;

    fn list_days(&self) -> PersistenceResult<Vec<NonWorkingDay>>;
    fn insert_day(&mut self, draft: NonWorkingDayDraft) -> PersistenceResult<NonWorkingDay>;
    fn update_day(&mut self, day: &NonWorkingDay) -> PersistenceResult<()>;
    fn remove_day(&mut self, id: i64) -> PersistenceResult<bool>;

    /// Run `batch` so that either every write it makes is kept or none is.
    fn in_transaction(&mut self, batch: &mut Batch<'_>) -> PersistenceResult<()>;
}

/// A group of writes applied through [`EntityStore::in_transaction`].
pub type Batch<'a> = dyn FnMut(&mut dyn EntityStore) -> PersistenceResult<()> + 'a;

/// Run `batch` on a copy of `store` and keep the copy only when it succeeds.
pub fn apply_to_snapshot<S>(store: &mut S, batch: &mut Batch<'_>) -> PersistenceResult<()>
where
    S: EntityStore + Clone,
{
    let mut staged = store.clone();
    batch(&mut staged)?;
    *store = staged;
    Ok(())
}

impl<S: EntityStore + ?Sized> EntityStore for Box<S> {
    fn list_events(&self) -> PersistenceResult<Vec<Event>> {
        (**self).list_events()
    }

    fn insert_event(&mut self, draft: EventDraft) -> PersistenceResult<Event> {
        (**self).insert_event(draft)
    }

    fn update_event(&mut self, event: &Event) -> PersistenceResult<()> {
        (**self).update_event(event)
    }

    fn remove_event(&mut self, id: i64) -> PersistenceResult<bool> {
        (**self).remove_event(id)
    }

    fn list_days(&self) -> PersistenceResult<Vec<NonWorkingDay>> {
        (**self).list_days()
    }

    fn insert_day(&mut self, draft: NonWorkingDayDraft) -> PersistenceResult<NonWorkingDay> {
        (**self).insert_day(draft)
    }

    fn update_day(&mut self, day: &NonWorkingDay) -> PersistenceResult<()> {
        (**self).update_day(day)
    }

    fn remove_day(&mut self, id: i64) -> PersistenceResult<bool> {
        (**self).remove_day(id)
    }

    fn in_transaction(&mut self, batch: &mut Batch<'_>) -> PersistenceResult<()> {
        (**self).in_transaction(batch)
    }
}

/// Store chosen at runtime.
pub type DynStore = Box<dyn EntityStore + Send>;

/// Open a SQLite store at `db_path`, or an in-memory store when no path is given.
pub fn open_store(db_path: Option<&Path>) -> PersistenceResult<DynStore> {
    match db_path {
        #[cfg(feature = "sqlite")]
        Some(path) => Ok(Box::new(sqlite::SqliteStore::open(path)?)),
        #[cfg(not(feature = "sqlite"))]
        Some(path) => Err(PersistenceError::InvalidData(format!(
            "cannot open {}: built without the `sqlite` feature",
            path.display()
        ))),
        None => Ok(Box::new(MemoryStore::new())),
    }
}

pub mod file;
pub mod memory;
#[cfg(feature = "sqlite")]
pub mod sqlite;

pub use file::{
    load_exchange_from_csv, load_exchange_from_json, save_exchange_to_csv, save_exchange_to_json,
};
pub use memory::MemoryStore;
