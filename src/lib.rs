pub mod calendar;
pub mod config;
pub mod entity_validation;
pub mod event;
pub mod exchange;
#[cfg(feature = "http_api")]
pub mod http_api;
pub mod import;
pub mod logging;
pub mod persistence;
pub mod results;
pub mod tracker;

pub use calendar::{ExclusionSet, business_days_between};
pub use config::{AppConfig, ConfigError};
pub use entity_validation::EntityValidationError;
pub use event::{Event, EventDraft, NonWorkingDay, NonWorkingDayDraft};
pub use exchange::{ExchangeData, ValidationError, parse_import, serialize_export, validate};
pub use import::{
    AppendImporter, ImportReport, ImportStrategy, Importer, ReplaceByIdImporter,
    SkipDuplicateDatesImporter,
};
#[cfg(feature = "sqlite")]
pub use persistence::sqlite::SqliteStore;
pub use persistence::{
    Batch, DynStore, EntityKind, EntityStore, MemoryStore, PersistenceError, PersistenceResult,
    apply_to_snapshot, load_exchange_from_csv, load_exchange_from_json, open_store, save_exchange_to_csv,
    save_exchange_to_json,
};
pub use results::{
    ComputedResult, ResultQuery, ResultRow, ResultSummary, compute_results, filter_by_name,
    flag_at_risk, query_results, sort_by_business_days,
};
pub use tracker::Tracker;
