use std::{net::SocketAddr, sync::Arc};

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{Local, NaiveDate};
use log::{info, warn};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    DynStore, EntityKind, Event, EventDraft, ExchangeData, ImportReport, ImportStrategy,
    NonWorkingDay, NonWorkingDayDraft, PersistenceError, ResultQuery, ResultRow, ResultSummary,
    Tracker,
};

#[derive(Clone)]
pub struct AppState {
    tracker: Arc<Mutex<Tracker<DynStore>>>,
    minimum_business_days: i64,
}

impl AppState {
    pub fn new(tracker: Tracker<DynStore>) -> Self {
        Self {
            tracker: Arc::new(Mutex::new(tracker)),
            minimum_business_days: 0,
        }
    }

    pub fn with_minimum_business_days(mut self, minimum_business_days: i64) -> Self {
        self.minimum_business_days = minimum_business_days;
        self
    }

    fn tracker(&self) -> Arc<Mutex<Tracker<DynStore>>> {
        self.tracker.clone()
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    message: String,
}

#[derive(Debug)]
enum ApiError {
    NotFound(String),
    Invalid(String),
    Internal(String),
}

impl ApiError {
    fn not_found(kind: EntityKind, id: i64) -> Self {
        ApiError::NotFound(format!("{kind} {id} not found"))
    }

    fn invalid(message: impl Into<String>) -> Self {
        ApiError::Invalid(message.into())
    }
}

impl From<PersistenceError> for ApiError {
    fn from(value: PersistenceError) -> Self {
        let message = value.to_string();
        match value {
            PersistenceError::Validation(_) | PersistenceError::Entity(_) => {
                ApiError::Invalid(message)
            }
            PersistenceError::NotFound { .. } => ApiError::NotFound(message),
            _ => ApiError::Internal(message),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, message) = match self {
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, "not_found", message),
            ApiError::Invalid(message) => (StatusCode::BAD_REQUEST, "invalid_request", message),
            ApiError::Internal(message) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", message)
            }
        };
        (status, Json(ErrorBody { error, message })).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct ResultsParams {
    #[serde(default)]
    search: Option<String>,
    #[serde(default)]
    minimum: Option<i64>,
    #[serde(default)]
    today: Option<NaiveDate>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub today: NaiveDate,
    pub summary: ResultSummary,
    pub rows: Vec<ResultRow>,
}

#[derive(Debug, Deserialize)]
struct ImportParams {
    #[serde(default)]
    strategy: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/events", get(list_events).post(create_event))
        .route(
            "/events/:id",
            get(get_event).put(update_event).delete(delete_event),
        )
        .route("/days", get(list_days).post(create_day))
        .route("/days/:id", get(get_day).put(update_day).delete(delete_day))
        .route("/results", get(get_results))
        .route("/import", post(import_data))
        .route("/export", get(export_data))
        .with_state(state)
}

pub async fn serve(addr: SocketAddr, state: AppState) -> std::io::Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("event=http_listen module=http_api addr={addr}");
    axum::serve(listener, app).await
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}

async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let tracker = state.tracker();
    let events = tracker.lock().events()?;
    Ok(Json(events))
}

async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<Json<Event>, ApiError> {
    let tracker = state.tracker();
    let events = tracker.lock().events()?;
    events
        .into_iter()
        .find(|event| event.id == event_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(EntityKind::Event, event_id))
}

async fn create_event(
    State(state): State<AppState>,
    Json(draft): Json<EventDraft>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let tracker = state.tracker();
    let created = tracker.lock().add_event(draft)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
    Json(draft): Json<EventDraft>,
) -> Result<Json<Event>, ApiError> {
    let event = draft.with_id(event_id);
    let tracker = state.tracker();
    tracker.lock().update_event(&event)?;
    Ok(Json(event))
}

async fn delete_event(
    State(state): State<AppState>,
    Path(event_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let tracker = state.tracker();
    let removed = tracker.lock().delete_event(event_id)?;
    if !removed {
        return Err(ApiError::not_found(EntityKind::Event, event_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn list_days(State(state): State<AppState>) -> Result<Json<Vec<NonWorkingDay>>, ApiError> {
    let tracker = state.tracker();
    let days = tracker.lock().days()?;
    Ok(Json(days))
}

async fn get_day(
    State(state): State<AppState>,
    Path(day_id): Path<i64>,
) -> Result<Json<NonWorkingDay>, ApiError> {
    let tracker = state.tracker();
    let days = tracker.lock().days()?;
    days.into_iter()
        .find(|day| day.id == day_id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(EntityKind::NonWorkingDay, day_id))
}

async fn create_day(
    State(state): State<AppState>,
    Json(draft): Json<NonWorkingDayDraft>,
) -> Result<(StatusCode, Json<NonWorkingDay>), ApiError> {
    let tracker = state.tracker();
    let created = tracker.lock().add_day(draft)?;
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_day(
    State(state): State<AppState>,
    Path(day_id): Path<i64>,
    Json(draft): Json<NonWorkingDayDraft>,
) -> Result<Json<NonWorkingDay>, ApiError> {
    let day = draft.with_id(day_id);
    let tracker = state.tracker();
    tracker.lock().update_day(&day)?;
    Ok(Json(day))
}

async fn delete_day(
    State(state): State<AppState>,
    Path(day_id): Path<i64>,
) -> Result<StatusCode, ApiError> {
    let tracker = state.tracker();
    let removed = tracker.lock().delete_day(day_id)?;
    if !removed {
        return Err(ApiError::not_found(EntityKind::NonWorkingDay, day_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn get_results(
    State(state): State<AppState>,
    Query(params): Query<ResultsParams>,
) -> Result<Json<ResultsResponse>, ApiError> {
    let today = params.today.unwrap_or_else(|| Local::now().date_naive());
    let query = ResultQuery::new(
        params.search.unwrap_or_default(),
        params.minimum.unwrap_or(state.minimum_business_days),
    );
    let tracker = state.tracker();
    let rows = tracker.lock().view(today, &query)?;
    let summary = ResultSummary::from_rows(&rows);
    Ok(Json(ResultsResponse {
        today,
        summary,
        rows,
    }))
}

async fn import_data(
    State(state): State<AppState>,
    Query(params): Query<ImportParams>,
    body: String,
) -> Result<Json<ImportReport>, ApiError> {
    let strategy = match params.strategy.as_deref() {
        Some(raw) => raw.parse::<ImportStrategy>().map_err(ApiError::invalid)?,
        None => ImportStrategy::default(),
    };
    let importer = strategy.importer();
    let tracker = state.tracker();
    let report = tracker
        .lock()
        .import_text(&body, importer.as_ref())
        .inspect_err(|err| warn!("event=http_import module=http_api status=error error={err}"))?;
    Ok(Json(report))
}

async fn export_data(State(state): State<AppState>) -> Result<Json<ExchangeData>, ApiError> {
    let tracker = state.tracker();
    let data = tracker.lock().export_data()?;
    Ok(Json(data))
}
