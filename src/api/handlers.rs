use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::error::{Result, TrackerError};
use crate::model::{NewSpool, NewUsageLog, SpoolId};
use crate::store::{LocalStore, SpoolStore};
use crate::wire::{ApiLog, ApiSpool, CreatedResponse, SuccessResponse};

/// Application state shared across handlers
pub struct AppState {
    pub store: LocalStore,
}

impl AppState {
    pub fn new(store: LocalStore) -> Self {
        Self { store }
    }
}

/// Health check
pub async fn health() -> &'static str {
    "ok"
}

/// List all spools, photos inline
pub async fn list_filaments(State(state): State<Arc<AppState>>) -> Result<Json<Vec<ApiSpool>>> {
    let spools = state.store.list_spools().await?;
    Ok(Json(spools.iter().map(ApiSpool::from).collect()))
}

/// Get a single spool
pub async fn get_filament(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SpoolId>,
) -> Result<Json<ApiSpool>> {
    let spool = state
        .store
        .get_spool(id)
        .await?
        .ok_or(TrackerError::SpoolNotFound(id))?;
    Ok(Json(ApiSpool::from(&spool)))
}

/// Create a spool
pub async fn create_filament(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ApiSpool>,
) -> Result<Json<CreatedResponse>> {
    let spool = NewSpool::try_from(body)?;
    let id = state.store.add_spool(spool).await?;
    tracing::info!("Created spool {}", id);
    Ok(Json(CreatedResponse { id }))
}

/// Delete a spool and its history
pub async fn delete_filament(
    State(state): State<Arc<AppState>>,
    Path(id): Path<SpoolId>,
) -> Result<Json<SuccessResponse>> {
    state.store.delete_spool(id).await?;
    tracing::info!("Deleted spool {}", id);
    Ok(Json(SuccessResponse::ok()))
}

/// History for one spool, newest first
pub async fn list_logs(
    State(state): State<Arc<AppState>>,
    Path(filament_id): Path<SpoolId>,
) -> Result<Json<Vec<ApiLog>>> {
    let logs = state.store.list_logs(filament_id).await?;
    Ok(Json(logs.iter().map(ApiLog::from).collect()))
}

/// Append a log entry and apply its change to the spool's weight
pub async fn append_log(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ApiLog>,
) -> Result<Json<SuccessResponse>> {
    let log = NewUsageLog::try_from(body)?;
    let spool_id = log.spool_id;
    let weight = state.store.apply_log_delta(log).await?;
    tracing::info!("Spool {} weight is now {}g", spool_id, weight);
    Ok(Json(SuccessResponse::ok()))
}
