use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use supply_shared::models::incident::{ActionStatus, EventFilter};
use supply_shared::SupplyChainEvent;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ResolveRequest {
    pub resolution: String,
}

#[derive(Debug, Deserialize)]
pub struct EscalateRequest {
    pub escalated_to: String,
}

#[derive(Debug, Deserialize)]
pub struct ActionUpdateRequest {
    pub status: ActionStatus,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_events))
        .route("/{id}", get(get_event))
        .route("/{id}/resolve", post(resolve))
        .route("/{id}/escalate", post(escalate))
        .route("/{id}/monitor", post(monitor))
        .route("/{id}/actions/{action_id}", post(update_action))
}

async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Json<Vec<SupplyChainEvent>> {
    Json(state.engine.supply_chain_events(&filter))
}

async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplyChainEvent>, AppError> {
    Ok(Json(state.engine.supply_chain_event(&id)?))
}

async fn resolve(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<SupplyChainEvent>, AppError> {
    Ok(Json(state.engine.resolve_event(&id, &req.resolution)?))
}

async fn escalate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<EscalateRequest>,
) -> Result<Json<SupplyChainEvent>, AppError> {
    Ok(Json(state.engine.escalate_event(&id, &req.escalated_to)?))
}

async fn monitor(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplyChainEvent>, AppError> {
    Ok(Json(state.engine.monitor_event(&id)?))
}

async fn update_action(
    State(state): State<AppState>,
    Path((id, action_id)): Path<(Uuid, Uuid)>,
    Json(req): Json<ActionUpdateRequest>,
) -> Result<Json<SupplyChainEvent>, AppError> {
    Ok(Json(state.engine.update_response_action(&id, &action_id, req.status)?))
}
