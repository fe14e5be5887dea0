use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use supply_shared::{Shipment, ShipmentStatus};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ShipmentStatusRequest {
    pub status: ShipmentStatus,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/{id}", get(get_shipment))
        .route("/{id}/status", post(update_status))
}

async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    Ok(Json(state.engine.shipment(&id)?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<ShipmentStatusRequest>,
) -> Result<Json<Shipment>, AppError> {
    Ok(Json(state.engine.update_shipment_status(&id, req.status, req.notes)?))
}
