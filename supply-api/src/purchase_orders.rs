use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use supply_shared::models::purchase_order::{NewPurchaseOrder, PurchaseOrderFilter};
use supply_shared::{PurchaseOrder, PurchaseOrderStatus, Shipment};
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: PurchaseOrderStatus,
    pub notes: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/{id}", get(get_order))
        .route("/{id}/status", post(update_status))
        .route("/{id}/shipment", get(get_shipment))
}

async fn create_order(
    State(state): State<AppState>,
    Json(req): Json<NewPurchaseOrder>,
) -> Result<(StatusCode, Json<PurchaseOrder>), AppError> {
    let order = state.engine.create_purchase_order(req)?;
    Ok((StatusCode::CREATED, Json(order)))
}

async fn list_orders(
    State(state): State<AppState>,
    Query(filter): Query<PurchaseOrderFilter>,
) -> Json<Vec<PurchaseOrder>> {
    Json(state.engine.purchase_orders(&filter))
}

async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<PurchaseOrder>, AppError> {
    Ok(Json(state.engine.purchase_order(&id)?))
}

async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateStatusRequest>,
) -> Result<Json<PurchaseOrder>, AppError> {
    Ok(Json(state.engine.update_order_status(&id, req.status, req.notes)?))
}

async fn get_shipment(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Shipment>, AppError> {
    Ok(Json(state.engine.shipment_for_order(&id)?))
}
