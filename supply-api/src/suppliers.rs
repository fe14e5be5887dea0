use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use supply_shared::models::supplier::{NewSupplier, SupplierFilter};
use supply_shared::Supplier;
use uuid::Uuid;

use crate::{error::AppError, state::AppState};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", post(add_supplier).get(list_suppliers))
        .route("/{id}", get(get_supplier))
        .route("/{id}/risk-assessment", post(assess_risk))
}

async fn add_supplier(
    State(state): State<AppState>,
    Json(req): Json<NewSupplier>,
) -> Result<(StatusCode, Json<Supplier>), AppError> {
    let supplier = state.engine.add_supplier(req)?;
    Ok((StatusCode::CREATED, Json(supplier)))
}

async fn list_suppliers(
    State(state): State<AppState>,
    Query(filter): Query<SupplierFilter>,
) -> Json<Vec<Supplier>> {
    Json(state.engine.suppliers(&filter))
}

async fn get_supplier(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    Ok(Json(state.engine.supplier(&id)?))
}

async fn assess_risk(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Supplier>, AppError> {
    Ok(Json(state.engine.assess_supplier_risk(&id)?))
}
