//! Forecast, inventory and KPI endpoints.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use supply_shared::{DemandForecast, InventoryOptimization, SupplyChainKpis};

use crate::{error::AppError, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ForecastRequest {
    pub product_id: String,
    pub sku: String,
}

#[derive(Debug, Deserialize)]
pub struct OptimizeRequest {
    pub product_id: String,
    pub current_stock: i64,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/forecasts", post(generate_forecast))
        .route("/v1/forecasts/{product_id}", get(get_forecast))
        .route("/v1/inventory/optimize", post(optimize_inventory))
        .route("/v1/inventory/{product_id}", get(get_optimization))
        .route("/v1/kpis", get(kpis))
}

async fn generate_forecast(
    State(state): State<AppState>,
    Json(req): Json<ForecastRequest>,
) -> Result<(StatusCode, Json<DemandForecast>), AppError> {
    let forecast = state.engine.generate_demand_forecast(&req.product_id, &req.sku)?;
    Ok((StatusCode::CREATED, Json(forecast)))
}

async fn get_forecast(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<DemandForecast>, AppError> {
    Ok(Json(state.engine.demand_forecast(&product_id)?))
}

async fn optimize_inventory(
    State(state): State<AppState>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<InventoryOptimization>, AppError> {
    Ok(Json(state.engine.optimize_inventory(&req.product_id, req.current_stock)?))
}

async fn get_optimization(
    State(state): State<AppState>,
    Path(product_id): Path<String>,
) -> Result<Json<InventoryOptimization>, AppError> {
    Ok(Json(state.engine.inventory_optimization(&product_id)?))
}

async fn kpis(State(state): State<AppState>) -> Json<SupplyChainKpis> {
    Json(state.engine.kpis())
}
