use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use supply_api::{app, AppState};
use supply_engine::SupplyChainEngine;
use supply_store::Config;
use tower::ServiceExt;

fn test_app() -> (Router, SupplyChainEngine) {
    let mut config = Config::default();
    config.engine.rng_seed = Some(11);
    let engine = SupplyChainEngine::builder(config).build().unwrap();
    (app(AppState::new(engine.clone())), engine)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(body) => Body::from(body.to_string()),
            None => Body::empty(),
        })
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn supplier_body(on_time: f64) -> Value {
    json!({
        "name": "Delta Plastics",
        "supplier_type": "manufacturer",
        "tier": "tier1",
        "rating": 8.5,
        "contact": {
            "contact_name": "Lee Park",
            "email": "lee@deltaplastics.test",
            "phone": null,
            "country": "KR",
            "city": "Busan"
        },
        "financial": {
            "credit_rating": "A",
            "payment_terms": "Net 30",
            "annual_revenue": 8000000.0,
            "currency": "USD"
        },
        "performance": {
            "on_time_delivery": on_time,
            "quality_score": 8.0,
            "responsiveness": 8.0,
            "flexibility": 7.0,
            "cost_competitiveness": 7.0,
            "sustainability": 7.0,
            "total_orders": 0,
            "total_value": 0.0,
            "average_lead_time": 21.0,
            "defect_rate": 0.5,
            "return_rate": 0.2,
            "last_order_date": null
        }
    })
}

fn order_body(supplier_id: &str) -> Value {
    json!({
        "supplier_id": supplier_id,
        "requester": "buyer@acme.test",
        "expected_delivery": "2030-01-15T00:00:00Z",
        "items": [
            { "product_id": "P-CASE", "sku": "CASE-01", "quantity": 500, "unit_price": 2.4 }
        ],
        "shipping": {
            "method": "sea",
            "carrier": "Ocean Link",
            "origin": "Busan",
            "destination": "Long Beach",
            "instructions": null
        }
    })
}

#[tokio::test]
async fn test_health() {
    let (app, _) = test_app();
    let (status, body) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_supplier_and_order_flow() {
    let (app, _engine) = test_app();

    let (status, supplier) = send(&app, "POST", "/v1/suppliers", Some(supplier_body(97.0))).await;
    assert_eq!(status, StatusCode::CREATED);
    let supplier_id = supplier["id"].as_str().unwrap().to_string();

    let (status, listed) = send(&app, "GET", "/v1/suppliers?tier=tier1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, order) = send(&app, "POST", "/v1/purchase-orders", Some(order_body(&supplier_id))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["status"], "draft");
    assert_eq!(order["total_value"], 1200.0);
    let order_id = order["id"].as_str().unwrap().to_string();

    let uri = format!("/v1/purchase-orders/{}/status", order_id);
    let (status, body) = send(&app, "POST", &uri, Some(json!({ "status": "shipped" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("draft"));

    let (status, updated) = send(
        &app,
        "POST",
        &uri,
        Some(json!({ "status": "pending_approval", "notes": "needs sign-off" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["tracking"].as_array().unwrap().len(), 2);

    let (status, filtered) = send(&app, "GET", "/v1/purchase-orders?status=pending_approval", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(filtered.as_array().unwrap().len(), 1);

    let uri = format!("/v1/purchase-orders/{}/shipment", order_id);
    let (status, _) = send(&app, "GET", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_order_for_unknown_supplier() {
    let (app, _) = test_app();
    let body = order_body("6f1c2a4e-0000-4000-8000-000000000000");
    let (status, body) = send(&app, "POST", "/v1/purchase-orders", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_forecast_and_inventory() {
    let (app, _) = test_app();

    let (status, forecast) = send(
        &app,
        "POST",
        "/v1/forecasts",
        Some(json!({ "product_id": "P-CASE", "sku": "CASE-01" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(forecast["forecast"].as_array().unwrap().len(), 6);
    assert_eq!(forecast["forecast"][0]["predicted"], 1065.0);

    let (status, _) = send(&app, "GET", "/v1/forecasts/P-CASE", None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/inventory/optimize",
        Some(json!({ "product_id": "P-CASE", "current_stock": -3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, optimization) = send(
        &app,
        "POST",
        "/v1/inventory/optimize",
        Some(json!({ "product_id": "P-NEW", "current_stock": 100 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(optimization["economic_order_quantity"], 840);
    assert_eq!(optimization["reorder_point"], 1276);

    let (status, _) = send(&app, "GET", "/v1/inventory/P-NEW", None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_events_and_kpis() {
    let (app, engine) = test_app();
    send(&app, "POST", "/v1/suppliers", Some(supplier_body(80.0))).await;
    engine.run_monitoring_scan();

    let (status, events) = send(&app, "GET", "/v1/events?severity=medium&status=active", None).await;
    assert_eq!(status, StatusCode::OK);
    let events = events.as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["event_type"], "supplier_issue");
    let event_id = events[0]["id"].as_str().unwrap().to_string();

    let (_, kpis) = send(&app, "GET", "/v1/kpis", None).await;
    assert_eq!(kpis["total_suppliers"], 1);
    assert_eq!(kpis["active_events"], 1);
    assert_eq!(kpis["average_lead_time"], 21.0);

    let uri = format!("/v1/events/{}/resolve", event_id);
    let (status, resolved) = send(&app, "POST", &uri, Some(json!({ "resolution": "Plan agreed" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(resolved["status"], "resolved");

    let (status, _) = send(&app, "POST", &uri, Some(json!({ "resolution": "again" }))).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (_, kpis) = send(&app, "GET", "/v1/kpis", None).await;
    assert_eq!(kpis["active_events"], 0);
}
