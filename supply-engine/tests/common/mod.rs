#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeZone, Utc};
use supply_core::TokioClock;
use supply_engine::SupplyChainEngine;
use supply_shared::models::purchase_order::{
    NewPurchaseOrder, NewPurchaseOrderItem, OrderPriority, PurchaseOrderType, ShippingSpec,
};
use supply_shared::models::supplier::{FinancialInfo, NewSupplier, SupplierContact, SupplierPerformance};
use supply_shared::{DomainEvent, PurchaseOrderStatus, SupplierTier, SupplierType};
use supply_store::Config;
use tokio::sync::broadcast;
use uuid::Uuid;

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap()
}

/// Engine on the paused tokio clock with a fixed seed
pub fn engine() -> SupplyChainEngine {
    let mut config = Config::default();
    config.engine.rng_seed = Some(42);
    SupplyChainEngine::builder(config)
        .clock(Arc::new(TokioClock::starting_at(start_time())))
        .build()
        .unwrap()
}

pub fn supplier_request(on_time: f64, quality: f64) -> NewSupplier {
    NewSupplier {
        name: "Harbor Metals".to_string(),
        supplier_type: SupplierType::RawMaterial,
        tier: SupplierTier::Tier2,
        status: None,
        rating: 7.5,
        contact: SupplierContact {
            contact_name: "Sam Okafor".to_string(),
            email: "sam@harbormetals.test".to_string(),
            phone: Some("+1 555 0100".to_string()),
            country: "US".to_string(),
            city: Some("Baltimore".to_string()),
        },
        financial: FinancialInfo {
            credit_rating: "A".to_string(),
            payment_terms: "Net 45".to_string(),
            annual_revenue: 40_000_000.0,
            currency: "USD".to_string(),
        },
        categories: vec!["steel".to_string()],
        certifications: vec![],
        performance: Some(SupplierPerformance {
            on_time_delivery: on_time,
            quality_score: quality,
            ..SupplierPerformance::default()
        }),
    }
}

pub fn order_request(supplier_id: Uuid, status: PurchaseOrderStatus) -> NewPurchaseOrder {
    NewPurchaseOrder {
        supplier_id,
        order_type: PurchaseOrderType::Standard,
        status,
        priority: OrderPriority::High,
        requester: "planner@acme.test".to_string(),
        approver: Some("lead@acme.test".to_string()),
        expected_delivery: start_time() + chrono::Duration::days(14),
        items: vec![
            NewPurchaseOrderItem {
                product_id: "P-STEEL".to_string(),
                sku: "STL-PLATE-10".to_string(),
                description: "10mm steel plate".to_string(),
                quantity: 40,
                unit_price: 250.0,
                specifications: vec![],
                quality_requirements: vec!["mill certificate".to_string()],
                delivery_date: None,
            },
            NewPurchaseOrderItem {
                product_id: "P-BOLT".to_string(),
                sku: "BLT-M12".to_string(),
                description: "M12 bolts".to_string(),
                quantity: 1000,
                unit_price: 0.5,
                specifications: vec![],
                quality_requirements: vec![],
                delivery_date: None,
            },
        ],
        terms: Default::default(),
        shipping: ShippingSpec {
            method: "truck".to_string(),
            carrier: "Blue Line Freight".to_string(),
            origin: "Baltimore".to_string(),
            destination: "Pittsburgh".to_string(),
            instructions: None,
        },
        documents: vec![],
        notes: vec![],
    }
}

/// Walk a draft order along the happy path until it reaches `target`
pub fn drive_to(engine: &SupplyChainEngine, order_id: &Uuid, target: PurchaseOrderStatus) {
    if matches!(target, PurchaseOrderStatus::Cancelled | PurchaseOrderStatus::Disputed) {
        engine.update_order_status(order_id, target, None).unwrap();
        return;
    }
    let mut status = engine.purchase_order(order_id).unwrap().status;
    while status != target {
        let next = status.next().unwrap();
        engine.update_order_status(order_id, next, None).unwrap();
        status = next;
    }
}

pub async fn advance(secs: u64) {
    tokio::time::sleep(Duration::from_secs(secs)).await;
}

/// Names of every event currently buffered on `rx`
pub fn drain(rx: &mut broadcast::Receiver<DomainEvent>) -> Vec<&'static str> {
    let mut names = Vec::new();
    while let Ok(event) = rx.try_recv() {
        names.push(event.name());
    }
    names
}
