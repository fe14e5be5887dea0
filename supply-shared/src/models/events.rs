use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::forecast::DemandForecast;
use super::incident::{ResponseAction, SupplyChainEvent};
use super::inventory::InventoryOptimization;
use super::purchase_order::{PurchaseOrder, PurchaseOrderStatus};
use super::shipment::Shipment;
use super::supplier::{RiskProfile, Supplier, SupplierPerformance};

/// Topic names emitted by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    SupplierAdded,
    PurchaseOrderCreated,
    PurchaseOrderSent,
    PurchaseOrderAcknowledged,
    OrderStatusUpdated,
    ShipmentCreated,
    ShipmentTrackingUpdated,
    DeliveryProcessed,
    SupplierPerformanceUpdated,
    SupplierRiskAssessed,
    DemandForecastGenerated,
    DemandForecastUpdated,
    InventoryOptimized,
    SupplyChainEventCreated,
    ResponseActionsGenerated,
}

impl EventKind {
    pub const ALL: [EventKind; 15] = [
        Self::SupplierAdded,
        Self::PurchaseOrderCreated,
        Self::PurchaseOrderSent,
        Self::PurchaseOrderAcknowledged,
        Self::OrderStatusUpdated,
        Self::ShipmentCreated,
        Self::ShipmentTrackingUpdated,
        Self::DeliveryProcessed,
        Self::SupplierPerformanceUpdated,
        Self::SupplierRiskAssessed,
        Self::DemandForecastGenerated,
        Self::DemandForecastUpdated,
        Self::InventoryOptimized,
        Self::SupplyChainEventCreated,
        Self::ResponseActionsGenerated,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupplierAdded => "supplier_added",
            Self::PurchaseOrderCreated => "purchase_order_created",
            Self::PurchaseOrderSent => "purchase_order_sent",
            Self::PurchaseOrderAcknowledged => "purchase_order_acknowledged",
            Self::OrderStatusUpdated => "order_status_updated",
            Self::ShipmentCreated => "shipment_created",
            Self::ShipmentTrackingUpdated => "shipment_tracking_updated",
            Self::DeliveryProcessed => "delivery_processed",
            Self::SupplierPerformanceUpdated => "supplier_performance_updated",
            Self::SupplierRiskAssessed => "supplier_risk_assessed",
            Self::DemandForecastGenerated => "demand_forecast_generated",
            Self::DemandForecastUpdated => "demand_forecast_updated",
            Self::InventoryOptimized => "inventory_optimized",
            Self::SupplyChainEventCreated => "supply_chain_event_created",
            Self::ResponseActionsGenerated => "response_actions_generated",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct OrderStatusUpdatedEvent {
    pub order: PurchaseOrder,
    pub previous_status: PurchaseOrderStatus,
    pub new_status: PurchaseOrderStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct DeliveryProcessedEvent {
    pub order_id: Uuid,
    pub shipment_id: Option<Uuid>,
    pub supplier_id: Uuid,
    pub on_time: bool,
    pub order_value: f64,
    pub actual_delivery: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SupplierPerformanceUpdatedEvent {
    pub supplier_id: Uuid,
    pub performance: SupplierPerformance,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SupplierRiskAssessedEvent {
    pub supplier_id: Uuid,
    pub risk_profile: RiskProfile,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ResponseActionsGeneratedEvent {
    pub event_id: Uuid,
    pub actions: Vec<ResponseAction>,
}

/// Everything an observer can see, one variant per topic
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "event", content = "payload", rename_all = "snake_case")]
pub enum DomainEvent {
    SupplierAdded(Supplier),
    PurchaseOrderCreated(PurchaseOrder),
    PurchaseOrderSent(PurchaseOrder),
    PurchaseOrderAcknowledged(PurchaseOrder),
    OrderStatusUpdated(OrderStatusUpdatedEvent),
    ShipmentCreated(Shipment),
    ShipmentTrackingUpdated(Shipment),
    DeliveryProcessed(DeliveryProcessedEvent),
    SupplierPerformanceUpdated(SupplierPerformanceUpdatedEvent),
    SupplierRiskAssessed(SupplierRiskAssessedEvent),
    DemandForecastGenerated(DemandForecast),
    DemandForecastUpdated(DemandForecast),
    InventoryOptimized(InventoryOptimization),
    SupplyChainEventCreated(SupplyChainEvent),
    ResponseActionsGenerated(ResponseActionsGeneratedEvent),
}

impl DomainEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            Self::SupplierAdded(_) => EventKind::SupplierAdded,
            Self::PurchaseOrderCreated(_) => EventKind::PurchaseOrderCreated,
            Self::PurchaseOrderSent(_) => EventKind::PurchaseOrderSent,
            Self::PurchaseOrderAcknowledged(_) => EventKind::PurchaseOrderAcknowledged,
            Self::OrderStatusUpdated(_) => EventKind::OrderStatusUpdated,
            Self::ShipmentCreated(_) => EventKind::ShipmentCreated,
            Self::ShipmentTrackingUpdated(_) => EventKind::ShipmentTrackingUpdated,
            Self::DeliveryProcessed(_) => EventKind::DeliveryProcessed,
            Self::SupplierPerformanceUpdated(_) => EventKind::SupplierPerformanceUpdated,
            Self::SupplierRiskAssessed(_) => EventKind::SupplierRiskAssessed,
            Self::DemandForecastGenerated(_) => EventKind::DemandForecastGenerated,
            Self::DemandForecastUpdated(_) => EventKind::DemandForecastUpdated,
            Self::InventoryOptimized(_) => EventKind::InventoryOptimized,
            Self::SupplyChainEventCreated(_) => EventKind::SupplyChainEventCreated,
            Self::ResponseActionsGenerated(_) => EventKind::ResponseActionsGenerated,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    /// Payload alone, without the topic envelope
    pub fn payload(&self) -> serde_json::Result<serde_json::Value> {
        match self {
            Self::SupplierAdded(p) => serde_json::to_value(p),
            Self::PurchaseOrderCreated(p)
            | Self::PurchaseOrderSent(p)
            | Self::PurchaseOrderAcknowledged(p) => serde_json::to_value(p),
            Self::OrderStatusUpdated(p) => serde_json::to_value(p),
            Self::ShipmentCreated(p) | Self::ShipmentTrackingUpdated(p) => serde_json::to_value(p),
            Self::DeliveryProcessed(p) => serde_json::to_value(p),
            Self::SupplierPerformanceUpdated(p) => serde_json::to_value(p),
            Self::SupplierRiskAssessed(p) => serde_json::to_value(p),
            Self::DemandForecastGenerated(p) | Self::DemandForecastUpdated(p) => {
                serde_json::to_value(p)
            }
            Self::InventoryOptimized(p) => serde_json::to_value(p),
            Self::SupplyChainEventCreated(p) => serde_json::to_value(p),
            Self::ResponseActionsGenerated(p) => serde_json::to_value(p),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_uses_topic_name() {
        let event = DomainEvent::ResponseActionsGenerated(ResponseActionsGeneratedEvent {
            event_id: Uuid::nil(),
            actions: vec![],
        });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event"], "response_actions_generated");
        assert_eq!(event.name(), "response_actions_generated");
        assert_eq!(event.payload().unwrap()["actions"], serde_json::json!([]));
    }

    #[test]
    fn test_kind_names_match_serde_names() {
        for kind in EventKind::ALL {
            let json = serde_json::to_string(&kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.as_str()));
        }
    }
}
