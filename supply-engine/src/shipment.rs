use std::sync::Arc;

use chrono::Duration;
use supply_core::{CoreError, CoreResult};
use supply_shared::models::shipment::{InsuranceRecord, ShipmentCost, ShipmentItem};
use supply_shared::models::tracking::TrackingEntry;
use supply_shared::{DomainEvent, PurchaseOrder, PurchaseOrderStatus, Shipment, ShipmentStatus};
use uuid::Uuid;

use crate::context::{shipment_key, EngineContext};
use crate::lifecycle::PurchaseOrderManager;

const ENTITY: &str = "shipment";

const FREIGHT: f64 = 850.0;
const INSURANCE_RATE: f64 = 0.005;
const DUTIES: f64 = 120.0;
const TAX_RATE: f64 = 0.15;
const HANDLING: f64 = 45.0;
const INSURANCE_DAYS: i64 = 30;
const INSURANCE_PROVIDER: &str = "Global Cargo Insurance";

/// Fixed cost breakdown for a shipment carrying `order_value` worth of goods
pub fn shipment_cost(order_value: f64, currency: &str) -> ShipmentCost {
    let insurance = order_value * INSURANCE_RATE;
    let taxes = (FREIGHT + DUTIES) * TAX_RATE;
    ShipmentCost {
        freight: FREIGHT,
        insurance,
        duties: DUTIES,
        taxes,
        handling: HANDLING,
        total: FREIGHT + insurance + DUTIES + taxes + HANDLING,
        currency: currency.to_string(),
    }
}

/// One scheduled progress step
struct Leg {
    status: ShipmentStatus,
    location: String,
    description: String,
}

/// Tracks shipments from pickup to delivery
pub struct ShipmentTracker {
    ctx: Arc<EngineContext>,
}

impl ShipmentTracker {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    pub fn get_shipment(&self, shipment_id: &Uuid) -> CoreResult<Shipment> {
        self.ctx.registry.shipments.get(shipment_id)
    }

    pub fn shipment_for_order(&self, order_id: &Uuid) -> CoreResult<Shipment> {
        let order = self.ctx.registry.orders.get(order_id)?;
        let shipment_id = order
            .shipment_id
            .ok_or_else(|| CoreError::not_found(ENTITY, format!("order {}", order_id)))?;
        self.get_shipment(&shipment_id)
    }

    /// Create the single shipment for a just-shipped order and schedule its legs
    pub(crate) fn create_shipment(&self, order: &PurchaseOrder) -> CoreResult<Shipment> {
        let now = self.ctx.now();
        let id = Uuid::new_v4();
        let carrier = order.shipping.carrier.clone();
        let leg = Duration::seconds(self.ctx.settings.shipment_leg_interval_secs as i64);

        // Claim the order first; a second claim means a shipment already exists
        self.ctx.registry.orders.update(&order.id, |stored| {
            if stored.shipment_id.is_some() {
                return Err(CoreError::invalid_transition(
                    "purchase_order",
                    stored.status,
                    PurchaseOrderStatus::Shipped,
                ));
            }
            stored.shipment_id = Some(id);
            Ok(())
        })?;

        let shipment = Shipment {
            id,
            purchase_order_id: order.id,
            supplier_id: order.supplier_id,
            tracking_number: self.tracking_number(&carrier),
            status: ShipmentStatus::PickedUp,
            origin: order.shipping.origin.clone(),
            destination: order.shipping.destination.clone(),
            ship_date: now,
            estimated_arrival: now + leg * 3,
            actual_arrival: None,
            items: order
                .items
                .iter()
                .map(|item| ShipmentItem {
                    product_id: item.product_id.clone(),
                    sku: item.sku.clone(),
                    quantity: item.quantity,
                    condition: "good".to_string(),
                })
                .collect(),
            cost: shipment_cost(order.total_value, &order.terms.currency),
            insurance: InsuranceRecord {
                provider: INSURANCE_PROVIDER.to_string(),
                policy_number: format!("INS-{}", self.ctx.random.code(8)),
                coverage: order.total_value,
                valid_from: now,
                valid_until: now + Duration::days(INSURANCE_DAYS),
            },
            tracking: vec![TrackingEntry::new(
                now,
                ShipmentStatus::PickedUp.as_str(),
                format!("Picked up by {}", carrier),
                carrier.as_str(),
            )
            .at(order.shipping.origin.as_str())],
            carrier,
            updated_at: now,
        };

        self.ctx.registry.shipments.insert(shipment.clone())?;
        tracing::info!(
            shipment_id = %id,
            order_id = %order.id,
            tracking_number = %shipment.tracking_number,
            "Shipment created"
        );
        self.ctx.publish(DomainEvent::ShipmentCreated(shipment.clone()));
        self.schedule_legs(&shipment);
        Ok(shipment)
    }

    fn tracking_number(&self, carrier: &str) -> String {
        let prefix: String = carrier
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(3)
            .collect::<String>()
            .to_uppercase();
        let prefix = if prefix.is_empty() { "TRK".to_string() } else { prefix };
        format!("{}{}", prefix, self.ctx.random.code(10))
    }

    fn schedule_legs(&self, shipment: &Shipment) {
        let legs = [
            Leg {
                status: ShipmentStatus::InTransit,
                location: format!("{} distribution hub", shipment.origin),
                description: "Departed origin facility".to_string(),
            },
            Leg {
                status: ShipmentStatus::OutForDelivery,
                location: shipment.destination.clone(),
                description: "Out for delivery".to_string(),
            },
            Leg {
                status: ShipmentStatus::Delivered,
                location: shipment.destination.clone(),
                description: "Delivered to consignee".to_string(),
            },
        ];

        let spacing = self.ctx.settings.shipment_leg_interval();
        for (step, leg) in (1u32..).zip(legs) {
            let ctx = Arc::clone(&self.ctx);
            let shipment_id = shipment.id;
            self.ctx
                .scheduler
                .schedule(shipment_key(shipment_id), spacing * step, move || {
                    ShipmentTracker::new(ctx).run_leg(shipment_id, leg)
                });
        }
    }

    fn run_leg(&self, shipment_id: Uuid, leg: Leg) {
        match self.advance(&shipment_id, leg.status, leg.description, Some(leg.location), None) {
            Ok(Some(_)) => {}
            Ok(None) => {
                tracing::debug!(shipment_id = %shipment_id, status = %leg.status, "Shipment leg skipped");
            }
            Err(e) => tracing::warn!(shipment_id = %shipment_id, "Shipment leg failed: {}", e),
        }
    }

    /// Operator override into any later state, including the exception states
    pub fn update_status(
        &self,
        shipment_id: &Uuid,
        status: ShipmentStatus,
        notes: Option<String>,
    ) -> CoreResult<Shipment> {
        let current = self.get_shipment(shipment_id)?;
        if !current.status.can_advance_to(status) {
            return Err(CoreError::invalid_transition(ENTITY, current.status, status));
        }
        let description = notes.unwrap_or_else(|| format!("Status changed from {} to {}", current.status, status));
        self.advance(shipment_id, status, description, None, Some("operator"))?
            .ok_or_else(|| CoreError::invalid_transition(ENTITY, current.status, status))
    }

    /// Apply one forward step. `Ok(None)` means the step no longer applies:
    /// the shipment moved past it or the parent order was closed.
    ///
    /// The order stays locked across the shipment write, so a cancellation
    /// lands either before the step (which is then dropped) or after the
    /// order is already delivered.
    fn advance(
        &self,
        shipment_id: &Uuid,
        status: ShipmentStatus,
        description: String,
        location: Option<String>,
        actor: Option<&str>,
    ) -> CoreResult<Option<Shipment>> {
        let now = self.ctx.now();
        let order_id = self.get_shipment(shipment_id)?.purchase_order_id;

        let step = self.ctx.registry.orders.update(&order_id, |order| {
            if order.status.is_terminal() {
                return Ok(Step::OrderClosed);
            }
            let applied = self.ctx.registry.shipments.update(shipment_id, |shipment| {
                if !shipment.status.can_advance_to(status) {
                    return Ok(None);
                }
                shipment.status = status;
                let actor = actor.unwrap_or(shipment.carrier.as_str()).to_string();
                let mut entry = TrackingEntry::new(now, status.as_str(), description, actor);
                if let Some(location) = location {
                    entry = entry.at(location);
                }
                shipment.record(entry);
                if status == ShipmentStatus::Delivered {
                    shipment.actual_arrival = Some(now);
                }
                Ok(Some(shipment.clone()))
            })?;
            let Some(shipment) = applied else {
                return Ok(Step::Skipped);
            };
            let delivered = status == ShipmentStatus::Delivered
                && PurchaseOrderManager::settle_delivery(order, shipment.id, now);
            Ok(Step::Applied(shipment, delivered.then(|| order.clone())))
        })?;

        let (shipment, delivered_order) = match step {
            Step::OrderClosed => {
                self.ctx.scheduler.cancel(&shipment_key(*shipment_id));
                return Ok(None);
            }
            Step::Skipped => return Ok(None),
            Step::Applied(shipment, order) => (shipment, order),
        };
        tracing::info!(shipment_id = %shipment.id, status = %status, "Shipment tracking updated");
        self.ctx.publish(DomainEvent::ShipmentTrackingUpdated(shipment.clone()));

        if status.is_terminal() {
            self.ctx.scheduler.cancel(&shipment_key(shipment.id));
        }
        match delivered_order {
            Some(order) => {
                PurchaseOrderManager::new(Arc::clone(&self.ctx)).delivery_settled(&order, shipment.id)
            }
            None if status == ShipmentStatus::Delivered => {
                tracing::debug!(order_id = %order_id, "Delivery ignored, order not in shipped state");
            }
            None => {}
        }
        Ok(Some(shipment))
    }
}

/// Outcome of one step, decided under the order lock
enum Step {
    OrderClosed,
    Skipped,
    Applied(Shipment, Option<PurchaseOrder>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{order_request, supplier_request, test_engine};
    use crate::engine::SupplyChainEngine;

    fn shipped_order(engine: &SupplyChainEngine) -> PurchaseOrder {
        let supplier = engine.add_supplier(supplier_request(95.0, 8.0)).unwrap();
        let order = engine
            .create_purchase_order(order_request(supplier.id, PurchaseOrderStatus::Draft))
            .unwrap();
        for status in [
            PurchaseOrderStatus::PendingApproval,
            PurchaseOrderStatus::Approved,
            PurchaseOrderStatus::Sent,
            PurchaseOrderStatus::Acknowledged,
            PurchaseOrderStatus::InProduction,
            PurchaseOrderStatus::Shipped,
        ] {
            engine.update_order_status(&order.id, status, None).unwrap();
        }
        engine.purchase_order(&order.id).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn test_leg_dropped_when_order_closed_under_it() {
        let engine = test_engine();
        let order = shipped_order(&engine);
        let shipment_id = order.shipment_id.unwrap();
        assert_eq!(engine.context().scheduler.pending(&shipment_key(shipment_id)), 3);

        // Close the order without going through the lifecycle manager, so the
        // legs are still scheduled when they fire
        engine
            .context()
            .registry
            .orders
            .update(&order.id, |stored| {
                stored.status = PurchaseOrderStatus::Cancelled;
                Ok(())
            })
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(3601)).await;
        let shipment = engine.shipment(&shipment_id).unwrap();
        assert_eq!(shipment.status, ShipmentStatus::PickedUp);
        assert!(shipment.actual_arrival.is_none());
        assert_eq!(engine.context().scheduler.pending(&shipment_key(shipment_id)), 0);

        let order = engine.purchase_order(&order.id).unwrap();
        assert_eq!(order.status, PurchaseOrderStatus::Cancelled);
        assert!(order.actual_delivery.is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_delivery_settles_order_in_same_step() {
        let engine = test_engine();
        let order = shipped_order(&engine);
        let shipment_id = order.shipment_id.unwrap();
        let tracker = engine.shipments();

        let delivered = tracker
            .advance(&shipment_id, ShipmentStatus::Delivered, "Delivered".to_string(), None, None)
            .unwrap()
            .unwrap();
        let order = engine.purchase_order(&order.id).unwrap();
        assert_eq!(order.status, PurchaseOrderStatus::Delivered);
        assert_eq!(order.actual_delivery, delivered.actual_arrival);
        assert_eq!(engine.context().scheduler.pending(&shipment_key(shipment_id)), 0);

        let replay = tracker
            .advance(&shipment_id, ShipmentStatus::Delivered, "Delivered".to_string(), None, None)
            .unwrap();
        assert!(replay.is_none());
        assert_eq!(engine.supplier(&order.supplier_id).unwrap().performance.total_orders, 1);
    }

    #[test]
    fn test_cost_breakdown() {
        let cost = shipment_cost(10_000.0, "USD");
        assert_eq!(cost.freight, 850.0);
        assert_eq!(cost.insurance, 50.0);
        assert_eq!(cost.duties, 120.0);
        assert!((cost.taxes - 145.5).abs() < 1e-9);
        assert_eq!(cost.handling, 45.0);
        assert!((cost.total - (850.0 + 50.0 + 120.0 + 145.5 + 45.0)).abs() < 1e-9);
        assert_eq!(cost.currency, "USD");
    }
}
