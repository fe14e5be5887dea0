use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use supply_core::{CoreError, CoreResult};
use supply_shared::models::events::{DeliveryProcessedEvent, OrderStatusUpdatedEvent};
use supply_shared::models::purchase_order::{
    ItemStatus, NewPurchaseOrder, PurchaseOrderFilter,
};
use supply_shared::models::tracking::TrackingEntry;
use supply_shared::{DomainEvent, PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus};
use uuid::Uuid;

use crate::context::{order_key, shipment_key, EngineContext, SYSTEM_ACTOR};
use crate::monitor::{DeliveryOutcome, SupplierMonitor};
use crate::shipment::ShipmentTracker;

const ENTITY: &str = "purchase_order";
const USER_ACTOR: &str = "user";

/// Manages purchase order lifecycle and state transitions
pub struct PurchaseOrderManager {
    ctx: Arc<EngineContext>,
}

impl PurchaseOrderManager {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Create a purchase order; orders created `approved` are sent straight to the supplier
    pub fn create_order(&self, request: NewPurchaseOrder) -> CoreResult<PurchaseOrder> {
        Self::validate(&request)?;
        // The supplier must exist before anything is stored
        self.ctx.registry.suppliers.get(&request.supplier_id)?;

        let now = self.ctx.now();
        let id = Uuid::new_v4();
        let items: Vec<PurchaseOrderItem> = request
            .items
            .into_iter()
            .map(|item| PurchaseOrderItem {
                id: Uuid::new_v4(),
                total_price: item.unit_price * item.quantity as f64,
                product_id: item.product_id,
                sku: item.sku,
                description: item.description,
                quantity: item.quantity,
                unit_price: item.unit_price,
                specifications: item.specifications,
                quality_requirements: item.quality_requirements,
                delivery_date: item.delivery_date.unwrap_or(request.expected_delivery),
                status: ItemStatus::Pending,
            })
            .collect();
        let total_value = items.iter().map(|item| item.total_price).sum();

        let order = PurchaseOrder {
            id,
            supplier_id: request.supplier_id,
            order_number: format!("PO-{}-{}", now.format("%Y%m%d"), self.ctx.random.code(6)),
            order_type: request.order_type,
            status: request.status,
            priority: request.priority,
            tracking: vec![TrackingEntry::new(
                now,
                request.status.as_str(),
                "Purchase order created",
                request.requester.as_str(),
            )],
            requester: request.requester,
            approver: request.approver,
            order_date: now,
            expected_delivery: request.expected_delivery,
            actual_delivery: None,
            items,
            total_value,
            terms: request.terms,
            shipping: request.shipping,
            documents: request.documents,
            notes: request.notes,
            shipment_id: None,
            updated_at: now,
        };

        self.ctx.registry.orders.insert(order.clone())?;
        tracing::info!(
            order_id = %id,
            order_number = %order.order_number,
            status = %order.status,
            total_value,
            "Purchase order created"
        );
        self.ctx.publish(DomainEvent::PurchaseOrderCreated(order.clone()));

        if order.status == PurchaseOrderStatus::Approved {
            return self.send_to_supplier(&id);
        }
        Ok(order)
    }

    fn validate(request: &NewPurchaseOrder) -> CoreResult<()> {
        if !request.status.is_initial() {
            return Err(CoreError::validation(format!(
                "purchase orders cannot be created as {}",
                request.status
            )));
        }
        if request.requester.trim().is_empty() {
            return Err(CoreError::validation("requester is required"));
        }
        if request.items.is_empty() {
            return Err(CoreError::validation("purchase order needs at least one item"));
        }
        for item in &request.items {
            if item.quantity == 0 {
                return Err(CoreError::validation(format!(
                    "quantity must be positive for {}",
                    item.sku
                )));
            }
            if !item.unit_price.is_finite() || item.unit_price <= 0.0 {
                return Err(CoreError::validation(format!(
                    "unit price must be positive for {}",
                    item.sku
                )));
            }
        }
        Ok(())
    }

    pub fn get_order(&self, order_id: &Uuid) -> CoreResult<PurchaseOrder> {
        self.ctx.registry.orders.get(order_id)
    }

    pub fn list_orders(&self, filter: &PurchaseOrderFilter) -> Vec<PurchaseOrder> {
        self.ctx.registry.orders.list(|order| filter.matches(order))
    }

    /// Transition: Approved → Sent, then schedule the supplier's acknowledgment
    fn send_to_supplier(&self, order_id: &Uuid) -> CoreResult<PurchaseOrder> {
        let now = self.ctx.now();
        let order = self.ctx.registry.orders.update(order_id, |order| {
            if order.status != PurchaseOrderStatus::Approved {
                return Err(CoreError::invalid_transition(
                    ENTITY,
                    order.status,
                    PurchaseOrderStatus::Sent,
                ));
            }
            order.transition(
                PurchaseOrderStatus::Sent,
                now,
                "Purchase order transmitted to supplier".to_string(),
                SYSTEM_ACTOR,
            );
            Ok(order.clone())
        })?;

        tracing::info!(order_id = %order.id, "Purchase order sent to supplier");
        self.ctx.publish(DomainEvent::PurchaseOrderSent(order.clone()));
        self.schedule_acknowledgment(order.id);
        Ok(order)
    }

    fn schedule_acknowledgment(&self, order_id: Uuid) {
        let settings = &self.ctx.settings;
        let delay = self
            .ctx
            .random
            .between(settings.ack_delay_min_secs, settings.ack_delay_max_secs);
        let ctx = Arc::clone(&self.ctx);
        self.ctx.scheduler.schedule(
            order_key(order_id),
            Duration::from_secs(delay),
            move || PurchaseOrderManager::new(ctx).acknowledge(&order_id),
        );
    }

    /// Transition: Sent → Acknowledged (deferred); a no-op once the order moved on
    pub(crate) fn acknowledge(&self, order_id: &Uuid) {
        let now = self.ctx.now();
        let outcome = self.ctx.registry.orders.update(order_id, |order| {
            if order.status != PurchaseOrderStatus::Sent {
                return Ok(None);
            }
            order.transition(
                PurchaseOrderStatus::Acknowledged,
                now,
                "Supplier acknowledged the purchase order".to_string(),
                SYSTEM_ACTOR,
            );
            for item in order.items.iter_mut().filter(|i| i.status == ItemStatus::Pending) {
                item.status = ItemStatus::Confirmed;
            }
            Ok(Some(order.clone()))
        });

        match outcome {
            Ok(Some(order)) => {
                tracing::info!(order_id = %order.id, "Purchase order acknowledged");
                self.ctx.publish(DomainEvent::PurchaseOrderAcknowledged(order));
            }
            Ok(None) => {
                tracing::debug!(order_id = %order_id, "Acknowledgment skipped, order already moved on");
            }
            Err(e) => tracing::warn!(order_id = %order_id, "Acknowledgment failed: {}", e),
        }
    }

    /// Caller-driven status change along a legal edge.
    ///
    /// `delivered` is reserved for the shipment tracker and rejected here.
    pub fn update_status(
        &self,
        order_id: &Uuid,
        new_status: PurchaseOrderStatus,
        notes: Option<String>,
    ) -> CoreResult<PurchaseOrder> {
        let now = self.ctx.now();
        let (order, previous) = self.ctx.registry.orders.update(order_id, |order| {
            let previous = order.status;
            if new_status == PurchaseOrderStatus::Delivered || !previous.can_transition_to(new_status) {
                return Err(CoreError::invalid_transition(ENTITY, previous, new_status));
            }
            // Shipping an order twice would spawn a second shipment
            if new_status == PurchaseOrderStatus::Shipped && order.shipment_id.is_some() {
                return Err(CoreError::invalid_transition(ENTITY, previous, new_status));
            }

            let mut description = format!("Status changed from {} to {}", previous, new_status);
            if let Some(note) = notes.as_deref() {
                description.push_str(": ");
                description.push_str(note);
                order.notes.push(note.to_string());
            }
            order.transition(new_status, now, description, USER_ACTOR);
            sync_item_status(&mut order.items, new_status);
            Ok((order.clone(), previous))
        })?;

        tracing::info!(
            order_id = %order_id,
            from = %previous,
            to = %new_status,
            "Purchase order status updated"
        );
        self.ctx.publish(DomainEvent::OrderStatusUpdated(OrderStatusUpdatedEvent {
            order: order.clone(),
            previous_status: previous,
            new_status,
            notes,
        }));

        match new_status {
            PurchaseOrderStatus::Shipped => {
                ShipmentTracker::new(Arc::clone(&self.ctx)).create_shipment(&order)?;
                self.get_order(order_id)
            }
            PurchaseOrderStatus::Cancelled | PurchaseOrderStatus::Disputed => {
                self.ctx.scheduler.cancel(&order_key(order.id));
                if let Some(shipment_id) = order.shipment_id {
                    self.ctx.scheduler.cancel(&shipment_key(shipment_id));
                }
                Ok(order)
            }
            _ => Ok(order),
        }
    }

    /// Transition: Shipped → Delivered, applied by the shipment tracker while
    /// it holds the order.
    ///
    /// Returns false when the order already left `shipped`; `actual_delivery`
    /// is written once and never changed afterwards.
    pub(crate) fn settle_delivery(
        order: &mut PurchaseOrder,
        shipment_id: Uuid,
        delivered_at: DateTime<Utc>,
    ) -> bool {
        if order.status != PurchaseOrderStatus::Shipped || order.actual_delivery.is_some() {
            return false;
        }
        order.actual_delivery = Some(delivered_at);
        order.transition(
            PurchaseOrderStatus::Delivered,
            delivered_at,
            format!("Status changed from shipped to delivered (shipment {})", shipment_id),
            SYSTEM_ACTOR,
        );
        sync_item_status(&mut order.items, PurchaseOrderStatus::Delivered);
        true
    }

    /// Announce a settled delivery and feed it to the supplier's record
    pub(crate) fn delivery_settled(&self, order: &PurchaseOrder, shipment_id: Uuid) {
        let Some(delivered_at) = order.actual_delivery else {
            return;
        };
        let on_time = !order.is_late(delivered_at);
        tracing::info!(order_id = %order.id, on_time, "Purchase order delivered");
        self.ctx.publish(DomainEvent::OrderStatusUpdated(OrderStatusUpdatedEvent {
            order: order.clone(),
            previous_status: PurchaseOrderStatus::Shipped,
            new_status: PurchaseOrderStatus::Delivered,
            notes: None,
        }));

        let outcome = DeliveryOutcome {
            on_time,
            order_value: order.total_value,
        };
        if let Err(e) = SupplierMonitor::new(Arc::clone(&self.ctx)).record_delivery(&order.supplier_id, outcome) {
            tracing::warn!(supplier_id = %order.supplier_id, "Could not record delivery performance: {}", e);
        }

        self.ctx.publish(DomainEvent::DeliveryProcessed(DeliveryProcessedEvent {
            order_id: order.id,
            shipment_id: Some(shipment_id),
            supplier_id: order.supplier_id,
            on_time,
            order_value: order.total_value,
            actual_delivery: delivered_at,
        }));
    }
}

/// Item statuses follow the order forward but never overwrite a rejection
fn sync_item_status(items: &mut [PurchaseOrderItem], status: PurchaseOrderStatus) {
    let item_status = match status {
        PurchaseOrderStatus::InProduction => ItemStatus::InProduction,
        PurchaseOrderStatus::Shipped => ItemStatus::Shipped,
        PurchaseOrderStatus::Delivered => ItemStatus::Delivered,
        _ => return,
    };
    for item in items.iter_mut().filter(|i| i.status != ItemStatus::Rejected) {
        item.status = item_status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{order_request, test_engine};

    #[tokio::test(start_paused = true)]
    async fn test_order_lifecycle() {
        let engine = test_engine();
        let supplier = engine.add_supplier(crate::engine::testing::supplier_request(95.0, 9.0)).unwrap();
        let manager = engine.orders();

        let order = manager.create_order(order_request(supplier.id, PurchaseOrderStatus::Draft)).unwrap();
        let order_id = order.id;
        assert_eq!(order.tracking.len(), 1);

        for status in [
            PurchaseOrderStatus::PendingApproval,
            PurchaseOrderStatus::Approved,
            PurchaseOrderStatus::Sent,
            PurchaseOrderStatus::Acknowledged,
            PurchaseOrderStatus::InProduction,
        ] {
            let updated = manager.update_status(&order_id, status, None).unwrap();
            assert_eq!(updated.status, status);
        }
        let order = manager.get_order(&order_id).unwrap();
        assert_eq!(order.tracking.len(), 6);
        assert!(order.items.iter().all(|i| i.status == ItemStatus::InProduction));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalid_transition() {
        let engine = test_engine();
        let supplier = engine.add_supplier(crate::engine::testing::supplier_request(95.0, 9.0)).unwrap();
        let manager = engine.orders();
        let order = manager.create_order(order_request(supplier.id, PurchaseOrderStatus::Draft)).unwrap();

        // Cannot go directly from Draft to Sent
        let result = manager.update_status(&order.id, PurchaseOrderStatus::Sent, None);
        assert!(matches!(result, Err(CoreError::InvalidTransition { .. })));
        assert_eq!(manager.get_order(&order.id).unwrap().tracking.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_supplier_rejected() {
        let engine = test_engine();
        let result = engine.orders().create_order(order_request(Uuid::new_v4(), PurchaseOrderStatus::Draft));
        assert!(matches!(result, Err(CoreError::NotFound { entity: "supplier", .. })));
        assert!(engine.context().registry.orders.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_item_validation() {
        let engine = test_engine();
        let supplier = engine.add_supplier(crate::engine::testing::supplier_request(95.0, 9.0)).unwrap();

        let mut request = order_request(supplier.id, PurchaseOrderStatus::Draft);
        request.items[0].quantity = 0;
        assert!(matches!(engine.orders().create_order(request), Err(CoreError::ValidationError(_))));

        let mut request = order_request(supplier.id, PurchaseOrderStatus::Draft);
        request.items[0].unit_price = -1.0;
        assert!(matches!(engine.orders().create_order(request), Err(CoreError::ValidationError(_))));

        let request = order_request(supplier.id, PurchaseOrderStatus::Shipped);
        assert!(matches!(engine.orders().create_order(request), Err(CoreError::ValidationError(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_totals_and_notes() {
        let engine = test_engine();
        let supplier = engine.add_supplier(crate::engine::testing::supplier_request(95.0, 9.0)).unwrap();
        let order = engine
            .orders()
            .create_order(order_request(supplier.id, PurchaseOrderStatus::Draft))
            .unwrap();
        assert_eq!(order.total_value, 100.0 * 12.5);
        assert!(order.order_number.starts_with("PO-"));

        let updated = engine
            .orders()
            .update_status(&order.id, PurchaseOrderStatus::Cancelled, Some("budget cut".to_string()))
            .unwrap();
        assert_eq!(updated.notes, vec!["budget cut".to_string()]);
        assert!(updated.tracking.last().unwrap().description.ends_with("budget cut"));
    }
}
