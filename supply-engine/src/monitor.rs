//! Supplier performance bookkeeping, risk assessment and the periodic
//! threshold scans that turn breaches into supply-chain events.

use std::sync::Arc;

use supply_core::CoreResult;
use supply_planning::risk;
use supply_shared::models::events::{SupplierPerformanceUpdatedEvent, SupplierRiskAssessedEvent};
use supply_shared::models::incident::{EventSpec, ImpactAssessment};
use supply_shared::{DomainEvent, EventSeverity, EventType, Supplier, SupplyChainEvent};
use uuid::Uuid;

use crate::context::EngineContext;
use crate::coordinator::EventCoordinator;

/// Delivery signal fed back after an order is delivered
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeliveryOutcome {
    pub on_time: bool,
    pub order_value: f64,
}

pub struct SupplierMonitor {
    ctx: Arc<EngineContext>,
}

impl SupplierMonitor {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Fold one delivery into the supplier's running on-time average
    pub fn record_delivery(&self, supplier_id: &Uuid, outcome: DeliveryOutcome) -> CoreResult<Supplier> {
        let now = self.ctx.now();
        let supplier = self.ctx.registry.suppliers.update(supplier_id, |supplier| {
            let perf = &mut supplier.performance;
            let orders = perf.total_orders as f64;
            let signal = if outcome.on_time { 100.0 } else { 0.0 };
            perf.on_time_delivery = (perf.on_time_delivery * orders + signal) / (orders + 1.0);
            perf.total_orders += 1;
            perf.total_value += outcome.order_value;
            perf.last_order_date = Some(now);
            supplier.updated_at = now;
            Ok(supplier.clone())
        })?;

        tracing::info!(
            supplier_id = %supplier_id,
            on_time = outcome.on_time,
            on_time_delivery = supplier.performance.on_time_delivery,
            total_orders = supplier.performance.total_orders,
            "Supplier performance updated"
        );
        self.ctx
            .publish(DomainEvent::SupplierPerformanceUpdated(SupplierPerformanceUpdatedEvent {
                supplier_id: *supplier_id,
                performance: supplier.performance.clone(),
            }));
        Ok(supplier)
    }

    /// Re-run the risk rules for one supplier
    pub fn assess_risk(&self, supplier_id: &Uuid) -> CoreResult<Supplier> {
        let now = self.ctx.now();
        let thresholds = self.ctx.risk_thresholds();
        let supplier = self.ctx.registry.suppliers.update(supplier_id, |supplier| {
            supplier.risk_profile = risk::assess(supplier, &thresholds, now);
            supplier.updated_at = now;
            Ok(supplier.clone())
        })?;

        tracing::info!(
            supplier_id = %supplier_id,
            overall_risk = ?supplier.risk_profile.overall_risk,
            factors = supplier.risk_profile.risk_factors.len(),
            "Supplier risk assessed"
        );
        self.ctx.publish(DomainEvent::SupplierRiskAssessed(SupplierRiskAssessedEvent {
            supplier_id: *supplier_id,
            risk_profile: supplier.risk_profile.clone(),
        }));
        Ok(supplier)
    }

    /// Assess every supplier; failures are logged and skipped
    pub fn assess_all(&self) -> usize {
        let mut assessed = 0;
        for supplier_id in self.ctx.registry.suppliers.keys() {
            match self.assess_risk(&supplier_id) {
                Ok(_) => assessed += 1,
                Err(e) => tracing::warn!(supplier_id = %supplier_id, "Risk assessment failed: {}", e),
            }
        }
        tracing::info!(assessed, "Risk assessment cycle finished");
        assessed
    }

    /// Threshold checks over every supplier.
    ///
    /// A breach raises an event unless one of the same type is still open
    /// for that supplier; a supplier that fails to evaluate is logged and
    /// the scan moves on.
    pub fn scan_suppliers(&self) -> Vec<SupplyChainEvent> {
        self.scan_supplier_ids(self.ctx.registry.suppliers.keys())
    }

    pub(crate) fn scan_supplier_ids(&self, supplier_ids: impl IntoIterator<Item = Uuid>) -> Vec<SupplyChainEvent> {
        let mut raised = Vec::new();
        for supplier_id in supplier_ids {
            match self.scan_supplier(&supplier_id) {
                Ok(events) => raised.extend(events),
                Err(e) => tracing::warn!(supplier_id = %supplier_id, "Supplier scan failed: {}", e),
            }
        }
        raised
    }

    fn scan_supplier(&self, supplier_id: &Uuid) -> CoreResult<Vec<SupplyChainEvent>> {
        let supplier = self.ctx.registry.suppliers.get(supplier_id)?;
        let thresholds = &self.ctx.thresholds;
        let coordinator = EventCoordinator::new(Arc::clone(&self.ctx));
        let mut raised = Vec::new();

        let on_time = supplier.performance.on_time_delivery;
        if on_time < thresholds.on_time_delivery
            && !coordinator.has_open_event(EventType::SupplierIssue, &supplier.id)
        {
            raised.push(coordinator.raise(EventSpec {
                event_type: EventType::SupplierIssue,
                severity: EventSeverity::Medium,
                title: format!("Poor delivery performance: {}", supplier.name),
                description: format!(
                    "On-time delivery at {:.1}% is below the {:.0}% threshold",
                    on_time, thresholds.on_time_delivery
                ),
                affected_suppliers: vec![supplier.id],
                affected_products: Vec::new(),
                affected_orders: Vec::new(),
                impact: ImpactAssessment {
                    financial: "Potential expediting and stockout costs".to_string(),
                    operational: "Production schedules at risk from late inbound material".to_string(),
                    customer: "Possible delays to customer orders".to_string(),
                    timeline: "1-2 weeks".to_string(),
                },
            })?);
        }

        let quality = supplier.performance.quality_score;
        if quality < thresholds.quality_score
            && !coordinator.has_open_event(EventType::QualityProblem, &supplier.id)
        {
            raised.push(coordinator.raise(EventSpec {
                event_type: EventType::QualityProblem,
                severity: EventSeverity::High,
                title: format!("Quality below threshold: {}", supplier.name),
                description: format!(
                    "Quality score {:.1} is below the minimum of {:.1}",
                    quality, thresholds.quality_score
                ),
                affected_suppliers: vec![supplier.id],
                affected_products: Vec::new(),
                affected_orders: Vec::new(),
                impact: ImpactAssessment {
                    financial: "Rework, scrap and return costs".to_string(),
                    operational: "Additional inspection load on receiving".to_string(),
                    customer: "Risk of defective product reaching customers".to_string(),
                    timeline: "Immediate".to_string(),
                },
            })?);
        }

        Ok(raised)
    }

    /// Raise one `delivery_delay` per order still owed past its expected delivery
    pub fn scan_overdue_orders(&self) -> Vec<SupplyChainEvent> {
        let now = self.ctx.now();
        let orders = &self.ctx.registry.orders;
        self.ctx
            .retain_delays(|id| orders.find(id).is_some_and(|order| order.status.awaiting_delivery()));

        let overdue = self
            .ctx
            .registry
            .orders
            .list(|order| order.status.awaiting_delivery() && order.expected_delivery < now);

        let coordinator = EventCoordinator::new(Arc::clone(&self.ctx));
        let mut raised = Vec::new();
        for order in overdue {
            if !self.ctx.flag_delay(order.id) {
                continue;
            }
            let days_late = (now - order.expected_delivery).num_days();
            let spec = EventSpec {
                event_type: EventType::DeliveryDelay,
                severity: EventSeverity::High,
                title: format!("Delivery overdue: {}", order.order_number),
                description: format!(
                    "Order {} was expected on {} and is still {}",
                    order.order_number,
                    order.expected_delivery.format("%Y-%m-%d"),
                    order.status
                ),
                affected_suppliers: vec![order.supplier_id],
                affected_products: order.items.iter().map(|i| i.product_id.clone()).collect(),
                affected_orders: vec![order.id],
                impact: ImpactAssessment {
                    financial: format!("{:.2} of goods in delay", order.total_value),
                    operational: "Dependent production and replenishment on hold".to_string(),
                    customer: "Customer commitments may slip".to_string(),
                    timeline: format!("{} day(s) overdue", days_late),
                },
            };
            match coordinator.raise(spec) {
                Ok(event) => raised.push(event),
                Err(e) => tracing::warn!(order_id = %order.id, "Delay event failed: {}", e),
            }
        }
        raised
    }

    /// Body of the monitoring cadence
    pub fn run_monitoring(&self) -> Vec<SupplyChainEvent> {
        let mut raised = self.scan_suppliers();
        raised.extend(self.scan_overdue_orders());
        tracing::info!(events = raised.len(), "Monitoring scan finished");
        raised
    }
}
