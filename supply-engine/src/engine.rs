use std::sync::Arc;

use supply_core::{Clock, CoreError, CoreResult, Scheduler, SystemClock};
use supply_planning::ForecastModel;
use supply_shared::models::incident::{ActionStatus, EventFilter};
use supply_shared::models::kpi::PerformanceKpis;
use supply_shared::models::purchase_order::{NewPurchaseOrder, PurchaseOrderFilter};
use supply_shared::models::supplier::{NewSupplier, SupplierFilter};
use supply_shared::{
    DemandForecast, DomainEvent, EventKind, EventSeverity, InventoryOptimization, PurchaseOrder,
    PurchaseOrderStatus, Shipment, ShipmentStatus, Supplier, SupplyChainEvent, SupplyChainKpis,
};
use supply_store::Config;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::context::EngineContext;
use crate::coordinator::EventCoordinator;
use crate::forecasting::DemandForecaster;
use crate::lifecycle::PurchaseOrderManager;
use crate::monitor::SupplierMonitor;
use crate::optimizer::InventoryOptimizer;
use crate::shipment::ShipmentTracker;
use crate::worker;

pub struct EngineBuilder {
    config: Config,
    clock: Option<Arc<dyn Clock>>,
    forecast_model: ForecastModel,
}

impl EngineBuilder {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            clock: None,
            forecast_model: ForecastModel::default(),
        }
    }

    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    pub fn forecast_model(mut self, model: ForecastModel) -> Self {
        self.forecast_model = model;
        self
    }

    /// Must be called inside a tokio runtime; deferred work runs on it
    pub fn build(self) -> CoreResult<SupplyChainEngine> {
        let settings = self.config.engine;
        if settings.ack_delay_min_secs > settings.ack_delay_max_secs {
            return Err(CoreError::validation(
                "ack_delay_min_secs must not exceed ack_delay_max_secs",
            ));
        }
        let cadences = [
            ("monitoring_interval_secs", settings.monitoring_interval_secs),
            ("forecast_refresh_interval_secs", settings.forecast_refresh_interval_secs),
            ("risk_assessment_interval_secs", settings.risk_assessment_interval_secs),
            ("shipment_leg_interval_secs", settings.shipment_leg_interval_secs),
        ];
        if let Some((name, _)) = cadences.iter().find(|(_, secs)| *secs == 0) {
            return Err(CoreError::validation(format!("{} must be greater than zero", name)));
        }
        let scheduler = Scheduler::current()?;
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        let ctx = EngineContext::new(
            scheduler,
            clock,
            settings,
            self.config.thresholds,
            self.config.inventory,
            self.forecast_model,
        );
        Ok(SupplyChainEngine { ctx: Arc::new(ctx) })
    }
}

/// Entry point for every command and query
#[derive(Clone)]
pub struct SupplyChainEngine {
    ctx: Arc<EngineContext>,
}

impl SupplyChainEngine {
    pub fn builder(config: Config) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    pub fn context(&self) -> &Arc<EngineContext> {
        &self.ctx
    }

    pub fn orders(&self) -> PurchaseOrderManager {
        PurchaseOrderManager::new(Arc::clone(&self.ctx))
    }

    pub fn shipments(&self) -> ShipmentTracker {
        ShipmentTracker::new(Arc::clone(&self.ctx))
    }

    pub fn monitor(&self) -> SupplierMonitor {
        SupplierMonitor::new(Arc::clone(&self.ctx))
    }

    pub fn forecaster(&self) -> DemandForecaster {
        DemandForecaster::new(Arc::clone(&self.ctx))
    }

    pub fn inventory(&self) -> InventoryOptimizer {
        InventoryOptimizer::new(Arc::clone(&self.ctx))
    }

    pub fn coordinator(&self) -> EventCoordinator {
        EventCoordinator::new(Arc::clone(&self.ctx))
    }

    /// Start the periodic monitoring, forecast refresh and risk cadences
    pub fn start(&self) {
        worker::start_workers(&self.ctx);
    }

    /// Stop background work; pending deferred transitions are dropped
    pub fn shutdown(&self) {
        self.ctx.scheduler.shutdown();
        tracing::info!("Supply chain engine stopped");
    }

    pub fn subscribe(&self) -> broadcast::Receiver<DomainEvent> {
        self.ctx.bus.subscribe()
    }

    pub fn subscribe_topic(&self, kind: EventKind) -> broadcast::Receiver<DomainEvent> {
        self.ctx.bus.subscribe_topic(kind)
    }

    // Suppliers

    pub fn add_supplier(&self, request: NewSupplier) -> CoreResult<Supplier> {
        if request.name.trim().is_empty() {
            return Err(CoreError::validation("supplier name is required"));
        }
        if !(1.0..=10.0).contains(&request.rating) {
            return Err(CoreError::validation(format!(
                "rating must be between 1 and 10, got {}",
                request.rating
            )));
        }
        if let Some(perf) = &request.performance {
            if !(0.0..=100.0).contains(&perf.on_time_delivery) {
                return Err(CoreError::validation("on-time delivery must be a percentage"));
            }
        }

        let supplier = Supplier::from_request(request, self.ctx.now());
        self.ctx.registry.suppliers.insert(supplier.clone())?;
        tracing::info!(supplier_id = %supplier.id, name = %supplier.name, "Supplier added");
        self.ctx.publish(DomainEvent::SupplierAdded(supplier.clone()));
        Ok(supplier)
    }

    pub fn supplier(&self, supplier_id: &Uuid) -> CoreResult<Supplier> {
        self.ctx.registry.suppliers.get(supplier_id)
    }

    pub fn suppliers(&self, filter: &SupplierFilter) -> Vec<Supplier> {
        self.ctx.registry.suppliers.list(|s| filter.matches(s))
    }

    pub fn assess_supplier_risk(&self, supplier_id: &Uuid) -> CoreResult<Supplier> {
        self.monitor().assess_risk(supplier_id)
    }

    pub fn assess_all_risks(&self) -> usize {
        self.monitor().assess_all()
    }

    pub fn run_monitoring_scan(&self) -> Vec<SupplyChainEvent> {
        self.monitor().run_monitoring()
    }

    // Purchase orders and shipments

    pub fn create_purchase_order(&self, request: NewPurchaseOrder) -> CoreResult<PurchaseOrder> {
        self.orders().create_order(request)
    }

    pub fn update_order_status(
        &self,
        order_id: &Uuid,
        status: PurchaseOrderStatus,
        notes: Option<String>,
    ) -> CoreResult<PurchaseOrder> {
        self.orders().update_status(order_id, status, notes)
    }

    pub fn purchase_order(&self, order_id: &Uuid) -> CoreResult<PurchaseOrder> {
        self.orders().get_order(order_id)
    }

    pub fn purchase_orders(&self, filter: &PurchaseOrderFilter) -> Vec<PurchaseOrder> {
        self.orders().list_orders(filter)
    }

    pub fn shipment(&self, shipment_id: &Uuid) -> CoreResult<Shipment> {
        self.shipments().get_shipment(shipment_id)
    }

    pub fn shipment_for_order(&self, order_id: &Uuid) -> CoreResult<Shipment> {
        self.shipments().shipment_for_order(order_id)
    }

    pub fn update_shipment_status(
        &self,
        shipment_id: &Uuid,
        status: ShipmentStatus,
        notes: Option<String>,
    ) -> CoreResult<Shipment> {
        self.shipments().update_status(shipment_id, status, notes)
    }

    // Planning

    pub fn generate_demand_forecast(&self, product_id: &str, sku: &str) -> CoreResult<DemandForecast> {
        self.forecaster().generate(product_id, sku)
    }

    pub fn demand_forecast(&self, product_id: &str) -> CoreResult<DemandForecast> {
        self.forecaster().get(product_id)
    }

    pub fn refresh_forecasts(&self) -> usize {
        self.forecaster().refresh_all()
    }

    pub fn optimize_inventory(&self, product_id: &str, current_stock: i64) -> CoreResult<InventoryOptimization> {
        self.inventory().optimize(product_id, current_stock)
    }

    pub fn inventory_optimization(&self, product_id: &str) -> CoreResult<InventoryOptimization> {
        self.inventory().get(product_id)
    }

    // Supply chain events

    pub fn supply_chain_events(&self, filter: &EventFilter) -> Vec<SupplyChainEvent> {
        self.coordinator().list_events(filter)
    }

    pub fn supply_chain_event(&self, event_id: &Uuid) -> CoreResult<SupplyChainEvent> {
        self.coordinator().get_event(event_id)
    }

    pub fn resolve_event(&self, event_id: &Uuid, resolution: &str) -> CoreResult<SupplyChainEvent> {
        self.coordinator().resolve(event_id, resolution)
    }

    pub fn escalate_event(&self, event_id: &Uuid, escalated_to: &str) -> CoreResult<SupplyChainEvent> {
        self.coordinator().escalate(event_id, escalated_to)
    }

    pub fn monitor_event(&self, event_id: &Uuid) -> CoreResult<SupplyChainEvent> {
        self.coordinator().monitor(event_id)
    }

    pub fn update_response_action(
        &self,
        event_id: &Uuid,
        action_id: &Uuid,
        status: ActionStatus,
    ) -> CoreResult<SupplyChainEvent> {
        self.coordinator().update_action(event_id, action_id, status)
    }

    /// Dashboard aggregates over every supplier, order and event
    pub fn kpis(&self) -> SupplyChainKpis {
        let suppliers = self.ctx.registry.suppliers.all();
        let orders = self.ctx.registry.orders.all();
        let events = self.ctx.registry.events.all();

        let count = suppliers.len();

        SupplyChainKpis {
            total_suppliers: count,
            active_suppliers: suppliers.iter().filter(|s| s.is_active()).count(),
            average_rating: mean(&suppliers, |s| s.rating),
            average_on_time_delivery: mean(&suppliers, |s| s.performance.on_time_delivery),
            total_spend: suppliers.iter().map(|s| s.performance.total_value).sum(),
            total_orders: orders.len(),
            open_orders: orders.iter().filter(|o| !o.status.is_terminal()).count(),
            active_events: events.iter().filter(|e| e.is_open()).count(),
            critical_events: events
                .iter()
                .filter(|e| e.is_open() && e.severity == EventSeverity::Critical)
                .count(),
            average_lead_time: mean(&suppliers, |s| s.performance.average_lead_time),
            performance: PerformanceKpis {
                quality: mean(&suppliers, |s| s.performance.quality_score),
                responsiveness: mean(&suppliers, |s| s.performance.responsiveness),
                cost_competitiveness: mean(&suppliers, |s| s.performance.cost_competitiveness),
            },
        }
    }
}

fn mean(suppliers: &[Supplier], field: impl Fn(&Supplier) -> f64) -> f64 {
    if suppliers.is_empty() {
        return 0.0;
    }
    suppliers.iter().map(field).sum::<f64>() / suppliers.len() as f64
}
