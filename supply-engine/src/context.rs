use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Utc};
use supply_core::{Clock, EventBus, RandomSource, Scheduler};
use supply_planning::{ForecastModel, RiskThresholds};
use supply_shared::{DomainEvent, InventoryPolicy};
use supply_store::app_config::{EngineSettings, MonitorThresholds};
use supply_store::Registry;
use uuid::Uuid;

/// Actor recorded on tracking entries written by the engine itself
pub const SYSTEM_ACTOR: &str = "system";

/// Scheduler key for deferred order transitions
pub fn order_key(id: Uuid) -> String {
    format!("order:{}", id)
}

/// Scheduler key for deferred shipment legs
pub fn shipment_key(id: Uuid) -> String {
    format!("shipment:{}", id)
}

/// State and services shared by every component
pub struct EngineContext {
    pub registry: Registry,
    pub bus: EventBus,
    pub scheduler: Scheduler,
    pub clock: Arc<dyn Clock>,
    pub random: RandomSource,
    pub settings: EngineSettings,
    pub thresholds: MonitorThresholds,
    pub policy: InventoryPolicy,
    pub forecast_model: ForecastModel,
    /// Orders already reported overdue by the monitoring scan
    reported_delays: Mutex<HashSet<Uuid>>,
}

impl EngineContext {
    pub fn new(
        scheduler: Scheduler,
        clock: Arc<dyn Clock>,
        settings: EngineSettings,
        thresholds: MonitorThresholds,
        policy: InventoryPolicy,
        forecast_model: ForecastModel,
    ) -> Self {
        Self {
            registry: Registry::new(),
            bus: EventBus::new(settings.event_bus_capacity),
            scheduler,
            clock,
            random: RandomSource::new(settings.rng_seed),
            settings,
            thresholds,
            policy,
            forecast_model,
            reported_delays: Mutex::new(HashSet::new()),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn publish(&self, event: DomainEvent) {
        self.bus.publish(event);
    }

    pub fn risk_thresholds(&self) -> RiskThresholds {
        RiskThresholds {
            on_time_delivery: self.thresholds.risk_on_time_delivery,
            quality_score: self.thresholds.risk_quality_score,
            ..RiskThresholds::default()
        }
    }

    /// True the first time an order is flagged as overdue
    pub(crate) fn flag_delay(&self, order_id: Uuid) -> bool {
        self.reported_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(order_id)
    }

    /// Forget overdue flags for orders `keep` rejects
    pub(crate) fn retain_delays(&self, keep: impl Fn(&Uuid) -> bool) {
        self.reported_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|id| keep(id));
    }

    pub(crate) fn reported_delay_count(&self) -> usize {
        self.reported_delays
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
