use std::sync::Arc;

use crate::context::EngineContext;
use crate::forecasting::DemandForecaster;
use crate::monitor::SupplierMonitor;

/// Register the three background cadences on the engine's scheduler
pub fn start_workers(ctx: &Arc<EngineContext>) {
    let settings = &ctx.settings;

    let monitor_ctx = Arc::clone(ctx);
    ctx.scheduler
        .every("supplier_monitoring", settings.monitoring_interval(), move || {
            SupplierMonitor::new(Arc::clone(&monitor_ctx)).run_monitoring();
        });

    let forecast_ctx = Arc::clone(ctx);
    ctx.scheduler
        .every("forecast_refresh", settings.forecast_refresh_interval(), move || {
            DemandForecaster::new(Arc::clone(&forecast_ctx)).refresh_all();
        });

    let risk_ctx = Arc::clone(ctx);
    ctx.scheduler
        .every("risk_assessment", settings.risk_assessment_interval(), move || {
            SupplierMonitor::new(Arc::clone(&risk_ctx)).assess_all();
        });

    tracing::info!("Supply chain workers started");
}
