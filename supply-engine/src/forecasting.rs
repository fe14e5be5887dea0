use std::sync::Arc;

use supply_core::{CoreError, CoreResult};
use supply_shared::{DemandForecast, DomainEvent};

use crate::context::EngineContext;

/// Largest accuracy change applied by one refresh
const ACCURACY_NUDGE: f64 = 2.0;

pub struct DemandForecaster {
    ctx: Arc<EngineContext>,
}

impl DemandForecaster {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    /// Build a fresh forecast, replacing any earlier one for the product
    pub fn generate(&self, product_id: &str, sku: &str) -> CoreResult<DemandForecast> {
        if product_id.trim().is_empty() || sku.trim().is_empty() {
            return Err(CoreError::validation("product id and sku are required"));
        }
        let forecast = self.ctx.forecast_model.generate(product_id, sku, self.ctx.now());
        if self.ctx.registry.forecasts.put(forecast.clone()).is_some() {
            tracing::debug!(product_id, "Replaced previous forecast");
        }
        tracing::info!(product_id, sku, periods = forecast.forecast.len(), "Demand forecast generated");
        self.ctx.publish(DomainEvent::DemandForecastGenerated(forecast.clone()));
        Ok(forecast)
    }

    pub fn get(&self, product_id: &str) -> CoreResult<DemandForecast> {
        self.ctx.registry.forecasts.get(&product_id.to_string())
    }

    /// Nudge the accuracy of every active forecast; predicted values never change
    pub fn refresh_all(&self) -> usize {
        let mut refreshed = 0;
        for product_id in self.ctx.registry.forecasts.keys() {
            match self.refresh(&product_id) {
                Ok(Some(_)) => refreshed += 1,
                Ok(None) => {}
                Err(e) => tracing::warn!(product_id = %product_id, "Forecast refresh failed: {}", e),
            }
        }
        tracing::info!(refreshed, "Forecast refresh cycle finished");
        refreshed
    }

    fn refresh(&self, product_id: &String) -> CoreResult<Option<DemandForecast>> {
        let now = self.ctx.now();
        let delta = self.ctx.random.uniform(-ACCURACY_NUDGE, ACCURACY_NUDGE);
        let model = &self.ctx.forecast_model;
        let updated = self.ctx.registry.forecasts.update(product_id, |forecast| {
            if !forecast.is_active() {
                return Ok(None);
            }
            forecast.accuracy = model.nudge_accuracy(forecast.accuracy, delta);
            forecast.last_updated = now;
            Ok(Some(forecast.clone()))
        })?;

        if let Some(forecast) = &updated {
            tracing::debug!(product_id = %product_id, accuracy = forecast.accuracy, "Forecast refreshed");
            self.ctx.publish(DomainEvent::DemandForecastUpdated(forecast.clone()));
        }
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::test_engine;
    use supply_shared::ForecastStatus;

    #[tokio::test(start_paused = true)]
    async fn test_generate_overwrites() {
        let engine = test_engine();
        let forecaster = engine.forecaster();
        let first = forecaster.generate("P-100", "SKU-100").unwrap();
        let second = forecaster.generate("P-100", "SKU-100").unwrap();

        assert_ne!(first.id, second.id);
        assert_eq!(engine.context().registry.forecasts.len(), 1);
        assert_eq!(forecaster.get("P-100").unwrap().id, second.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_keeps_series_and_bounds_accuracy() {
        let engine = test_engine();
        let forecaster = engine.forecaster();
        let original = forecaster.generate("P-1", "SKU-1").unwrap();

        for _ in 0..50 {
            assert_eq!(forecaster.refresh_all(), 1);
        }
        let refreshed = forecaster.get("P-1").unwrap();
        assert_eq!(refreshed.forecast, original.forecast);
        assert_eq!(refreshed.historical, original.historical);
        assert!(refreshed.accuracy >= 50.0 && refreshed.accuracy <= 95.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_inactive_forecasts_are_skipped() {
        let engine = test_engine();
        engine.forecaster().generate("P-2", "SKU-2").unwrap();
        engine
            .context()
            .registry
            .forecasts
            .update(&"P-2".to_string(), |f| {
                f.status = ForecastStatus::Outdated;
                Ok(())
            })
            .unwrap();
        assert_eq!(engine.forecaster().refresh_all(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_product() {
        let engine = test_engine();
        assert!(matches!(engine.forecaster().get("nope"), Err(CoreError::NotFound { .. })));
        assert!(engine.forecaster().generate("", "SKU").is_err());
    }
}
