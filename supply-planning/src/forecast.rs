use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use uuid::Uuid;

use supply_shared::models::forecast::{ForecastFactor, ForecastPeriod, HistoricalPeriod};
use supply_shared::{DemandForecast, ForecastStatus};

/// Synthetic trend + seasonality demand model.
///
/// Demand for period offset `t` (negative = history, positive = future) is
/// `base + trend * t + amplitude * sin(2πt / season_length)`. Fully
/// deterministic; only accuracy refreshes involve randomness, and those are
/// drawn by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastModel {
    pub base_demand: f64,
    pub trend_per_period: f64,
    pub seasonal_amplitude: f64,
    pub season_length: u32,
    pub history_periods: u32,
    pub horizon: u32,
    pub initial_accuracy: f64,
    pub initial_confidence: f64,
    pub accuracy_floor: f64,
    pub accuracy_ceiling: f64,
}

impl Default for ForecastModel {
    fn default() -> Self {
        Self {
            base_demand: 1000.0,
            trend_per_period: 15.0,
            seasonal_amplitude: 100.0,
            season_length: 12,
            history_periods: 12,
            horizon: 6,
            initial_accuracy: 85.0,
            initial_confidence: 90.0,
            accuracy_floor: 50.0,
            accuracy_ceiling: 95.0,
        }
    }
}

const MODEL_NAME: &str = "seasonal_trend_v1";
const PROMOTION_EVERY: i32 = 4;
const PROMOTION_UPLIFT: f64 = 1.15;
const STOCKOUT_LOSS: f64 = 0.05;

impl ForecastModel {
    pub fn trend(&self, t: i32) -> f64 {
        self.trend_per_period * t as f64
    }

    pub fn seasonal(&self, t: i32) -> f64 {
        self.seasonal_amplitude * (2.0 * PI * t as f64 / self.season_length as f64).sin()
    }

    pub fn expected_demand(&self, t: i32) -> f64 {
        self.base_demand + self.trend(t) + self.seasonal(t)
    }

    /// Confidence for the `i`th future period (1-based): 0.9, minus 0.05 per step, floored at 0.6
    pub fn period_confidence(i: u32) -> f64 {
        (0.9 - 0.05 * (i.saturating_sub(1)) as f64).max(0.6)
    }

    pub fn history(&self) -> Vec<HistoricalPeriod> {
        let periods = self.history_periods as i32;
        (-periods..0)
            .map(|t| {
                let promotion = t % PROMOTION_EVERY == 0;
                let mut demand = self.expected_demand(t).round();
                if promotion {
                    demand = (demand * PROMOTION_UPLIFT).round();
                }
                // Promotions outrun stock once per promoted period
                let stockouts = u32::from(promotion);
                let lost = if stockouts > 0 {
                    (demand * STOCKOUT_LOSS).round()
                } else {
                    0.0
                };
                HistoricalPeriod {
                    period: t,
                    demand,
                    actual_sales: demand - lost,
                    stockouts,
                    promotion,
                    events: if promotion {
                        vec!["promotion".to_string()]
                    } else {
                        Vec::new()
                    },
                }
            })
            .collect()
    }

    pub fn projection(&self) -> Vec<ForecastPeriod> {
        (1..=self.horizon)
            .map(|i| {
                let predicted = self.expected_demand(i as i32).round();
                ForecastPeriod {
                    period: i as i32,
                    predicted,
                    lower_bound: 0.8 * predicted,
                    upper_bound: 1.2 * predicted,
                    confidence: Self::period_confidence(i),
                }
            })
            .collect()
    }

    pub fn factors() -> Vec<ForecastFactor> {
        [
            ("seasonality", 0.30, "high"),
            ("trend", 0.20, "medium"),
            ("promotions", 0.15, "medium"),
            ("market_conditions", 0.10, "low"),
        ]
        .into_iter()
        .map(|(factor_type, impact, importance)| ForecastFactor {
            factor_type: factor_type.to_string(),
            impact,
            importance: importance.to_string(),
        })
        .collect()
    }

    pub fn generate(&self, product_id: &str, sku: &str, now: DateTime<Utc>) -> DemandForecast {
        DemandForecast {
            id: Uuid::new_v4(),
            product_id: product_id.to_string(),
            sku: sku.to_string(),
            model: MODEL_NAME.to_string(),
            historical: self.history(),
            forecast: self.projection(),
            accuracy: self.initial_accuracy,
            confidence: self.initial_confidence,
            factors: Self::factors(),
            status: ForecastStatus::Active,
            created_at: now,
            last_updated: now,
        }
    }

    /// Apply a refresh nudge, keeping accuracy inside the model's band
    pub fn nudge_accuracy(&self, accuracy: f64, delta: f64) -> f64 {
        (accuracy + delta).clamp(self.accuracy_floor, self.accuracy_ceiling)
    }
}
