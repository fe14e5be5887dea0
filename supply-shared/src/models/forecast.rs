use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ForecastStatus {
    Active,
    Outdated,
    UnderReview,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoricalPeriod {
    /// Offset from the current period, -12..=-1
    pub period: i32,
    pub demand: f64,
    pub actual_sales: f64,
    pub stockouts: u32,
    pub promotion: bool,
    pub events: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastPeriod {
    /// Offset from the current period, 1..=6
    pub period: i32,
    pub predicted: f64,
    pub lower_bound: f64,
    pub upper_bound: f64,
    pub confidence: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ForecastFactor {
    pub factor_type: String,
    pub impact: f64,
    pub importance: String,
}

/// The single active forecast for a product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DemandForecast {
    pub id: Uuid,
    pub product_id: String,
    pub sku: String,
    pub model: String,
    pub historical: Vec<HistoricalPeriod>,
    pub forecast: Vec<ForecastPeriod>,
    /// Percentage
    pub accuracy: f64,
    /// Percentage
    pub confidence: f64,
    pub factors: Vec<ForecastFactor>,
    pub status: ForecastStatus,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

impl DemandForecast {
    pub fn is_active(&self) -> bool {
        self.status == ForecastStatus::Active
    }

    /// Mean of the forward series
    pub fn average_predicted(&self) -> Option<f64> {
        if self.forecast.is_empty() {
            return None;
        }
        let sum: f64 = self.forecast.iter().map(|p| p.predicted).sum();
        Some(sum / self.forecast.len() as f64)
    }
}
