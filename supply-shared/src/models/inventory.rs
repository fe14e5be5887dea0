use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Inventory-theory constants used by the optimizer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InventoryPolicy {
    pub lead_time_days: f64,
    pub service_level: f64,
    /// z-score matching `service_level`
    pub z_score: f64,
    pub ordering_cost: f64,
    pub holding_cost_rate: f64,
    pub unit_cost: f64,
    /// Monthly demand assumed when a product has no active forecast
    pub fallback_demand: f64,
    pub demand_std_dev_ratio: f64,
    pub obsolescence_rate: f64,
    pub assumed_cost_improvement: f64,
    pub assumed_risk_reduction: f64,
    pub assumed_service_improvement: f64,
}

impl Default for InventoryPolicy {
    fn default() -> Self {
        Self {
            lead_time_days: 14.0,
            service_level: 0.95,
            z_score: 1.65,
            ordering_cost: 250.0,
            holding_cost_rate: 0.25,
            unit_cost: 25.50,
            fallback_demand: 750.0,
            demand_std_dev_ratio: 0.2,
            obsolescence_rate: 0.05,
            assumed_cost_improvement: 0.15,
            assumed_risk_reduction: 0.25,
            assumed_service_improvement: 0.10,
        }
    }
}

impl InventoryPolicy {
    pub fn holding_cost(&self) -> f64 {
        self.unit_cost * self.holding_cost_rate
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StockAction {
    Increase,
    Decrease,
    Maintain,
    Discontinue,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryCosts {
    pub holding: f64,
    pub ordering: f64,
    pub stockout: f64,
    pub obsolescence: f64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StockRecommendation {
    pub action: StockAction,
    pub target_level: i64,
    pub rationale: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OptimizationSummary {
    pub current_cost: f64,
    pub optimized_cost: f64,
    pub savings: f64,
    /// Percentages
    pub cost_improvement: f64,
    pub risk_reduction: f64,
    pub service_improvement: f64,
}

/// Per-product policy snapshot, overwritten on each recomputation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InventoryOptimization {
    pub product_id: String,
    pub current_stock: i64,
    pub average_demand: f64,
    pub demand_std_dev: f64,
    pub lead_time_days: f64,
    pub safety_stock: i64,
    pub reorder_point: i64,
    pub economic_order_quantity: i64,
    pub service_level: f64,
    pub costs: InventoryCosts,
    pub recommended_stock: StockRecommendation,
    pub optimization: OptimizationSummary,
    pub last_calculated: DateTime<Utc>,
}
