use chrono::{DateTime, Utc};

use supply_shared::models::inventory::{
    InventoryCosts, OptimizationSummary, StockAction, StockRecommendation,
};
use supply_shared::{InventoryOptimization, InventoryPolicy};

/// Days per demand period; forecasts are monthly
const DAYS_PER_PERIOD: f64 = 30.0;
const PERIODS_PER_YEAR: f64 = 12.0;

/// `round(z * sqrt(lead_time) * σ)`
pub fn safety_stock(z_score: f64, lead_time_days: f64, demand_std_dev: f64) -> i64 {
    (z_score * lead_time_days.sqrt() * demand_std_dev).round() as i64
}

/// `round(avg_demand / 30 * lead_time + safety_stock)`
pub fn reorder_point(average_demand: f64, lead_time_days: f64, safety_stock: i64) -> i64 {
    (average_demand / DAYS_PER_PERIOD * lead_time_days + safety_stock as f64).round() as i64
}

/// Wilson EOQ: `round(sqrt(2 * D * S / H))`
pub fn economic_order_quantity(annual_demand: f64, ordering_cost: f64, holding_cost: f64) -> i64 {
    (2.0 * annual_demand * ordering_cost / holding_cost).sqrt().round() as i64
}

/// Compute the full inventory policy snapshot for one product.
///
/// `average_demand` is the mean of the product's active forecast; `None`
/// falls back to the policy's default monthly demand.
pub fn optimize(
    policy: &InventoryPolicy,
    product_id: &str,
    current_stock: i64,
    average_demand: Option<f64>,
    now: DateTime<Utc>,
) -> Result<InventoryOptimization, PlanningError> {
    if current_stock < 0 {
        return Err(PlanningError::InvalidStock(current_stock));
    }
    let holding_cost = policy.holding_cost();
    if holding_cost <= 0.0 || policy.lead_time_days <= 0.0 {
        return Err(PlanningError::InvalidPolicy(
            "holding cost and lead time must be positive".to_string(),
        ));
    }

    let average_demand = average_demand
        .filter(|d| d.is_finite() && *d >= 0.0)
        .unwrap_or(policy.fallback_demand);
    let demand_std_dev = policy.demand_std_dev_ratio * average_demand;

    let safety = safety_stock(policy.z_score, policy.lead_time_days, demand_std_dev);
    let reorder = reorder_point(average_demand, policy.lead_time_days, safety);

    let annual_demand = average_demand * PERIODS_PER_YEAR;
    let eoq = economic_order_quantity(annual_demand, policy.ordering_cost, holding_cost);

    let stock = current_stock as f64;
    let holding = stock * holding_cost;
    let ordering = if eoq > 0 {
        annual_demand / eoq as f64 * policy.ordering_cost
    } else {
        0.0
    };
    let obsolescence = stock * policy.unit_cost * policy.obsolescence_rate;
    // Covered by the service level
    let stockout = 0.0;
    let total = holding + ordering + stockout + obsolescence;

    let recommended_stock = if current_stock < reorder {
        StockRecommendation {
            action: StockAction::Increase,
            target_level: reorder + eoq,
            rationale: format!(
                "Stock {} is below the reorder point {}; order {} units to reach {}",
                current_stock,
                reorder,
                eoq,
                reorder + eoq
            ),
        }
    } else {
        StockRecommendation {
            action: StockAction::Maintain,
            target_level: current_stock,
            rationale: format!(
                "Stock {} covers the reorder point {} at a {:.0}% service level",
                current_stock,
                reorder,
                policy.service_level * 100.0
            ),
        }
    };

    // Flat demonstration figures, not derived from the recommendation
    let savings = total * policy.assumed_cost_improvement;
    let optimization = OptimizationSummary {
        current_cost: total,
        optimized_cost: total - savings,
        savings,
        cost_improvement: policy.assumed_cost_improvement * 100.0,
        risk_reduction: policy.assumed_risk_reduction * 100.0,
        service_improvement: policy.assumed_service_improvement * 100.0,
    };

    Ok(InventoryOptimization {
        product_id: product_id.to_string(),
        current_stock,
        average_demand,
        demand_std_dev,
        lead_time_days: policy.lead_time_days,
        safety_stock: safety,
        reorder_point: reorder,
        economic_order_quantity: eoq,
        service_level: policy.service_level,
        costs: InventoryCosts {
            holding,
            ordering,
            stockout,
            obsolescence,
            total,
        },
        recommended_stock,
        optimization,
        last_calculated: now,
    })
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum PlanningError {
    #[error("Current stock must not be negative: {0}")]
    InvalidStock(i64),

    #[error("Invalid inventory policy: {0}")]
    InvalidPolicy(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eoq_reference_values() {
        let policy = InventoryPolicy::default();
        assert_eq!(policy.holding_cost(), 6.375);
        let expected = (2.0_f64 * 9000.0 * 250.0 / 6.375).sqrt().round() as i64;
        assert_eq!(economic_order_quantity(9000.0, 250.0, 6.375), expected);
        assert_eq!(expected, 840);
    }

    #[test]
    fn test_safety_stock_and_reorder_point() {
        let safety = safety_stock(1.65, 14.0, 150.0);
        assert_eq!(safety, (1.65_f64 * 14.0_f64.sqrt() * 150.0).round() as i64);
        assert_eq!(safety, 926);
        assert_eq!(reorder_point(750.0, 14.0, safety), 1276);
    }

    #[test]
    fn test_fallback_demand_when_no_forecast() {
        let policy = InventoryPolicy::default();
        let result = optimize(&policy, "P-1", 500, None, Utc::now()).unwrap();

        assert_eq!(result.average_demand, 750.0);
        assert_eq!(result.demand_std_dev, 150.0);
        assert_eq!(result.safety_stock, 926);
        assert_eq!(result.reorder_point, 1276);
        assert_eq!(result.economic_order_quantity, 840);
        assert_eq!(result.recommended_stock.action, StockAction::Increase);
        assert_eq!(result.recommended_stock.target_level, 1276 + 840);
    }

    #[test]
    fn test_costs() {
        let policy = InventoryPolicy::default();
        let result = optimize(&policy, "P-1", 2000, Some(750.0), Utc::now()).unwrap();

        assert_eq!(result.costs.holding, 2000.0 * 6.375);
        assert_eq!(result.costs.ordering, 9000.0 / 840.0 * 250.0);
        assert_eq!(result.costs.obsolescence, 2000.0 * 25.50 * 0.05);
        assert_eq!(result.costs.stockout, 0.0);
        let total = result.costs.holding + result.costs.ordering + result.costs.obsolescence;
        assert!((result.costs.total - total).abs() < 1e-9);

        assert_eq!(result.recommended_stock.action, StockAction::Maintain);
        assert_eq!(result.recommended_stock.target_level, 2000);
    }

    #[test]
    fn test_summary_uses_flat_constants() {
        let policy = InventoryPolicy::default();
        let result = optimize(&policy, "P-1", 100, Some(1000.0), Utc::now()).unwrap();
        let summary = &result.optimization;

        assert!((summary.savings - summary.current_cost * 0.15).abs() < 1e-9);
        assert!((summary.optimized_cost - summary.current_cost * 0.85).abs() < 1e-9);
        assert!((summary.cost_improvement - 15.0).abs() < 1e-9);
        assert!((summary.risk_reduction - 25.0).abs() < 1e-9);
        assert!((summary.service_improvement - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_negative_stock_rejected() {
        let policy = InventoryPolicy::default();
        let err = optimize(&policy, "P-1", -1, None, Utc::now()).unwrap_err();
        assert_eq!(err, PlanningError::InvalidStock(-1));
    }
}
