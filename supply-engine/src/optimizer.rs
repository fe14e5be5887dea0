use std::sync::Arc;

use supply_core::{CoreError, CoreResult};
use supply_planning::optimize;
use supply_shared::{DomainEvent, InventoryOptimization};

use crate::context::EngineContext;

/// Runs the inventory math against the product's active forecast
pub struct InventoryOptimizer {
    ctx: Arc<EngineContext>,
}

impl InventoryOptimizer {
    pub fn new(ctx: Arc<EngineContext>) -> Self {
        Self { ctx }
    }

    pub fn optimize(&self, product_id: &str, current_stock: i64) -> CoreResult<InventoryOptimization> {
        if product_id.trim().is_empty() {
            return Err(CoreError::validation("product id is required"));
        }
        let average_demand = self
            .ctx
            .registry
            .forecasts
            .find(&product_id.to_string())
            .filter(|f| f.is_active())
            .and_then(|f| f.average_predicted());

        let result = optimize(&self.ctx.policy, product_id, current_stock, average_demand, self.ctx.now())
            .map_err(|e| CoreError::validation(e.to_string()))?;

        self.ctx.registry.optimizations.put(result.clone());
        tracing::info!(
            product_id,
            current_stock,
            reorder_point = result.reorder_point,
            eoq = result.economic_order_quantity,
            action = ?result.recommended_stock.action,
            "Inventory optimized"
        );
        self.ctx.publish(DomainEvent::InventoryOptimized(result.clone()));
        Ok(result)
    }

    pub fn get(&self, product_id: &str) -> CoreResult<InventoryOptimization> {
        self.ctx.registry.optimizations.get(&product_id.to_string())
    }
}
