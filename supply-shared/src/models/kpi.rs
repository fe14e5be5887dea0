use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PerformanceKpis {
    pub quality: f64,
    pub responsiveness: f64,
    pub cost_competitiveness: f64,
}

/// Dashboard aggregates across suppliers, orders and incidents
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SupplyChainKpis {
    pub total_suppliers: usize,
    pub active_suppliers: usize,
    pub average_rating: f64,
    pub average_on_time_delivery: f64,
    pub total_spend: f64,
    pub total_orders: usize,
    pub open_orders: usize,
    pub active_events: usize,
    pub critical_events: usize,
    pub average_lead_time: f64,
    pub performance: PerformanceKpis,
}
