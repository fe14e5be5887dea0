use supply_engine::SupplyChainEngine;

#[derive(Clone)]
pub struct AppState {
    pub engine: SupplyChainEngine,
}

impl AppState {
    pub fn new(engine: SupplyChainEngine) -> Self {
        Self { engine }
    }
}
