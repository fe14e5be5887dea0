pub mod context;
pub mod coordinator;
pub mod engine;
pub mod forecasting;
pub mod lifecycle;
pub mod monitor;
pub mod optimizer;
pub mod shipment;
pub mod worker;

pub use context::EngineContext;
pub use coordinator::EventCoordinator;
pub use engine::{EngineBuilder, SupplyChainEngine};
pub use forecasting::DemandForecaster;
pub use lifecycle::PurchaseOrderManager;
pub use monitor::{DeliveryOutcome, SupplierMonitor};
pub use optimizer::InventoryOptimizer;
pub use shipment::ShipmentTracker;
