pub mod models;

pub use models::events::{DomainEvent, EventKind};
pub use models::forecast::{DemandForecast, ForecastStatus};
pub use models::incident::{EventSeverity, EventStatus, EventType, SupplyChainEvent};
pub use models::inventory::{InventoryOptimization, InventoryPolicy};
pub use models::kpi::SupplyChainKpis;
pub use models::purchase_order::{PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus};
pub use models::shipment::{Shipment, ShipmentStatus};
pub use models::supplier::{RiskLevel, Supplier, SupplierStatus, SupplierTier, SupplierType};
