pub mod events;
pub mod forecast;
pub mod incident;
pub mod inventory;
pub mod kpi;
pub mod purchase_order;
pub mod shipment;
pub mod supplier;
pub mod tracking;
