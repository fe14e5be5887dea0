use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::tracking::TrackingEntry;

/// Purchase order status in the lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderStatus {
    Draft,
    PendingApproval,
    Approved,
    Sent,
    Acknowledged,
    InProduction,
    Shipped,
    Delivered,
    Received,
    Completed,
    Cancelled,
    Disputed,
}

impl PurchaseOrderStatus {
    pub const ALL: [PurchaseOrderStatus; 12] = [
        Self::Draft,
        Self::PendingApproval,
        Self::Approved,
        Self::Sent,
        Self::Acknowledged,
        Self::InProduction,
        Self::Shipped,
        Self::Delivered,
        Self::Received,
        Self::Completed,
        Self::Cancelled,
        Self::Disputed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::PendingApproval => "pending_approval",
            Self::Approved => "approved",
            Self::Sent => "sent",
            Self::Acknowledged => "acknowledged",
            Self::InProduction => "in_production",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Received => "received",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
            Self::Disputed => "disputed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled | Self::Disputed)
    }

    /// Successor on the happy path
    pub fn next(&self) -> Option<Self> {
        match self {
            Self::Draft => Some(Self::PendingApproval),
            Self::PendingApproval => Some(Self::Approved),
            Self::Approved => Some(Self::Sent),
            Self::Sent => Some(Self::Acknowledged),
            Self::Acknowledged => Some(Self::InProduction),
            Self::InProduction => Some(Self::Shipped),
            Self::Shipped => Some(Self::Delivered),
            Self::Delivered => Some(Self::Received),
            Self::Received => Some(Self::Completed),
            Self::Completed | Self::Cancelled | Self::Disputed => None,
        }
    }

    /// Full edge set of the state machine
    pub fn can_transition_to(&self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        matches!(target, Self::Cancelled | Self::Disputed) || self.next() == Some(target)
    }

    /// Statuses an order may be created in
    pub fn is_initial(&self) -> bool {
        matches!(self, Self::Draft | Self::PendingApproval | Self::Approved)
    }

    /// Orders with goods still owed by the supplier
    pub fn awaiting_delivery(&self) -> bool {
        matches!(
            self,
            Self::Sent | Self::Acknowledged | Self::InProduction | Self::Shipped
        )
    }
}

impl fmt::Display for PurchaseOrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PurchaseOrderType {
    Standard,
    Blanket,
    Contract,
    Planned,
    Emergency,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum OrderPriority {
    Low,
    Normal,
    High,
    Urgent,
}

/// Per-item status, tracked independently of the order and allowed to lag it
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    Pending,
    Confirmed,
    InProduction,
    Shipped,
    Delivered,
    Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseOrderItem {
    pub id: Uuid,
    pub product_id: String,
    pub sku: String,
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub total_price: f64,
    #[serde(default)]
    pub specifications: Vec<String>,
    #[serde(default)]
    pub quality_requirements: Vec<String>,
    pub delivery_date: DateTime<Utc>,
    pub status: ItemStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PurchaseTerms {
    pub payment_terms: String,
    pub incoterms: String,
    pub currency: String,
    pub warranty: Option<String>,
}

impl Default for PurchaseTerms {
    fn default() -> Self {
        Self {
            payment_terms: "Net 30".to_string(),
            incoterms: "FOB".to_string(),
            currency: "USD".to_string(),
            warranty: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShippingSpec {
    pub method: String,
    pub carrier: String,
    pub origin: String,
    pub destination: String,
    pub instructions: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDocument {
    pub name: String,
    pub document_type: String,
    pub url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseOrder {
    pub id: Uuid,
    pub supplier_id: Uuid,
    pub order_number: String,
    pub order_type: PurchaseOrderType,
    pub status: PurchaseOrderStatus,
    pub priority: OrderPriority,
    pub requester: String,
    pub approver: Option<String>,
    pub order_date: DateTime<Utc>,
    pub expected_delivery: DateTime<Utc>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub items: Vec<PurchaseOrderItem>,
    pub total_value: f64,
    pub terms: PurchaseTerms,
    pub shipping: ShippingSpec,
    pub tracking: Vec<TrackingEntry>,
    pub documents: Vec<OrderDocument>,
    pub notes: Vec<String>,
    pub shipment_id: Option<Uuid>,
    pub updated_at: DateTime<Utc>,
}

impl PurchaseOrder {
    /// Append a tracking entry; the log never shrinks
    pub fn record(&mut self, entry: TrackingEntry) {
        self.updated_at = entry.timestamp;
        self.tracking.push(entry);
    }

    /// Move to `status` and log the edge
    pub fn transition(
        &mut self,
        status: PurchaseOrderStatus,
        now: DateTime<Utc>,
        description: String,
        updated_by: &str,
    ) -> PurchaseOrderStatus {
        let previous = self.status;
        self.status = status;
        self.record(TrackingEntry::new(now, status.as_str(), description, updated_by));
        previous
    }

    pub fn is_late(&self, delivered_at: DateTime<Utc>) -> bool {
        delivered_at > self.expected_delivery
    }
}

/// One line of a create-order command
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOrderItem {
    pub product_id: String,
    pub sku: String,
    #[serde(default)]
    pub description: String,
    pub quantity: u32,
    pub unit_price: f64,
    #[serde(default)]
    pub specifications: Vec<String>,
    #[serde(default)]
    pub quality_requirements: Vec<String>,
    #[serde(default)]
    pub delivery_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPurchaseOrder {
    pub supplier_id: Uuid,
    #[serde(default = "default_order_type")]
    pub order_type: PurchaseOrderType,
    #[serde(default = "default_initial_status")]
    pub status: PurchaseOrderStatus,
    #[serde(default = "default_priority")]
    pub priority: OrderPriority,
    pub requester: String,
    #[serde(default)]
    pub approver: Option<String>,
    pub expected_delivery: DateTime<Utc>,
    pub items: Vec<NewPurchaseOrderItem>,
    #[serde(default)]
    pub terms: PurchaseTerms,
    pub shipping: ShippingSpec,
    #[serde(default)]
    pub documents: Vec<OrderDocument>,
    #[serde(default)]
    pub notes: Vec<String>,
}

fn default_order_type() -> PurchaseOrderType {
    PurchaseOrderType::Standard
}

fn default_initial_status() -> PurchaseOrderStatus {
    PurchaseOrderStatus::Draft
}

fn default_priority() -> OrderPriority {
    OrderPriority::Normal
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PurchaseOrderFilter {
    pub status: Option<PurchaseOrderStatus>,
    pub supplier_id: Option<Uuid>,
}

impl PurchaseOrderFilter {
    pub fn matches(&self, order: &PurchaseOrder) -> bool {
        self.status.map_or(true, |s| order.status == s)
            && self.supplier_id.map_or(true, |id| order.supplier_id == id)
    }
}
