use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Kinds of supply-chain incidents
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    SupplierIssue,
    DeliveryDelay,
    QualityProblem,
    DemandSpike,
    CapacityConstraint,
    NaturalDisaster,
    Geopolitical,
    PriceVolatility,
    RegulatoryChange,
}

impl EventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SupplierIssue => "supplier_issue",
            Self::DeliveryDelay => "delivery_delay",
            Self::QualityProblem => "quality_problem",
            Self::DemandSpike => "demand_spike",
            Self::CapacityConstraint => "capacity_constraint",
            Self::NaturalDisaster => "natural_disaster",
            Self::Geopolitical => "geopolitical",
            Self::PriceVolatility => "price_volatility",
            Self::RegulatoryChange => "regulatory_change",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    Active,
    Resolved,
    Monitoring,
    Escalated,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Resolved => "resolved",
            Self::Monitoring => "monitoring",
            Self::Escalated => "escalated",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImpactAssessment {
    pub financial: String,
    pub operational: String,
    pub customer: String,
    pub timeline: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TimelineEntry {
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionPriority {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ActionStatus {
    Pending,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResponseAction {
    pub id: Uuid,
    pub action: String,
    pub assignee: String,
    pub priority: ActionPriority,
    pub deadline: DateTime<Utc>,
    pub status: ActionStatus,
}

/// Incident record raised by the monitor or coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SupplyChainEvent {
    pub id: Uuid,
    pub event_type: EventType,
    pub severity: EventSeverity,
    pub status: EventStatus,
    pub title: String,
    pub description: String,
    pub affected_suppliers: Vec<Uuid>,
    pub affected_products: Vec<String>,
    pub affected_orders: Vec<Uuid>,
    pub impact: ImpactAssessment,
    pub timeline: Vec<TimelineEntry>,
    pub response_actions: Vec<ResponseAction>,
    pub detected_at: DateTime<Utc>,
    pub resolved_at: Option<DateTime<Utc>>,
    pub escalated_to: Option<String>,
}

impl SupplyChainEvent {
    pub fn is_open(&self) -> bool {
        self.status != EventStatus::Resolved
    }
}

/// What a monitor finding carries into the coordinator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventSpec {
    pub event_type: EventType,
    pub severity: EventSeverity,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub affected_suppliers: Vec<Uuid>,
    #[serde(default)]
    pub affected_products: Vec<String>,
    #[serde(default)]
    pub affected_orders: Vec<Uuid>,
    pub impact: ImpactAssessment,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    pub severity: Option<EventSeverity>,
    pub status: Option<EventStatus>,
}

impl EventFilter {
    pub fn matches(&self, event: &SupplyChainEvent) -> bool {
        self.severity.map_or(true, |s| event.severity == s)
            && self.status.map_or(true, |s| event.status == s)
    }
}
