use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use super::tracking::TrackingEntry;

/// Shipment status; forward-only along the happy path
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ShipmentStatus {
    Preparing,
    PickedUp,
    InTransit,
    Customs,
    OutForDelivery,
    Delivered,
    Exception,
    Delayed,
    Lost,
    Damaged,
}

impl ShipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Preparing => "preparing",
            Self::PickedUp => "picked_up",
            Self::InTransit => "in_transit",
            Self::Customs => "customs",
            Self::OutForDelivery => "out_for_delivery",
            Self::Delivered => "delivered",
            Self::Exception => "exception",
            Self::Delayed => "delayed",
            Self::Lost => "lost",
            Self::Damaged => "damaged",
        }
    }

    /// Position on the happy path; `None` for the exception states
    fn rank(&self) -> Option<u8> {
        match self {
            Self::Preparing => Some(0),
            Self::PickedUp => Some(1),
            Self::InTransit => Some(2),
            Self::Customs => Some(3),
            Self::OutForDelivery => Some(4),
            Self::Delivered => Some(5),
            Self::Exception | Self::Delayed | Self::Lost | Self::Damaged => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(
            self,
            Self::Preparing | Self::PickedUp | Self::InTransit | Self::Customs | Self::OutForDelivery
        )
    }

    /// Forward moves (skipping allowed) or a drop into an exception state
    pub fn can_advance_to(&self, target: Self) -> bool {
        if self.is_terminal() {
            return false;
        }
        match (self.rank(), target.rank()) {
            (Some(from), Some(to)) => to > from,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentItem {
    pub product_id: String,
    pub sku: String,
    pub quantity: u32,
    pub condition: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentCost {
    pub freight: f64,
    pub insurance: f64,
    pub duties: f64,
    pub taxes: f64,
    pub handling: f64,
    pub total: f64,
    pub currency: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InsuranceRecord {
    pub provider: String,
    pub policy_number: String,
    pub coverage: f64,
    pub valid_from: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub id: Uuid,
    pub purchase_order_id: Uuid,
    pub supplier_id: Uuid,
    pub carrier: String,
    pub tracking_number: String,
    pub status: ShipmentStatus,
    pub origin: String,
    pub destination: String,
    pub ship_date: DateTime<Utc>,
    pub estimated_arrival: DateTime<Utc>,
    pub actual_arrival: Option<DateTime<Utc>>,
    pub items: Vec<ShipmentItem>,
    pub cost: ShipmentCost,
    pub insurance: InsuranceRecord,
    pub tracking: Vec<TrackingEntry>,
    pub updated_at: DateTime<Utc>,
}

impl Shipment {
    pub fn record(&mut self, entry: TrackingEntry) {
        self.updated_at = entry.timestamp;
        self.tracking.push(entry);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_only() {
        assert!(ShipmentStatus::PickedUp.can_advance_to(ShipmentStatus::InTransit));
        assert!(ShipmentStatus::InTransit.can_advance_to(ShipmentStatus::OutForDelivery));
        assert!(!ShipmentStatus::OutForDelivery.can_advance_to(ShipmentStatus::InTransit));
        assert!(!ShipmentStatus::InTransit.can_advance_to(ShipmentStatus::InTransit));
    }

    #[test]
    fn test_exception_states_are_terminal() {
        assert!(ShipmentStatus::Customs.can_advance_to(ShipmentStatus::Lost));
        for status in [
            ShipmentStatus::Delivered,
            ShipmentStatus::Exception,
            ShipmentStatus::Delayed,
            ShipmentStatus::Lost,
            ShipmentStatus::Damaged,
        ] {
            assert!(status.is_terminal());
            assert!(!status.can_advance_to(ShipmentStatus::Delivered));
        }
    }
}
