use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of an append-only status history (orders and shipments)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TrackingEntry {
    pub timestamp: DateTime<Utc>,
    pub status: String,
    pub description: String,
    pub location: Option<String>,
    pub updated_by: String,
}

impl TrackingEntry {
    pub fn new(
        timestamp: DateTime<Utc>,
        status: impl Into<String>,
        description: impl Into<String>,
        updated_by: impl Into<String>,
    ) -> Self {
        Self {
            timestamp,
            status: status.into(),
            description: description.into(),
            location: None,
            updated_by: updated_by.into(),
        }
    }

    pub fn at(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }
}
