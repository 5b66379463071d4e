//! Alert data models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AlertType;

/// Audit record of one target's classification at one point in time.
///
/// Alerts are append-only: once handed to the alerts store they are never
/// edited or deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    /// Unique identifier
    pub id: Uuid,

    /// The check that produced this alert (set by the alerts store)
    pub check_id: Option<Uuid>,

    /// Target the reading belongs to
    pub target: String,

    /// Observed value
    pub value: f64,

    /// Warn threshold in effect at evaluation time
    pub warn: f64,

    /// Error threshold in effect at evaluation time
    pub error: f64,

    /// State of the check before the run
    pub from_type: AlertType,

    /// State computed for this target
    pub to_type: AlertType,

    /// Time of the run
    pub timestamp: DateTime<Utc>,
}

impl Alert {
    /// Whether the alert records a change of state
    pub fn is_transition(&self) -> bool {
        self.from_type != self.to_type
    }
}
