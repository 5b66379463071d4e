//! Check data models

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{AlertType, Subscription};

/// Last observed reading per target; `None` when the target had no datum
pub type TargetValues = BTreeMap<String, Option<f64>>;

/// A monitored rule over one or more time-series targets.
///
/// A `Check` is an immutable snapshot of what the checks store holds. The
/// runner never edits it: state changes go through
/// [`ChecksStore::update_state_and_last_check_and_last_values`](crate::store::ChecksStore::update_state_and_last_check_and_last_values),
/// which hands back a fresh snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Check {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Human-readable name
    pub name: String,

    /// Description of what this check monitors
    #[serde(default)]
    pub description: Option<String>,

    /// Target expression handed to the target checker
    pub target: String,

    /// Warn threshold
    pub warn: f64,

    /// Error threshold
    pub error: f64,

    /// Whether the check is evaluated at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Treat an absence of data as healthy instead of unknown
    #[serde(default)]
    pub allow_no_data: bool,

    /// Evaluated once; the state only ever worsens
    #[serde(default)]
    pub one_time: bool,

    /// Do not record alerts for repeated identical states
    #[serde(default)]
    pub disable_same_state_alerts: bool,

    /// Current canonical state
    #[serde(default)]
    pub state: AlertType,

    /// When the check was last evaluated
    #[serde(default)]
    pub last_check: Option<DateTime<Utc>>,

    /// Readings from the last evaluation
    #[serde(default)]
    pub last_values: TargetValues,

    /// Notification destinations
    #[serde(default)]
    pub subscriptions: Vec<Subscription>,
}

fn default_true() -> bool {
    true
}

impl Check {
    /// Create an enabled, recurring check in the `OK` state
    pub fn new(name: impl Into<String>, target: impl Into<String>, warn: f64, error: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            description: None,
            target: target.into(),
            warn,
            error,
            enabled: true,
            allow_no_data: false,
            one_time: false,
            disable_same_state_alerts: false,
            state: AlertType::Ok,
            last_check: None,
            last_values: TargetValues::new(),
            subscriptions: Vec::new(),
        }
    }

    /// Whether the check is re-evaluated on every tick
    pub fn is_recurring(&self) -> bool {
        !self.one_time
    }
}

/// The fields written back after a run, applied atomically by the checks store
#[derive(Debug, Clone, PartialEq)]
pub struct StateUpdate {
    /// New canonical state
    pub state: AlertType,
    /// Time of the run
    pub last_check: DateTime<Utc>,
    /// Every fetched target with its reading, absent ones included
    pub last_values: TargetValues,
}
