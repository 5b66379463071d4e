//! Persistence seams for checks and alerts
//!
//! The runner only depends on the two traits below. [`MemoryChecksStore`] and
//! [`MemoryAlertsStore`] back the CLI and the test-suite.

mod memory;

pub use memory::{MemoryAlertsStore, MemoryChecksStore};

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::models::{Alert, Check, StateUpdate, Subscription};

/// Append-only store of alert records
#[async_trait]
pub trait AlertsStore: Send + Sync {
    /// Persist `alert` for `check_id` and return the stored record
    async fn create_alert(&self, check_id: Uuid, alert: Alert) -> Result<Alert>;

    /// Most recent alert recorded for `target` of `check_id`
    async fn last_alert_for_target_of_check(
        &self,
        target: &str,
        check_id: Uuid,
    ) -> Result<Option<Alert>>;

    /// Alerts recorded for `check_id`, oldest first
    async fn alerts_for_check(&self, check_id: Uuid) -> Result<Vec<Alert>>;
}

/// Store of check aggregates
#[async_trait]
pub trait ChecksStore: Send + Sync {
    /// Read a check
    async fn get_check(&self, id: Uuid) -> Result<Option<Check>>;

    /// List checks, optionally only enabled ones
    async fn get_checks(&self, enabled_only: bool) -> Result<Vec<Check>>;

    /// Atomically apply `update` to the check and return the fresh snapshot,
    /// subscriptions included
    async fn update_state_and_last_check_and_last_values(
        &self,
        id: Uuid,
        update: StateUpdate,
    ) -> Result<Check>;

    /// Attach a subscription to a check
    async fn add_subscription(&self, id: Uuid, subscription: Subscription) -> Result<Check>;
}
