//! In-memory stores

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::RwLock;
use tracing::debug;
use uuid::Uuid;

use super::{AlertsStore, ChecksStore};
use crate::error::{Error, Result};
use crate::models::{Alert, Check, StateUpdate, Subscription};

/// Checks held in a concurrent map.
///
/// Updates of one check hold that entry's shard lock, so concurrent updates
/// of the same check are serialised while different checks proceed
/// independently.
#[derive(Clone, Default)]
pub struct MemoryChecksStore {
    checks: Arc<DashMap<Uuid, Check>>,
}

impl MemoryChecksStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a check
    pub fn insert(&self, check: Check) {
        self.checks.insert(check.id, check);
    }

    /// Number of stored checks
    pub fn len(&self) -> usize {
        self.checks.len()
    }

    /// Whether the store is empty
    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl FromIterator<Check> for MemoryChecksStore {
    fn from_iter<I: IntoIterator<Item = Check>>(iter: I) -> Self {
        let store = Self::new();
        for check in iter {
            store.insert(check);
        }
        store
    }
}

#[async_trait]
impl ChecksStore for MemoryChecksStore {
    async fn get_check(&self, id: Uuid) -> Result<Option<Check>> {
        Ok(self.checks.get(&id).map(|c| c.value().clone()))
    }

    async fn get_checks(&self, enabled_only: bool) -> Result<Vec<Check>> {
        let mut checks: Vec<Check> = self
            .checks
            .iter()
            .filter(|c| !enabled_only || c.enabled)
            .map(|c| c.value().clone())
            .collect();
        checks.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(checks)
    }

    async fn update_state_and_last_check_and_last_values(
        &self,
        id: Uuid,
        update: StateUpdate,
    ) -> Result<Check> {
        let mut entry = self
            .checks
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Check", id.to_string()))?;

        let check = entry.value_mut();
        check.state = update.state;
        check.last_check = Some(update.last_check);
        check.last_values = update.last_values;

        debug!(check_id = %id, state = %check.state, "Check state updated");

        Ok(check.clone())
    }

    async fn add_subscription(&self, id: Uuid, subscription: Subscription) -> Result<Check> {
        let mut entry = self
            .checks
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("Check", id.to_string()))?;

        entry.value_mut().subscriptions.push(subscription);
        Ok(entry.value().clone())
    }
}

/// Alerts held in an append-only vector
#[derive(Clone, Default)]
pub struct MemoryAlertsStore {
    alerts: Arc<RwLock<Vec<Alert>>>,
}

impl MemoryAlertsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Every stored alert, oldest first
    pub fn all(&self) -> Vec<Alert> {
        self.alerts.read().clone()
    }

    /// Number of stored alerts
    pub fn len(&self) -> usize {
        self.alerts.read().len()
    }

    /// Whether no alert has been stored
    pub fn is_empty(&self) -> bool {
        self.alerts.read().is_empty()
    }
}

#[async_trait]
impl AlertsStore for MemoryAlertsStore {
    async fn create_alert(&self, check_id: Uuid, mut alert: Alert) -> Result<Alert> {
        alert.check_id = Some(check_id);
        self.alerts.write().push(alert.clone());
        Ok(alert)
    }

    async fn last_alert_for_target_of_check(
        &self,
        target: &str,
        check_id: Uuid,
    ) -> Result<Option<Alert>> {
        let alerts = self.alerts.read();
        // later inserts win ties on timestamp
        let last = alerts
            .iter()
            .filter(|a| a.check_id == Some(check_id) && a.target == target)
            .fold(None::<&Alert>, |best, a| match best {
                Some(b) if b.timestamp > a.timestamp => Some(b),
                _ => Some(a),
            });
        Ok(last.cloned())
    }

    async fn alerts_for_check(&self, check_id: Uuid) -> Result<Vec<Alert>> {
        Ok(self
            .alerts
            .read()
            .iter()
            .filter(|a| a.check_id == Some(check_id))
            .cloned()
            .collect())
    }
}
