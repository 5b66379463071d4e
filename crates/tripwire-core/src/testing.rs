//! Test doubles shared by unit tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use uuid::Uuid;

use crate::checker::{TargetChecker, TargetContext};
use crate::error::{Error, Result};
use crate::models::{Alert, Check, Subscription, SubscriptionType};
use crate::notification::{NotificationError, NotificationService};
use crate::store::AlertsStore;

/// Target checker returning canned values per check name
#[derive(Default)]
pub struct StubTargetChecker {
    values: Mutex<HashMap<String, HashMap<String, Option<f64>>>>,
    failing: Mutex<Vec<String>>,
    delay: Mutex<HashMap<String, Duration>>,
    calls: AtomicUsize,
}

impl StubTargetChecker {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set(&self, check_name: &str, values: &[(&str, Option<f64>)]) {
        self.values.lock().insert(
            check_name.to_string(),
            values
                .iter()
                .map(|(target, value)| (target.to_string(), *value))
                .collect(),
        );
    }

    pub fn fail(&self, check_name: &str) {
        self.failing.lock().push(check_name.to_string());
    }

    pub fn delay(&self, check_name: &str, delay: Duration) {
        self.delay.lock().insert(check_name.to_string(), delay);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TargetChecker for StubTargetChecker {
    async fn check(&self, ctx: TargetContext<'_>) -> Result<HashMap<String, Option<f64>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let delay = self.delay.lock().get(&ctx.check.name).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().contains(&ctx.check.name) {
            return Err(Error::fetch("Boom!"));
        }
        Ok(self
            .values
            .lock()
            .get(&ctx.check.name)
            .cloned()
            .unwrap_or_default())
    }
}

/// Alerts store that rejects every write
#[derive(Default)]
pub struct FailingAlertsStore;

#[async_trait]
impl AlertsStore for FailingAlertsStore {
    async fn create_alert(&self, _check_id: Uuid, _alert: Alert) -> Result<Alert> {
        Err(Error::storage("alerts store unavailable"))
    }

    async fn last_alert_for_target_of_check(
        &self,
        _target: &str,
        _check_id: Uuid,
    ) -> Result<Option<Alert>> {
        Ok(None)
    }

    async fn alerts_for_check(&self, _check_id: Uuid) -> Result<Vec<Alert>> {
        Ok(Vec::new())
    }
}

/// A delivery recorded by [`RecordingService`]
#[derive(Debug, Clone)]
pub struct Delivery {
    pub check_id: Uuid,
    pub destination: String,
    pub alerts: Vec<Alert>,
}

/// Notification channel recording every delivery; optionally failing them
pub struct RecordingService {
    handles: SubscriptionType,
    fail: bool,
    sent: Mutex<Vec<Delivery>>,
}

impl RecordingService {
    pub fn new(handles: SubscriptionType) -> Arc<Self> {
        Arc::new(Self {
            handles,
            fail: false,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn failing(handles: SubscriptionType) -> Arc<Self> {
        Arc::new(Self {
            handles,
            fail: true,
            sent: Mutex::new(Vec::new()),
        })
    }

    pub fn sent(&self) -> Vec<Delivery> {
        self.sent.lock().clone()
    }
}

#[async_trait]
impl NotificationService for RecordingService {
    fn can_handle(&self, subscription_type: SubscriptionType) -> bool {
        subscription_type == self.handles
    }

    async fn send_notification(
        &self,
        check: &Check,
        subscription: &Subscription,
        alerts: &[Alert],
    ) -> std::result::Result<(), NotificationError> {
        self.sent.lock().push(Delivery {
            check_id: check.id,
            destination: subscription.target.clone(),
            alerts: alerts.to_vec(),
        });
        if self.fail {
            Err(NotificationError::Http("Boom!".to_string()))
        } else {
            Ok(())
        }
    }

    fn name(&self) -> &str {
        "recording"
    }
}

/// Erase concrete channel types for a dispatcher
pub fn services(services: &[&Arc<RecordingService>]) -> Vec<Arc<dyn NotificationService>> {
    services
        .iter()
        .map(|s| Arc::clone(*s) as Arc<dyn NotificationService>)
        .collect()
}
