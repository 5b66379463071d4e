//! Notification fan-out

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, warn};

use super::NotificationService;
use crate::models::{Alert, AlertType, Check};

/// Counts of what a dispatch did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchSummary {
    /// Subscriptions whose eligibility predicate declined
    pub skipped: usize,
    /// Successful (subscription, channel) deliveries
    pub delivered: usize,
    /// Failed (subscription, channel) deliveries
    pub failed: usize,
}

/// Sends a run's alerts to every eligible subscription through every
/// registered channel able to handle it.
///
/// Each (subscription, channel) delivery stands alone: a failure is logged
/// and the next delivery proceeds.
#[derive(Clone, Default)]
pub struct NotificationDispatcher {
    services: Vec<Arc<dyn NotificationService>>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over `services`
    pub fn new(services: Vec<Arc<dyn NotificationService>>) -> Self {
        Self { services }
    }

    /// Register another channel
    pub fn register(&mut self, service: Arc<dyn NotificationService>) {
        self.services.push(service);
    }

    /// Deliver `alerts` for `check`.
    ///
    /// Eligibility is decided once per subscription from the check-level
    /// `worst` state, not per alert.
    pub async fn dispatch(
        &self,
        check: &Check,
        worst: AlertType,
        alerts: &[Alert],
        now: DateTime<Utc>,
    ) -> DispatchSummary {
        let mut summary = DispatchSummary::default();

        for subscription in &check.subscriptions {
            if !subscription.should_notify(now, worst) {
                debug!(
                    check_id = %check.id,
                    destination = %subscription.target,
                    channel = %subscription.subscription_type,
                    state = %worst,
                    "Subscription not eligible for notification"
                );
                summary.skipped += 1;
                continue;
            }

            for service in self
                .services
                .iter()
                .filter(|s| s.can_handle(subscription.subscription_type))
            {
                match service.send_notification(check, subscription, alerts).await {
                    Ok(()) => {
                        summary.delivered += 1;
                        metrics::counter!(
                            "tripwire_notifications_total",
                            "channel" => subscription.subscription_type.as_str(),
                            "status" => "delivered"
                        )
                        .increment(1);
                    }
                    Err(e) => {
                        summary.failed += 1;
                        metrics::counter!(
                            "tripwire_notifications_total",
                            "channel" => subscription.subscription_type.as_str(),
                            "status" => "failed"
                        )
                        .increment(1);
                        warn!(
                            check_id = %check.id,
                            destination = %subscription.target,
                            channel = %subscription.subscription_type,
                            service = service.name(),
                            error = %e,
                            "Notifying {} by {} failed",
                            subscription.target,
                            subscription.subscription_type
                        );
                    }
                }
            }
        }

        summary
    }
}
