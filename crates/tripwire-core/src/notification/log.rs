//! Log channel

use async_trait::async_trait;
use tracing::info;

use super::{NotificationError, NotificationService};
use crate::models::{Alert, Check, Subscription, SubscriptionType};

/// Writes one structured log line per alert
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotificationService;

impl LogNotificationService {
    /// Create a new log channel
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl NotificationService for LogNotificationService {
    fn can_handle(&self, subscription_type: SubscriptionType) -> bool {
        subscription_type == SubscriptionType::Log
    }

    async fn send_notification(
        &self,
        check: &Check,
        subscription: &Subscription,
        alerts: &[Alert],
    ) -> Result<(), NotificationError> {
        if !self.can_handle(subscription.subscription_type) {
            return Err(NotificationError::Unsupported(subscription.subscription_type));
        }

        for alert in alerts {
            info!(
                check_id = %check.id,
                check_name = %check.name,
                destination = %subscription.target,
                target = %alert.target,
                value = alert.value,
                from = %alert.from_type,
                to = %alert.to_type,
                "Check alert"
            );
        }

        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}
