//! Notification delivery for alerts
//!
//! Channels implement [`NotificationService`]; the [`NotificationDispatcher`]
//! fans a run's alerts out to every eligible subscription through every
//! channel that can handle it.

mod dispatcher;
mod log;
mod webhook;

pub use dispatcher::{DispatchSummary, NotificationDispatcher};
pub use log::LogNotificationService;
pub use webhook::WebhookNotificationService;

use async_trait::async_trait;

use crate::models::{Alert, Check, Subscription, SubscriptionType};

/// A delivery channel
#[async_trait]
pub trait NotificationService: Send + Sync {
    /// Whether this channel delivers subscriptions of `subscription_type`
    fn can_handle(&self, subscription_type: SubscriptionType) -> bool;

    /// Deliver `alerts` raised by `check` to `subscription`
    async fn send_notification(
        &self,
        check: &Check,
        subscription: &Subscription,
        alerts: &[Alert],
    ) -> Result<(), NotificationError>;

    /// Channel name for logs and metrics
    fn name(&self) -> &str;
}

/// Notification errors
#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    /// The request failed or the endpoint answered with a non-2xx status
    #[error("HTTP error: {0}")]
    Http(String),

    /// The channel could not be set up
    #[error("Configuration error: {0}")]
    Config(String),

    /// The channel was handed a subscription type it does not deliver
    #[error("Unsupported subscription type: {0}")]
    Unsupported(SubscriptionType),
}
