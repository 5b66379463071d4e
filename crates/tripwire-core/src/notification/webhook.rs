//! HTTP webhook channel

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use tracing::info;

use super::{NotificationError, NotificationService};
use crate::models::{Alert, AlertType, Check, Subscription, SubscriptionType};

/// POSTs a JSON summary of the check and its alerts to the subscription's URL
#[derive(Clone)]
pub struct WebhookNotificationService {
    client: Client,
}

impl WebhookNotificationService {
    /// Create a webhook channel whose requests give up after `timeout`
    pub fn new(timeout: Duration) -> Result<Self, NotificationError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NotificationError::Config(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl NotificationService for WebhookNotificationService {
    fn can_handle(&self, subscription_type: SubscriptionType) -> bool {
        subscription_type == SubscriptionType::Http
    }

    async fn send_notification(
        &self,
        check: &Check,
        subscription: &Subscription,
        alerts: &[Alert],
    ) -> Result<(), NotificationError> {
        let payload = WebhookPayload {
            check_id: check.id.to_string(),
            check_name: &check.name,
            description: check.description.as_deref(),
            state: check.state,
            last_check: check.last_check,
            alerts: alerts.iter().map(WebhookAlert::from).collect(),
        };

        let response = self
            .client
            .post(&subscription.target)
            .json(&payload)
            .send()
            .await
            .map_err(|e| NotificationError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NotificationError::Http(format!(
                "Webhook returned {}: {}",
                status, body
            )));
        }

        info!(check_id = %check.id, url = %subscription.target, "Webhook notification sent");
        Ok(())
    }

    fn name(&self) -> &str {
        "webhook"
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    check_id: String,
    check_name: &'a str,
    description: Option<&'a str>,
    state: AlertType,
    last_check: Option<DateTime<Utc>>,
    alerts: Vec<WebhookAlert<'a>>,
}

#[derive(Debug, Serialize)]
struct WebhookAlert<'a> {
    target: &'a str,
    value: f64,
    warn: f64,
    error: f64,
    from: AlertType,
    to: AlertType,
    timestamp: DateTime<Utc>,
}

impl<'a> From<&'a Alert> for WebhookAlert<'a> {
    fn from(alert: &'a Alert) -> Self {
        Self {
            target: &alert.target,
            value: alert.value,
            warn: alert.warn,
            error: alert.error,
            from: alert.from_type,
            to: alert.to_type,
            timestamp: alert.timestamp,
        }
    }
}
