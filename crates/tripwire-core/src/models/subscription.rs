//! Notification subscriptions

use std::fmt;

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::AlertType;

/// Kind of channel a subscription is delivered through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionType {
    /// Email notification
    Email,
    /// Slack webhook
    Slack,
    /// PagerDuty
    PagerDuty,
    /// Generic HTTP webhook
    Http,
    /// Structured log line
    Log,
}

impl SubscriptionType {
    /// Lower-case name as used in logs and metrics
    pub fn as_str(self) -> &'static str {
        match self {
            SubscriptionType::Email => "email",
            SubscriptionType::Slack => "slack",
            SubscriptionType::PagerDuty => "pagerduty",
            SubscriptionType::Http => "http",
            SubscriptionType::Log => "log",
        }
    }
}

impl fmt::Display for SubscriptionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Days and time-of-day (UTC) during which a subscription may be notified.
///
/// The window is inclusive on both ends and wraps midnight when `from > to`.
/// `from == to` covers the whole day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationWindow {
    /// Days on which notifications are allowed
    pub days: Vec<Weekday>,
    /// Start of the allowed time-of-day range
    pub from: NaiveTime,
    /// End of the allowed time-of-day range
    pub to: NaiveTime,
}

impl Default for NotificationWindow {
    fn default() -> Self {
        Self {
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            from: NaiveTime::MIN,
            to: NaiveTime::MIN,
        }
    }
}

impl NotificationWindow {
    /// Whether `time` falls inside this window
    pub fn contains(&self, time: DateTime<Utc>) -> bool {
        if !self.days.contains(&time.weekday()) {
            return false;
        }

        let t = time.time();
        if self.from == self.to {
            true
        } else if self.from < self.to {
            self.from <= t && t <= self.to
        } else {
            t >= self.from || t <= self.to
        }
    }
}

/// A notification destination attached to a check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Unique identifier
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,

    /// Destination (address, URL, channel name, ...)
    pub target: String,

    /// Channel type
    #[serde(rename = "type")]
    pub subscription_type: SubscriptionType,

    /// Whether the subscription is active
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Suppress notifications while the check is OK
    #[serde(default)]
    pub ignore_ok: bool,

    /// Suppress notifications while the check is WARN
    #[serde(default)]
    pub ignore_warn: bool,

    /// Suppress notifications while the check is ERROR
    #[serde(default)]
    pub ignore_error: bool,

    /// Suppress notifications while the check is UNKNOWN
    #[serde(default)]
    pub ignore_unknown: bool,

    /// When notifications may be delivered
    #[serde(default)]
    pub window: NotificationWindow,
}

fn default_true() -> bool {
    true
}

impl Subscription {
    /// Create an enabled subscription notified at any time for any severity
    pub fn new(subscription_type: SubscriptionType, target: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            target: target.into(),
            subscription_type,
            enabled: true,
            ignore_ok: false,
            ignore_warn: false,
            ignore_error: false,
            ignore_unknown: false,
            window: NotificationWindow::default(),
        }
    }

    /// Whether this subscription wants to hear about a check in `state` at `now`
    pub fn should_notify(&self, now: DateTime<Utc>, state: AlertType) -> bool {
        if !self.enabled {
            return false;
        }

        let ignored = match state {
            AlertType::Ok => self.ignore_ok,
            AlertType::Warn => self.ignore_warn,
            AlertType::Error => self.ignore_error,
            AlertType::Unknown => self.ignore_unknown,
        };
        if ignored {
            return false;
        }

        self.window.contains(now)
    }
}
