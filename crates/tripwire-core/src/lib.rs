//! # Tripwire
//!
//! Check evaluation and alert dispatch for time-series monitoring.
//!
//! A *check* watches one or more targets against warn and error thresholds.
//! On every run Tripwire fetches the targets' current readings, classifies
//! each one, records alert-worthy transitions, updates the check's state and
//! notifies the check's subscribers.
//!
//! ## Architecture
//!
//! - **Models**: `AlertType` severity order, checks, subscriptions, alerts
//! - **Checkers**: target fetching and threshold classification
//! - **Stores**: check and alert persistence seams with in-memory backends
//! - **Notification**: channel trait, fan-out dispatcher, log and webhook channels
//! - **Schedule**: the check runner and a bounded concurrent scheduler
//!
//! ## Quick Start
//!
//! ```bash
//! # Evaluate every check once
//! tripwire evaluate --checks checks.json --values values.json
//!
//! # Keep evaluating until Ctrl+C
//! tripwire run --checks checks.json --values values.json
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod checker;
pub mod config;
pub mod error;
pub mod models;
pub mod notification;
pub mod schedule;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use error::{Error, Result};

/// Re-exports for convenience
pub mod prelude {
    pub use crate::checker::{TargetChecker, ThresholdValueChecker, ValueChecker};
    pub use crate::config::Config;
    pub use crate::error::{Error, Result};
    pub use crate::models::*;
    pub use crate::notification::{NotificationDispatcher, NotificationService};
    pub use crate::schedule::{CheckRunner, CheckScheduler, RunOutcome};
    pub use crate::store::{AlertsStore, ChecksStore};
}
