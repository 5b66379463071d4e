//! Check evaluation
//!
//! One run of a check: fetch every target's reading, classify it, record
//! alert-worthy transitions, write the check's new state back and notify
//! subscribers. A run never returns an error; every collaborator failure is
//! logged at its call site and reflected in the returned [`RunOutcome`].

use std::fmt;
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::checker::{TargetChecker, TargetContext, ValueChecker};
use crate::models::{Alert, AlertType, Check, StateUpdate, TargetValues};
use crate::notification::{DispatchSummary, NotificationDispatcher};
use crate::store::{AlertsStore, ChecksStore};

/// Step at which a run gave up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    /// Fetching target values
    Fetch,
    /// Persisting an alert
    CreateAlert,
    /// Writing the check's state back
    UpdateState,
}

impl RunStage {
    /// Short name for logs and output
    pub fn as_str(self) -> &'static str {
        match self {
            RunStage::Fetch => "fetch",
            RunStage::CreateAlert => "create_alert",
            RunStage::UpdateState => "update_state",
        }
    }
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a completed run did
#[derive(Debug, Clone, PartialEq)]
pub struct RunReport {
    /// Worst severity over every target with a reading
    pub worst: AlertType,
    /// State written back to the checks store
    pub state: AlertType,
    /// Alerts persisted during the run
    pub alerts: Vec<Alert>,
    /// How many of those alerts were handed to the dispatcher
    pub notified_alerts: usize,
    /// Dispatch counts, `None` when nothing was worth notifying
    pub dispatch: Option<DispatchSummary>,
}

/// Result of one run
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// The check is disabled; nothing was touched
    Disabled,
    /// The run stopped early; nothing after `stage` happened
    Aborted(RunStage),
    /// The run went through every step
    Completed(RunReport),
}

impl RunOutcome {
    fn label(&self) -> &'static str {
        match self {
            RunOutcome::Disabled => "disabled",
            RunOutcome::Aborted(_) => "aborted",
            RunOutcome::Completed(_) => "completed",
        }
    }
}

/// Evaluates checks against their collaborators.
///
/// The runner holds no per-check state, so one instance can evaluate any
/// number of checks concurrently.
#[derive(Clone)]
pub struct CheckRunner {
    alerts_store: Arc<dyn AlertsStore>,
    checks_store: Arc<dyn ChecksStore>,
    target_checker: Arc<dyn TargetChecker>,
    value_checker: Arc<dyn ValueChecker>,
    dispatcher: NotificationDispatcher,
}

impl CheckRunner {
    /// Create a new check runner
    pub fn new(
        alerts_store: Arc<dyn AlertsStore>,
        checks_store: Arc<dyn ChecksStore>,
        target_checker: Arc<dyn TargetChecker>,
        value_checker: Arc<dyn ValueChecker>,
        dispatcher: NotificationDispatcher,
    ) -> Self {
        Self {
            alerts_store,
            checks_store,
            target_checker,
            value_checker,
            dispatcher,
        }
    }

    /// Evaluate `check` once.
    ///
    /// `check` is the snapshot read before the run; its `state` is the prior
    /// state for every target. Notifications go out against the snapshot the
    /// checks store returns after the state update.
    pub async fn evaluate(&self, check: &Check) -> RunOutcome {
        let outcome = self.run(check).await;
        metrics::counter!("tripwire_check_runs_total", "outcome" => outcome.label()).increment(1);
        outcome
    }

    async fn run(&self, check: &Check) -> RunOutcome {
        if !check.enabled {
            return RunOutcome::Disabled;
        }

        let now = Utc::now();

        let target_values = match self
            .target_checker
            .check(TargetContext::new(check, now))
            .await
        {
            Ok(values) => values,
            Err(e) => {
                warn!(check_id = %check.id, check_name = %check.name, error = %e, "{} failed", check.name);
                return RunOutcome::Aborted(RunStage::Fetch);
            }
        };

        let last = check.state;
        let readings: Vec<(&String, f64, AlertType)> = target_values
            .iter()
            .filter_map(|(target, value)| {
                let Some(value) = *value else {
                    info!(check_id = %check.id, target = %target, "No value present for {}", target);
                    return None;
                };
                let current = self.value_checker.check_value(value, check.warn, check.error);
                Some((target, value, current))
            })
            .collect();

        let initial = if check.allow_no_data {
            AlertType::Ok
        } else {
            AlertType::Unknown
        };
        let worst = AlertType::worst_of(initial, readings.iter().map(|(_, _, current)| *current));

        let mut alerts = Vec::new();
        let mut interesting = Vec::new();

        for (target, value, current) in readings {
            if alert_suppressed(check, last, current) {
                debug!(
                    check_id = %check.id,
                    target = %target,
                    from = %last,
                    to = %current,
                    "Alert suppressed"
                );
                continue;
            }

            let alert = Alert {
                id: Uuid::new_v4(),
                check_id: Some(check.id),
                target: target.clone(),
                value,
                warn: check.warn,
                error: check.error,
                from_type: last,
                to_type: current,
                timestamp: now,
            };

            let alert = match self.alerts_store.create_alert(check.id, alert).await {
                Ok(alert) => alert,
                Err(e) => {
                    warn!(
                        check_id = %check.id,
                        check_name = %check.name,
                        target = %target,
                        error = %e,
                        "Failed to record alert, aborting run"
                    );
                    return RunOutcome::Aborted(RunStage::CreateAlert);
                }
            };

            info!(
                check_id = %check.id,
                check_name = %check.name,
                target = %target,
                value = value,
                from = %last,
                to = %current,
                "Alert created"
            );
            metrics::counter!("tripwire_alerts_created_total").increment(1);

            if worth_notifying(check, &alert) {
                interesting.push(alert.clone());
            }
            alerts.push(alert);
        }

        let state = next_state(check, worst);
        let update = StateUpdate {
            state,
            last_check: now,
            last_values: target_values.into_iter().collect::<TargetValues>(),
        };

        let updated = match self
            .checks_store
            .update_state_and_last_check_and_last_values(check.id, update)
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                warn!(
                    check_id = %check.id,
                    check_name = %check.name,
                    error = %e,
                    "Failed to update check state, aborting run"
                );
                return RunOutcome::Aborted(RunStage::UpdateState);
            }
        };

        debug!(
            check_id = %check.id,
            from = %last,
            to = %state,
            worst = %worst,
            alerts = alerts.len(),
            "Check evaluated"
        );

        let dispatch = if interesting.is_empty() {
            None
        } else {
            Some(
                self.dispatcher
                    .dispatch(&updated, worst, &interesting, now)
                    .await,
            )
        };

        RunOutcome::Completed(RunReport {
            worst,
            state,
            alerts,
            notified_alerts: interesting.len(),
            dispatch,
        })
    }
}

/// Whether a target moving from `last` to `current` should not be recorded
fn alert_suppressed(check: &Check, last: AlertType, current: AlertType) -> bool {
    let still_ok = last == AlertType::Ok && current == AlertType::Ok;
    let same_state_noise = check.is_recurring() && check.disable_same_state_alerts && last == current;
    // one-time checks never alert on a move into OK
    let one_time_recovery = check.one_time && current == AlertType::Ok;

    still_ok || same_state_noise || one_time_recovery
}

/// Recurring checks notify only on a change of state; one-time checks always
fn worth_notifying(check: &Check, alert: &Alert) -> bool {
    check.one_time || alert.is_transition()
}

/// State written back after a run. One-time checks only ever worsen.
fn next_state(check: &Check, worst: AlertType) -> AlertType {
    if check.is_recurring() || worst.is_worse_than(check.state) {
        worst
    } else {
        check.state
    }
}
