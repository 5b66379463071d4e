//! Periodic evaluation of every enabled check

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::runner::{CheckRunner, RunOutcome};
use crate::config::SchedulerConfig;
use crate::error::Result;
use crate::store::ChecksStore;

/// Counts for one evaluation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassSummary {
    /// Runs that went through every step
    pub completed: usize,
    /// Runs that stopped early on a collaborator failure
    pub aborted: usize,
    /// Checks disabled between listing and evaluation
    pub disabled: usize,
    /// Runs cut off by the run timeout
    pub timed_out: usize,
    /// Runs whose task panicked
    pub panicked: usize,
}

impl PassSummary {
    /// Number of runs started
    pub fn total(&self) -> usize {
        self.completed + self.aborted + self.disabled + self.timed_out + self.panicked
    }
}

/// Runs every enabled check concurrently, bounded by
/// `max_concurrent_checks`, each run bounded by `run_timeout`
pub struct CheckScheduler {
    runner: Arc<CheckRunner>,
    checks_store: Arc<dyn ChecksStore>,
    config: SchedulerConfig,
}

impl CheckScheduler {
    /// Create a new scheduler
    pub fn new(
        runner: Arc<CheckRunner>,
        checks_store: Arc<dyn ChecksStore>,
        config: SchedulerConfig,
    ) -> Self {
        Self {
            runner,
            checks_store,
            config,
        }
    }

    /// Evaluate every enabled check once and wait for all runs to finish
    pub async fn run_once(&self) -> Result<PassSummary> {
        let checks = self.checks_store.get_checks(true).await?;

        debug!(count = checks.len(), "Evaluating checks");

        let permits = Arc::new(Semaphore::new(self.config.max_concurrent_checks));
        let run_timeout = self.config.run_timeout;
        let mut runs = JoinSet::new();

        for check in checks {
            let permits = Arc::clone(&permits);
            let runner = Arc::clone(&self.runner);

            runs.spawn(async move {
                // the semaphore is never closed
                let _permit = permits.acquire_owned().await.ok();
                match timeout(run_timeout, runner.evaluate(&check)).await {
                    Ok(outcome) => Some(outcome),
                    Err(_) => {
                        warn!(
                            check_id = %check.id,
                            check_name = %check.name,
                            timeout = ?run_timeout,
                            "Check run timed out"
                        );
                        None
                    }
                }
            });
        }

        let mut summary = PassSummary::default();
        while let Some(joined) = runs.join_next().await {
            match joined {
                Ok(Some(RunOutcome::Completed(_))) => summary.completed += 1,
                Ok(Some(RunOutcome::Aborted(_))) => summary.aborted += 1,
                Ok(Some(RunOutcome::Disabled)) => summary.disabled += 1,
                Ok(None) => summary.timed_out += 1,
                Err(e) => {
                    error!(error = %e, "Check run task failed");
                    summary.panicked += 1;
                }
            }
        }

        Ok(summary)
    }

    /// Evaluate on every tick of `scheduler.interval` until `shutdown` fires
    pub async fn run(&self, shutdown: CancellationToken) {
        info!(
            interval = ?self.config.interval,
            max_concurrent_checks = self.config.max_concurrent_checks,
            "Starting check scheduler"
        );

        let mut ticker = interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Check scheduler stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match self.run_once().await {
                        Ok(summary) => debug!(?summary, "Evaluation pass finished"),
                        Err(e) => error!(error = %e, "Error listing checks"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checker::ThresholdValueChecker;
    use crate::models::{AlertType, Check};
    use crate::notification::NotificationDispatcher;
    use crate::store::{MemoryAlertsStore, MemoryChecksStore};
    use crate::testing::StubTargetChecker;
    use std::time::Duration;

    fn scheduler(
        checks: &MemoryChecksStore,
        targets: &Arc<StubTargetChecker>,
        config: SchedulerConfig,
    ) -> CheckScheduler {
        let runner = CheckRunner::new(
            Arc::new(MemoryAlertsStore::new()),
            Arc::new(checks.clone()),
            targets.clone(),
            Arc::new(ThresholdValueChecker::new()),
            NotificationDispatcher::default(),
        );
        CheckScheduler::new(Arc::new(runner), Arc::new(checks.clone()), config)
    }

    #[tokio::test]
    async fn test_run_once_evaluates_enabled_checks() {
        let mut disabled = Check::new("disabled", "x.*", 2.0, 3.0);
        disabled.enabled = false;
        let checks: MemoryChecksStore = (0..10)
            .map(|i| Check::new(format!("check-{i}"), "x.*", 2.0, 3.0))
            .chain([disabled])
            .collect();
        let targets = StubTargetChecker::new();
        for i in 0..10 {
            targets.set(&format!("check-{i}"), &[("x.a", Some(5.0))]);
        }
        let config = SchedulerConfig {
            max_concurrent_checks: 3,
            ..SchedulerConfig::default()
        };

        let summary = scheduler(&checks, &targets, config).run_once().await.unwrap();

        assert_eq!(summary.completed, 10);
        assert_eq!(summary.total(), 10);
        assert_eq!(targets.calls(), 10);
        for check in checks.get_checks(true).await.unwrap() {
            assert_eq!(check.state, AlertType::Error);
        }
    }

    #[tokio::test]
    async fn test_failing_check_does_not_affect_others() {
        let checks: MemoryChecksStore = ["good", "bad"]
            .into_iter()
            .map(|name| Check::new(name, "x.*", 2.0, 3.0))
            .collect();
        let targets = StubTargetChecker::new();
        targets.set("good", &[("x.a", Some(2.5))]);
        targets.fail("bad");

        let summary = scheduler(&checks, &targets, SchedulerConfig::default())
            .run_once()
            .await
            .unwrap();

        assert_eq!(summary.completed, 1);
        assert_eq!(summary.aborted, 1);
        let states: Vec<(String, AlertType)> = checks
            .get_checks(false)
            .await
            .unwrap()
            .into_iter()
            .map(|c| (c.name, c.state))
            .collect();
        assert_eq!(
            states,
            vec![
                ("bad".to_string(), AlertType::Ok),
                ("good".to_string(), AlertType::Warn)
            ]
        );
    }

    #[tokio::test]
    async fn test_slow_check_times_out_alone() {
        let checks: MemoryChecksStore = ["fast", "slow"]
            .into_iter()
            .map(|name| Check::new(name, "x.*", 2.0, 3.0))
            .collect();
        let targets = StubTargetChecker::new();
        targets.set("fast", &[("x.a", Some(5.0))]);
        targets.delay("slow", Duration::from_secs(30));
        let config = SchedulerConfig {
            run_timeout: Duration::from_millis(100),
            ..SchedulerConfig::default()
        };

        let summary = scheduler(&checks, &targets, config).run_once().await.unwrap();

        assert_eq!(summary.completed, 1);
        assert_eq!(summary.timed_out, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let checks: MemoryChecksStore = [Check::new("cpu", "x.*", 2.0, 3.0)].into_iter().collect();
        let targets = StubTargetChecker::new();
        let config = SchedulerConfig {
            interval: Duration::from_millis(10),
            ..SchedulerConfig::default()
        };
        let scheduler = Arc::new(scheduler(&checks, &targets, config));
        let shutdown = CancellationToken::new();

        let handle = {
            let scheduler = Arc::clone(&scheduler);
            let shutdown = shutdown.clone();
            tokio::spawn(async move { scheduler.run(shutdown).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        shutdown.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();

        assert!(targets.calls() >= 1);
    }
}
