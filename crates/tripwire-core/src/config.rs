//! Configuration management for Tripwire

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;

use crate::error::{Error, Result};

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "TRIPWIRE";

/// Main configuration struct
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Scheduler configuration
    pub scheduler: SchedulerConfig,

    /// Notification configuration
    pub notifications: NotificationConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from an optional file, overridden by `TRIPWIRE__*`
    /// environment variables (e.g. `TRIPWIRE__SCHEDULER__INTERVAL=30s`).
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config: Self = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the scheduler cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.scheduler.interval.is_zero() {
            return Err(Error::validation("scheduler.interval must be greater than zero"));
        }
        if self.scheduler.max_concurrent_checks == 0 {
            return Err(Error::validation(
                "scheduler.max_concurrent_checks must be at least 1",
            ));
        }
        if self.scheduler.max_concurrent_checks > Semaphore::MAX_PERMITS {
            return Err(Error::validation(format!(
                "scheduler.max_concurrent_checks must be at most {}",
                Semaphore::MAX_PERMITS
            )));
        }
        if self.scheduler.run_timeout.is_zero() {
            return Err(Error::validation("scheduler.run_timeout must be greater than zero"));
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(Error::validation(format!(
                "logging.format must be 'pretty' or 'json', got '{}'",
                self.logging.format
            )));
        }
        Ok(())
    }
}

/// Scheduler configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Time between two evaluation passes
    #[serde(with = "humantime_serde")]
    pub interval: Duration,
    /// Maximum number of checks evaluated at the same time
    pub max_concurrent_checks: usize,
    /// Upper bound for a single check run
    #[serde(with = "humantime_serde")]
    pub run_timeout: Duration,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(60),
            max_concurrent_checks: 16,
            run_timeout: Duration::from_secs(30),
        }
    }
}

/// Notification configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Request timeout for webhook deliveries
    #[serde(with = "humantime_serde")]
    pub webhook_timeout: Duration,
    /// Register the log channel
    pub log_channel_enabled: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            webhook_timeout: Duration::from_secs(10),
            log_channel_enabled: true,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Log format (json or pretty)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.scheduler.interval, Duration::from_secs(60));
        assert_eq!(config.scheduler.max_concurrent_checks, 16);
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[scheduler]
interval = "15s"
max_concurrent_checks = 4
run_timeout = "5s"

[logging]
format = "json"
"#
        )
        .unwrap();

        let config = Config::load(Some(file.path())).unwrap();

        assert_eq!(config.scheduler.interval, Duration::from_secs(15));
        assert_eq!(config.scheduler.max_concurrent_checks, 4);
        assert_eq!(config.scheduler.run_timeout, Duration::from_secs(5));
        assert_eq!(config.logging.format, "json");
        // untouched sections keep their defaults
        assert_eq!(config.logging.level, "info");
        assert!(config.notifications.log_channel_enabled);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let result = Config::load(Some(Path::new("/nonexistent/tripwire.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }

    #[test]
    fn test_rejects_zero_concurrency() {
        let mut config = Config::default();
        config.scheduler.max_concurrent_checks = 0;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_rejects_concurrency_above_semaphore_limit() {
        let mut config = Config::default();
        config.scheduler.max_concurrent_checks = Semaphore::MAX_PERMITS + 1;
        assert!(matches!(config.validate(), Err(Error::Validation(_))));

        config.scheduler.max_concurrent_checks = Semaphore::MAX_PERMITS;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_unknown_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();
        assert!(matches!(config.validate(), Err(Error::Validation(_))));
    }
}
