//! Threshold classification

use crate::models::AlertType;

/// Maps a reading and a check's thresholds onto a severity
pub trait ValueChecker: Send + Sync {
    /// Classify `value` against the `warn` and `error` thresholds
    fn check_value(&self, value: f64, warn: f64, error: f64) -> AlertType;
}

/// Default classifier.
///
/// When `warn <= error` higher readings are worse, otherwise lower readings
/// are worse. Reaching a threshold counts as crossing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdValueChecker;

impl ThresholdValueChecker {
    /// Create a new threshold checker
    pub fn new() -> Self {
        Self
    }

    fn is_beyond(value: f64, threshold: f64, high_is_worse: bool) -> bool {
        if high_is_worse {
            value >= threshold
        } else {
            value <= threshold
        }
    }
}

impl ValueChecker for ThresholdValueChecker {
    fn check_value(&self, value: f64, warn: f64, error: f64) -> AlertType {
        if value.is_nan() {
            return AlertType::Unknown;
        }

        let high_is_worse = warn <= error;

        if Self::is_beyond(value, error, high_is_worse) {
            AlertType::Error
        } else if Self::is_beyond(value, warn, high_is_worse) {
            AlertType::Warn
        } else {
            AlertType::Ok
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(1.0, AlertType::Ok)]
    #[case(2.0, AlertType::Warn)]
    #[case(2.5, AlertType::Warn)]
    #[case(3.0, AlertType::Error)]
    #[case(100.0, AlertType::Error)]
    fn test_higher_is_worse(#[case] value: f64, #[case] expected: AlertType) {
        assert_eq!(ThresholdValueChecker::new().check_value(value, 2.0, 3.0), expected);
    }

    #[rstest]
    #[case(10.0, AlertType::Ok)]
    #[case(5.0, AlertType::Warn)]
    #[case(3.0, AlertType::Warn)]
    #[case(2.0, AlertType::Error)]
    #[case(-1.0, AlertType::Error)]
    fn test_lower_is_worse(#[case] value: f64, #[case] expected: AlertType) {
        assert_eq!(ThresholdValueChecker::new().check_value(value, 5.0, 2.0), expected);
    }

    #[test]
    fn test_equal_thresholds_skip_warn() {
        let checker = ThresholdValueChecker::new();
        assert_eq!(checker.check_value(4.9, 5.0, 5.0), AlertType::Ok);
        assert_eq!(checker.check_value(5.0, 5.0, 5.0), AlertType::Error);
    }

    #[test]
    fn test_nan_is_unknown() {
        assert_eq!(
            ThresholdValueChecker::new().check_value(f64::NAN, 2.0, 3.0),
            AlertType::Unknown
        );
    }
}
