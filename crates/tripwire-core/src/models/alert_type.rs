//! Severity model

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a check or of a single target reading.
///
/// Variants are declared in aggregation order, so the derived `Ord` gives
/// `Unknown < Ok < Warn < Error`. `Unknown` means "no confirmed signal" and
/// ranks below `Ok` so that any real measurement overrides it when the worst
/// severity of several targets is computed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AlertType {
    /// No data has confirmed a state yet
    Unknown,
    /// Below the warn threshold
    #[default]
    Ok,
    /// Beyond the warn threshold
    Warn,
    /// Beyond the error threshold
    Error,
}

impl AlertType {
    /// All severities, lightest first
    pub const ALL: [AlertType; 4] = [
        AlertType::Unknown,
        AlertType::Ok,
        AlertType::Warn,
        AlertType::Error,
    ];

    /// Whether `self` is strictly worse than `other`
    pub fn is_worse_than(self, other: AlertType) -> bool {
        self > other
    }

    /// Worst severity of `states`, starting from `initial`
    pub fn worst_of<I>(initial: AlertType, states: I) -> AlertType
    where
        I: IntoIterator<Item = AlertType>,
    {
        states.into_iter().fold(initial, AlertType::max)
    }

    /// Upper-case name as persisted and logged
    pub fn as_str(self) -> &'static str {
        match self {
            AlertType::Unknown => "UNKNOWN",
            AlertType::Ok => "OK",
            AlertType::Warn => "WARN",
            AlertType::Error => "ERROR",
        }
    }
}

impl fmt::Display for AlertType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
