//! Checkers consumed by the check runner
//!
//! A [`TargetChecker`] fetches the current reading of every target a check
//! monitors; a [`ValueChecker`] maps a single reading onto an [`AlertType`](crate::models::AlertType).

mod target;
mod value;

pub use target::{FileTargetChecker, TargetChecker, TargetContext};
pub use value::{ThresholdValueChecker, ValueChecker};
