//! Check scheduling and evaluation
//!
//! [`CheckRunner`] evaluates one check; [`CheckScheduler`] drives the runner
//! over every enabled check on a fixed interval.

mod runner;
mod scheduler;

pub use runner::{CheckRunner, RunOutcome, RunReport, RunStage};
pub use scheduler::{CheckScheduler, PassSummary};
