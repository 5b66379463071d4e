//! Target value fetching

use std::collections::HashMap;
use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::Check;

/// What a target checker is asked to fetch
#[derive(Debug, Clone, Copy)]
pub struct TargetContext<'a> {
    /// The check being evaluated
    pub check: &'a Check,
    /// Logical time of the run, shared by every target
    pub now: DateTime<Utc>,
}

impl<'a> TargetContext<'a> {
    /// Create a new context
    pub fn new(check: &'a Check, now: DateTime<Utc>) -> Self {
        Self { check, now }
    }
}

/// Fetches the current reading of every target a check monitors.
///
/// A target mapped to `None` had no datum in the evaluation window; that is
/// not an error.
#[async_trait]
pub trait TargetChecker: Send + Sync {
    /// Fetch readings for `ctx.check` at `ctx.now`
    async fn check(&self, ctx: TargetContext<'_>) -> Result<HashMap<String, Option<f64>>>;
}

/// Reads target values from a JSON document on every fetch.
///
/// The document maps check names to `{ target: number | null }` objects.
/// A check missing from the document has no targets.
#[derive(Debug, Clone)]
pub struct FileTargetChecker {
    path: PathBuf,
}

impl FileTargetChecker {
    /// Create a checker backed by the file at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl TargetChecker for FileTargetChecker {
    async fn check(&self, ctx: TargetContext<'_>) -> Result<HashMap<String, Option<f64>>> {
        let raw = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            Error::fetch(format!("failed to read {}: {e}", self.path.display()))
        })?;

        let mut document: HashMap<String, HashMap<String, Option<f64>>> =
            serde_json::from_str(&raw).map_err(|e| {
                Error::fetch(format!("malformed values file {}: {e}", self.path.display()))
            })?;

        let values = document.remove(&ctx.check.name).unwrap_or_default();

        debug!(
            check_name = %ctx.check.name,
            targets = values.len(),
            "Fetched target values from file"
        );

        Ok(values)
    }
}
