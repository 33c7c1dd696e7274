//! CLI configuration.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use workday_core::{OfficeLocation, DEFAULT_TARGET_HOURS};

/// Settings for the `workday` binary. Every field has a default, so an empty
/// JSON object is a valid file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkdayConfig {
    /// Base URL of the API both services live under
    pub api_base_url: String,

    /// Per-request timeout
    pub request_timeout_secs: u64,

    /// Target length of a new day
    pub target_hours: f64,

    /// Progress tick period for `watch`
    pub tick_interval_ms: u64,

    /// Office the geofence is drawn around
    pub office: OfficeLocation,
}

impl Default for WorkdayConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:5000/api".to_string(),
            request_timeout_secs: 30,
            target_hours: DEFAULT_TARGET_HOURS,
            tick_interval_ms: 1000,
            office: OfficeLocation::default(),
        }
    }
}

impl WorkdayConfig {
    /// Load from a JSON file, or defaults when no path is given.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        Self::from_json(&content).with_context(|| format!("Invalid config {}", path.display()))
    }

    /// Parse and validate a JSON document.
    pub fn from_json(content: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the session code cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.api_base_url.trim().is_empty() {
            bail!("api_base_url must not be empty");
        }
        if !self.target_hours.is_finite() || self.target_hours <= 0.0 {
            bail!("target_hours must be positive, got {}", self.target_hours);
        }
        if self.tick_interval_ms == 0 {
            bail!("tick_interval_ms must be non-zero");
        }
        self.office.validate().context("office location")?;
        Ok(())
    }

    /// Request timeout as a duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Tick period as a duration.
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
