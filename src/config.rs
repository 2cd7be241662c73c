//! Recorder configuration
//!
//! Loaded from a JSON file; every field has a default so a partial file (or
//! `{}`) is valid.

use crate::storage::SlotId;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecorderConfig {
    /// Chip-select line of the card
    pub slot: SlotId,

    /// Session length used by `start_default`
    pub default_duration_secs: u32,

    /// Upper bound on file name candidates tried per `start`
    pub max_name_attempts: u32,

    /// Pause between name candidates, so the clock moves on
    pub collision_delay_ms: u64,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            slot: SlotId(4),
            default_duration_secs: 2 * 60 * 60,
            max_name_attempts: 1000,
            collision_delay_ms: 1,
        }
    }
}

impl RecorderConfig {
    /// Read and validate a JSON config file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: RecorderConfig = serde_json::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;

        tracing::debug!("Loaded recorder config from {:?}: {:?}", path, config);
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_name_attempts == 0 {
            bail!("maxNameAttempts must be at least 1");
        }
        Ok(())
    }
}
