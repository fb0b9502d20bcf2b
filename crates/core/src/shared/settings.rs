use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::shared::constants::{
    CPUS_PER_EXPIRY_WORKER, DEFAULT_ACTIVE_TTL_SECS, DEFAULT_LOST_TTL_SECS,
    DEFAULT_SWEEP_INTERVAL_MS,
};
use crate::tracking::domain::expiry_policy::ExpiryPolicy;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("failed to read settings from {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed track settings: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid track settings: {0}")]
    Invalid(&'static str),
}

/// Tunables for track expiry.
///
/// Every field has a default, so a partial document (or `{}`) is valid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSettings {
    pub lost_ttl_secs: u64,
    pub active_ttl_secs: u64,
    pub sweep_interval_ms: u64,
    /// Worker thread count; derived from the CPU count when unset.
    pub num_workers: Option<usize>,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            lost_ttl_secs: DEFAULT_LOST_TTL_SECS,
            active_ttl_secs: DEFAULT_ACTIVE_TTL_SECS,
            sweep_interval_ms: DEFAULT_SWEEP_INTERVAL_MS,
            num_workers: None,
        }
    }
}

impl TrackSettings {
    pub fn from_json_str(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json).map_err(SettingsError::Parse)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|e| SettingsError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> Result<(), SettingsError> {
        if self.sweep_interval_ms == 0 {
            return Err(SettingsError::Invalid("sweep_interval_ms must be >= 1"));
        }
        if self.num_workers == Some(0) {
            return Err(SettingsError::Invalid("num_workers must be >= 1"));
        }
        Ok(())
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(
            Duration::from_secs(self.lost_ttl_secs),
            Duration::from_secs(self.active_ttl_secs),
        )
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_millis(self.sweep_interval_ms.max(1))
    }

    /// Configured worker count, or one worker per `CPUS_PER_EXPIRY_WORKER` CPUs.
    pub fn resolved_num_workers(&self) -> usize {
        match self.num_workers {
            Some(n) => n.max(1),
            None => {
                let cpus = std::thread::available_parallelism()
                    .map(NonZeroUsize::get)
                    .unwrap_or(1);
                (cpus / CPUS_PER_EXPIRY_WORKER).max(1)
            }
        }
    }
}
