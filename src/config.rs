//! shiftlog configuration loaded from `shiftlog.toml`.
//!
//! [`ShiftlogConfig`] holds every configurable parameter; fields missing from
//! the file fall back to defaults. The `SHIFTLOG_WORKER` environment variable
//! takes precedence over the file for the worker id.

use anyhow::Result;
use serde::Deserialize;
use std::path::Path;

pub const CONFIG_FILE: &str = "shiftlog.toml";

/// Top-level configuration loaded from `shiftlog.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ShiftlogConfig {
    /// Worker whose events are recorded when `--worker` is not given.
    #[serde(default = "default_worker_id")]
    pub worker_id: String,

    /// `tracing` filter directive used when `SHIFTLOG_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Log output format: "compact" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,
}

fn default_worker_id() -> String {
    "local".to_string()
}

fn default_log_filter() -> String {
    "shiftlog=info".to_string()
}

fn default_log_format() -> String {
    "compact".to_string()
}

impl Default for ShiftlogConfig {
    fn default() -> Self {
        Self {
            worker_id: default_worker_id(),
            log_filter: default_log_filter(),
            log_format: default_log_format(),
        }
    }
}

impl ShiftlogConfig {
    /// Load `shiftlog.toml` from the current directory, using defaults if the
    /// file does not exist.
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(path)?;
            toml::from_str::<ShiftlogConfig>(&contents)?
        } else {
            Self::default()
        };

        if let Ok(worker) = std::env::var("SHIFTLOG_WORKER")
            && !worker.trim().is_empty()
        {
            config.worker_id = worker.trim().to_string();
        }

        Ok(config)
    }
}
