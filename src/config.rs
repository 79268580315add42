//! Provides a ConfigManager to read and refresh config from files.
//!

use color_eyre::{Result, eyre::eyre};
use log::*;
use notify::{RecommendedWatcher, Watcher};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};
use tokio::sync::mpsc::UnboundedSender;
use utiltrack::{ResourceOverrides, SystemResources, TrackerOptions};

use crate::event::{AppEvent, Event};

pub const DEFAULT_FILE: &str = "utiltrack.toml";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UtiltrackConfig {
    /// How much published history the dashboard keeps.
    #[serde(default = "default_history_seconds")]
    pub history_seconds: u64,
    /// Also write every published utilization to the log.
    #[serde(default = "default_log_publisher")]
    pub log_publisher: bool,
    #[serde(default)]
    pub tracker: TrackerOptions,
    #[serde(default)]
    pub resources: ResourceOverrides,
}

fn default_history_seconds() -> u64 {
    120
}

fn default_log_publisher() -> bool {
    true
}

impl Default for UtiltrackConfig {
    fn default() -> Self {
        Self {
            history_seconds: default_history_seconds(),
            log_publisher: default_log_publisher(),
            tracker: TrackerOptions::default(),
            resources: ResourceOverrides::default(),
        }
    }
}

impl UtiltrackConfig {
    pub fn validate(&self) -> Result<()> {
        self.tracker.validate()?;
        if let Some(units) = self.resources.cpu_units {
            SystemResources::new(units, self.resources.memory_limit_bytes.unwrap_or(1))?;
        }
        if self.resources.memory_limit_bytes == Some(0) {
            return Err(eyre!("resources.memory_limit_bytes must be greater than zero"));
        }
        if self.history_seconds == 0 {
            return Err(eyre!("history_seconds must be greater than zero"));
        }
        Ok(())
    }

    pub fn history(&self) -> Duration {
        Duration::from_secs(self.history_seconds)
    }
}

#[derive(Debug)]
pub struct ConfigManager {
    pub file_path: PathBuf,
    config: UtiltrackConfig,
    _watcher: RecommendedWatcher,
}

impl ConfigManager {
    pub fn new(file_path: PathBuf, sender: UnboundedSender<Event>) -> Result<ConfigManager> {
        let captured = sender.clone();
        let mut watcher = notify::recommended_watcher(move |_| {
            let _ = captured.send(Event::App(AppEvent::Reload));
        })?;
        info!(target: "Config", "Watching file {:?}", file_path);
        watcher.watch(&file_path, notify::RecursiveMode::NonRecursive)?;
        Ok(ConfigManager {
            file_path: file_path.clone(),
            config: load_from_file(file_path)?,
            _watcher: watcher,
        })
    }

    pub fn current(&self) -> UtiltrackConfig {
        self.config.clone()
    }

    /// Load the file again. The previous config stays current if the new one
    /// does not load or validate.
    pub fn reload(&mut self) -> Result<UtiltrackConfig> {
        self.config = load_from_file(self.file_path.clone())?;
        Ok(self.current())
    }
}

/// Read and validate a config file, with `UTILTRACK_` environment overrides
/// (`UTILTRACK_TRACKER__SAMPLING_INTERVAL_MS=500`).
pub fn load_from_file(file_path: PathBuf) -> Result<UtiltrackConfig> {
    load_with_environment(file_path, environment())
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("UTILTRACK")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

fn load_with_environment(
    file_path: PathBuf,
    environment: config::Environment,
) -> Result<UtiltrackConfig> {
    let raw = config::Config::builder()
        .add_source(config::File::from(file_path))
        .add_source(environment)
        .build()?;
    let config: UtiltrackConfig = raw.try_deserialize()?;
    config.validate()?;
    Ok(config)
}
