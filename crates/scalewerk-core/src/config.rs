// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Driver configuration file: one settings section per engine.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::Result;
use crate::types::DriverSettings;

/// File name looked up inside the config directory.
pub const CONFIG_FILE_NAME: &str = "drivers.json";

/// Persistent driver settings, keyed by engine section name
/// (e.g. `srmd_ncnn_vulkan`, `waifu2x_caffe`).
///
/// Sections are stored raw; validating them against an engine's option
/// schema is the driver crate's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DriverConfig {
    pub drivers: BTreeMap<String, DriverSettings>,
}

impl DriverConfig {
    /// Read and parse a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        info!(path = %path.display(), sections = config.drivers.len(), "driver config loaded");
        Ok(config)
    }

    /// Write the config as pretty-printed JSON, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "driver config saved");
        Ok(())
    }

    pub fn section(&self, name: &str) -> Option<&DriverSettings> {
        self.drivers.get(name)
    }

    /// Default config location.
    ///
    /// `$XDG_CONFIG_HOME/scalewerk/drivers.json`, falling back to
    /// `$HOME/.config/scalewerk/drivers.json`, then the working directory.
    pub fn default_path() -> PathBuf {
        config_base().join("scalewerk").join(CONFIG_FILE_NAME)
    }
}

fn config_base() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        if !xdg.is_empty() {
            return PathBuf::from(xdg);
        }
    }
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".config");
    }
    PathBuf::from(".")
}
