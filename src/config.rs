//! Controller configuration
//!
//! Stored as TOML, by default in `~/.config/emucontroller/controller.toml`.
//! A missing file means defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use emucontroller_core::{DeviceStrings, HidError, QueuePolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Device setup failed: {0}")]
    Device(#[from] HidError),
}

/// Identity and strings the device reports to the host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceConfig {
    #[serde(default = "default_vendor_id")]
    pub vendor_id: u16,
    #[serde(default = "default_product_id")]
    pub product_id: u16,
    #[serde(default = "default_version")]
    pub version: u16,
    #[serde(default = "default_manufacturer")]
    pub manufacturer: String,
    #[serde(default = "default_product")]
    pub product: String,
    #[serde(default = "default_serial")]
    pub serial_number: String,
    /// Get-Indexed-String table, keyed by decimal index
    #[serde(default)]
    pub indexed_strings: BTreeMap<String, String>,
}

fn default_vendor_id() -> u16 {
    0xDEED
}

fn default_product_id() -> u16 {
    0xFEED
}

fn default_version() -> u16 {
    0x0101
}

fn default_manufacturer() -> String {
    "EmuController".to_string()
}

fn default_product() -> String {
    "EmuController Virtual Gamepad".to_string()
}

fn default_serial() -> String {
    "EMU-000001".to_string()
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            vendor_id: default_vendor_id(),
            product_id: default_product_id(),
            version: default_version(),
            manufacturer: default_manufacturer(),
            product: default_product(),
            serial_number: default_serial(),
            indexed_strings: BTreeMap::new(),
        }
    }
}

impl DeviceConfig {
    /// Strings table for the device
    pub fn strings(&self) -> Result<DeviceStrings, ConfigError> {
        let mut indexed = BTreeMap::new();
        for (key, value) in &self.indexed_strings {
            let index = key.parse::<u32>().map_err(|_| {
                ConfigError::Invalid(format!("indexed string key \"{key}\" is not a number"))
            })?;
            indexed.insert(index, value.clone());
        }
        Ok(DeviceStrings {
            manufacturer: self.manufacturer.clone(),
            product: self.product.clone(),
            serial_number: self.serial_number.clone(),
            indexed,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TriggerConfig {
    /// Firing period of the simulated interrupt
    #[serde(default = "default_period_ms")]
    pub period_ms: u64,
}

fn default_period_ms() -> u64 {
    10
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            period_ms: default_period_ms(),
        }
    }
}

impl TriggerConfig {
    pub fn period(&self) -> Duration {
        Duration::from_millis(self.period_ms)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ControllerConfig {
    #[serde(default)]
    pub device: DeviceConfig,
    #[serde(default)]
    pub queue: QueuePolicy,
    #[serde(default)]
    pub trigger: TriggerConfig,
}

impl ControllerConfig {
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("emucontroller")
            .join("controller.toml")
    }

    /// Load config from a file, or return defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: ControllerConfig =
            toml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let io_err = |source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(io_err)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.trigger.period_ms == 0 {
            return Err(ConfigError::Invalid(
                "trigger.period_ms must be at least 1".into(),
            ));
        }
        if self.queue.capacity == Some(0) {
            return Err(ConfigError::Invalid(
                "queue.capacity must be at least 1 (omit it for unbounded)".into(),
            ));
        }
        self.device.strings()?;
        Ok(())
    }
}
