// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Service configuration.
//!
//! Supports both programmatic and file-based (TOML) configuration. All
//! components receive an explicit `Config`; there is no ambient global
//! lookup.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Position and unit of one value field within a logged line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Zero-based position within the comma-split line.
    pub index: usize,

    /// Unit suffix appended when not already present (may be empty).
    #[serde(default)]
    pub unit: String,
}

/// Service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the `YYYY-MM-DD` day files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Sensors to resolve, in output order.
    #[serde(default)]
    pub tracked_sensors: Vec<String>,

    /// Byte budget for the tail window. Must fit several complete lines for
    /// the number of tracked sensors.
    #[serde(default = "default_window_bytes")]
    pub window_bytes: u64,

    /// Value fields extracted per record.
    #[serde(default = "default_value_fields")]
    pub value_fields: Vec<FieldSpec>,

    /// Topics the formatted report is published to.
    #[serde(default)]
    pub publish_topics: Vec<String>,

    /// Periodic report trigger in seconds (0 = external triggers only).
    #[serde(default)]
    pub report_interval_secs: u64,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("sensor-data")
}

fn default_window_bytes() -> u64 {
    500
}

fn default_value_fields() -> Vec<FieldSpec> {
    // Reference encoding: temperature at position 2, humidity at position 4.
    vec![
        FieldSpec {
            index: 2,
            unit: " *C".to_string(),
        },
        FieldSpec {
            index: 4,
            unit: "%".to_string(),
        },
    ]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            tracked_sensors: Vec::new(),
            window_bytes: default_window_bytes(),
            value_fields: default_value_fields(),
            publish_topics: Vec::new(),
            report_interval_secs: 0,
        }
    }
}

impl Config {
    /// Create a new config builder.
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_bytes == 0 {
            return Err(ConfigError::Invalid("window_bytes must be non-zero".into()));
        }
        if self.value_fields.is_empty() {
            return Err(ConfigError::Invalid("no value fields configured".into()));
        }
        Ok(())
    }
}

/// Config builder for fluent API.
#[derive(Debug, Default)]
pub struct ConfigBuilder {
    data_dir: Option<PathBuf>,
    tracked_sensors: Vec<String>,
    window_bytes: Option<u64>,
    value_fields: Option<Vec<FieldSpec>>,
    publish_topics: Vec<String>,
    report_interval_secs: Option<u64>,
}

impl ConfigBuilder {
    /// Set the data directory.
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Add a tracked sensor (output order follows call order).
    pub fn tracked_sensor(mut self, sensor_id: impl Into<String>) -> Self {
        self.tracked_sensors.push(sensor_id.into());
        self
    }

    /// Set the tail window byte budget.
    pub fn window_bytes(mut self, bytes: u64) -> Self {
        self.window_bytes = Some(bytes);
        self
    }

    /// Replace the extracted value fields.
    pub fn value_fields(mut self, fields: Vec<FieldSpec>) -> Self {
        self.value_fields = Some(fields);
        self
    }

    /// Add an outbound report topic.
    pub fn publish_topic(mut self, topic: impl Into<String>) -> Self {
        self.publish_topics.push(topic.into());
        self
    }

    /// Set the periodic report interval in seconds (0 = external only).
    pub fn report_interval_secs(mut self, secs: u64) -> Self {
        self.report_interval_secs = Some(secs);
        self
    }

    /// Build the configuration.
    pub fn build(self) -> Config {
        let defaults = Config::default();

        Config {
            data_dir: self.data_dir.unwrap_or(defaults.data_dir),
            tracked_sensors: self.tracked_sensors,
            window_bytes: self.window_bytes.unwrap_or(defaults.window_bytes),
            value_fields: self.value_fields.unwrap_or(defaults.value_fields),
            publish_topics: self.publish_topics,
            report_interval_secs: self
                .report_interval_secs
                .unwrap_or(defaults.report_interval_secs),
        }
    }
}
