//! YAML run configuration (`--config <file>`).
//!
//! ```yaml
//! seed: 42
//! format: copy
//! batch_inserts: true
//! batch_size: 500
//! cache_capacity: 20000
//! reference_time: "2025-01-01 00:00:00"
//! ```
//!
//! Every key is optional. Values here override [`PipelineOptions`] defaults
//! and are in turn overridden by command-line flags.

use crate::error::SettingsError;
use crate::pipeline::PipelineOptions;
use crate::value::parse_timestamp;
use crate::writer::OutputFormat;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Settings {
    pub seed: Option<i64>,
    pub format: Option<OutputFormat>,
    pub batch_inserts: Option<bool>,
    pub batch_size: Option<usize>,
    pub cache_capacity: Option<i64>,
    pub reference_time: Option<String>,
}

impl Settings {
    /// Load settings from a YAML file
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let content = fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, SettingsError> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Apply these settings on top of `options`.
    pub fn apply(&self, mut options: PipelineOptions) -> Result<PipelineOptions, SettingsError> {
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if let Some(format) = self.format {
            options.format = format;
        }
        if let Some(batch) = self.batch_inserts {
            options.batch_inserts = batch;
        }
        if let Some(size) = self.batch_size {
            options.batch_size = size;
        }
        if let Some(capacity) = self.cache_capacity {
            options.cache_capacity = capacity;
        }
        if let Some(ref raw) = self.reference_time {
            options.reference_time = parse_timestamp(raw).ok_or_else(|| SettingsError::Invalid {
                key: "reference_time",
                message: format!("'{}' is not a timestamp (expected YYYY-MM-DD HH:MM:SS)", raw),
            })?;
        }
        Ok(options)
    }
}
