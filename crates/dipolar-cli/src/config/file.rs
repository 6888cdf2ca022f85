use crate::error::{CliError, Result};
use dipolar::core::physics::constants::PhysicalConstants;
use serde::Deserialize;
use std::path::Path;
use tracing::debug;

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FileInputConfig {
    pub limit: Option<usize>,
    pub skip_malformed: Option<bool>,
}

#[derive(Deserialize, Debug, Default, Clone, Copy)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
pub struct FilePipelineConfig {
    pub workers: Option<usize>,
    pub pair_queue_capacity: Option<usize>,
    pub result_queue_capacity: Option<usize>,
    pub write_step: Option<u64>,
    pub shutdown_grace_ms: Option<u64>,
}

/// Everything a configuration file may set. Every table and key is optional.
#[derive(Deserialize, Debug, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub input: Option<FileInputConfig>,
    pub pipeline: Option<FilePipelineConfig>,
    pub constants: Option<PhysicalConstants>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
