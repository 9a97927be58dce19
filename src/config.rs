//! Configuration for tile mosaicing runs.

use crate::transform::MosaicOptions;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for a mosaic run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Input configuration
    #[serde(default)]
    pub input: InputConfig,

    /// Mosaic configuration
    #[serde(default)]
    pub mosaic: MosaicConfig,
}

/// Where tiles are read from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InputConfig {
    /// Directory the tile files are resolved against
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Tile files to combine, relative to `data_dir`
    #[serde(default)]
    pub files: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            files: Vec::new(),
        }
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

/// How tiles are combined.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MosaicConfig {
    /// Output resolution in earth units per pixel (default: finest input)
    #[serde(default)]
    pub resolution: Option<u32>,

    /// Keep the full union extent, zero-filled where no tile has data
    #[serde(default = "default_true")]
    pub padding: bool,
}

impl Default for MosaicConfig {
    fn default() -> Self {
        Self {
            resolution: None,
            padding: true,
        }
    }
}

impl MosaicConfig {
    /// Options for the two-tile orchestrator.
    pub fn options(&self) -> MosaicOptions {
        MosaicOptions {
            resolution: self.resolution,
            padding: self.padding,
        }
    }
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a YAML or JSON file.
    /// Format is auto-detected from file extension (.yaml, .yml, or .json).
    pub fn from_file(path: &PathBuf) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        let config: Config = match ext {
            "json" => serde_json::from_str(&contents)?,
            // YAML is a superset of JSON
            _ => serde_yaml::from_str(&contents)?,
        };
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> anyhow::Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from a JSON string.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let config: Config = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.input.data_dir.as_os_str().is_empty() {
            anyhow::bail!("data_dir must not be empty");
        }
        if self.mosaic.resolution == Some(0) {
            anyhow::bail!("Mosaic resolution must be > 0");
        }
        if self.input.files.iter().any(|f| f.trim().is_empty()) {
            anyhow::bail!("Input file names must not be empty");
        }
        Ok(())
    }
}

/// Commented sample configuration written by `generate-config`.
pub const SAMPLE_CONFIG: &str = r#"# aigean-mosaic configuration

input:
  # Directory tile files are resolved against
  data_dir: "."

  # Tiles to combine (zip bundles with a JSON sidecar and an .npy raster)
  files:
    - aigean_fan_20230104_150010.zip
    - aigean_fan_20230104_145310.zip

mosaic:
  # Output resolution in earth units per pixel; omit to use the finest input
  # resolution: 5

  # Keep the full union extent, zero-filled where no tile has data
  padding: true
"#;
