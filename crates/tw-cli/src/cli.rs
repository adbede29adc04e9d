//! CLI configuration loaded from `trapweave.toml`

use crate::{CliError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tw_pipeline::DEFAULT_BATCH_SIZE;

/// Default configuration file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "trapweave.toml";

/// CLI configuration; every field may be overridden on the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// Weaving settings
    pub weave: WeaveConfig,

    /// Output settings
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeaveConfig {
    /// Treat modules as standard-library modules
    pub std_mode: bool,

    /// Instrument package-level variables and constants
    pub var_trap: bool,

    /// Registration statements per synthesized unit
    pub batch_size: usize,

    /// Log every descriptor that survives filtering
    pub print_descriptors: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory receiving descriptor dumps
    pub data_dir: Option<PathBuf>,

    /// Directory receiving synthesized units; the module directory when unset
    pub out_dir: Option<PathBuf>,
}

impl Default for WeaveConfig {
    fn default() -> Self {
        Self {
            std_mode: false,
            var_trap: false,
            batch_size: DEFAULT_BATCH_SIZE,
            print_descriptors: false,
        }
    }
}

impl CliConfig {
    /// Load configuration from file, falling back to defaults
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_from_file(path),
            None => {
                let local = Path::new(CONFIG_FILE_NAME);
                if local.is_file() {
                    Self::load_from_file(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CliError::Config(format!("Failed to read config file {}: {}", path.display(), e))
        })?;
        Self::parse(&content)
            .map_err(|e| CliError::Config(format!("Failed to parse config file {}: {}", path.display(), e)))
    }

    pub fn parse(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}
